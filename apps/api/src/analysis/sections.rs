//! Section Segmenter — finds a heading in free-form analysis text and collects the bullet
//! items written under it.
//!
//! Headings come from a single category → alternatives registry. Where a section ends is
//! decided by a [`SectionBoundary`], a list of rules that can be extended without touching
//! the segmenter itself.

use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Items kept per section; anything past this is dropped.
pub const DEFAULT_ITEM_LIMIT: usize = 4;

/// Characters that start a list item.
pub const BULLET_MARKERS: &[char] = &['-', '–', '•', '●', '·', '▪'];

/// UTF-8 bullet decoded as Windows-1252, as seen in text that passed through a bad encoding hop.
pub const MISENCODED_BULLET: &str = "â€¢";

/// Labels that head a score line rather than a section. They still end a section.
const SCORE_LABELS: &[&str] = &[
    "Overall Rating",
    "Overall Score",
    "ATS Score",
    "ATS Compatibility Score",
    "Compatibility Score",
];

// ────────────────────────────────────────────────────────────────────────────
// Heading registry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionCategory {
    Strengths,
    Issues,
    Recommendations,
    FoundKeywords,
    MissingKeywords,
}

impl SectionCategory {
    pub const ALL: [SectionCategory; 5] = [
        SectionCategory::Strengths,
        SectionCategory::Issues,
        SectionCategory::Recommendations,
        SectionCategory::FoundKeywords,
        SectionCategory::MissingKeywords,
    ];

    /// Interchangeable heading spellings the model uses for this category.
    pub fn headings(self) -> &'static [&'static str] {
        match self {
            SectionCategory::Strengths => &["Key Strengths", "Strengths"],
            SectionCategory::Issues => &["Critical Issues", "Improvements", "Areas for"],
            SectionCategory::Recommendations => &["Recommendations", "Quick Wins"],
            SectionCategory::FoundKeywords => &[
                "Technical Skills Found",
                "Keywords Found",
                "Found Keywords",
            ],
            SectionCategory::MissingKeywords => &["Missing Industry Keywords", "Missing Keywords"],
        }
    }
}

/// A compiled heading matcher for one set of alternatives.
#[derive(Debug, Clone)]
pub struct SectionRule {
    pub category: Option<SectionCategory>,
    heading: Regex,
}

impl SectionRule {
    /// Matches any of `labels` literally, case-insensitively, on word boundaries.
    pub fn for_labels(labels: &[&str]) -> Result<Self, regex::Error> {
        let alternatives = labels
            .iter()
            .map(|label| regex::escape(label))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            category: None,
            heading: Regex::new(&format!(r"(?i)\b(?:{alternatives})\b"))?,
        })
    }

    pub fn for_category(category: SectionCategory) -> Result<Self, regex::Error> {
        Ok(Self {
            category: Some(category),
            ..Self::for_labels(category.headings())?
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section boundary
// ────────────────────────────────────────────────────────────────────────────

/// One way of recognising that a line starts a new section.
#[derive(Debug, Clone)]
pub enum BoundaryRule {
    /// `**Heading**` or `__Heading__`, optionally followed by a colon.
    Emphasis,
    /// `# Heading`, `## Heading`, ...
    MarkdownHeading,
    /// A line whose text ends in `:` (ignoring trailing emphasis).
    TrailingColon,
    /// A line whose label (text before the first `:`, or the whole line) is one of these,
    /// compared case-insensitively.
    KnownLabel(Vec<String>),
}

impl BoundaryRule {
    fn matches(&self, line: &str) -> bool {
        match self {
            BoundaryRule::Emphasis => {
                let core = line.trim_end_matches(':').trim_end();
                (core.len() > 4 && core.starts_with("**") && core.ends_with("**"))
                    || (core.len() > 4 && core.starts_with("__") && core.ends_with("__"))
            }
            BoundaryRule::MarkdownHeading => line.starts_with('#'),
            BoundaryRule::TrailingColon => line.trim_end_matches(['*', '_']).ends_with(':'),
            BoundaryRule::KnownLabel(labels) => {
                let label = line
                    .split_once(':')
                    .map_or(line, |(label, _)| label)
                    .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace());
                labels.iter().any(|known| known.eq_ignore_ascii_case(label))
            }
        }
    }
}

/// Decides where a captured section stops.
#[derive(Debug, Clone)]
pub struct SectionBoundary {
    rules: Vec<BoundaryRule>,
}

impl SectionBoundary {
    pub fn new(rules: Vec<BoundaryRule>) -> Self {
        Self { rules }
    }

    /// Emphasis, markdown and trailing-colon headings, plus every registered section and
    /// score label.
    pub fn standard() -> Self {
        let labels = SectionCategory::ALL
            .iter()
            .flat_map(|c| c.headings().iter())
            .chain(SCORE_LABELS.iter())
            .map(|label| label.to_string())
            .collect();

        Self::new(vec![
            BoundaryRule::Emphasis,
            BoundaryRule::MarkdownHeading,
            BoundaryRule::TrailingColon,
            BoundaryRule::KnownLabel(labels),
        ])
    }

    pub fn with_rule(mut self, rule: BoundaryRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// True when `line` (already trimmed) heads a new section. A leading bullet marker is
    /// ignored, so `- Critical Issues:` counts as a heading.
    pub fn is_heading(&self, line: &str) -> bool {
        let line = strip_bullet(line).trim();
        !line.is_empty() && self.rules.iter().any(|rule| rule.matches(line))
    }
}

impl Default for SectionBoundary {
    fn default() -> Self {
        Self::standard()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Extracts up to `limit` items listed under the first heading `rule` finds.
///
/// The capture is the rest of the heading line plus the bullet lines that follow it (blank
/// lines in between are skipped). It ends at the first non-bullet line, the first line
/// `boundary` recognises as a heading, or the end of the text. An absent heading or a
/// heading with nothing under it yields an empty list.
pub fn extract_section(
    text: &str,
    rule: &SectionRule,
    boundary: &SectionBoundary,
    limit: usize,
) -> Vec<String> {
    let Some(heading) = rule.heading.find(text) else {
        debug!("No heading found for {:?}", rule.category);
        return Vec::new();
    };

    let mut lines = text[heading.end()..].split('\n');
    let mut captured: Vec<&str> = Vec::new();

    if let Some(inline) = lines.next().and_then(heading_remainder) {
        captured.push(inline);
    }

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if boundary.is_heading(line) {
            break;
        }
        if !is_bullet_line(line) {
            debug!("Section {:?} ended at non-bullet line {line:?}", rule.category);
            break;
        }
        captured.push(line);
    }

    let items: Vec<String> = split_items(&captured.join("\n"))
        .into_iter()
        .take(limit)
        .collect();

    debug!(
        "Found {} items for {:?} under '{}'",
        items.len(),
        rule.category,
        heading.as_str()
    );
    items
}

/// Content written on the heading line itself, e.g. `Strengths: clear layout`.
/// Returns `None` when the rest of the line only closes the heading (`:`, `:**`, ` Improvement:`).
fn heading_remainder(line: &str) -> Option<&str> {
    let rest = line
        .trim_start_matches(|c: char| c == ':' || c == '*' || c == '_' || c.is_whitespace())
        .trim_end();

    let closes_heading = rest.trim_end_matches(['*', '_']).ends_with(':');
    (!rest.is_empty() && !closes_heading).then_some(rest)
}

fn is_bullet_line(line: &str) -> bool {
    line.starts_with(BULLET_MARKERS) || line.starts_with(MISENCODED_BULLET)
}

fn strip_bullet(line: &str) -> &str {
    line.strip_prefix(MISENCODED_BULLET)
        .or_else(|| line.strip_prefix(BULLET_MARKERS))
        .unwrap_or(line)
}

/// Splits on bullet markers that open a token (start of text or after whitespace), so
/// hyphenated words such as `cross-functional` stay whole. Fragments are trimmed and empty
/// ones dropped.
fn split_items(content: &str) -> Vec<String> {
    let content = content.replace(MISENCODED_BULLET, "•");

    let mut items = Vec::new();
    let mut current = String::new();
    let mut at_token_start = true;

    for c in content.chars() {
        if at_token_start && BULLET_MARKERS.contains(&c) {
            push_item(&mut items, &current);
            current.clear();
        } else {
            current.push(c);
        }
        at_token_start = c.is_whitespace();
    }
    push_item(&mut items, &current);

    items
}

fn push_item(items: &mut Vec<String>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        items.push(fragment.to_string());
    }
}
