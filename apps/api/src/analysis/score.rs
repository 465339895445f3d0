//! Score Extractor — ordered, named numeric rules with clamping and a fixed fallback.
//!
//! Rules are tried in declared order and the first rule that matches anywhere in the
//! text wins. Contextual rules (anchored to a named heading) are declared before generic
//! ones so that unrelated numbers in the prose are not picked up first.

use std::num::IntErrorKind;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// (name, pattern) for the compatibility score, most specific first.
pub const COMPATIBILITY_RULES: &[(&str, &str)] = &[
    ("ats_score", r"ATS.*?SCORE.*?([0-9]+)"),
    ("ats_out_of_100", r"ATS.*?([0-9]+)/100"),
    ("compatibility", r"COMPATIBILITY.*?([0-9]+)"),
    ("score", r"Score.*?([0-9]+)"),
];

/// (name, pattern) for the overall rating, most specific first.
pub const RATING_RULES: &[(&str, &str)] = &[
    ("overall_rating", r"Overall Rating.*?([0-9]+)"),
    ("rating_out_of_10", r"Rating.*?([0-9]+)/10"),
    ("assessment", r"Assessment.*?([0-9]+)"),
];

pub const COMPATIBILITY_BOUNDS: (u32, u32) = (0, 100);
pub const RATING_BOUNDS: (u32, u32) = (0, 10);
pub const DEFAULT_COMPATIBILITY: u32 = 75;
pub const DEFAULT_RATING: u32 = 7;

/// A single named numeric pattern. The first capture group must be the numeral, written as
/// `[0-9]+`: `\d` in a Unicode regex also matches non-ASCII digits.
#[derive(Debug, Clone)]
pub struct ScoreRule {
    pub name: &'static str,
    pattern: Regex,
}

impl ScoreRule {
    /// Compiles `pattern` case-insensitively; `.` does not cross line breaks.
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(&format!("(?i){pattern}"))?,
        })
    }

    /// The numeral captured by the leftmost match, if any. Numerals too large for a `u64`
    /// saturate, which the caller then clamps to its upper bound.
    fn capture(&self, text: &str) -> Option<u64> {
        let digits = self.pattern.captures(text)?.get(1)?.as_str();
        match digits.parse::<u64>() {
            Ok(value) => Some(value),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u64::MAX),
            Err(e) => {
                debug!("Rule '{}' captured unparsable numeral {digits:?}: {e}", self.name);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Matched,
    Default,
}

/// A bounded score plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedScore {
    pub value: u32,
    pub source: ScoreSource,
    /// Name of the winning rule; `None` when the fallback was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<&'static str>,
}

/// Everything needed to pull one score out of a text.
#[derive(Debug, Clone)]
pub struct ScoreSpec {
    pub label: &'static str,
    pub rules: Vec<ScoreRule>,
    pub lower: u32,
    pub upper: u32,
    pub fallback: u32,
}

impl ScoreSpec {
    /// Builds a spec from a `(name, pattern)` table. The fallback is clamped into range so
    /// the bounds hold even for the default path.
    pub fn from_table(
        label: &'static str,
        table: &[(&'static str, &str)],
        (lower, upper): (u32, u32),
        fallback: u32,
    ) -> Result<Self, regex::Error> {
        let rules = table
            .iter()
            .map(|&(name, pattern)| ScoreRule::new(name, pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            label,
            rules,
            lower,
            upper,
            fallback: fallback.clamp(lower, upper),
        })
    }

    /// ATS compatibility score, 0–100.
    pub fn compatibility(fallback: u32) -> Result<Self, regex::Error> {
        Self::from_table(
            "compatibility",
            COMPATIBILITY_RULES,
            COMPATIBILITY_BOUNDS,
            fallback,
        )
    }

    /// Overall rating, 0–10.
    pub fn rating(fallback: u32) -> Result<Self, regex::Error> {
        Self::from_table("rating", RATING_RULES, RATING_BOUNDS, fallback)
    }

    fn default_score(&self) -> ExtractedScore {
        ExtractedScore {
            value: self.fallback,
            source: ScoreSource::Default,
            rule: None,
        }
    }
}

/// Applies `spec` to `text`. Never fails and always returns a value within the spec's bounds.
pub fn extract_score(text: &str, spec: &ScoreSpec) -> ExtractedScore {
    for rule in &spec.rules {
        let Some(raw) = rule.capture(text) else {
            continue;
        };

        let value = raw.clamp(u64::from(spec.lower), u64::from(spec.upper)) as u32;
        debug!(
            "Found {} score {value} (raw {raw}) using rule '{}'",
            spec.label, rule.name
        );
        return ExtractedScore {
            value,
            source: ScoreSource::Matched,
            rule: Some(rule.name),
        };
    }

    debug!(
        "No {} rule matched; using fallback {}",
        spec.label, spec.fallback
    );
    spec.default_score()
}
