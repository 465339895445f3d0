//! Extraction pipeline: normalized text → scores + sections → `AnalysisReport`.
//!
//! `AppState` holds an `Arc<dyn ReportExtractor>`; `RuleBasedExtractor` is the default
//! (and currently only) backend. Rule tables are compiled once at construction.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::analysis::animator::{self, plan_frames};
use crate::analysis::normalizer::{NormalizedText, PayloadKind};
use crate::analysis::report::{AnalysisReport, ScoreBand};
use crate::analysis::score::{self, extract_score, ScoreSpec};
use crate::analysis::sections::{
    self, extract_section, SectionBoundary, SectionCategory, SectionRule,
};

/// Tunables for one extractor instance. Built from `Config` in the server.
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub score_fallback: u32,
    pub rating_fallback: u32,
    pub section_item_limit: usize,
    pub animation_step: u32,
    pub animation_interval_ms: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            score_fallback: score::DEFAULT_COMPATIBILITY,
            rating_fallback: score::DEFAULT_RATING,
            section_item_limit: sections::DEFAULT_ITEM_LIMIT,
            animation_step: animator::DEFAULT_STEP,
            animation_interval_ms: animator::DEFAULT_INTERVAL.as_millis() as u64,
        }
    }
}

/// Turns normalized text into a report. Implement this to swap extraction backends without
/// touching the handlers.
pub trait ReportExtractor: Send + Sync {
    fn extract(&self, normalized: &NormalizedText) -> AnalysisReport;
}

/// Regex rule tables plus a heading registry; fully deterministic.
#[derive(Debug, Clone)]
pub struct RuleBasedExtractor {
    compatibility: ScoreSpec,
    rating: ScoreSpec,
    sections: Vec<SectionRule>,
    boundary: SectionBoundary,
    settings: ExtractionSettings,
}

impl RuleBasedExtractor {
    pub fn new(settings: ExtractionSettings) -> Result<Self, regex::Error> {
        let sections = SectionCategory::ALL
            .into_iter()
            .map(SectionRule::for_category)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            compatibility: ScoreSpec::compatibility(settings.score_fallback)?,
            rating: ScoreSpec::rating(settings.rating_fallback)?,
            sections,
            boundary: SectionBoundary::standard(),
            settings,
        })
    }

    /// Replaces the section boundary, e.g. to recognise an extra heading style.
    pub fn with_boundary(mut self, boundary: SectionBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    fn sections_for(&self, text: &str) -> BTreeMap<SectionCategory, Vec<String>> {
        self.sections
            .iter()
            .filter_map(|rule| rule.category.map(|category| (category, rule)))
            .map(|(category, rule)| {
                let items = extract_section(
                    text,
                    rule,
                    &self.boundary,
                    self.settings.section_item_limit,
                );
                (category, items)
            })
            .collect()
    }

    fn empty_sections() -> BTreeMap<SectionCategory, Vec<String>> {
        SectionCategory::ALL
            .into_iter()
            .map(|category| (category, Vec::new()))
            .collect()
    }
}

impl ReportExtractor for RuleBasedExtractor {
    fn extract(&self, normalized: &NormalizedText) -> AnalysisReport {
        // Diagnostics skip the rules entirely: defaults and empty sections.
        let (compatibility, rating, sections) = match normalized.analysis_text() {
            Some(text) => (
                extract_score(text, &self.compatibility),
                extract_score(text, &self.rating),
                self.sections_for(text),
            ),
            None => {
                debug!("No analysis text; reporting fallback scores");
                (
                    extract_score("", &self.compatibility),
                    extract_score("", &self.rating),
                    Self::empty_sections(),
                )
            }
        };

        info!(
            "Extracted report: compatibility={} ({:?}), rating={} ({:?})",
            compatibility.value, compatibility.source, rating.value, rating.source
        );

        let score_band = ScoreBand::for_score(compatibility.value);
        AnalysisReport {
            compatibility_score: compatibility.value,
            overall_rating: rating.value,
            score_band,
            score_label: score_band.label(),
            sections,
            score_frames: plan_frames(compatibility.value, self.settings.animation_step),
            frame_interval_ms: self.settings.animation_interval_ms,
            text: normalized.render(PayloadKind::Analysis),
            diagnostic: normalized.diagnostic().cloned(),
            compatibility,
            rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::{normalize, normalize_value, Diagnostic};
    use crate::analysis::payload::RawAnalysisPayload;
    use crate::analysis::score::ScoreSource;
    use serde_json::json;

    const GEMINI_STYLE: &str = "\
**ATS COMPATIBILITY SCORE: 68/100**

**OVERALL ASSESSMENT:**
- Overall Rating: 6/10
- Key Strengths:
  - Solid Python and SQL background
  - Clear, single-page layout
- Critical Issues:
  - Few quantified achievements
  - Missing summary section

**SKILLS ANALYSIS:**
- Technical Skills Found:
  - Python
  - PostgreSQL
- Missing Industry Keywords:
  - Kubernetes
  - CI/CD

**RECOMMENDATIONS:**
1. Top Priority Fix: add metrics
2. Quick Wins: tighten bullet verbs";

    fn extractor() -> RuleBasedExtractor {
        RuleBasedExtractor::new(ExtractionSettings::default()).unwrap()
    }

    fn report_for(text: &str) -> AnalysisReport {
        extractor().extract(&normalize(Some(&RawAnalysisPayload::from_text(text))))
    }

    #[test]
    fn test_score_and_strengths_scenario() {
        let report = report_for(
            "ATS Score: 42/100\n\nKey Strengths:\n- Good communication\n- Strong portfolio",
        );

        assert_eq!(report.compatibility_score, 42);
        assert_eq!(report.overall_rating, 7);
        assert_eq!(report.rating.source, ScoreSource::Default);
        assert_eq!(
            report.section(SectionCategory::Strengths),
            ["Good communication", "Strong portfolio"]
        );
        assert!(report.diagnostic.is_none());
    }

    #[test]
    fn test_error_payload_scenario() {
        let normalized = normalize_value(Some(&json!({"error": "quota exceeded"})));
        let report = extractor().extract(&normalized);

        assert_eq!(report.text, "Analysis Error: quota exceeded");
        assert!(report.text.contains("quota exceeded"));
        assert_eq!(report.compatibility_score, 75);
        assert_eq!(report.overall_rating, 7);
        assert_eq!(report.sections.len(), SectionCategory::ALL.len());
        assert!(report.sections.values().all(Vec::is_empty));
        assert_eq!(
            report.diagnostic,
            Some(Diagnostic::ProviderError("quota exceeded".to_string()))
        );
    }

    #[test]
    fn test_sentinel_text_yields_defaults_when_run_through_rules() {
        let extractor = extractor();
        for diagnostic in [
            Diagnostic::NoData,
            Diagnostic::ProviderError("quota exceeded".to_string()),
            Diagnostic::NoCandidates,
            Diagnostic::EmptyCandidates,
            Diagnostic::NoContent,
            Diagnostic::NoParts,
            Diagnostic::EmptyParts,
            Diagnostic::NoText,
        ] {
            let sentinel = diagnostic.sentinel(PayloadKind::Analysis);
            let report = extractor.extract(&NormalizedText::Analysis(sentinel.clone()));
            assert_eq!(report.compatibility_score, 75, "{sentinel}");
            assert_eq!(report.overall_rating, 7, "{sentinel}");
            assert!(report.sections.values().all(Vec::is_empty), "{sentinel}");
        }
    }

    #[test]
    fn test_gemini_structured_response() {
        let report = report_for(GEMINI_STYLE);

        assert_eq!(report.compatibility_score, 68);
        assert_eq!(report.compatibility.rule, Some("ats_score"));
        assert_eq!(report.overall_rating, 6);
        assert_eq!(report.score_band, ScoreBand::Good);
        assert_eq!(
            report.section(SectionCategory::Strengths),
            ["Solid Python and SQL background", "Clear, single-page layout"]
        );
        assert_eq!(
            report.section(SectionCategory::Issues),
            ["Few quantified achievements", "Missing summary section"]
        );
        assert_eq!(
            report.section(SectionCategory::FoundKeywords),
            ["Python", "PostgreSQL"]
        );
        assert_eq!(
            report.section(SectionCategory::MissingKeywords),
            ["Kubernetes", "CI/CD"]
        );
        // Numbered recommendation lines are not bullets.
        assert!(report.section(SectionCategory::Recommendations).is_empty());
    }

    #[test]
    fn test_every_category_is_reported() {
        let report = report_for("nothing structured here");
        for category in SectionCategory::ALL {
            assert!(report.sections.contains_key(&category));
        }
    }

    #[test]
    fn test_frames_follow_score() {
        let report = report_for("ATS Score: 9");
        assert_eq!(report.score_frames, vec![2, 4, 6, 8, 9]);
        assert_eq!(report.frame_interval_ms, 30);
    }

    #[test]
    fn test_custom_settings() {
        let extractor = RuleBasedExtractor::new(ExtractionSettings {
            score_fallback: 50,
            rating_fallback: 5,
            section_item_limit: 1,
            animation_step: 10,
            animation_interval_ms: 16,
        })
        .unwrap();

        let report = extractor.extract(&NormalizedText::Analysis(
            "Strengths:\n- a\n- b".to_string(),
        ));
        assert_eq!(report.compatibility_score, 50);
        assert_eq!(report.overall_rating, 5);
        assert_eq!(report.section(SectionCategory::Strengths), ["a"]);
        assert_eq!(report.score_frames, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let value = serde_json::to_value(report_for("ATS Score: 81")).unwrap();
        assert_eq!(value["compatibilityScore"], 81);
        assert_eq!(value["overallRating"], 7);
        assert_eq!(value["scoreBand"], "excellent");
        assert_eq!(value["compatibility"]["source"], "matched");
        assert_eq!(value["rating"]["source"], "default");
        assert!(value["sections"]["missing_keywords"].is_array());
        assert!(value.get("diagnostic").is_none());
    }

    #[test]
    fn test_custom_boundary() {
        use crate::analysis::sections::BoundaryRule;

        let text = "Strengths:\n- Python\n- Education\n- Mentoring";
        let default = report_for(text);
        assert_eq!(default.section(SectionCategory::Strengths).len(), 3);

        let boundary = SectionBoundary::standard()
            .with_rule(BoundaryRule::KnownLabel(vec!["Education".to_string()]));
        let report = extractor()
            .with_boundary(boundary)
            .extract(&NormalizedText::Analysis(text.to_string()));
        assert_eq!(report.section(SectionCategory::Strengths), ["Python"]);
    }

    #[test]
    fn test_each_call_is_independent() {
        let extractor = extractor();
        let first = extractor.extract(&NormalizedText::Analysis("ATS Score: 90".to_string()));
        let second = extractor.extract(&NormalizedText::Analysis("nothing".to_string()));
        assert_eq!(first.compatibility_score, 90);
        assert_eq!(second.compatibility_score, 75);
    }
}
