//! Structured result handed to presentation layers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::normalizer::Diagnostic;
use crate::analysis::score::ExtractedScore;
use crate::analysis::sections::SectionCategory;

/// Qualitative band for the compatibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsWork,
}

impl ScoreBand {
    /// ≥ 80 excellent, ≥ 60 good, anything lower needs work.
    pub fn for_score(score: u32) -> Self {
        if score >= 80 {
            ScoreBand::Excellent
        } else if score >= 60 {
            ScoreBand::Good
        } else {
            ScoreBand::NeedsWork
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::NeedsWork => "Needs Work",
        }
    }
}

/// Everything extracted from one analysis payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub compatibility_score: u32,
    pub overall_rating: u32,
    /// How each score was obtained (matched rule or fallback).
    pub compatibility: ExtractedScore,
    pub rating: ExtractedScore,
    pub score_band: ScoreBand,
    pub score_label: &'static str,
    /// Every category is present; categories whose heading was not found map to `[]`.
    pub sections: BTreeMap<SectionCategory, Vec<String>>,
    /// Counter values for the score ramp, one per animation tick.
    pub score_frames: Vec<u32>,
    pub frame_interval_ms: u64,
    /// The analysis text, or the diagnostic sentinel when the payload had none.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl AnalysisReport {
    pub fn section(&self, category: SectionCategory) -> &[String] {
        self.sections
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
