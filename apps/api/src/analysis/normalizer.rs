//! Text Normalizer: turns a raw provider payload into the single text the extractors read.
//!
//! Never fails. Payload problems become a [`Diagnostic`] tag; the user-visible sentinel
//! string for a diagnostic is only produced by [`NormalizedText::render`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::analysis::payload::RawAnalysisPayload;

/// Which generated document a payload carries. Only affects sentinel wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Analysis,
    CoverLetter,
}

/// Why a payload produced no usable text, in the order the checks run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Diagnostic {
    NoData,
    ProviderError(String),
    NoCandidates,
    EmptyCandidates,
    NoContent,
    NoParts,
    EmptyParts,
    NoText,
    Unreadable(String),
}

impl Diagnostic {
    /// Placeholder text shown in place of the document.
    pub fn sentinel(&self, kind: PayloadKind) -> String {
        match kind {
            PayloadKind::Analysis => match self {
                Diagnostic::NoData => "No analysis data received".to_string(),
                Diagnostic::ProviderError(msg) => format!("Analysis Error: {msg}"),
                Diagnostic::NoCandidates => "No candidates in analysis response".to_string(),
                Diagnostic::EmptyCandidates => "Empty candidates array in response".to_string(),
                Diagnostic::NoContent => "No content in analysis candidate".to_string(),
                Diagnostic::NoParts => "No parts array in analysis content".to_string(),
                Diagnostic::EmptyParts => "Empty parts array in analysis".to_string(),
                Diagnostic::NoText => "No text field in analysis part".to_string(),
                Diagnostic::Unreadable(reason) => format!("Error extracting text: {reason}"),
            },
            PayloadKind::CoverLetter => match self {
                Diagnostic::NoData => "No cover letter data received".to_string(),
                Diagnostic::ProviderError(msg) => format!("Cover Letter Error: {msg}"),
                Diagnostic::NoCandidates => "No candidates in cover letter response".to_string(),
                Diagnostic::EmptyCandidates => {
                    "Empty candidates array in cover letter response".to_string()
                }
                Diagnostic::NoContent => "No content in cover letter candidate".to_string(),
                Diagnostic::NoParts => "No parts array in cover letter content".to_string(),
                Diagnostic::EmptyParts => "Empty parts array in cover letter".to_string(),
                Diagnostic::NoText => "No text field in cover letter part".to_string(),
                Diagnostic::Unreadable(reason) => {
                    format!("Error extracting cover letter: {reason}")
                }
            },
        }
    }
}

/// Output of normalization: either the trimmed document text or the reason there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedText {
    Analysis(String),
    Diagnostic(Diagnostic),
}

impl NormalizedText {
    pub fn analysis_text(&self) -> Option<&str> {
        match self {
            NormalizedText::Analysis(text) => Some(text),
            NormalizedText::Diagnostic(_) => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            NormalizedText::Analysis(_) => None,
            NormalizedText::Diagnostic(diagnostic) => Some(diagnostic),
        }
    }

    /// The string shown to the user: the text itself, or the diagnostic's sentinel.
    pub fn render(&self, kind: PayloadKind) -> String {
        match self {
            NormalizedText::Analysis(text) => text.clone(),
            NormalizedText::Diagnostic(diagnostic) => diagnostic.sentinel(kind),
        }
    }
}

/// Normalizes an already-typed payload.
pub fn normalize(payload: Option<&RawAnalysisPayload>) -> NormalizedText {
    match first_text(payload) {
        Ok(text) => {
            let text = text.trim();
            debug!("Normalized payload text ({} bytes)", text.len());
            NormalizedText::Analysis(text.to_string())
        }
        Err(diagnostic) => {
            warn!("Payload produced no text: {diagnostic:?}");
            NormalizedText::Diagnostic(diagnostic)
        }
    }
}

/// Normalizes untyped JSON. `None` and JSON `null` both count as an absent payload.
pub fn normalize_value(value: Option<&Value>) -> NormalizedText {
    let value = match value {
        None | Some(Value::Null) => return normalize(None),
        Some(value) => value,
    };

    // Deserializing from the borrowed value avoids cloning the request body.
    match RawAnalysisPayload::deserialize(value) {
        Ok(payload) => normalize(Some(&payload)),
        Err(e) => {
            warn!("Payload could not be read as a response envelope: {e}");
            NormalizedText::Diagnostic(Diagnostic::Unreadable(e.to_string()))
        }
    }
}

fn first_text(payload: Option<&RawAnalysisPayload>) -> Result<&str, Diagnostic> {
    let payload = payload.ok_or(Diagnostic::NoData)?;

    if let Some(message) = payload.error.as_deref().filter(|m| !m.is_empty()) {
        return Err(Diagnostic::ProviderError(message.to_string()));
    }

    let candidates = payload.candidates.as_ref().ok_or(Diagnostic::NoCandidates)?;
    let candidate = candidates.first().ok_or(Diagnostic::EmptyCandidates)?;
    let content = candidate.content.as_ref().ok_or(Diagnostic::NoContent)?;
    let parts = content.parts.as_ref().ok_or(Diagnostic::NoParts)?;
    let part = parts.first().ok_or(Diagnostic::EmptyParts)?;

    part.text
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(Diagnostic::NoText)
}
