//! Axum route handlers for the extraction API.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::analysis::normalizer::{normalize_value, Diagnostic, PayloadKind};
use crate::analysis::report::AnalysisReport;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis/extract
///
/// Accepts the provider envelope (or the backend's `{ "analysis": ... }` wrapper) and
/// returns scores and sections. Envelope problems degrade the report; they are not errors.
pub async fn handle_extract_analysis(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<AnalysisReport>, AppError> {
    let payload = unwrap_payload(&body, "analysis")?;
    let normalized = normalize_value(payload);
    Ok(Json(state.extractor.extract(&normalized)))
}

/// POST /api/v1/cover-letter/extract
///
/// Accepts the provider envelope (or `{ "cover_letter": ... }`) and returns the letter text,
/// or the cover-letter sentinel when the payload carries none.
pub async fn handle_extract_cover_letter(
    Json(body): Json<Value>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let payload = unwrap_payload(&body, "cover_letter")?;
    let normalized = normalize_value(payload);

    Ok(Json(CoverLetterResponse {
        text: normalized.render(PayloadKind::CoverLetter),
        diagnostic: normalized.diagnostic().cloned(),
    }))
}

/// Picks the envelope out of a request body.
///
/// `null` means no payload. An object with a `wrapper_key` field and no envelope fields of its
/// own is the backend wrapper; any other object is the envelope itself.
fn unwrap_payload<'a>(body: &'a Value, wrapper_key: &str) -> Result<Option<&'a Value>, AppError> {
    match body {
        Value::Null => Ok(None),
        Value::Object(map) => {
            let is_envelope = map.contains_key("candidates") || map.contains_key("error");
            match map.get(wrapper_key) {
                Some(inner) if !is_envelope => {
                    debug!("Unwrapping '{wrapper_key}' response wrapper");
                    Ok(Some(inner))
                }
                _ => Ok(Some(body)),
            }
        }
        _ => Err(AppError::Validation(
            "request body must be a JSON object or null".to_string(),
        )),
    }
}
