use std::sync::Arc;

use crate::analysis::extractor::{ReportExtractor, RuleBasedExtractor};
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable extraction backend. Default: RuleBasedExtractor.
    pub extractor: Arc<dyn ReportExtractor>,
}

impl AppState {
    /// Compiles the rule tables for `config`.
    pub fn new(config: Config) -> Result<Self, regex::Error> {
        let extractor = RuleBasedExtractor::new(config.extraction_settings())?;
        Ok(Self {
            config,
            extractor: Arc::new(extractor),
        })
    }
}
