use std::str::FromStr;

use anyhow::{ensure, Context, Result};

use crate::analysis::extractor::ExtractionSettings;
use crate::analysis::{animator, score, sections};

/// Application configuration loaded from environment variables.
/// Every variable is optional; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Compatibility score reported when no score rule matches (0–100).
    pub score_fallback: u32,
    /// Overall rating reported when no rating rule matches (0–10).
    pub rating_fallback: u32,
    pub section_item_limit: usize,
    pub animation_step: u32,
    pub animation_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            score_fallback: score::DEFAULT_COMPATIBILITY,
            rating_fallback: score::DEFAULT_RATING,
            section_item_limit: sections::DEFAULT_ITEM_LIMIT,
            animation_step: animator::DEFAULT_STEP,
            animation_interval_ms: animator::DEFAULT_INTERVAL.as_millis() as u64,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let config = Config {
            port: parse_var(&lookup, "PORT", defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            score_fallback: parse_var(&lookup, "SCORE_FALLBACK", defaults.score_fallback)?,
            rating_fallback: parse_var(&lookup, "RATING_FALLBACK", defaults.rating_fallback)?,
            section_item_limit: parse_var(
                &lookup,
                "SECTION_ITEM_LIMIT",
                defaults.section_item_limit,
            )?,
            animation_step: parse_var(&lookup, "ANIMATION_STEP", defaults.animation_step)?,
            animation_interval_ms: parse_var(
                &lookup,
                "ANIMATION_INTERVAL_MS",
                defaults.animation_interval_ms,
            )?,
        };

        let (_, max_score) = score::COMPATIBILITY_BOUNDS;
        let (_, max_rating) = score::RATING_BOUNDS;
        ensure!(
            config.score_fallback <= max_score,
            "SCORE_FALLBACK must be at most {max_score}"
        );
        ensure!(
            config.rating_fallback <= max_rating,
            "RATING_FALLBACK must be at most {max_rating}"
        );
        ensure!(config.animation_step > 0, "ANIMATION_STEP must be positive");
        ensure!(
            config.animation_interval_ms > 0,
            "ANIMATION_INTERVAL_MS must be positive"
        );

        Ok(config)
    }

    pub fn extraction_settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            score_fallback: self.score_fallback,
            rating_fallback: self.rating_fallback,
            section_item_limit: self.section_item_limit,
            animation_step: self.animation_step,
            animation_interval_ms: self.animation_interval_ms,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
