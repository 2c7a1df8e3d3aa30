//! Extraction configuration
//!
//! Fallback constants live here and are handed to extractors through
//! [`ExtractorConfig`] rather than read from global state.

use serde::Deserialize;

/// USD per CNY when no live rate is supplied (1 USD = 7.2 CNY)
pub const DEFAULT_CNY_TO_USD: f64 = 1.0 / 7.2;

/// How deep the embedded-payload search descends into decoded JSON
pub const DEFAULT_MAX_PAYLOAD_DEPTH: usize = 10;

pub const CLAUDE_CONTEXT_WINDOW: u64 = 200_000;
pub const OPENAI_CONTEXT_WINDOW: u64 = 128_000;
pub const GEMINI_CONTEXT_WINDOW: u64 = 200_000;
pub const DEEPSEEK_CONTEXT_WINDOW: u64 = 128_000;
pub const DOUBAO_CONTEXT_WINDOW: u64 = 128_000;

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// USD per one CNY
    #[serde(default = "default_cny_to_usd")]
    pub cny_to_usd: f64,
    #[serde(default = "default_max_payload_depth")]
    pub max_payload_depth: usize,
}

fn default_cny_to_usd() -> f64 {
    DEFAULT_CNY_TO_USD
}

fn default_max_payload_depth() -> usize {
    DEFAULT_MAX_PAYLOAD_DEPTH
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            cny_to_usd: DEFAULT_CNY_TO_USD,
            max_payload_depth: DEFAULT_MAX_PAYLOAD_DEPTH,
        }
    }
}

impl ExtractorConfig {
    /// Build a config from an optionally fetched exchange rate.
    /// Missing, zero, negative or non-finite rates fall back to the default.
    pub fn with_cny_to_usd(rate: Option<f64>) -> Self {
        Self {
            cny_to_usd: rate.unwrap_or(DEFAULT_CNY_TO_USD),
            ..Self::default()
        }
        .sanitized()
    }

    /// Replace unusable values with their defaults
    pub fn sanitized(mut self) -> Self {
        if !self.cny_to_usd.is_finite() || self.cny_to_usd <= 0.0 {
            self.cny_to_usd = DEFAULT_CNY_TO_USD;
        }
        self
    }
}
