//! Per-provider extraction
//!
//! Each module knows one vendor's pricing page layout. [`Provider`] ties a
//! vendor name to its extractor, source URL and output metadata.

mod claude_extractor;
mod deepseek_extractor;
mod doubao_extractor;
mod gemini_extractor;
mod openai_extractor;

pub use claude_extractor::*;
pub use deepseek_extractor::*;
pub use doubao_extractor::*;
pub use gemini_extractor::*;
pub use openai_extractor::*;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{
    ExtractorConfig, CLAUDE_CONTEXT_WINDOW, DEEPSEEK_CONTEXT_WINDOW, DOUBAO_CONTEXT_WINDOW,
    GEMINI_CONTEXT_WINDOW, OPENAI_CONTEXT_WINDOW,
};
use crate::document::Document;
use crate::error::PricingError;
use crate::record::{CurrencyConversion, PriceRecord, ProviderResult};

/// Turns one vendor's document into price records. Never fails: a page
/// that does not fit yields an empty list.
pub trait PriceExtractor {
    fn extract(&self, document: &Document<'_>) -> Vec<PriceRecord>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Claude,
    OpenAi,
    Gemini,
    DeepSeek,
    Doubao,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Claude,
        Provider::OpenAi,
        Provider::Gemini,
        Provider::DeepSeek,
        Provider::Doubao,
    ];

    /// Display name written to `ProviderResult::provider`
    pub fn name(self) -> &'static str {
        match self {
            Provider::Claude => "Claude",
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
            Provider::DeepSeek => "DeepSeek",
            Provider::Doubao => "Doubao",
        }
    }

    pub fn source_url(self) -> &'static str {
        match self {
            Provider::Claude => "https://platform.claude.com/docs/en/about-claude/pricing",
            Provider::OpenAi => "https://developers.openai.com/api/docs/pricing",
            Provider::Gemini => "https://ai.google.dev/gemini-api/docs/pricing",
            Provider::DeepSeek => "https://api-docs.deepseek.com/quick_start/pricing",
            Provider::Doubao => "https://www.volcengine.com/docs/82379/1544106?lang=zh",
        }
    }

    /// Context window used when the page does not state one
    pub fn default_context_window(self) -> u64 {
        match self {
            Provider::Claude => CLAUDE_CONTEXT_WINDOW,
            Provider::OpenAi => OPENAI_CONTEXT_WINDOW,
            Provider::Gemini => GEMINI_CONTEXT_WINDOW,
            Provider::DeepSeek => DEEPSEEK_CONTEXT_WINDOW,
            Provider::Doubao => DOUBAO_CONTEXT_WINDOW,
        }
    }

    /// Currency conversion applied to this provider's records, if any
    pub fn conversion(self, config: &ExtractorConfig) -> Option<CurrencyConversion> {
        match self {
            Provider::Doubao => Some(CurrencyConversion::cny_to_usd(config.cny_to_usd)),
            _ => None,
        }
    }

    pub fn extract(self, document: &Document<'_>, config: &ExtractorConfig) -> Vec<PriceRecord> {
        match self {
            Provider::Claude => ClaudeExtractor.extract(document),
            Provider::OpenAi => OpenAiExtractor.extract(document),
            Provider::Gemini => GeminiExtractor.extract(document),
            Provider::DeepSeek => DeepSeekExtractor.extract(document),
            Provider::Doubao => DoubaoExtractor::new(config).extract(document),
        }
    }

    /// Extract and assemble one provider's result. A missing or blank
    /// document gives a result with no models.
    pub fn run(self, raw: Option<&str>, config: &ExtractorConfig, scraped_at: DateTime<Utc>) -> ProviderResult {
        let config = config.clone().sanitized();

        let records = match raw {
            Some(raw) if !raw.trim().is_empty() => self.extract(&Document::parse(raw), &config),
            _ => {
                warn!(provider = self.name(), "no document to extract from");
                Vec::new()
            }
        };

        let result = ProviderResult::assemble(
            self.name(),
            self.source_url(),
            records,
            self.conversion(&config),
            scraped_at,
        );
        if result.models.is_empty() {
            warn!(provider = self.name(), "no pricing extracted");
        } else {
            info!(provider = self.name(), models = result.models.len(), "provider done");
        }
        result
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.name().to_lowercase() == wanted)
            .ok_or_else(|| PricingError::UnknownProvider(s.to_string()))
    }
}
