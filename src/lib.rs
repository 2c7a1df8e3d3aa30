//! LLM pricing extraction and normalization
//!
//! Turns captured vendor pricing pages into one record schema:
//! - HTML tables with per-vendor header vocabularies
//! - JSON payloads embedded in single-page apps, carrying markdown tables
//! - Inline price phrases as a last resort
//!
//! Fetching pages is left to the caller; everything here works on text
//! already in memory and never fails on malformed input.

pub mod aggregate;
pub mod cascade;
pub mod config;
pub mod document;
pub mod error;
pub mod extractors;
pub mod ffi;
pub mod markdown;
pub mod merge;
pub mod normalize;
pub mod payload;
pub mod record;
pub mod table;

pub use aggregate::{extract_all, BatchRequest, PricingSnapshot, ProviderModel, SourceDocument};
pub use config::ExtractorConfig;
pub use document::Document;
pub use error::{PricingError, Result};
pub use extractors::{PriceExtractor, Provider};
pub use ffi::*;
pub use record::{CurrencyConversion, PriceRecord, ProviderResult};
