//! Multi-provider runs
//!
//! Providers share nothing, so each document is extracted on its own
//! rayon worker. Results keep the order of the input documents.

use chrono::{DateTime, SecondsFormat, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ExtractorConfig;
use crate::extractors::Provider;
use crate::record::{PriceRecord, ProviderResult};

/// One provider's captured page; `html` is `None` when it could not be fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub provider: Provider,
    #[serde(default)]
    pub html: Option<String>,
}

/// Batch input: documents plus the config to extract them with
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub documents: Vec<SourceDocument>,
    #[serde(default)]
    pub config: ExtractorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSnapshot {
    pub scraped_at: String,
    pub providers: Vec<ProviderResult>,
}

/// A record tagged with the provider it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderModel<'a> {
    pub provider: &'a str,
    #[serde(flatten)]
    pub record: &'a PriceRecord,
}

impl PricingSnapshot {
    pub fn all_models(&self) -> Vec<ProviderModel<'_>> {
        self.providers
            .iter()
            .flat_map(|result| {
                result.models.iter().map(move |record| ProviderModel {
                    provider: result.provider.as_str(),
                    record,
                })
            })
            .collect()
    }

    pub fn model_count(&self) -> usize {
        self.providers.iter().map(|p| p.models.len()).sum()
    }
}

/// Extract every document in parallel, all stamped with the same capture time
pub fn extract_all(
    documents: &[SourceDocument],
    config: &ExtractorConfig,
    scraped_at: DateTime<Utc>,
) -> PricingSnapshot {
    let providers: Vec<ProviderResult> = documents
        .par_iter()
        .map(|doc| doc.provider.run(doc.html.as_deref(), config, scraped_at))
        .collect();

    let snapshot = PricingSnapshot {
        scraped_at: scraped_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        providers,
    };
    info!(
        providers = snapshot.providers.len(),
        models = snapshot.model_count(),
        "extraction finished"
    );
    snapshot
}
