//! Output schema and assembly
//!
//! [`PriceRecord`] is one model's pricing; [`ProviderResult`] wraps the
//! records of one provider with capture metadata.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::{derive_id, round4};

/// Pricing for a single model, prices per million tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub model_name: String,
    pub model_id: String,
    pub input_price_per_mtok: f64,
    pub output_price_per_mtok: f64,
    pub context_window: u64,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_input_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_output_price: Option<f64>,
}

impl PriceRecord {
    /// Build a record, deriving the id from the name and rounding prices.
    /// Names with no ASCII alphanumerics keep their trimmed text as the id.
    pub fn new(
        model_name: impl Into<String>,
        input_price: f64,
        output_price: f64,
        context_window: u64,
        notes: impl Into<String>,
    ) -> Self {
        let model_name = model_name.into();
        let model_id = match derive_id(&model_name) {
            id if id.is_empty() => model_name.trim().to_string(),
            id => id,
        };
        Self {
            model_name,
            model_id,
            input_price_per_mtok: round4(input_price.max(0.0)),
            output_price_per_mtok: round4(output_price.max(0.0)),
            context_window,
            notes: notes.into(),
            original_currency: None,
            original_input_price: None,
            original_output_price: None,
        }
    }

    /// Override the derived id (vendors that publish their own ids)
    pub fn with_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn has_input(&self) -> bool {
        self.input_price_per_mtok > 0.0
    }

    pub fn has_output(&self) -> bool {
        self.output_price_per_mtok > 0.0
    }

    /// Both prices present
    pub fn is_complete(&self) -> bool {
        self.has_input() && self.has_output()
    }

    /// Both prices zero: a decoration or no-data row
    pub fn is_empty(&self) -> bool {
        !self.has_input() && !self.has_output()
    }
}

/// Conversion from a non-USD source currency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyConversion {
    /// USD per one unit of the source currency
    pub rate: f64,
}

impl CurrencyConversion {
    pub const SOURCE_CURRENCY: &'static str = "CNY";

    pub fn cny_to_usd(rate: f64) -> Self {
        Self { rate }
    }

    /// Turn a record priced in CNY into a USD record that remembers its origin
    pub fn apply(&self, record: PriceRecord) -> PriceRecord {
        let input = record.input_price_per_mtok;
        let output = record.output_price_per_mtok;
        PriceRecord {
            input_price_per_mtok: round4(input * self.rate),
            output_price_per_mtok: round4(output * self.rate),
            notes: format!("CNY: ¥{:?}/¥{:?} per 1M tokens", input, output),
            original_currency: Some(Self::SOURCE_CURRENCY.to_string()),
            original_input_price: Some(input),
            original_output_price: Some(output),
            ..record
        }
    }

    /// `"1 USD = 7.2 CNY"`
    pub fn label(&self) -> String {
        format!("1 USD = {:.1} {}", 1.0 / self.rate, Self::SOURCE_CURRENCY)
    }
}

/// All records captured from one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider: String,
    pub scraped_at: String,
    pub currency: String,
    pub models: Vec<PriceRecord>,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cny_to_usd_rate: Option<f64>,
}

impl ProviderResult {
    /// Wrap extracted records with provider metadata.
    ///
    /// Records with both prices at zero are dropped here as a last guard.
    /// Conversion metadata is only attached when records survived.
    pub fn assemble(
        provider: &str,
        source_url: &str,
        records: Vec<PriceRecord>,
        conversion: Option<CurrencyConversion>,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        let models: Vec<PriceRecord> = records.into_iter().filter(|r| !r.is_empty()).collect();

        let mut result = Self {
            provider: provider.to_string(),
            scraped_at: scraped_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            currency: "USD".to_string(),
            models,
            source_url: source_url.to_string(),
            exchange_rate: None,
            cny_to_usd_rate: None,
        };

        if let Some(conversion) = conversion {
            if !result.models.is_empty() {
                result.currency = format!("USD (converted from {})", CurrencyConversion::SOURCE_CURRENCY);
                result.exchange_rate = Some(conversion.label());
                result.cny_to_usd_rate = Some(conversion.rate);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_record() {
        let r = PriceRecord::new("Claude Opus 4", 15.0, 75.0, 200_000, "");
        assert_eq!(r.model_id, "claude-opus-4");
        assert!(r.is_complete());

        let r = PriceRecord::new("x", 0.123456, -3.0, 1, "");
        assert_eq!(r.input_price_per_mtok, 0.1235);
        assert_eq!(r.output_price_per_mtok, 0.0);
        assert!(!r.is_complete());
        assert!(!r.is_empty());

        let r = PriceRecord::new(" 豆包 ", 0.8, 2.0, 1, "");
        assert_eq!(r.model_id, "豆包");
        assert_eq!(PriceRecord::new("千问", 3.0, 6.0, 1, "").model_id, "千问");
    }

    #[test]
    fn test_conversion() {
        let conversion = CurrencyConversion::cny_to_usd(1.0 / 7.2);
        let r = conversion.apply(PriceRecord::new("豆包-pro", 0.8, 2.0, 128_000, ""));
        assert_eq!(r.input_price_per_mtok, 0.1111);
        assert_eq!(r.output_price_per_mtok, 0.2778);
        assert_eq!(r.original_currency.as_deref(), Some("CNY"));
        assert_eq!(r.original_input_price, Some(0.8));
        assert_eq!(r.original_output_price, Some(2.0));
        assert_eq!(r.notes, "CNY: ¥0.8/¥2.0 per 1M tokens");

        let r = conversion.apply(PriceRecord::new("豆包-lite", 3.0, 6.0, 32_000, ""));
        assert_eq!(r.notes, "CNY: ¥3.0/¥6.0 per 1M tokens");
        assert_eq!(conversion.label(), "1 USD = 7.2 CNY");
    }

    #[test]
    fn test_assemble_plain() {
        let records = vec![
            PriceRecord::new("A", 1.0, 2.0, 10, ""),
            PriceRecord::new("B", 0.0, 0.0, 10, ""),
        ];
        let result = ProviderResult::assemble("Claude", "https://example.com", records, None, at());
        assert_eq!(result.provider, "Claude");
        assert_eq!(result.currency, "USD");
        assert_eq!(result.models.len(), 1);
        assert_eq!(result.scraped_at, "2025-03-01T12:00:00.000000Z");

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("exchange_rate").is_none());
        assert!(json["models"][0].get("original_currency").is_none());
    }

    #[test]
    fn test_assemble_converted() {
        let conversion = CurrencyConversion::cny_to_usd(1.0 / 7.2);
        let records = vec![conversion.apply(PriceRecord::new("豆包-pro", 0.8, 2.0, 128_000, ""))];
        let result =
            ProviderResult::assemble("Doubao", "https://example.com", records, Some(conversion), at());
        assert_eq!(result.currency, "USD (converted from CNY)");
        assert_eq!(result.exchange_rate.as_deref(), Some("1 USD = 7.2 CNY"));
        assert_eq!(result.cny_to_usd_rate, Some(1.0 / 7.2));

        let empty = ProviderResult::assemble("Doubao", "https://example.com", vec![], Some(conversion), at());
        assert_eq!(empty.currency, "USD");
        assert!(empty.exchange_rate.is_none());
    }
}
