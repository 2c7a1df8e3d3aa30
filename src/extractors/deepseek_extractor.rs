//! DeepSeek pricing
//!
//! The "Model Details" table is transposed: models are columns, attributes
//! are rows (`MODEL`, `CONTEXT LENGTH`, then one row per price). Every
//! listed model shares the same prices.

use scraper::ElementRef;

use crate::config::DEEPSEEK_CONTEXT_WINDOW;
use crate::document::{element_text, select_in, Document};
use crate::normalize::{normalize_price, parse_context_window, title_case};
use crate::record::PriceRecord;

use super::PriceExtractor;

const DEFAULT_MODELS: &[&str] = &["deepseek-chat", "deepseek-reasoner"];

#[derive(Debug, PartialEq)]
struct ModelDetails {
    model_ids: Vec<String>,
    context_window: u64,
    cache_hit: f64,
    cache_miss: f64,
    output: f64,
}

impl Default for ModelDetails {
    fn default() -> Self {
        Self {
            model_ids: Vec::new(),
            context_window: DEEPSEEK_CONTEXT_WINDOW,
            cache_hit: 0.0,
            cache_miss: 0.0,
            output: 0.0,
        }
    }
}

pub struct DeepSeekExtractor;

impl DeepSeekExtractor {
    /// The table inside a font-size styled wrapper, else the first table on the page
    fn details_table<'d>(document: &'d Document<'_>) -> Option<ElementRef<'d>> {
        document
            .select("div[style]")
            .into_iter()
            .filter(|div| div.value().attr("style").is_some_and(|s| s.contains("font-size")))
            .find_map(|div| select_in(&div, "table").into_iter().next())
            .or_else(|| document.select("table").into_iter().next())
    }

    fn read_details(table: &ElementRef<'_>) -> ModelDetails {
        let mut details = ModelDetails::default();

        for tr in select_in(table, "tr") {
            let cells: Vec<String> = select_in(&tr, "td, th").iter().map(element_text).collect();
            let Some(first) = cells.first().map(|c| c.trim().to_uppercase()) else {
                continue;
            };
            let value = cells.last().map(String::as_str).unwrap_or_default();

            if first == "MODEL" && cells.len() >= 2 {
                details.model_ids = cells[1..]
                    .iter()
                    .map(|c| c.trim())
                    .filter(|c| !c.starts_with("http") && c.to_lowercase().contains("deepseek-"))
                    .map(str::to_string)
                    .collect();
            } else if first.contains("CONTEXT") && first.contains("LENGTH") {
                let window = if cells.len() > 1 { parse_context_window(value) } else { 0 };
                details.context_window = if window > 0 { window } else { DEEPSEEK_CONTEXT_WINDOW };
            } else if first.contains("PRICING") && cells.len() < 2 {
                continue;
            } else {
                // a rowspan'd PRICING cell shifts the label right
                let row_text = cells.join(" ").to_uppercase();
                let price = normalize_price(value);
                if row_text.contains("CACHE HIT") && row_text.contains("INPUT") {
                    details.cache_hit = price;
                } else if row_text.contains("CACHE MISS") {
                    details.cache_miss = price;
                } else if row_text.contains("OUTPUT") && !row_text.contains("INPUT") {
                    details.output = price;
                }
            }
        }

        if details.model_ids.is_empty() {
            details.model_ids = DEFAULT_MODELS.iter().map(|id| id.to_string()).collect();
        }
        details
    }
}

impl PriceExtractor for DeepSeekExtractor {
    fn extract(&self, document: &Document<'_>) -> Vec<PriceRecord> {
        let Some(table) = Self::details_table(document) else {
            return vec![];
        };
        let details = Self::read_details(&table);

        let mut records = Vec::new();
        for model_id in details.model_ids.iter().filter(|id| !id.is_empty()) {
            let name = title_case(model_id);

            if details.cache_miss > 0.0 {
                records.push(
                    PriceRecord::new(
                        name.as_str(),
                        details.cache_miss,
                        details.output,
                        details.context_window,
                        "Cache miss pricing",
                    )
                    .with_id(model_id.as_str()),
                );
            }
            if details.cache_hit > 0.0 {
                records.push(
                    PriceRecord::new(
                        format!("{} (Cached)", name),
                        details.cache_hit,
                        details.output,
                        details.context_window,
                        "Cache hit pricing",
                    )
                    .with_id(model_id.as_str()),
                );
            }
        }

        records
    }
}
