//! Google Gemini pricing
//!
//! Each model has its own section: an `h2` heading (with the API id in a
//! following `<em><code>`) and a tabbed block of pricing tables. Rows are
//! labelled ("Input price", "Output price") and the third column holds
//! the paid tier.

use std::collections::HashSet;

use scraper::ElementRef;

use crate::config::GEMINI_CONTEXT_WINDOW;
use crate::document::{element_text, select_in, Document};
use crate::normalize::{derive_id, normalize_price};
use crate::record::PriceRecord;

use super::PriceExtractor;

/// Paid prices are quoted for prompts up to 200k tokens
const NOTES: &str = "Standard tier; prompts <= 200k";

pub struct GeminiExtractor;

/// Prices read from one model's paid-tier table
#[derive(Debug, Default, PartialEq)]
struct PaidTier {
    input: f64,
    output: f64,
}

impl GeminiExtractor {
    fn model_id(heading: &ElementRef<'_>, model_name: &str) -> String {
        heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "em")
            .and_then(|em| select_in(&em, "code").into_iter().next())
            .map(|code| element_text(&code))
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| derive_id(model_name))
    }

    /// The tab block following the heading's models-section, or the next one in the page
    fn tabs_for<'d>(document: &'d Document<'_>, heading: &ElementRef<'d>) -> Option<ElementRef<'d>> {
        let section = heading.ancestors().filter_map(ElementRef::wrap).find(|el| {
            el.value().name() == "div" && el.value().classes().any(|c| c.contains("models-section"))
        });

        section
            .and_then(|section| {
                section
                    .next_siblings()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.value().classes().any(|c| c == "ds-selector-tabs"))
            })
            .or_else(|| document.find_after(heading, r#"div[class*="ds-selector-tabs"]"#))
    }

    /// The "Standard" tab's pricing table, else the first pricing table
    fn standard_table<'d>(tabs: &ElementRef<'d>) -> Option<ElementRef<'d>> {
        select_in(tabs, "section")
            .into_iter()
            .filter(|section| {
                select_in(section, "h3")
                    .first()
                    .is_some_and(|h3| element_text(h3).to_lowercase().contains("standard"))
            })
            .find_map(|section| select_in(&section, "table.pricing-table").into_iter().next())
            .or_else(|| select_in(tabs, "table.pricing-table").into_iter().next())
    }

    fn parse_paid_tier(table: &ElementRef<'_>) -> PaidTier {
        let mut tier = PaidTier::default();

        let body = select_in(table, "tbody").into_iter().next().unwrap_or(*table);
        for tr in select_in(&body, "tr") {
            let cells = select_in(&tr, "td");
            if cells.len() < 3 {
                continue;
            }
            let label = element_text(&cells[0]).to_lowercase();
            let price = normalize_price(&cells[2].text().collect::<String>());

            if label.contains("input price") && !label.contains("output") {
                tier.input = price;
            } else if label.contains("output price") {
                tier.output = price;
            }
        }

        tier
    }
}

impl PriceExtractor for GeminiExtractor {
    fn extract(&self, document: &Document<'_>) -> Vec<PriceRecord> {
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        let headings = document.select("h2[id]").into_iter().filter(|h2| {
            h2.value()
                .attr("id")
                .is_some_and(|id| id.to_lowercase().contains("gemini"))
        });

        for heading in headings {
            let model_name = heading
                .value()
                .attr("data-text")
                .map(str::to_string)
                .unwrap_or_else(|| element_text(&heading))
                .trim()
                .to_string();
            let model_id = Self::model_id(&heading, &model_name);
            if model_id.is_empty() || seen.contains(&model_id) {
                continue;
            }

            let Some(table) = Self::tabs_for(document, &heading).and_then(|tabs| Self::standard_table(&tabs)) else {
                continue;
            };
            let tier = Self::parse_paid_tier(&table);
            if tier.input == 0.0 && tier.output == 0.0 {
                continue;
            }

            seen.insert(model_id.clone());
            records.push(
                PriceRecord::new(
                    model_name,
                    tier.input,
                    tier.output,
                    GEMINI_CONTEXT_WINDOW,
                    NOTES,
                )
                .with_id(model_id),
            );
        }

        records
    }
}
