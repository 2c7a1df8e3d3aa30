//! OpenAI pricing
//!
//! The docs page switches between pricing tiers with content-switcher panes;
//! the Standard pane is the default and preferred.

use std::collections::HashSet;

use scraper::ElementRef;

use crate::config::OPENAI_CONTEXT_WINDOW;
use crate::document::{select_in, Document};
use crate::normalize::normalize_price;
use crate::record::PriceRecord;
use crate::table::{extract_table, ColumnRole, Fallback, HeaderRow, RoleSpec, TableSpec};

use super::PriceExtractor;

const ROLES: &[RoleSpec] = &[
    RoleSpec {
        role: ColumnRole::Model,
        exact: &["model"],
        contains: &[&["model"]],
        excludes: &[],
        fallback: Fallback::Column(0),
    },
    RoleSpec {
        role: ColumnRole::Input,
        exact: &["input"],
        contains: &[&["input"]],
        excludes: &["cached"],
        fallback: Fallback::Column(1),
    },
    RoleSpec {
        role: ColumnRole::Output,
        exact: &["output"],
        contains: &[&["output"]],
        excludes: &[],
        fallback: Fallback::LastColumn,
    },
    RoleSpec {
        role: ColumnRole::CachedInput,
        exact: &["cached input"],
        contains: &[&["cached"]],
        excludes: &[],
        fallback: Fallback::Optional,
    },
];

const TABLE: TableSpec = TableSpec {
    required: &[&["model"], &["input"], &["output"]],
    roles: ROLES,
    header: HeaderRow::Thead,
    min_name_len: 2,
    skip_name: None,
    price: normalize_price,
};

pub struct OpenAiExtractor;

impl OpenAiExtractor {
    /// Standard pane table first, then the first visible pane, then every table
    fn candidate_tables<'d>(document: &'d Document<'_>) -> Vec<ElementRef<'d>> {
        let pane = document
            .select(r#"div[data-content-switcher-pane="standard"]"#)
            .into_iter()
            .find(|pane| !select_in(pane, "table").is_empty())
            .or_else(|| {
                document
                    .select("div[data-content-switcher-pane]")
                    .into_iter()
                    .find(|pane| pane.value().attr("hidden").is_none() && !select_in(pane, "table").is_empty())
            });

        let mut tables: Vec<ElementRef<'d>> = pane
            .map(|pane| select_in(&pane, "table").into_iter().take(1).collect())
            .unwrap_or_default();
        tables.extend(document.select("table"));
        tables
    }
}

impl PriceExtractor for OpenAiExtractor {
    fn extract(&self, document: &Document<'_>) -> Vec<PriceRecord> {
        for table in Self::candidate_tables(document) {
            let Some(found) = extract_table(&table, &TABLE) else {
                continue;
            };

            let mut seen = HashSet::new();
            let mut records = Vec::new();
            for row in &found.rows {
                let cached = found
                    .cell(row, ColumnRole::CachedInput)
                    .map(normalize_price)
                    .unwrap_or(0.0);
                let notes = if cached > 0.0 {
                    format!("Standard tier; cached input: ${}/MTok", cached)
                } else {
                    "Standard tier".to_string()
                };

                let record = PriceRecord::new(
                    row.model_name.as_str(),
                    row.input,
                    row.output,
                    OPENAI_CONTEXT_WINDOW,
                    notes,
                );
                if seen.insert(record.model_id.clone()) {
                    records.push(record);
                }
            }

            if !records.is_empty() {
                return records;
            }
        }

        vec![]
    }
}
