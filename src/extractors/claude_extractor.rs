//! Anthropic Claude pricing
//!
//! The pricing page carries a "Model | Base Input Tokens | ... | Output
//! Tokens" table; cache-write and cache-hit columns are ignored.

use crate::config::CLAUDE_CONTEXT_WINDOW;
use crate::document::Document;
use crate::normalize::normalize_price;
use crate::record::PriceRecord;
use crate::table::{first_match, ColumnRole, Fallback, HeaderRow, RoleSpec, TableSpec};

use super::PriceExtractor;

const ROLES: &[RoleSpec] = &[
    RoleSpec {
        role: ColumnRole::Model,
        exact: &["model"],
        contains: &[],
        excludes: &[],
        fallback: Fallback::Column(0),
    },
    RoleSpec {
        role: ColumnRole::Input,
        exact: &["base input tokens"],
        contains: &[&["base input"]],
        excludes: &[],
        fallback: Fallback::Required,
    },
    RoleSpec {
        role: ColumnRole::Output,
        exact: &["output tokens"],
        contains: &[&["output", "token"]],
        excludes: &[],
        fallback: Fallback::Required,
    },
];

const TABLE: TableSpec = TableSpec {
    required: &[&["base input tokens"], &["output tokens"]],
    roles: ROLES,
    header: HeaderRow::Thead,
    min_name_len: 3,
    skip_name: Some(is_context_label),
    price: normalize_price,
};

/// Rows like "Input tokens > 200K" belong to long-context tables, not models
fn is_context_label(name: &str) -> bool {
    name.to_lowercase().contains("token") && !name.contains('$')
}

pub struct ClaudeExtractor;

impl PriceExtractor for ClaudeExtractor {
    fn extract(&self, document: &Document<'_>) -> Vec<PriceRecord> {
        let mut tables = document.select("table.w-full");
        if tables.is_empty() {
            tables = document.select("table");
        }

        let Some(found) = first_match(tables, &TABLE) else {
            return vec![];
        };

        found
            .rows
            .into_iter()
            .map(|row| {
                let notes = if row.model_name.to_lowercase().contains("deprecated") {
                    "Deprecated"
                } else {
                    "Base input and output pricing"
                };
                PriceRecord::new(row.model_name, row.input, row.output, CLAUDE_CONTEXT_WINDOW, notes)
            })
            .collect()
    }
}
