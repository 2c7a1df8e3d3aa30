//! Markdown pricing tables
//!
//! Handles pipe tables as found in documentation payloads:
//!
//! ```text
//! |模型名称|条件|输入|输出|
//! |---|---|---|---|
//! |doubao-seed-1.6|输入长度 [0, 32]|0.80|8.00|
//! |^^|输入长度 (32, 128]|1.20|16.00|
//! ```
//!
//! Continuation rows inherit the model of the row above. Rows for the same
//! model are merged so later partial rows fill gaps left by earlier ones.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::merge::RecordMerger;
use crate::normalize::first_number;
use crate::record::PriceRecord;
use crate::table::{resolve_columns, ColumnRole, RoleSpec};

static BLOCK_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\|[-:\s|]+\|").unwrap());

#[derive(Debug, Clone, Copy)]
pub struct MarkdownSpec {
    /// Marks a table's header row, e.g. `|模型名称`
    pub header_marker: &'static str,
    pub currency_marker: &'static str,
    pub roles: &'static [RoleSpec],
    /// Model cell prefix meaning "same model as the row above"
    pub continuation: &'static str,
    /// Price cell text meaning the row's mode is not offered
    pub unsupported: &'static str,
    pub context_window: u64,
}

/// Whether `text` contains a markdown pricing table worth parsing
pub fn looks_like_table(text: &str, spec: &MarkdownSpec) -> bool {
    text.contains(spec.header_marker) && text.contains(spec.currency_marker) && text.contains("|---")
}

/// Parse every pricing table in `markdown`. Prices stay in the table's currency.
pub fn parse_markdown_tables(markdown: &str, spec: &MarkdownSpec) -> Vec<PriceRecord> {
    let normalized = markdown.replace("\r\n", "\n");
    let mut merger = RecordMerger::new();

    for block in BLOCK_SPLIT_RE.split(&normalized) {
        if looks_like_table(block, spec) {
            parse_block(block, spec, &mut merger);
        }
    }

    merger.into_records()
}

fn parse_block(block: &str, spec: &MarkdownSpec, merger: &mut RecordMerger) {
    let rows: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|r| r.starts_with('|'))
        .collect();
    if rows.len() < 2 {
        return;
    }

    let Some(sep_idx) = rows.iter().position(|r| SEPARATOR_RE.is_match(r)) else {
        return;
    };

    let headers: Vec<String> = split_row(&rows[0].replace('\\', ""));
    let Some(columns) = resolve_columns(&headers, spec.roles) else {
        debug!(?headers, "markdown table lacks price columns");
        return;
    };
    let (Some(col_model), Some(col_input), Some(col_output)) = (
        columns.get(ColumnRole::Model),
        columns.get(ColumnRole::Input),
        columns.get(ColumnRole::Output),
    ) else {
        return;
    };
    let max_idx = col_model.max(col_input).max(col_output);

    let mut current_model = String::new();
    for row in &rows[sep_idx + 1..] {
        let cells = split_row(row);
        if cells.len() <= max_idx {
            continue;
        }

        let model_cell = &cells[col_model];
        if !model_cell.is_empty() && !model_cell.starts_with(spec.continuation) {
            current_model = model_cell.replace("\\-", "-").trim().to_string();
        }
        if current_model.is_empty() {
            continue;
        }

        let (input_cell, output_cell) = (&cells[col_input], &cells[col_output]);
        if input_cell.contains(spec.unsupported) || output_cell.contains(spec.unsupported) {
            continue;
        }

        let input = first_number(input_cell);
        let output = first_number(output_cell);
        if input <= 0.0 && output <= 0.0 {
            continue;
        }

        merger.offer(PriceRecord::new(
            current_model.as_str(),
            input,
            output,
            spec.context_window,
            "",
        ));
    }
}

/// `"| a | b |"` -> `["a", "b"]`; text outside the outer pipes is dropped
fn split_row(row: &str) -> Vec<String> {
    let parts: Vec<&str> = row.split('|').collect();
    if parts.len() < 3 {
        return vec![];
    }
    parts[1..parts.len() - 1]
        .iter()
        .map(|c| c.trim().to_string())
        .collect()
}
