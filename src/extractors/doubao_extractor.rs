//! Doubao (Volcengine) pricing
//!
//! The docs site is a single-page app: the pricing table may arrive as
//! rendered HTML, only as markdown inside the router payload, or as plain
//! prose. Each layout gets its own strategy, tried in that order. Prices
//! are read in CNY and converted to USD at the end.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::cascade::Cascade;
use crate::config::{ExtractorConfig, DOUBAO_CONTEXT_WINDOW};
use crate::document::Document;
use crate::markdown::{looks_like_table, parse_markdown_tables, MarkdownSpec};
use crate::merge::RecordMerger;
use crate::normalize::parse_yuan;
use crate::payload::{decode_after_marker, find_string};
use crate::record::{CurrencyConversion, PriceRecord};
use crate::table::{extract_table, ColumnRole, Fallback, HeaderRow, RoleSpec, TableSpec};

use super::PriceExtractor;

static ROUTER_DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"window\._ROUTER_DATA\s*=\s*").unwrap());

/// `豆包-pro-32k：0.8元/千tokens 输入，2.0元/千tokens 输出`
static PRICE_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)([A-Za-z0-9\x{4e00}-\x{9fff}\-]+)\s*[：:]\s*",
        r"(\d+(?:\.\d+)?)\s*元\s*[/／]?\s*(千|万|百万)?\s*tokens?",
        r"[^,，\d]*[,，]?\s*",
        r"(\d+(?:\.\d+)?)\s*元\s*[/／]?\s*(千|万|百万)?\s*tokens?",
    ))
    .unwrap()
});

const TABLE_ROLES: &[RoleSpec] = &[
    RoleSpec {
        role: ColumnRole::Model,
        exact: &[],
        contains: &[&["模型"], &["model"]],
        excludes: &[],
        fallback: Fallback::Column(0),
    },
    RoleSpec {
        role: ColumnRole::Input,
        exact: &[],
        contains: &[&["输入"], &["input"], &["元"]],
        excludes: &[],
        fallback: Fallback::Optional,
    },
    RoleSpec {
        role: ColumnRole::Output,
        exact: &[],
        contains: &[&["输出"], &["output"], &["元"]],
        excludes: &[],
        fallback: Fallback::Optional,
    },
];

const TABLE: TableSpec = TableSpec {
    required: &[&["元", "价格", "输入", "输出", "input", "output", "price"]],
    roles: TABLE_ROLES,
    header: HeaderRow::FirstRow,
    min_name_len: 2,
    skip_name: None,
    price: parse_yuan,
};

const MARKDOWN_ROLES: &[RoleSpec] = &[
    RoleSpec {
        role: ColumnRole::Model,
        exact: &[],
        contains: &[&["模型"], &["model"]],
        excludes: &[],
        fallback: Fallback::Column(0),
    },
    RoleSpec {
        role: ColumnRole::Input,
        exact: &["输入"],
        contains: &[&["输入"]],
        excludes: &["缓存"],
        fallback: Fallback::Required,
    },
    RoleSpec {
        role: ColumnRole::Output,
        exact: &["输出"],
        contains: &[&["输出"]],
        excludes: &[],
        fallback: Fallback::Required,
    },
];

const MARKDOWN: MarkdownSpec = MarkdownSpec {
    header_marker: "|模型名称",
    currency_marker: "元",
    roles: MARKDOWN_ROLES,
    continuation: "^^",
    unsupported: "不支持",
    context_window: DOUBAO_CONTEXT_WINDOW,
};

pub struct DoubaoExtractor {
    conversion: CurrencyConversion,
    max_depth: usize,
}

impl DoubaoExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            conversion: CurrencyConversion::cny_to_usd(config.cny_to_usd),
            max_depth: config.max_payload_depth,
        }
    }

    /// The strategies in the order they are tried, all yielding CNY prices
    pub fn cascade(&self) -> Cascade<'_> {
        Cascade::new("Doubao")
            .then("html_tables", html_tables)
            .then("router_data", |doc| self.router_data(doc))
            .then("markdown", |doc| parse_markdown_tables(doc.raw(), &MARKDOWN))
            .then("price_patterns", |doc| price_patterns(doc.raw()))
    }

    fn router_data(&self, document: &Document<'_>) -> Vec<PriceRecord> {
        let Some(data) = decode_after_marker(document.raw(), &ROUTER_DATA_RE) else {
            return vec![];
        };
        let root = match data.get("loaderData") {
            Some(loader) if loader.is_object() => loader,
            _ => &data,
        };

        match find_string(root, self.max_depth, |s| looks_like_table(s, &MARKDOWN)) {
            Some(markdown) => parse_markdown_tables(markdown, &MARKDOWN),
            None => {
                debug!("router payload holds no pricing table");
                vec![]
            }
        }
    }
}

impl PriceExtractor for DoubaoExtractor {
    fn extract(&self, document: &Document<'_>) -> Vec<PriceRecord> {
        self.cascade()
            .run(document)
            .into_iter()
            .map(|record| self.conversion.apply(record))
            .filter(|record| !record.is_empty())
            .collect()
    }
}

/// Rendered tables with yuan prices; rows from every matching table, merged by id
fn html_tables(document: &Document<'_>) -> Vec<PriceRecord> {
    let mut merger = RecordMerger::new();

    for table in document.select("table") {
        let Some(found) = extract_table(&table, &TABLE) else {
            continue;
        };
        merger.extend(
            found
                .rows
                .into_iter()
                .map(|row| PriceRecord::new(row.model_name, row.input, row.output, DOUBAO_CONTEXT_WINDOW, "")),
        );
    }

    merger.into_records()
}

/// Inline price phrases, scaled to yuan per million tokens
fn price_patterns(text: &str) -> Vec<PriceRecord> {
    PRICE_PHRASE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps[1].trim();
            let input = caps[2].parse::<f64>().ok()? * per_million(caps.get(3).map(|m| m.as_str()));
            let output = caps[4].parse::<f64>().ok()? * per_million(caps.get(5).map(|m| m.as_str()));
            let record = PriceRecord::new(name, input, output, DOUBAO_CONTEXT_WINDOW, "");
            (!record.is_empty()).then_some(record)
        })
        .collect()
}

fn per_million(unit: Option<&str>) -> f64 {
    match unit {
        Some("千") => 1_000.0,
        Some("万") => 100.0,
        _ => 1.0,
    }
}
