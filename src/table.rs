//! Header-driven table extraction
//!
//! A [`TableSpec`] names the keywords a pricing table's header must carry and
//! how each header maps to a [`ColumnRole`]. Tables that do not fit yield
//! nothing so the caller can move on to the next table or strategy.

use scraper::ElementRef;
use tracing::debug;

use crate::document::{element_text, select_in};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Model,
    Input,
    Output,
    CachedInput,
}

impl ColumnRole {
    /// Supplementary columns may be absent from short rows
    fn bounds_row(self) -> bool {
        !matches!(self, ColumnRole::CachedInput)
    }
}

/// What to do when no header matches a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// The table is unusable without this column
    Required,
    /// Leave the role unresolved; its price reads as zero
    Optional,
    /// Use this index, clamped to the last column
    Column(usize),
    LastColumn,
}

/// Header keywords for one role.
///
/// Exact phrases are tried first, then each `contains` alternative in order;
/// an alternative matches when the header holds all of its terms. All
/// comparisons are case-insensitive.
#[derive(Debug, Clone, Copy)]
pub struct RoleSpec {
    pub role: ColumnRole,
    pub exact: &'static [&'static str],
    pub contains: &'static [&'static [&'static str]],
    pub excludes: &'static [&'static str],
    pub fallback: Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRow {
    /// `thead th` holds the header, `tbody tr` the data
    Thead,
    /// First `tr` holds the header, the rest are data
    FirstRow,
}

#[derive(Clone, Copy)]
pub struct TableSpec {
    /// Every group needs at least one keyword somewhere in the header row
    pub required: &'static [&'static [&'static str]],
    pub roles: &'static [RoleSpec],
    pub header: HeaderRow,
    /// Shorter model names are decoration or continuation rows
    pub min_name_len: usize,
    pub skip_name: Option<fn(&str) -> bool>,
    pub price: fn(&str) -> f64,
}

/// Column index per resolved role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    columns: Vec<(ColumnRole, usize)>,
}

impl ResolvedColumns {
    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        self.columns
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, idx)| *idx)
    }

    /// Highest model or price column index a row must reach to be usable
    pub fn max_index(&self) -> usize {
        self.columns
            .iter()
            .filter(|(role, _)| role.bounds_row())
            .map(|(_, idx)| *idx)
            .max()
            .unwrap_or(0)
    }
}

/// One data row that passed the row policy
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub model_name: String,
    pub input: f64,
    pub output: f64,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TableMatch {
    pub columns: ResolvedColumns,
    pub rows: Vec<TableRow>,
}

impl TableMatch {
    /// Raw text of `role`'s cell in a row, if the role resolved
    pub fn cell<'r>(&self, row: &'r TableRow, role: ColumnRole) -> Option<&'r str> {
        let idx = self.columns.get(role)?;
        row.cells.get(idx).map(String::as_str)
    }
}

/// Every required keyword group has a hit somewhere in the header row
pub fn header_matches(headers: &[String], required: &[&[&str]]) -> bool {
    let joined = headers.join(" ").to_lowercase();
    required
        .iter()
        .all(|group| group.iter().any(|kw| joined.contains(&kw.to_lowercase())))
}

/// Map header cells to roles. Each column serves at most one role; roles are
/// resolved in the order given. `None` when a required role is missing or its
/// fallback column is already taken.
pub fn resolve_columns(headers: &[String], roles: &[RoleSpec]) -> Option<ResolvedColumns> {
    let lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let mut claimed = vec![false; lower.len()];
    let mut resolved = ResolvedColumns::default();

    for spec in roles {
        let excluded = |h: &str| spec.excludes.iter().any(|ex| h.contains(&ex.to_lowercase()));

        let exact = spec.exact.iter().find_map(|phrase| {
            let phrase = phrase.to_lowercase();
            (0..lower.len()).find(|&i| !claimed[i] && lower[i] == phrase && !excluded(&lower[i]))
        });

        let by_keyword = exact.or_else(|| {
            spec.contains.iter().find_map(|terms| {
                (0..lower.len()).find(|&i| {
                    !claimed[i]
                        && !excluded(&lower[i])
                        && terms.iter().all(|t| lower[i].contains(&t.to_lowercase()))
                })
            })
        });

        let idx = match (by_keyword, spec.fallback) {
            (Some(idx), _) => Some(idx),
            (None, Fallback::Required) => return None,
            (None, Fallback::Optional) => None,
            (None, Fallback::Column(n)) if !lower.is_empty() => Some(n.min(lower.len() - 1)),
            (None, Fallback::LastColumn) if !lower.is_empty() => Some(lower.len() - 1),
            (None, _) => return None,
        };

        if let Some(idx) = idx {
            if claimed[idx] {
                debug!(role = ?spec.role, idx, "fallback column already claimed");
                return None;
            }
            claimed[idx] = true;
            resolved.columns.push((spec.role, idx));
        }
    }

    Some(resolved)
}

/// Extract rows from one `<table>`. `None` when the header does not fit.
pub fn extract_table(table: &ElementRef, spec: &TableSpec) -> Option<TableMatch> {
    let (headers, body) = match spec.header {
        HeaderRow::Thead => {
            let thead = select_in(table, "thead").into_iter().next()?;
            let headers: Vec<String> = select_in(&thead, "th").iter().map(element_text).collect();
            let tbody = select_in(table, "tbody").into_iter().next()?;
            (headers, select_in(&tbody, "tr"))
        }
        HeaderRow::FirstRow => {
            let rows = select_in(table, "tr");
            if rows.len() < 2 {
                return None;
            }
            let headers: Vec<String> = select_in(&rows[0], "th, td").iter().map(element_text).collect();
            (headers, rows[1..].to_vec())
        }
    };

    if !header_matches(&headers, spec.required) {
        debug!(?headers, "table header lacks required keywords");
        return None;
    }
    let Some(columns) = resolve_columns(&headers, spec.roles) else {
        debug!(?headers, "table header has no column for a required role");
        return None;
    };

    let rows = body
        .iter()
        .filter_map(|tr| {
            let cells: Vec<String> = select_in(tr, "td, th").iter().map(element_text).collect();
            parse_row(cells, &columns, spec)
        })
        .collect();

    Some(TableMatch {
        columns,
        rows,
    })
}

/// First table yielding at least one row
pub fn first_match<'a>(
    tables: impl IntoIterator<Item = ElementRef<'a>>,
    spec: &TableSpec,
) -> Option<TableMatch> {
    tables
        .into_iter()
        .filter_map(|table| extract_table(&table, spec))
        .find(|m| !m.rows.is_empty())
}

fn parse_row(cells: Vec<String>, columns: &ResolvedColumns, spec: &TableSpec) -> Option<TableRow> {
    if cells.len() <= columns.max_index() {
        return None;
    }

    let model_name = cells.get(columns.get(ColumnRole::Model)?)?.trim().to_string();
    if model_name.is_empty() || model_name.chars().count() < spec.min_name_len {
        return None;
    }
    if spec.skip_name.is_some_and(|skip| skip(&model_name)) {
        return None;
    }

    let price_of = |role| {
        columns
            .get(role)
            .and_then(|idx| cells.get(idx))
            .map(|text| (spec.price)(text))
            .unwrap_or(0.0)
    };
    let input = price_of(ColumnRole::Input);
    let output = price_of(ColumnRole::Output);
    if input == 0.0 && output == 0.0 {
        return None;
    }

    Some(TableRow {
        model_name,
        input,
        output,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::normalize::normalize_price;

    const ROLES: &[RoleSpec] = &[
        RoleSpec {
            role: ColumnRole::Model,
            exact: &[],
            contains: &[&["model"]],
            excludes: &[],
            fallback: Fallback::Column(0),
        },
        RoleSpec {
            role: ColumnRole::Input,
            exact: &["input"],
            contains: &[&["input"]],
            excludes: &["cached"],
            fallback: Fallback::Required,
        },
        RoleSpec {
            role: ColumnRole::Output,
            exact: &[],
            contains: &[&["output"]],
            excludes: &[],
            fallback: Fallback::Required,
        },
    ];

    const SPEC: TableSpec = TableSpec {
        required: &[&["model"], &["input"], &["output"]],
        roles: ROLES,
        header: HeaderRow::Thead,
        min_name_len: 2,
        skip_name: None,
        price: normalize_price,
    };

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_prefers_exact_and_skips_excluded() {
        let cols = resolve_columns(
            &headers(&["Model", "Cached input", "Input tokens", "Input", "Output"]),
            ROLES,
        )
        .unwrap();
        assert_eq!(cols.get(ColumnRole::Model), Some(0));
        assert_eq!(cols.get(ColumnRole::Input), Some(3));
        assert_eq!(cols.get(ColumnRole::Output), Some(4));
        assert_eq!(cols.max_index(), 4);
    }

    #[test]
    fn test_resolve_first_substring_wins() {
        let cols = resolve_columns(&headers(&["Name", "Input (text)", "Input (audio)", "Output"]), ROLES).unwrap();
        assert_eq!(cols.get(ColumnRole::Model), Some(0));
        assert_eq!(cols.get(ColumnRole::Input), Some(1));
    }

    #[test]
    fn test_resolve_missing_required_role() {
        assert!(resolve_columns(&headers(&["Model", "Input"]), ROLES).is_none());
        assert!(resolve_columns(&[], ROLES).is_none());
    }

    #[test]
    fn test_cached_column_does_not_bound_rows() {
        let roles = [
            ROLES[0],
            ROLES[1],
            ROLES[2],
            RoleSpec {
                role: ColumnRole::CachedInput,
                exact: &[],
                contains: &[&["cached"]],
                excludes: &[],
                fallback: Fallback::Optional,
            },
        ];
        let cols = resolve_columns(&headers(&["Model", "Input", "Output", "Cached input"]), &roles).unwrap();
        assert_eq!(cols.get(ColumnRole::CachedInput), Some(3));
        assert_eq!(cols.max_index(), 2);

        let row = parse_row(headers(&["gpt-x", "$1.00", "$2.00"]), &cols, &SPEC).unwrap();
        assert_eq!(row.input, 1.0);
        assert_eq!(row.output, 2.0);
    }

    #[test]
    fn test_fallback_column_stays_exclusive() {
        let roles = [
            ROLES[0],
            RoleSpec {
                role: ColumnRole::Input,
                exact: &[],
                contains: &[&["input"]],
                excludes: &[],
                fallback: Fallback::Column(0),
            },
            RoleSpec {
                role: ColumnRole::Output,
                exact: &[],
                contains: &[&["output"]],
                excludes: &[],
                fallback: Fallback::LastColumn,
            },
        ];
        assert!(resolve_columns(&headers(&["Model", "Price"]), &roles).is_none());
        assert!(resolve_columns(&headers(&["Model", "Input"]), &roles).is_none());

        let cols = resolve_columns(&headers(&["Model", "Input", "Price"]), &roles).unwrap();
        assert_eq!(cols.get(ColumnRole::Output), Some(2));
    }

    #[test]
    fn test_header_matches() {
        let h = headers(&["Model", "Base Input Tokens", "Output Tokens"]);
        assert!(header_matches(&h, &[&["base input tokens"], &["output tokens"]]));
        assert!(!header_matches(&h, &[&["cache"]]));
        assert!(header_matches(&h, &[&["元", "input"]]));
    }

    #[test]
    fn test_extract_table_row_policy() {
        let html = r#"
        <table>
            <thead><tr><th>Model</th><th>Input</th><th>Output</th></tr></thead>
            <tbody>
                <tr><td>gpt-4.1</td><td>$2.00</td><td>$8.00</td></tr>
                <tr><td>x</td><td>$1.00</td><td>$1.00</td></tr>
                <tr><td></td><td>$1.00</td><td>$1.00</td></tr>
                <tr><td>gpt-free</td><td>-</td><td>N/A</td></tr>
                <tr><td>gpt-short</td><td>$1.00</td></tr>
                <tr><td>o3</td><td>-</td><td>$40.00</td></tr>
            </tbody>
        </table>
        "#;
        let doc = Document::parse(html);
        let m = first_match(doc.select("table"), &SPEC).unwrap();
        let names: Vec<&str> = m.rows.iter().map(|r| r.model_name.as_str()).collect();
        assert_eq!(names, vec!["gpt-4.1", "o3"]);
        assert_eq!(m.rows[0].input, 2.0);
        assert_eq!(m.rows[0].output, 8.0);
        assert_eq!(m.rows[1].input, 0.0);
        assert_eq!(m.cell(&m.rows[1], ColumnRole::Output), Some("$40.00"));
    }

    #[test]
    fn test_non_matching_tables_are_skipped() {
        let html = r#"
        <table>
            <thead><tr><th>Feature</th><th>Limit</th></tr></thead>
            <tbody><tr><td>Batch</td><td>50%</td></tr></tbody>
        </table>
        <table>
            <thead><tr><th>Model</th><th>Input</th><th>Output</th></tr></thead>
            <tbody><tr><td>gpt-4o</td><td>$2.50</td><td>$10.00</td></tr></tbody>
        </table>
        "#;
        let doc = Document::parse(html);
        let tables = doc.select("table");
        assert!(extract_table(&tables[0], &SPEC).is_none());
        let m = first_match(tables, &SPEC).unwrap();
        assert_eq!(m.rows.len(), 1);
        assert_eq!(m.rows[0].model_name, "gpt-4o");
    }

    #[test]
    fn test_first_row_header() {
        let spec = TableSpec {
            header: HeaderRow::FirstRow,
            ..SPEC
        };
        let html = r#"
        <table>
            <tr><td>Model</td><td>Input</td><td>Output</td></tr>
            <tr><td>lite</td><td>0.3</td><td>0.6</td></tr>
        </table>
        "#;
        let doc = Document::parse(html);
        let m = first_match(doc.select("table"), &spec).unwrap();
        assert_eq!(m.rows[0].model_name, "lite");
        assert_eq!(m.rows[0].output, 0.6);
    }
}
