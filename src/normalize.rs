//! Price and unit normalization
//!
//! Pure functions turning loosely formatted cell text into numbers.
//! Every function is total: unparseable input yields zero.

use std::sync::LazyLock;

use regex::Regex;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap());
static CONTEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*([KM])?").unwrap());
static YUAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[¥￥]?\s*(\d+(?:\.\d+)?)").unwrap());
static PLAIN_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d.]+").unwrap());

/// Markers meaning "no price published"
const UNAVAILABLE: &[&str] = &["-", "—", "–", "N/A", "Not available"];

/// Parse a price such as `"$5 / MTok"`, `"¥0.80"` or `"$2.00, prompts <= 200k"`.
///
/// Takes the first number in the text. Sentinels and garbage give `0.0`.
pub fn normalize_price(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() || UNAVAILABLE.contains(&trimmed) {
        return 0.0;
    }

    if let Some(m) = NUMBER_RE.find(trimmed) {
        let digits = m.as_str().replace(',', "");
        if let Ok(value) = digits.parse::<f64>() {
            return non_negative(value);
        }
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().map(non_negative).unwrap_or(0.0)
}

/// Parse a context window such as `"128K"`, `"1M"` or `"200,000"` into tokens.
pub fn parse_context_window(text: &str) -> u64 {
    let upper = text.to_uppercase().replace(',', "");
    let Some(caps) = CONTEXT_RE.captures(upper.trim()) else {
        return 0;
    };
    let Ok(number) = caps[1].parse::<f64>() else {
        return 0;
    };
    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        Some("K") => 1_000.0,
        Some("M") => 1_000_000.0,
        _ => 1.0,
    };
    let tokens = number * multiplier;
    if tokens.is_finite() && tokens >= 0.0 {
        tokens as u64
    } else {
        0
    }
}

/// Derive a slug id from a display name: `"GPT-4.1 Mini"` -> `"gpt-4-1-mini"`.
pub fn derive_id(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}

/// Round to the 4 fractional digits used in output
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Parse a CNY amount like `"0.8元/千tokens"` or `"¥0.8"`.
/// Falls back to [`normalize_price`] when no yuan-shaped number is present.
pub fn parse_yuan(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    YUAN_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .map(non_negative)
        .unwrap_or_else(|| normalize_price(text))
}

/// First run of digits and dots in a markdown cell; `"1.2.3"` and friends give `0.0`.
pub fn first_number(text: &str) -> f64 {
    PLAIN_NUMBER_RE
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(non_negative)
        .unwrap_or(0.0)
}

/// `"deepseek-chat"` -> `"Deepseek Chat"`
pub fn title_case(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut prev_alpha = false;
    for c in id.replace('-', " ").chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
