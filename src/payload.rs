//! Embedded payload lookup
//!
//! Client-rendered pages hand their initial state to the front-end as a
//! JSON object assigned in a script, e.g. `window._ROUTER_DATA = {...}`.
//! The object is decoded straight from the raw page text and searched for
//! a string of interest.

use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Decode the first JSON value following `marker` in `raw`.
///
/// Whatever follows the value (`;</script>...`) is ignored. Returns `None`
/// when the marker is absent or the value is malformed.
pub fn decode_after_marker(raw: &str, marker: &Regex) -> Option<Value> {
    let found = marker.find(raw)?;
    let rest = &raw[found.end()..];

    let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => Some(value),
        Some(Err(e)) => {
            debug!(error = %e, "failed to decode embedded payload");
            None
        }
        None => None,
    }
}

/// Depth-first search for the first string satisfying `predicate`.
///
/// Nodes deeper than `max_depth` below `root` are not visited. Object
/// members are visited in key order, array items in index order.
pub fn find_string<'v>(
    root: &'v Value,
    max_depth: usize,
    predicate: impl Fn(&str) -> bool,
) -> Option<&'v str> {
    let mut stack: Vec<(&'v Value, usize)> = vec![(root, 0)];

    while let Some((value, depth)) = stack.pop() {
        match value {
            Value::String(s) if predicate(s.as_str()) => return Some(s.as_str()),
            Value::Object(map) if depth < max_depth => {
                stack.extend(map.values().rev().map(|v| (v, depth + 1)));
            }
            Value::Array(items) if depth < max_depth => {
                stack.extend(items.iter().rev().map(|v| (v, depth + 1)));
            }
            _ => {}
        }
    }

    None
}
