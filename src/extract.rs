//! Dot-path value extraction from arbitrary JSON.
//!
//! Paths are period-separated field names (`bpi.USD.rate_float`). Bracketed
//! text is not an index: `results[0]` looks up a key literally named
//! `results[0]`, so array-indexed paths resolve to absent.

use serde_json::Value;

/// Split a path into field-name segments. An empty path has no segments.
///
/// This is the single place segment syntax is decided; index support would
/// start here.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(move |_| !path.is_empty())
}

/// Walk `path` from `root`. `None` means absent.
pub fn extract<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for key in segments(path) {
        current = current.as_object()?.get(key)?;
    }
    Some(current)
}

/// Numbers pass through, strings are parsed, everything else is 0.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

pub fn extract_number(root: &Value, path: &str) -> f64 {
    coerce_number(extract(root, path))
}
