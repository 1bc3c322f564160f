//! Label matcher construction.

use crate::models::Filter;

/// Escapes a label value for use inside a double-quoted PromQL string.
///
/// Backslashes are doubled first so the backslashes added in front of
/// quotes are not escaped a second time.
///
/// ```
/// use shared::promql::escape_promql_value;
///
/// assert_eq!(escape_promql_value(r#"a"b\c"#), r#"a\"b\\c"#);
/// ```
#[must_use]
pub fn escape_promql_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Builds the comma-joined matcher list for a selector, without braces.
///
/// Incomplete filters (no label) are skipped. Substring operators become
/// regex matchers around `.*value.*`.
#[must_use]
pub fn build_label_matchers(filters: &[Filter]) -> String {
    filters
        .iter()
        .filter(|f| f.is_complete())
        .map(|f| {
            let escaped = escape_promql_value(&f.value);
            let value = if f.operator.is_substring() {
                format!(".*{escaped}.*")
            } else {
                escaped
            };
            format!("{}{}\"{}\"", f.label.trim(), f.operator.matcher(), value)
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Builds an instant-vector selector: `key` or `key{matchers}`.
#[must_use]
pub fn selector(metric_key: &str, filters: &[Filter]) -> String {
    let matchers = build_label_matchers(filters);
    if matchers.is_empty() {
        metric_key.to_string()
    } else {
        format!("{metric_key}{{{matchers}}}")
    }
}
