//! Prometheus name sanitization for user-supplied prefixes and labels.

/// Sanitize a metric name prefix.
///
/// Prometheus metric names must match `[a-zA-Z_:][a-zA-Z0-9_:]*`. Invalid
/// characters become underscores, runs of underscores collapse, and trailing
/// underscores are dropped. A leading digit gets an underscore in front.
pub fn sanitize_prefix(prefix: &str) -> String {
    let mut result = String::with_capacity(prefix.len() + 1);
    if prefix.starts_with(|c: char| c.is_ascii_digit()) {
        result.push('_');
    }

    for c in prefix.chars() {
        let c = if c.is_ascii_alphanumeric() || c == ':' { c } else { '_' };
        if c == '_' && result.ends_with('_') {
            continue;
        }
        result.push(c);
    }

    result.trim_end_matches('_').to_string()
}

/// Sanitize a label name.
///
/// Prometheus label names must match `[a-zA-Z_][a-zA-Z0-9_]*` and names
/// starting with `__` are reserved.
pub fn sanitize_label_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());

    for (i, c) in name.chars().enumerate() {
        let valid = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if valid {
            result.push(c);
        } else if !result.ends_with('_') {
            result.push('_');
        }
    }

    let mut result = result.trim_end_matches('_').to_string();
    if result.is_empty() {
        return "label".to_string();
    }
    if result.starts_with("__") {
        result.insert(0, 'z');
    }
    result
}

/// Escape special characters in label values.
pub fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}
