//! HTML and inline-script escaping.

/// Escape text content for an HTML element body.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape serialized JSON so it can sit inside an inline `<script>`.
///
/// The output is still valid JSON and evaluates to the same value.
pub fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_text("\"quoted\""), "\"quoted\"");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn test_escape_script_json_breaks_closing_tag() {
        let json = serde_json::to_string(&serde_json::json!({"x": "</script><b>"})).unwrap();
        let escaped = escape_script_json(&json);
        assert!(!escaped.contains("</script>"));

        let decoded: serde_json::Value = serde_json::from_str(&escaped).unwrap();
        assert_eq!(decoded["x"], "</script><b>");
    }

    #[test]
    fn test_escape_script_json_line_separators() {
        let escaped = escape_script_json("\"a\u{2028}b\"");
        assert_eq!(escaped, "\"a\\u2028b\"");
    }
}
