//! Escaping helpers shared by the artifact emitters.

/// Percent-encode a single path segment with `encodeURIComponent` semantics.
///
/// `urlencoding` escapes every reserved mark, while browsers leave `! ' ( ) *` alone;
/// those are restored so generated URLs match links produced client-side.
pub fn encode_component(input: &str) -> String {
    urlencoding::encode(input)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

pub fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Make serialized JSON safe to inline inside a `<script>` element.
///
/// The output is still valid JSON: every replacement is a JSON string escape.
pub fn script_safe_json(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            '/' => escaped.push_str("\\/"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_component_matches_browser_semantics() {
        assert_eq!(encode_component("Rust (2024)!"), "Rust%20(2024)!");
        assert_eq!(encode_component("a/b?c=d&e"), "a%2Fb%3Fc%3Dd%26e");
        assert_eq!(encode_component("日記"), "%E6%97%A5%E8%A8%98");
        assert_eq!(encode_component("it's *ok* ~_-."), "it's%20*ok*%20~_-.");
    }

    #[test]
    fn script_safe_json_round_trips_through_serde() {
        let original = serde_json::json!({ "title": "</script><b>&\u{2028}" });
        let text = serde_json::to_string(&original).expect("encode");
        let safe = script_safe_json(&text);
        assert!(!safe.contains("</script>"));
        assert!(!safe.contains('<'));
        let decoded: serde_json::Value = serde_json::from_str(&safe).expect("decode");
        assert_eq!(decoded, original);
    }
}
