use crate::codec::JsonCodec;

/// Pretty-prints `text` with a two-space indent when it is a JSON object or
/// array. Anything else, including malformed JSON, comes back unchanged.
pub fn format_json(text: &str) -> String {
    match text.trim_start().chars().next() {
        Some('{' | '[') => {
            let codec = JsonCodec::PRETTY;
            match codec
                .deserialize::<serde_json::Value>(text)
                .and_then(|value| codec.serialize(&value))
            {
                Ok(pretty) => pretty,
                Err(e) => {
                    tracing::debug!("Falling back to raw text for malformed JSON: {}", e);
                    text.to_string()
                }
            }
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_is_indented() {
        assert_eq!(format_json(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
        assert_eq!(format_json("  [1,2]"), "[\n  1,\n  2\n]");
    }

    #[test]
    fn test_malformed_json_falls_back() {
        assert_eq!(format_json(r#"{"a":"#), r#"{"a":"#);
        assert_eq!(format_json("plain text"), "plain text");
        assert_eq!(format_json(""), "");
    }
}
