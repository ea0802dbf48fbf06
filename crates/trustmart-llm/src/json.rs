//! Extraction of the first well-formed JSON object from free text.

/// Returns the first `{...}` span that parses as a JSON object, tolerating
/// prose, markdown fences and stray braces around it.
pub fn extract_json_object(text: &str) -> Option<serde_json::Value> {
    let bytes = text.as_bytes();
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = matching_brace(bytes, start) {
            if let Ok(value @ serde_json::Value::Object(_)) = serde_json::from_str(&text[start..=end]) {
                return Some(value);
            }
        }
        search_from = start + 1;
    }
    None
}

/// Index of the brace closing the one at `start`, skipping braces in strings.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match (escaped, b) {
                (true, _) => escaped = false,
                (false, b'\\') => escaped = true,
                (false, b'"') => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_inside_prose_and_fences() {
        let text = "Sure! Here is the analysis:\n```json\n{\"isFake\": true, \"confidence\": 82}\n```\nHope it helps.";
        let v = extract_json_object(text).unwrap();
        assert_eq!(v["confidence"], 82);
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"{"reasons": ["uses } and { oddly", "quote \" inside"], "isFake": false}"#;
        let v = extract_json_object(text).unwrap();
        assert_eq!(v["reasons"][0], "uses } and { oddly");
    }

    #[test]
    fn test_skips_malformed_candidate() {
        let text = "{not json} then {\"ok\": 1}";
        assert_eq!(extract_json_object(text).unwrap()["ok"], 1);
    }

    #[test]
    fn test_none_without_object() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("{\"unterminated\": ").is_none());
    }
}
