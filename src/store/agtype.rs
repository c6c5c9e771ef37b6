//! Decoding of AGE `agtype` text.
//!
//! agtype text is JSON with type annotations appended to composite values,
//! e.g. `{"id": 1, "label": "A", "properties": {}}::vertex` or `12.5::numeric`.
//! The annotations are stripped outside of string literals and the rest is
//! parsed as JSON.

use super::errors::StoreError;
use super::value::Value;

/// Removes `::ident` annotations that are not inside string literals.
pub fn strip_annotations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                while chars
                    .peek()
                    .is_some_and(|next| next.is_ascii_alphanumeric() || *next == '_')
                {
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Parses one agtype column value. SQL NULL arrives as `None`.
pub fn parse_agtype(text: Option<&str>) -> Result<Value, StoreError> {
    let Some(text) = text else {
        return Ok(Value::Null);
    };
    let cleaned = strip_annotations(text.trim());
    let json: serde_json::Value = serde_json::from_str(&cleaned)
        .map_err(|e| StoreError::Decode(format!("{} in agtype `{}`", e, text)))?;
    Ok(Value::from_json(json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_keeps_string_contents() {
        assert_eq!(
            strip_annotations(r#"{"note": "a::b", "n": 1}::vertex"#),
            r#"{"note": "a::b", "n": 1}"#
        );
        assert_eq!(strip_annotations("12.5::numeric"), "12.5");
        assert_eq!(
            strip_annotations(r#"[{"id": 1}::vertex, {"id": 2}::edge]::path"#),
            r#"[{"id": 1}, {"id": 2}]"#
        );
    }

    #[test]
    fn test_parse_vertex() {
        let value = parse_agtype(Some(
            r#"{"id": 844424930131969, "label": "Employee", "properties": {"name": "Alice", "_types": ["Employee"]}}::vertex"#,
        ))
        .unwrap();
        match value {
            Value::Node(node) => {
                assert_eq!(node.id, 844424930131969);
                assert_eq!(node.label, "Employee");
            }
            other => panic!("expected vertex, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_scalars_and_null() {
        assert_eq!(parse_agtype(None).unwrap(), Value::Null);
        assert_eq!(parse_agtype(Some("null")).unwrap(), Value::Null);
        assert_eq!(parse_agtype(Some("\"x\"")).unwrap(), Value::from("x"));
        assert_eq!(parse_agtype(Some("42")).unwrap(), Value::Int(42));
        assert!(parse_agtype(Some("{broken")).is_err());
    }
}
