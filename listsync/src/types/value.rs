use serde_json::Value;

/// Renders a JSON value the way it should appear in a destination payload.
///
/// Strings are taken verbatim (no surrounding quotes), numbers and booleans
/// use their display form, and null renders as the empty string. Arrays and
/// objects fall back to compact JSON; the mapping layer is not expected to
/// reference such columns but must not panic on them.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strings_render_without_quotes() {
        assert_eq!(value_to_string(&json!("Alice")), "Alice");
    }

    #[test]
    fn test_null_renders_empty() {
        assert_eq!(value_to_string(&Value::Null), "");
    }

    #[test]
    fn test_numbers_and_bools_use_display_form() {
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(2.5)), "2.5");
        assert_eq!(value_to_string(&json!(true)), "true");
    }
}
