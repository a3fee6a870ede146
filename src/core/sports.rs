use std::collections::BTreeSet;

use serde_json::Value;

use crate::models::SportsField;

/// Normalize a profile's sports field into a set of sport names
///
/// Legacy rows hold a JSON-encoded array in a text column. Anything that
/// does not decode to an array (malformed JSON, a bare string, an object)
/// yields an empty set rather than an error, and non-string array
/// elements are ignored.
pub fn parse_sports(field: &SportsField) -> BTreeSet<String> {
    match field {
        SportsField::List(sports) => sports.iter().cloned().collect(),
        SportsField::Encoded(text) => parse_encoded(text),
        SportsField::Missing => BTreeSet::new(),
    }
}

fn parse_encoded(text: &str) -> BTreeSet<String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(sport) => Some(sport),
                _ => None,
            })
            .collect(),
        Ok(_) => BTreeSet::new(),
        Err(e) => {
            tracing::trace!("Ignoring malformed sports value {:?}: {}", text, e);
            BTreeSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_list() {
        let field = SportsField::List(vec!["tennis".to_string(), "golf".to_string(), "tennis".to_string()]);
        assert_eq!(parse_sports(&field), set(&["golf", "tennis"]));
    }

    #[test]
    fn test_parse_encoded_array() {
        let field = SportsField::Encoded(r#"["football", "running"]"#.to_string());
        assert_eq!(parse_sports(&field), set(&["football", "running"]));
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(parse_sports(&SportsField::Encoded(String::new())).is_empty());
        assert!(parse_sports(&SportsField::Encoded("[]".to_string())).is_empty());
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(parse_sports(&SportsField::Encoded("[\"tennis\"".to_string())).is_empty());
        assert!(parse_sports(&SportsField::Encoded("tennis".to_string())).is_empty());
    }

    #[test]
    fn test_parse_non_list_json() {
        assert!(parse_sports(&SportsField::Encoded(r#""tennis""#.to_string())).is_empty());
        assert!(parse_sports(&SportsField::Encoded(r#"{"sport":"tennis"}"#.to_string())).is_empty());
    }

    #[test]
    fn test_parse_ignores_non_string_elements() {
        let field = SportsField::Encoded(r#"["yoga", 7, null, "gym"]"#.to_string());
        assert_eq!(parse_sports(&field), set(&["gym", "yoga"]));
    }

    #[test]
    fn test_parse_missing() {
        assert!(parse_sports(&SportsField::Missing).is_empty());
    }
}
