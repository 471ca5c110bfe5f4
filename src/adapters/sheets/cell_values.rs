use serde_json::Value;

pub trait IntoStringRows {
    fn into_string_rows(self) -> Vec<Vec<String>>;
}

pub fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl IntoStringRows for Vec<Vec<Value>> {
    fn into_string_rows(self) -> Vec<Vec<String>> {
        self.into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strings_are_not_quoted() {
        assert_eq!(cell_to_string(json!("Acme \"West\"")), "Acme \"West\"");
    }

    #[test]
    fn test_non_string_cells() {
        assert_eq!(cell_to_string(json!(8842)), "8842");
        assert_eq!(cell_to_string(json!(true)), "true");
        assert_eq!(cell_to_string(Value::Null), "");
    }

    #[test]
    fn test_rows_keep_their_shape() {
        let rows = vec![vec![json!("Status"), json!("Convoso")], vec![json!("Active")]];
        assert_eq!(
            rows.into_string_rows(),
            vec![
                vec!["Status".to_string(), "Convoso".to_string()],
                vec!["Active".to_string()],
            ]
        );
    }
}
