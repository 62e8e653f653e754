//! Output formatters

use anyhow::Result;
use serde::Serialize;

/// JSON formatter
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format a value as pretty JSON
    pub fn format<T: Serialize>(value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Row {
        name: String,
        value: f64,
    }

    #[test]
    fn test_json_formatter() {
        let row = Row {
            name: "fpd".to_string(),
            value: 0.5,
        };
        let json = JsonFormatter::format(&row).unwrap();
        assert!(json.contains("\"name\": \"fpd\""));
        assert!(json.contains("\"value\": 0.5"));
    }
}
