//! JSON output formatting

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Wrapper for JSON output with metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    /// The actual data
    pub data: T,

    /// Metadata about the response
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// Timestamp of the response
    pub timestamp: String,

    /// CLI version
    pub version: String,

    /// Number of records, for list output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> JsonOutput<T> {
    /// Create a new JSON output with metadata
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                count: None,
            },
        }
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    let mut output = JsonOutput::new(serde_json::to_value(data)?);
    output.meta.count = output.data.as_array().map(Vec::len);
    serde_json::to_string_pretty(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_output_new() {
        let output = JsonOutput::new(vec!["item1", "item2"]);

        assert_eq!(output.data, vec!["item1", "item2"]);
        assert_eq!(output.meta.version, env!("CARGO_PKG_VERSION"));
        assert!(!output.meta.timestamp.is_empty());
        assert!(output.meta.count.is_none());
    }

    #[test]
    fn test_format_json_list_has_count() {
        let result = format_json(&json!([{"id": "1"}, {"id": "2"}])).unwrap();

        assert!(result.contains("\"data\""));
        assert!(result.contains("\"meta\""));
        assert!(result.contains("\"count\": 2"));
        assert!(result.contains("\"id\": \"1\""));
    }

    #[test]
    fn test_format_json_record_has_no_count() {
        let result = format_json(&json!({"id": "1"})).unwrap();
        assert!(!result.contains("\"count\""));
    }

    #[test]
    fn test_format_json_empty_vec() {
        let items: Vec<serde_json::Value> = vec![];
        let result = format_json(&items).unwrap();
        assert!(result.contains("\"data\": []"));
        assert!(result.contains("\"count\": 0"));
    }
}
