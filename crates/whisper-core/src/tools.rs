//! Tool definition types advertised to tool hosts.
//!
//! A [`Tool`] pairs a name and description with the JSON Schema of its
//! parameters. Hosts receive the list from `tools/list`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Tool schema
// ─────────────────────────────────────────────────────────────────────────────

/// JSON Schema-compatible parameter definition for a tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolParameterSchema {
    /// Top-level JSON Schema type.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Property definitions (when type is `object`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, Value>>,
    /// Required property names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Description of the schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Catch-all for additional JSON Schema properties.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ToolParameterSchema {
    /// Whether `name` is listed as required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|r| r.iter().any(|n| n == name))
    }
}

/// A tool definition that can be sent to a tool host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Tool name (unique identifier).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub input_schema: ToolParameterSchema,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ToolParameterSchema {
        let mut properties = serde_json::Map::new();
        let _ = properties.insert("input_file_path".into(), json!({"type": "string"}));
        ToolParameterSchema {
            schema_type: "object".into(),
            properties: Some(properties),
            required: Some(vec!["input_file_path".into()]),
            description: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn tool_serializes_input_schema_camel_case() {
        let tool = Tool {
            name: "transcribe_audio".into(),
            description: "Transcribe an audio file".into(),
            input_schema: schema(),
        };
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["name"], "transcribe_audio");
        assert_eq!(json["inputSchema"]["type"], "object");
        assert_eq!(json["inputSchema"]["required"][0], "input_file_path");
        assert!(json["inputSchema"].get("description").is_none());
    }

    #[test]
    fn extra_keys_flatten() {
        let mut s = schema();
        let _ = s.extra.insert("additionalProperties".into(), json!(false));
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["additionalProperties"], false);
    }

    #[test]
    fn required_lookup() {
        let s = schema();
        assert!(s.is_required("input_file_path"));
        assert!(!s.is_required("prompt"));
    }
}
