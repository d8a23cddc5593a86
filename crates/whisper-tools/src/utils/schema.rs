//! JSON Schema construction for operation definitions.

use serde_json::{Map, Value, json};
use whisper_core::ToolParameterSchema;

/// Builds an `object` parameter schema one property at a time.
#[derive(Default)]
pub struct SchemaBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl SchemaBuilder {
    /// Start an empty object schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string property.
    pub fn string(self, name: &str, description: &str, required: bool) -> Self {
        self.property(name, json!({"type": "string", "description": description}), required)
    }

    /// Add a string property restricted to `values`.
    pub fn string_enum(self, name: &str, description: &str, values: &[&str], default: Option<&str>) -> Self {
        let mut prop = json!({"type": "string", "enum": values, "description": description});
        if let Some(default) = default {
            prop["default"] = json!(default);
        }
        self.property(name, prop, false)
    }

    /// Add a number property with optional bounds and default.
    pub fn number(
        self,
        name: &str,
        description: &str,
        minimum: Option<f64>,
        maximum: Option<f64>,
        default: Option<f64>,
    ) -> Self {
        let mut prop = json!({"type": "number", "description": description});
        if let Some(min) = minimum {
            prop["minimum"] = json!(min);
        }
        if let Some(max) = maximum {
            prop["maximum"] = json!(max);
        }
        if let Some(default) = default {
            prop["default"] = json!(default);
        }
        self.property(name, prop, false)
    }

    fn property(mut self, name: &str, prop: Value, required: bool) -> Self {
        let _ = self.properties.insert(name.into(), prop);
        if required {
            self.required.push(name.into());
        }
        self
    }

    /// Finish the schema.
    pub fn build(self) -> ToolParameterSchema {
        ToolParameterSchema {
            schema_type: "object".into(),
            properties: Some(self.properties),
            required: Some(self.required),
            description: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_object_schema() {
        let schema = SchemaBuilder::new()
            .string("input_file_path", "Path to the audio file", true)
            .string_enum("target_format", "Output format", &["mp3", "wav"], Some("mp3"))
            .number("speed", "Playback speed", Some(0.25), Some(4.0), Some(1.0))
            .build();

        assert_eq!(schema.schema_type, "object");
        assert!(schema.is_required("input_file_path"));
        assert!(!schema.is_required("speed"));

        let props = schema.properties.unwrap();
        assert_eq!(props["target_format"]["enum"], json!(["mp3", "wav"]));
        assert_eq!(props["target_format"]["default"], "mp3");
        assert_eq!(props["speed"]["minimum"], 0.25);
        assert_eq!(props["speed"]["maximum"], 4.0);
    }
}
