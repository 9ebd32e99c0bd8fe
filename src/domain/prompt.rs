//! Request payload construction for `/api/generate`.
//!
//! Only formats text: no networking, no parsing.

use serde::Serialize;

/// Instruction prepended to every user prompt.
pub const ROADMAP_INSTRUCTIONS: &str = "\
You are an AI that returns roadmap data in JSON format.
Please ONLY return valid JSON. The JSON structure should look like:
{
  \"title\": \"string\",
  \"description\": \"string\",
  \"link\": \"string or null\",
  \"children\": [
    {
      \"title\": \"string\",
      \"description\": \"string\",
      \"link\": \"string or null\",
      \"children\": [...]
    },
    ...
  ]
}
";

/// Body of a non-streaming Ollama generate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    /// Ollama JSON mode; omitted from the payload unless enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl GenerateRequest {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    model: String,
    json_format: bool,
}

impl PromptBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            json_format: false,
        }
    }

    /// Ask the server to constrain output to JSON (`"format": "json"`).
    pub fn with_json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    /// Build the payload. The user prompt is taken as-is, empty included.
    pub fn build(&self, user_prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: format!("{}\n{}", ROADMAP_INSTRUCTIONS, user_prompt),
            stream: false,
            format: self.json_format.then(|| "json".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn given_user_prompt_when_building_then_appends_after_instructions() {
        let request = PromptBuilder::new("llama3.2:latest").build("Learn Rust");
        assert_eq!(request.model, "llama3.2:latest");
        assert!(!request.stream);
        assert!(request.prompt.starts_with(ROADMAP_INSTRUCTIONS));
        assert!(request.prompt.ends_with("\nLearn Rust"));
    }

    #[test]
    fn given_empty_prompt_when_building_then_accepts_it() {
        let request = PromptBuilder::new("m").build("");
        assert_eq!(request.prompt, format!("{}\n", ROADMAP_INSTRUCTIONS));
    }

    #[test]
    fn given_default_builder_when_serializing_then_has_exactly_three_fields() {
        let body = PromptBuilder::new("m").build("x").to_json().unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["model", "prompt", "stream"]);
        assert_eq!(object["stream"], Value::Bool(false));
    }

    #[test]
    fn given_json_format_when_serializing_then_includes_format() {
        let body = PromptBuilder::new("m")
            .with_json_format(true)
            .build("x")
            .to_json()
            .unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["format"], Value::String("json".into()));
    }
}
