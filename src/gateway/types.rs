//! Wire types for the local model server (SPEC §4.1, §6).

use serde::{Deserialize, Serialize};

/// Options controlling a single generation call (SPEC §4.1). Defaults match
/// the spec: temperature 0.3, max predicted tokens 500.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub top_k: u32,
    pub num_predict: u32,
    pub timeout_secs: u64,
    pub keep_alive: String,
}

impl GenerateOptions {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: 0.3,
            top_k: 40,
            num_predict: 500,
            timeout_secs: 30,
            keep_alive: "5m".to_string(),
        }
    }

    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    pub fn with_num_predict(mut self, n: u32) -> Self {
        self.num_predict = n;
        self
    }

    /// Append a repair instruction to the prompt, for the guardrail's
    /// one-shot repair retry (SPEC §4.7 step 1).
    pub fn with_repair_instruction(mut self) -> Self {
        self.prompt.push_str(
            "\n\nYour previous reply was not valid JSON matching the required shape. \
             Respond again with ONLY a single valid JSON object, no prose.",
        );
        self
    }

    fn to_wire(&self) -> GenerateRequestWire<'_> {
        GenerateRequestWire {
            model: &self.model,
            prompt: &self.prompt,
            format: "json",
            options: GenerateRequestOptions {
                temperature: self.temperature,
                top_k: self.top_k,
                num_predict: self.num_predict,
                keep_alive: &self.keep_alive,
            },
        }
    }
}

impl Serialize for GenerateOptions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_wire().serialize(serializer)
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequestWire<'a> {
    model: &'a str,
    prompt: &'a str,
    format: &'a str,
    options: GenerateRequestOptions<'a>,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequestOptions<'a> {
    temperature: f32,
    top_k: u32,
    num_predict: u32,
    keep_alive: &'a str,
}

/// A completed generation from the model server (SPEC §6 outbound shape).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelReply {
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub eval_count: u32,
}

/// Health of the model server, as reported by its `/tags` endpoint
/// (SPEC §4.1, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Online,
    Degraded(String),
    Offline(String),
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct EmbedRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EmbedReply {
    pub embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_serialization_matches_spec_shape() {
        let options = GenerateOptions::new("llama3", "hello");
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["format"], "json");
        assert_eq!(json["options"]["temperature"], 0.3);
        assert_eq!(json["options"]["num_predict"], 500);
    }

    #[test]
    fn repair_instruction_is_appended_to_prompt() {
        let options = GenerateOptions::new("llama3", "hello").with_repair_instruction();
        assert!(options.prompt.starts_with("hello"));
        assert!(options.prompt.contains("valid JSON"));
    }
}
