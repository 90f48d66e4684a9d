//! Request and response bodies of the external generation functions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CanvasError, Result};

/// Body for the canvas element generation function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasGenerationRequest {
    pub strategy_id: String,
    pub briefing_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhancement_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_content: Option<String>,
}

impl CanvasGenerationRequest {
    pub fn new(strategy_id: impl Into<String>, briefing_content: impl Into<String>) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            briefing_content: briefing_content.into(),
            section: None,
            enhancement_text: None,
            persona_content: None,
        }
    }

    /// Restrict generation to one canvas section, e.g. `customerJobs`.
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn enhancement(mut self, text: impl Into<String>) -> Self {
        self.enhancement_text = Some(text.into());
        self
    }

    pub fn persona(mut self, content: impl Into<String>) -> Self {
        self.persona_content = Some(content.into());
        self
    }
}

/// Body for the ad image generation function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub platform: String,
}

/// `{data, error, debugInfo}` envelope returned by every generation function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default, rename = "debugInfo")]
    pub debug_info: Option<Value>,
}

impl GenerationResponse {
    /// The `data` payload, or the reported error.
    pub fn into_result(self) -> Result<Value> {
        if let Some(error) = self.error.filter(|e| !e.is_null()) {
            let message = match &error {
                Value::String(s) => s.clone(),
                Value::Object(map) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string()),
                other => other.to_string(),
            };
            return Err(CanvasError::Generation(message));
        }

        match self.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(CanvasError::Generation("response carried no data".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canvas_request_skips_unset_fields() {
        let request = CanvasGenerationRequest::new("s1", "We sell flights").section("customerJobs");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "strategyId": "s1",
                "briefingContent": "We sell flights",
                "section": "customerJobs"
            })
        );
    }

    #[test]
    fn test_response_data() {
        let response: GenerationResponse =
            serde_json::from_value(json!({"data": {"customerJobs": []}, "debugInfo": {"ms": 12}}))
                .unwrap();
        assert!(response.debug_info.is_some());
        assert_eq!(response.into_result().unwrap(), json!({"customerJobs": []}));
    }

    #[test]
    fn test_response_error_message() {
        let response: GenerationResponse =
            serde_json::from_value(json!({"data": null, "error": {"message": "rate limited"}}))
                .unwrap();
        match response.into_result() {
            Err(CanvasError::Generation(message)) => assert_eq!(message, "rate limited"),
            other => panic!("expected generation error, got {:?}", other),
        }
    }

    #[test]
    fn test_response_without_data() {
        let response = GenerationResponse::default();
        assert!(response.into_result().is_err());
    }
}
