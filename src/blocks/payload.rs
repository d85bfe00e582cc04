//! OCR response payloads
//!
//! Back-ends either send a bare array of fragment records or a response
//! envelope (`status`, `texts`, `language`, `char_level`, ...). Envelope fields
//! other than `texts` are carried through to the output untouched.

use serde_json::{Map, Value};

use super::extract::ExtractOptions;
use super::BlockError;

/// Parsed OCR payload
#[derive(Debug, Clone)]
pub struct OcrPayload {
    /// Fragment records, in back-end order
    pub records: Vec<Value>,
    /// Source language reported by the back-end
    pub language: Option<String>,
    /// Whether the back-end emitted character-level fragments
    pub char_level: bool,
    envelope: Option<Map<String, Value>>,
}

impl OcrPayload {
    pub fn from_value(value: Value) -> Result<Self, BlockError> {
        match value {
            Value::Array(records) => Ok(Self {
                records,
                language: None,
                char_level: false,
                envelope: None,
            }),
            Value::Object(mut envelope) => {
                let records = match envelope.remove("texts") {
                    Some(Value::Array(records)) => records,
                    Some(_) => return Err(BlockError::InvalidPayload("`texts` is not an array".to_string())),
                    None => return Err(BlockError::InvalidPayload("missing `texts` array".to_string())),
                };
                let language = envelope
                    .get("language")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let char_level = envelope
                    .get("char_level")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

                Ok(Self {
                    records,
                    language,
                    char_level,
                    envelope: Some(envelope),
                })
            }
            other => Err(BlockError::InvalidPayload(format!(
                "expected an array or an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            default_is_character: self.char_level,
        }
    }

    /// Wrap output records the same way the input was wrapped
    pub fn into_output(self, texts: Vec<Value>) -> Value {
        match self.envelope {
            Some(mut envelope) => {
                envelope.insert("texts".to_string(), Value::Array(texts));
                Value::Object(envelope)
            }
            None => Value::Array(texts),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let payload = OcrPayload::from_value(json!([{"text": "a"}])).unwrap();
        assert_eq!(payload.records.len(), 1);
        assert!(payload.language.is_none());
        assert!(!payload.char_level);
        assert_eq!(payload.into_output(vec![json!(1)]), json!([1]));
    }

    #[test]
    fn test_envelope() {
        let payload = OcrPayload::from_value(json!({
            "status": "success",
            "texts": [{"text": "a"}, {"text": "b"}],
            "processing_time": 0.25,
            "language": "japan",
            "char_level": true
        }))
        .unwrap();

        assert_eq!(payload.records.len(), 2);
        assert_eq!(payload.language.as_deref(), Some("japan"));
        assert!(payload.extract_options().default_is_character);

        let output = payload.into_output(vec![json!({"text": "ab"})]);
        assert_eq!(output["status"], "success");
        assert_eq!(output["language"], "japan");
        assert_eq!(output["texts"], json!([{"text": "ab"}]));
    }

    #[test]
    fn test_invalid_payloads() {
        assert!(OcrPayload::from_value(json!("text")).is_err());
        assert!(OcrPayload::from_value(json!({"status": "error"})).is_err());
        assert!(OcrPayload::from_value(json!({"texts": 3})).is_err());
    }
}
