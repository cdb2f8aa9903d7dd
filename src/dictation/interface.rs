use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a recognition session is configured on the platform side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionOptions {
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl RecognitionOptions {
    /// Single utterance with interim results, the mode dictation always uses
    pub fn single_utterance(language_tag: &str) -> Self {
        Self {
            lang: language_tag.to_string(),
            continuous: false,
            interim_results: true,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DictationError {
    #[error("speech recognition is not supported on this platform")]
    Unsupported,

    #[error("a dictation session is already active")]
    AlreadyListening,

    #[error("speech capability unavailable: {0}")]
    Capability(String),

    #[error("invalid speech event: {0}")]
    InvalidEvent(String),
}

/// Platform speech-to-text capability. Owns at most one recognition
/// session; results come back as `SpeechEvent`s.
pub trait SpeechCapability: Send + Sync {
    fn start(&self, options: &RecognitionOptions) -> Result<(), DictationError>;

    fn stop(&self) -> Result<(), DictationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechSegment {
    pub transcript: String,
    #[serde(default)]
    pub is_final: bool,
}

/// Validated event reported by the platform recognizer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum SpeechEvent {
    Start,
    End,
    #[serde(rename_all = "camelCase")]
    Error {
        error: String,
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Result {
        #[serde(default)]
        result_index: usize,
        results: Vec<SpeechSegment>,
    },
}

impl SpeechEvent {
    /// Decode a raw event payload, rejecting anything structurally unsound
    pub fn from_value(value: serde_json::Value) -> Result<Self, DictationError> {
        let event: SpeechEvent = serde_json::from_value(value)
            .map_err(|e| DictationError::InvalidEvent(e.to_string()))?;

        if let SpeechEvent::Result { result_index, results } = &event {
            if *result_index > results.len() {
                return Err(DictationError::InvalidEvent(format!(
                    "resultIndex {} out of range for {} results",
                    result_index,
                    results.len()
                )));
            }
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_utterance_options() {
        let options = RecognitionOptions::single_utterance("th-TH");
        assert_eq!(options.lang, "th-TH");
        assert!(!options.continuous);
        assert!(options.interim_results);
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["interimResults"], true);
    }

    #[test]
    fn test_decode_result_event() {
        let event = SpeechEvent::from_value(json!({
            "event": "result",
            "resultIndex": 1,
            "results": [
                {"transcript": "สวัส", "isFinal": true},
                {"transcript": "ดี", "isFinal": false}
            ]
        }))
        .unwrap();

        match event {
            SpeechEvent::Result { result_index, results } => {
                assert_eq!(result_index, 1);
                assert_eq!(results.len(), 2);
                assert!(results[0].is_final);
                assert!(!results[1].is_final);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_lifecycle_and_error_events() {
        assert_eq!(SpeechEvent::from_value(json!({"event": "start"})).unwrap(), SpeechEvent::Start);
        assert_eq!(SpeechEvent::from_value(json!({"event": "end"})).unwrap(), SpeechEvent::End);
        assert_eq!(
            SpeechEvent::from_value(json!({"event": "error", "error": "no-speech"})).unwrap(),
            SpeechEvent::Error {
                error: "no-speech".to_string(),
                message: None
            }
        );
    }

    #[test]
    fn test_rejects_out_of_range_result_index() {
        let err = SpeechEvent::from_value(json!({
            "event": "result",
            "resultIndex": 3,
            "results": [{"transcript": "x", "isFinal": true}]
        }))
        .unwrap_err();
        assert!(matches!(err, DictationError::InvalidEvent(_)));
    }

    #[test]
    fn test_rejects_unknown_or_malformed_events() {
        assert!(SpeechEvent::from_value(json!({"event": "soundstart"})).is_err());
        assert!(SpeechEvent::from_value(json!({"event": "result", "results": "nope"})).is_err());
        assert!(SpeechEvent::from_value(json!({"results": []})).is_err());
    }
}
