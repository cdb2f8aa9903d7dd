use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::dictation::{DictationError, SpeechEvent};
use crate::session::SessionCommand;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message has no type")]
    MissingType,

    #[error("'{0}' requires a string 'text' field")]
    MissingText(&'static str),

    #[error(transparent)]
    Speech(#[from] DictationError),
}

/// Map one inbound websocket frame to a session command.
/// Unknown message types are logged and yield `None`.
pub fn parse_message(text: &str) -> Result<Option<SessionCommand>, MessageError> {
    let msg: Value = serde_json::from_str(text)?;
    let msg_type = msg
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(MessageError::MissingType)?;

    let command = match msg_type {
        "hello" => {
            let supported = msg
                .get("speechSupported")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            SessionCommand::SpeechSupport(supported)
        }
        "text-input" => {
            let text = msg
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or(MessageError::MissingText("text-input"))?;
            SessionCommand::TextInput(text.to_string())
        }
        "toggle-direction" => SessionCommand::ToggleDirection,
        "clear-input" => SessionCommand::Clear,
        "translate" => SessionCommand::Translate,
        "toggle-mic" => SessionCommand::ToggleDictation,
        "start-mic" => SessionCommand::StartDictation,
        "stop-mic" => SessionCommand::StopDictation,
        "speech-event" => SessionCommand::Speech(SpeechEvent::from_value(msg)?),
        other => {
            warn!("Unknown message type: {}", other);
            return Ok(None);
        }
    };
    Ok(Some(command))
}
