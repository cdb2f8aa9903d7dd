use std::sync::Arc;
use tracing::{debug, error, info};

use super::interface::{DictationError, RecognitionOptions, SpeechCapability, SpeechEvent};

/// What the adapter reports back to its owner after an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationUpdate {
    Listening(bool),
    Transcript(String),
    Failed(String),
}

/// Wraps the platform speech capability and turns its raw event stream into
/// listening transitions and committed transcripts.
pub struct DictationAdapter {
    capability: Option<Arc<dyn SpeechCapability>>,
    listening: bool,
    /// Set by `abort`; results are dropped until the session ends
    discarding: bool,
}

impl DictationAdapter {
    pub fn new(capability: Option<Arc<dyn SpeechCapability>>) -> Self {
        Self {
            capability,
            listening: false,
            discarding: false,
        }
    }

    pub fn unsupported() -> Self {
        Self::new(None)
    }

    pub fn is_supported(&self) -> bool {
        self.capability.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Swap the underlying capability, e.g. once the client reports support.
    /// Any active session on the old capability is abandoned.
    pub fn set_capability(&mut self, capability: Option<Arc<dyn SpeechCapability>>) {
        self.capability = capability;
        self.listening = false;
        self.discarding = false;
    }

    pub fn start(&mut self, language_tag: &str) -> Result<Vec<DictationUpdate>, DictationError> {
        let capability = self.capability.as_ref().ok_or(DictationError::Unsupported)?;
        if self.listening {
            return Err(DictationError::AlreadyListening);
        }

        capability.start(&RecognitionOptions::single_utterance(language_tag))?;
        self.discarding = false;
        info!("Dictation started: lang={}", language_tag);
        Ok(self.set_listening(true))
    }

    pub fn stop(&mut self) -> Result<(), DictationError> {
        if !self.listening {
            return Ok(());
        }
        match &self.capability {
            Some(capability) => capability.stop(),
            None => Ok(()),
        }
    }

    /// Stop the active session and drop whatever it still delivers. The
    /// platform may flush a final result for audio captured before the stop.
    pub fn abort(&mut self) -> Result<(), DictationError> {
        if !self.listening {
            return Ok(());
        }
        self.discarding = true;
        self.stop()
    }

    pub fn handle_event(&mut self, event: SpeechEvent) -> Vec<DictationUpdate> {
        match event {
            SpeechEvent::Start => self.set_listening(true),
            SpeechEvent::End => {
                self.discarding = false;
                self.set_listening(false)
            }
            SpeechEvent::Error { error, message } => {
                self.discarding = false;
                error!(
                    "Speech recognition error: {}{}",
                    error,
                    message.map(|m| format!(" ({})", m)).unwrap_or_default()
                );
                let mut updates = self.set_listening(false);
                updates.push(DictationUpdate::Failed(error));
                updates
            }
            SpeechEvent::Result { .. } if self.discarding => {
                debug!("Dropping result from aborted dictation");
                Vec::new()
            }
            SpeechEvent::Result { result_index, results } => {
                let mut transcript = String::new();
                for segment in results.iter().skip(result_index) {
                    if segment.is_final {
                        transcript.push_str(&segment.transcript);
                    } else {
                        debug!("Interim transcript: {}", segment.transcript);
                    }
                }
                if transcript.is_empty() {
                    Vec::new()
                } else {
                    vec![DictationUpdate::Transcript(transcript)]
                }
            }
        }
    }

    fn set_listening(&mut self, listening: bool) -> Vec<DictationUpdate> {
        if self.listening == listening {
            return Vec::new();
        }
        self.listening = listening;
        vec![DictationUpdate::Listening(listening)]
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::Mutex;

    use crate::dictation::interface::{DictationError, RecognitionOptions, SpeechCapability};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Start(RecognitionOptions),
        Stop,
    }

    #[derive(Default)]
    pub struct MockSpeech {
        pub calls: Mutex<Vec<Call>>,
    }

    impl MockSpeech {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SpeechCapability for MockSpeech {
        fn start(&self, options: &RecognitionOptions) -> Result<(), DictationError> {
            self.calls.lock().unwrap().push(Call::Start(options.clone()));
            Ok(())
        }

        fn stop(&self) -> Result<(), DictationError> {
            self.calls.lock().unwrap().push(Call::Stop);
            Ok(())
        }
    }
}
