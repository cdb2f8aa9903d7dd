use tracing::debug;

use super::interface::{DictationError, RecognitionOptions, SpeechCapability};
use crate::session::{MicControl, SessionUpdate, UpdateSender};

/// Speech capability living in the connected page. Start and stop are
/// forwarded as `control` messages; the page reports back with
/// `speech-event` messages.
pub struct ClientSpeechCapability {
    outbound: UpdateSender,
}

impl ClientSpeechCapability {
    pub fn new(outbound: UpdateSender) -> Self {
        Self { outbound }
    }

    fn send(&self, control: MicControl) -> Result<(), DictationError> {
        self.outbound
            .send(SessionUpdate::Control(control))
            .map_err(|_| DictationError::Capability("client disconnected".to_string()))
    }
}

impl SpeechCapability for ClientSpeechCapability {
    fn start(&self, options: &RecognitionOptions) -> Result<(), DictationError> {
        debug!("Requesting client mic start: lang={}", options.lang);
        self.send(MicControl::StartMic {
            lang: options.lang.clone(),
            continuous: options.continuous,
            interim_results: options.interim_results,
        })
    }

    fn stop(&self) -> Result<(), DictationError> {
        self.send(MicControl::StopMic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_start_sends_control_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let capability = ClientSpeechCapability::new(tx);

        capability
            .start(&RecognitionOptions::single_utterance("th-TH"))
            .unwrap();

        let sent = serde_json::to_value(rx.try_recv().unwrap()).unwrap();
        assert_eq!(sent["type"], "control");
        assert_eq!(sent["text"], "start-mic");
        assert_eq!(sent["lang"], "th-TH");
        assert_eq!(sent["continuous"], false);
        assert_eq!(sent["interimResults"], true);
    }

    #[test]
    fn test_stop_sends_stop_mic() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        ClientSpeechCapability::new(tx).stop().unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionUpdate::Control(MicControl::StopMic)
        );
    }

    #[test]
    fn test_closed_connection_is_a_capability_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let capability = ClientSpeechCapability::new(tx);
        assert!(matches!(capability.stop(), Err(DictationError::Capability(_))));
    }
}
