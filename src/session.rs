use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::debounce::{Debouncer, Settled};
use crate::dictation::{
    ClientSpeechCapability, DictationAdapter, DictationError, DictationUpdate, SpeechEvent,
};
use crate::direction::Direction;
use crate::translate::{TranslationPipeline, TranslationResult};

pub const UNSUPPORTED_SPEECH_NOTICE: &str = "Browser does not support speech recognition.";

/// Inbound events from the page
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    SpeechSupport(bool),
    TextInput(String),
    ToggleDirection,
    Clear,
    Translate,
    StartDictation,
    StopDictation,
    ToggleDictation,
    Speech(SpeechEvent),
}

/// Everything the page needs to render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub direction: Direction,
    pub input: String,
    pub placeholder: &'static str,
    pub result: Option<TranslationResult>,
    pub is_loading: bool,
    pub is_listening: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "text", rename_all = "kebab-case")]
pub enum MicControl {
    #[serde(rename_all = "camelCase")]
    StartMic {
        lang: String,
        continuous: bool,
        interim_results: bool,
    },
    StopMic,
}

/// Outbound messages, serialized with a `type` tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SessionUpdate {
    State(SessionSnapshot),
    Notice { message: String },
    Control(MicControl),
    Error { message: String },
}

pub type UpdateSender = mpsc::UnboundedSender<SessionUpdate>;

#[derive(Debug)]
struct Completion {
    request_id: u64,
    result: TranslationResult,
}

/// Per-connection event loop. Owns all display state; translation calls run
/// as spawned tasks and report back here, tagged with a request id so only
/// the latest issued request can change the display.
pub struct TranslatorSession {
    direction: Direction,
    input: String,
    result: Option<TranslationResult>,
    is_loading: bool,
    pipeline: TranslationPipeline,
    debouncer: Debouncer<String>,
    settled_rx: mpsc::UnboundedReceiver<Settled<String>>,
    dictation: DictationAdapter,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    latest_request: u64,
    updates: UpdateSender,
}

impl TranslatorSession {
    pub fn new(
        pipeline: TranslationPipeline,
        debounce_interval: Duration,
        dictation: DictationAdapter,
        updates: UpdateSender,
    ) -> Self {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            direction: Direction::default(),
            input: String::new(),
            result: None,
            is_loading: false,
            pipeline,
            debouncer: Debouncer::new(debounce_interval, settled_tx),
            settled_rx,
            dictation,
            completions_tx,
            completions_rx,
            latest_request: 0,
            updates,
        }
    }

    /// Start the event loop on its own task. The loop ends when every
    /// command sender is dropped.
    pub fn spawn(self) -> (mpsc::UnboundedSender<SessionCommand>, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(self.run(commands_rx));
        (commands_tx, handle)
    }

    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<SessionCommand>) {
        self.publish();
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(settled) = self.settled_rx.recv() => self.handle_settled(settled),
                Some(completion) = self.completions_rx.recv() => self.handle_completion(completion),
            }
        }
        self.debouncer.cancel();
        debug!("Session loop finished");
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            direction: self.direction,
            input: self.input.clone(),
            placeholder: self.direction.placeholder(),
            result: self.result.clone(),
            is_loading: self.is_loading,
            is_listening: self.dictation.is_listening(),
        }
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::SpeechSupport(supported) => {
                let capability = supported.then(|| {
                    Arc::new(ClientSpeechCapability::new(self.updates.clone()))
                        as Arc<dyn crate::dictation::SpeechCapability>
                });
                self.dictation.set_capability(capability);
                debug!("Client speech support: {}", self.dictation.is_supported());
            }
            SessionCommand::TextInput(text) => self.set_input(text),
            SessionCommand::ToggleDirection => self.toggle_direction(),
            SessionCommand::Clear => self.reset_content(),
            SessionCommand::Translate => self.translate_now(),
            SessionCommand::StartDictation => self.start_dictation(),
            SessionCommand::StopDictation => self.stop_dictation(),
            SessionCommand::ToggleDictation => {
                if self.dictation.is_listening() {
                    self.stop_dictation();
                } else {
                    self.start_dictation();
                }
            }
            SessionCommand::Speech(event) => {
                let updates = self.dictation.handle_event(event);
                self.apply_dictation(updates);
            }
        }
        self.publish();
    }

    fn set_input(&mut self, text: String) {
        self.input = text.clone();
        self.debouncer.update(text);
    }

    fn toggle_direction(&mut self) {
        self.direction = self.direction.toggle();
        info!("Direction switched to {}", self.direction);
        // a transcript still in flight would be in the old source language
        if let Err(e) = self.dictation.abort() {
            warn!("Failed to abort dictation: {}", e);
        }
        self.reset_content();
    }

    /// Drop pending input, the last result and anything in flight
    fn reset_content(&mut self) {
        self.input.clear();
        self.result = None;
        self.debouncer.cancel();
        self.latest_request += 1;
        self.is_loading = false;
    }

    fn translate_now(&mut self) {
        if self.input.trim().is_empty() {
            return;
        }
        self.debouncer.cancel();
        self.issue_request(self.input.clone());
    }

    fn start_dictation(&mut self) {
        match self.dictation.start(self.direction.speech_tag()) {
            Ok(updates) => self.apply_dictation(updates),
            Err(DictationError::Unsupported) => {
                self.send(SessionUpdate::Notice {
                    message: UNSUPPORTED_SPEECH_NOTICE.to_string(),
                });
            }
            Err(DictationError::AlreadyListening) => debug!("Dictation already active"),
            Err(e) => warn!("Failed to start dictation: {}", e),
        }
    }

    fn stop_dictation(&mut self) {
        if let Err(e) = self.dictation.stop() {
            warn!("Failed to stop dictation: {}", e);
        }
    }

    fn apply_dictation(&mut self, updates: Vec<DictationUpdate>) {
        for update in updates {
            match update {
                DictationUpdate::Transcript(text) => self.set_input(text),
                DictationUpdate::Listening(listening) => debug!("Listening: {}", listening),
                // already logged by the adapter; the page just returns to idle
                DictationUpdate::Failed(_) => {}
            }
        }
    }

    fn handle_settled(&mut self, settled: Settled<String>) {
        if !self.debouncer.accept(&settled) {
            debug!("Ignoring superseded settlement #{}", settled.generation);
            return;
        }

        if settled.value.trim().is_empty() {
            // cleared input: nothing already in flight may repopulate the result
            self.result = None;
            self.latest_request += 1;
            self.is_loading = false;
        } else {
            self.issue_request(settled.value);
        }
        self.publish();
    }

    fn issue_request(&mut self, text: String) {
        self.latest_request += 1;
        let request_id = self.latest_request;
        self.is_loading = true;

        let pipeline = self.pipeline.clone();
        let direction = self.direction;
        let completions = self.completions_tx.clone();
        debug!("Issuing translation #{} ({})", request_id, direction);
        tokio::spawn(async move {
            let result = pipeline.translate(&text, direction).await;
            let _ = completions.send(Completion { request_id, result });
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        if completion.request_id != self.latest_request {
            debug!(
                "Discarding stale translation #{} (latest #{})",
                completion.request_id, self.latest_request
            );
            return;
        }
        self.result = Some(completion.result);
        self.is_loading = false;
        self.publish();
    }

    fn publish(&self) {
        self.send(SessionUpdate::State(self.snapshot()));
    }

    fn send(&self, update: SessionUpdate) {
        if self.updates.send(update).is_err() {
            debug!("Session update dropped: client gone");
        }
    }
}
