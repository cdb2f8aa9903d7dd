use axum::{
    extract::{ws::Message, State, WebSocketUpgrade},
    response::Response,
};
use axum::extract::ws::WebSocket;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::dictation::DictationAdapter;
use crate::handlers;
use crate::session::{SessionUpdate, TranslatorSession};
use crate::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_uid = state.generate_client_uid();
    info!("New WebSocket connection: {}", client_uid);

    let (mut sender, mut receiver) = socket.split();
    let (updates_tx, mut updates_rx) = mpsc::unbounded_channel::<SessionUpdate>();

    // Speech stays unsupported until the page says hello
    let session = TranslatorSession::new(
        state.pipeline.clone(),
        state.debounce_interval(),
        DictationAdapter::unsupported(),
        updates_tx.clone(),
    );
    let (commands, session_task) = session.spawn();
    state
        .sessions
        .insert(client_uid.clone(), session_task.abort_handle());

    let writer_uid = client_uid.clone();
    let writer = tokio::spawn(async move {
        while let Some(update) = updates_rx.recv().await {
            let text = match serde_json::to_string(&update) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode update: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(text)).await {
                debug!("Stopped writing to {}: {}", writer_uid, e);
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match handlers::parse_message(&text) {
                Ok(Some(command)) => {
                    if commands.send(command).is_err() {
                        warn!("Session for {} is gone", client_uid);
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Error handling message: {}", e);
                    let _ = updates_tx.send(SessionUpdate::Error {
                        message: e.to_string(),
                    });
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", client_uid);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    // Cleanup
    drop(commands);
    if let Some((_, handle)) = state.sessions.remove(&client_uid) {
        handle.abort();
    }
    writer.abort();

    info!("Cleaned up client {}", client_uid);
}
