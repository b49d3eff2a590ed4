//! The text-only conversational endpoint.
//!
//! Structurally a sibling of the live relay (same upgrade pattern, one
//! session per connection) but far simpler: it keeps the conversation
//! history in memory and drives one text exchange at a time through a
//! short-lived, text-modality upstream session.

use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use gemini_live::{ContextTurn, LiveClient, LiveEvent};
use murmur_core::session::{
    MediaResolution, ResponseModality, SessionConfig, ThinkingSettings, ToolSettings,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChatClientMessage {
    /// One user turn.
    Chat { text: String },
    /// Clears the conversation history.
    Reset,
    Ping,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChatServerMessage {
    ChatResponse { text: String },
    Error { message: String },
    Pong,
}

/// Axum handler to upgrade an HTTP connection to a chat session.
pub async fn chat_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

#[instrument(name = "chat_session", skip_all, fields(session_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    tracing::Span::current().record("session_id", session_id.to_string());
    info!("New chat connection");

    let (mut socket_tx, mut socket_rx) = socket.split();
    let mut history: Vec<ContextTurn> = Vec::new();

    while let Some(msg_result) = socket_rx.next().await {
        let msg = match msg_result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "Error receiving from chat WebSocket");
                break;
            }
        };

        let parsed = match serde_json::from_str::<ChatClientMessage>(&msg) {
            Ok(parsed) => parsed,
            Err(e) => {
                let _ = send_msg(
                    &mut socket_tx,
                    ChatServerMessage::Error {
                        message: format!("unrecognized message: {e}"),
                    },
                )
                .await;
                continue;
            }
        };

        let outcome = match parsed {
            ChatClientMessage::Ping => send_msg(&mut socket_tx, ChatServerMessage::Pong).await,
            ChatClientMessage::Reset => {
                history.clear();
                Ok(())
            }
            ChatClientMessage::Chat { text } => {
                history.push(ContextTurn {
                    role: "user".into(),
                    text,
                });
                match run_exchange(&state, &history).await {
                    Ok(reply) => {
                        history.push(ContextTurn {
                            role: "model".into(),
                            text: reply.clone(),
                        });
                        send_msg(&mut socket_tx, ChatServerMessage::ChatResponse { text: reply })
                            .await
                    }
                    Err(e) => {
                        warn!(error = ?e, "Chat exchange failed");
                        send_msg(
                            &mut socket_tx,
                            ChatServerMessage::Error {
                                message: e.to_string(),
                            },
                        )
                        .await
                    }
                }
            }
        };
        if outcome.is_err() {
            break;
        }
    }
    info!("Chat session finished");
}

/// Configuration for the short-lived text session backing one exchange.
/// Text modality means every audio-gated field stays off.
fn text_session_config(state: &AppState) -> SessionConfig {
    SessionConfig {
        model: state.config.chat_model.clone(),
        system_instruction: state.config.system_prompt.clone(),
        response_modalities: vec![ResponseModality::Text],
        voice: String::new(),
        temperature: 0.8,
        context_compression: false,
        session_resumption: false,
        affective_dialog: false,
        proactive_audio: false,
        thinking: ThinkingSettings::default(),
        input_transcription: false,
        output_transcription: false,
        media_resolution: MediaResolution::Low,
        tools: ToolSettings::default(),
        async_tools: HashMap::new(),
    }
}

/// Sends the full history as one completed turn and collects the streamed
/// text reply.
async fn run_exchange(state: &AppState, history: &[ContextTurn]) -> Result<String> {
    let cfg = text_session_config(state);
    let (events_tx, mut events_rx) = mpsc::channel(64);
    let client =
        LiveClient::connect(&state.config.gemini_api_key, &cfg, None, events_tx).await?;
    client.send_context(history, true);

    let mut reply = String::new();
    while let Some(event) = events_rx.recv().await {
        match event {
            LiveEvent::Text { text } => reply.push_str(&text),
            LiveEvent::TurnComplete | LiveEvent::GenerationComplete => break,
            LiveEvent::Closed { reason } => {
                if reply.is_empty() {
                    anyhow::bail!("upstream closed before replying: {reason}");
                }
                break;
            }
            LiveEvent::Error { message, .. } => anyhow::bail!("upstream error: {message}"),
            _ => {}
        }
    }
    client.disconnect();
    Ok(reply)
}

async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ChatServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
