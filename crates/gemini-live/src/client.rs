//! Connection management for one live session.

use crate::types::{self, OutboundFrame, ServerFrame};
use crate::{ContextTurn, LiveEvent};
use futures_util::{SinkExt, StreamExt};
use murmur_core::session::SessionConfig;
use murmur_core::tools::ToolOutcome;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMessage};
use tracing::{debug, info, trace, warn};

const LIVE_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";
const SETUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure to establish an upstream session.
#[derive(Debug, thiserror::Error)]
pub enum LiveConnectError {
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("setup frame could not be serialized: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("upstream closed during setup: {0}")]
    Rejected(String),
    #[error("timed out waiting for setup to complete")]
    Timeout,
}

/// One established upstream session.
///
/// Send operations are fire-and-forget: they enqueue a frame for the writer
/// task and return immediately. Once the connection is gone the enqueue
/// fails and the frame is dropped silently; audio chunks arrive at high
/// frequency and logging every drop would swamp the logs, so drops are
/// reported at `trace!` only.
///
/// Dropping the client aborts both I/O tasks, which is the teardown path
/// for planned disconnects: no `Closed` event is emitted for them.
pub struct LiveClient {
    out_tx: mpsc::UnboundedSender<WsMessage>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl LiveClient {
    /// Connects, performs the setup handshake, and arms the event stream.
    ///
    /// Returns only after the upstream acknowledged the setup frame, so a
    /// returned client is immediately usable. `resume_handle` carries a
    /// previously issued resumption handle to continue the prior session's
    /// context instead of starting fresh.
    pub async fn connect(
        api_key: &str,
        cfg: &SessionConfig,
        resume_handle: Option<&str>,
        events: mpsc::Sender<LiveEvent>,
    ) -> Result<Self, LiveConnectError> {
        let url = format!("{LIVE_ENDPOINT}?key={api_key}");
        let (ws_stream, _) = connect_async(url).await?;
        let (mut ws_tx, mut ws_rx) = ws_stream.split();

        let setup = types::build_setup(cfg, resume_handle);
        let payload = serde_json::to_string(&OutboundFrame::Setup(setup))?;
        ws_tx.send(WsMessage::Text(payload.into())).await?;

        // The first meaningful frame must be setupComplete; anything else
        // before it is a handshake failure.
        let handshake = async {
            while let Some(msg) = ws_rx.next().await {
                match msg? {
                    WsMessage::Text(text) => match serde_json::from_str::<ServerFrame>(&text) {
                        Ok(frame) if frame.setup_complete.is_some() => return Ok(()),
                        Ok(_) => {
                            debug!("Ignoring pre-setup frame from upstream");
                        }
                        Err(e) => {
                            warn!(error = %e, "Unparseable frame during setup handshake");
                        }
                    },
                    WsMessage::Close(frame) => {
                        return Err(LiveConnectError::Rejected(
                            frame
                                .map(|f| f.reason.to_string())
                                .unwrap_or_else(|| "closed without reason".to_string()),
                        ));
                    }
                    _ => {}
                }
            }
            Err(LiveConnectError::Rejected(
                "stream ended during setup".to_string(),
            ))
        };
        match tokio::time::timeout(SETUP_TIMEOUT, handshake).await {
            Ok(result) => result?,
            Err(_) => return Err(LiveConnectError::Timeout),
        }
        info!(model = %cfg.model, resumed = resume_handle.is_some(), "Live session established");

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<WsMessage>();
        let writer = tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if let Err(e) = ws_tx.send(msg).await {
                    debug!(error = %e, "Upstream write failed; stopping writer");
                    break;
                }
            }
            let _ = ws_tx.send(WsMessage::Close(None)).await;
        });

        let include_thoughts = cfg.thinking.include_thoughts;
        let reader = tokio::spawn(async move {
            while let Some(msg) = ws_rx.next().await {
                match msg {
                    Ok(WsMessage::Text(text)) => {
                        let frame: ServerFrame = match serde_json::from_str(&text) {
                            Ok(frame) => frame,
                            Err(e) => {
                                warn!(error = %e, "Discarding unparseable upstream frame");
                                let _ = events
                                    .send(LiveEvent::Error {
                                        kind: "gemini_error".to_string(),
                                        message: format!("unparseable upstream frame: {e}"),
                                    })
                                    .await;
                                continue;
                            }
                        };
                        for event in frame.into_events(include_thoughts) {
                            if events.send(event).await.is_err() {
                                // Session is gone; no point reading further.
                                return;
                            }
                        }
                    }
                    Ok(WsMessage::Close(frame)) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .unwrap_or_else(|| "connection closed".to_string());
                        info!(%reason, "Upstream closed the live session");
                        let _ = events.send(LiveEvent::Closed { reason }).await;
                        return;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Upstream read failed");
                        let _ = events
                            .send(LiveEvent::Closed {
                                reason: e.to_string(),
                            })
                            .await;
                        return;
                    }
                }
            }
            let _ = events
                .send(LiveEvent::Closed {
                    reason: "stream ended".to_string(),
                })
                .await;
        });

        Ok(Self {
            out_tx,
            reader,
            writer,
        })
    }

    fn enqueue(&self, frame: &OutboundFrame) {
        let payload = match serde_json::to_string(frame) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Dropping unserializable outbound frame");
                return;
            }
        };
        if self.out_tx.send(WsMessage::Text(payload.into())).is_err() {
            trace!("Dropping frame: live session writer is gone");
        }
    }

    /// Streams one chunk of input audio. No-op when disconnected.
    pub fn send_audio(&self, data: &[u8], mime_type: &str) {
        self.enqueue(&types::audio_frame(data, mime_type));
    }

    /// Streams one video/image frame. No-op when disconnected.
    pub fn send_video(&self, data: &[u8], mime_type: &str) {
        self.enqueue(&types::video_frame(data, mime_type));
    }

    /// Submits a text turn, barging in on any in-flight audio first.
    pub fn send_text(&self, text: &str) {
        // The unbounded queue preserves order, so activity-start is
        // guaranteed to hit the wire before the turn content.
        for frame in types::text_turn_frames(text) {
            self.enqueue(&frame);
        }
    }

    /// Injects prior conversational turns.
    pub fn send_context(&self, turns: &[ContextTurn], turn_complete: bool) {
        self.enqueue(&types::context_frame(turns, turn_complete));
    }

    /// Signals a pause in the input audio stream.
    pub fn send_audio_stream_end(&self) {
        self.enqueue(&types::audio_stream_end_frame());
    }

    /// Delivers one or more tool outcomes. Each outcome's scheduling
    /// directive is honored by the upstream, not here.
    pub fn send_tool_results(&self, outcomes: &[ToolOutcome]) {
        if outcomes.is_empty() {
            return;
        }
        self.enqueue(&types::tool_response_frame(outcomes));
    }

    /// Closes the upstream connection. Safe to call repeatedly and with
    /// the connection already gone.
    pub fn disconnect(&self) {
        let _ = self.out_tx.send(WsMessage::Close(None));
    }
}

impl Drop for LiveClient {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}
