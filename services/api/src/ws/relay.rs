//! The per-connection relay session.
//!
//! One client WebSocket is bound to at most one upstream live session. The
//! session task multiplexes four sources in a single `tokio::select!` loop:
//! the client socket, the upstream event channel, an internal command
//! channel fed by tool tasks and reconnect timers, and the tool progress
//! channel. Everything that mutates session state happens on this one task;
//! spawned work only ever reports back through the channels.

use super::protocol::{
    ClientMessage, ContextTurnMessage, ResultMode, ServerMessage, StateView, ToolResultView,
};
use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use gemini_live::{ContextTurn, LiveClient, LiveEvent};
use murmur_core::session::SessionConfig;
use murmur_core::tools::{
    Scheduling, ToolCallRequest, ToolExecutor, ToolFamily, ToolOutcome, ToolProgress,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

/// Grace period between a go-away warning (or an unexpected drop) and the
/// reconnect attempt, giving the upstream time to actually begin closing.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

const DEFAULT_AUDIO_MIME: &str = "audio/pcm;rate=16000";

/// Lifecycle of one relay session. `Reconnecting` doubles as the
/// reentrancy guard: while the session is in it, upstream close events are
/// expected churn and no second reconnect may be scheduled. Every code
/// path that enters `Reconnecting` must leave it when the attempt
/// resolves, success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Connecting,
    Active,
    Reconnecting,
    Error,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Connecting => "connecting",
            SessionPhase::Active => "active",
            SessionPhase::Reconnecting => "reconnecting",
            SessionPhase::Error => "error",
        }
    }
}

/// Work reported back to the session task by things it spawned.
#[derive(Debug)]
enum RelayCommand {
    /// A sync long-running tool resolved; flush its single result.
    SyncResult(ToolOutcome),
    /// The whole async group resolved; flush the batch.
    AsyncResults(Vec<ToolOutcome>),
    /// A scheduled reconnect timer fired.
    Reconnect,
}

/// A tool-call batch split by execution discipline.
#[derive(Debug, Default, PartialEq)]
struct BatchPlan {
    /// Sync + instant: executed inline, flushed as one batch.
    instant: Vec<ToolCallRequest>,
    /// Sync + long-running: spawned individually, each result flushed on
    /// its own completion.
    long_running: Vec<ToolCallRequest>,
    /// Async: dispatched concurrently, awaited as a group, every result
    /// interrupt-scheduled.
    async_group: Vec<ToolCallRequest>,
}

/// Partitions a batch. Every call lands in exactly one group; names the
/// executor does not know count as instant so their failure result is
/// produced without a spawn.
fn partition_batch(
    calls: Vec<ToolCallRequest>,
    cfg: &SessionConfig,
    executor: &ToolExecutor,
) -> BatchPlan {
    let mut plan = BatchPlan::default();
    for call in calls {
        if cfg.tool_is_async(&call.name) {
            plan.async_group.push(call);
        } else if executor.is_long_running(&call.name) {
            plan.long_running.push(call);
        } else {
            plan.instant.push(call);
        }
    }
    plan
}

/// Arms the reconnect timer. The timer only posts a command; whether the
/// reconnect actually happens is decided by the session task when the
/// command is processed, so a session that moved on in the meantime simply
/// ignores it.
fn schedule_reconnect(cmd_tx: mpsc::Sender<RelayCommand>) {
    tokio::spawn(async move {
        tokio::time::sleep(RECONNECT_DELAY).await;
        let _ = cmd_tx.send(RelayCommand::Reconnect).await;
    });
}

fn result_views(outcomes: &[ToolOutcome]) -> Vec<ToolResultView> {
    outcomes
        .iter()
        .map(|o| ToolResultView {
            id: o.id.clone(),
            name: o.name.clone(),
            response: o.response.clone(),
        })
        .collect()
}

/// Axum handler to upgrade an HTTP connection to a live relay session.
pub async fn live_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

#[instrument(name = "live_session", skip_all, fields(session_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    tracing::Span::current().record("session_id", session_id.to_string());
    info!("New live relay connection");

    let (socket_tx, socket_rx) = socket.split();
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (progress_tx, progress_rx) = mpsc::channel(64);
    let (live_tx, live_rx) = mpsc::channel(256);

    let session = RelaySession {
        state,
        socket_tx,
        phase: SessionPhase::Idle,
        live: None,
        live_gen: 0,
        config: None,
        resume_handle: None,
        cmd_tx,
        progress_tx,
        live_tx,
    };
    if let Err(e) = session.run(socket_rx, live_rx, cmd_rx, progress_rx).await {
        warn!(error = ?e, "Relay session ended with error");
    }
    info!("Live relay session finished");
}

struct RelaySession {
    state: Arc<AppState>,
    socket_tx: SplitSink<WebSocket, Message>,
    phase: SessionPhase,
    live: Option<LiveClient>,
    /// Generation counter for upstream events. Events tagged with an older
    /// generation belong to a torn-down connection and are discarded,
    /// which is what keeps a replaced session's dying gasps from being
    /// mistaken for news about the current one.
    live_gen: u64,
    config: Option<SessionConfig>,
    resume_handle: Option<String>,
    cmd_tx: mpsc::Sender<RelayCommand>,
    progress_tx: mpsc::Sender<ToolProgress>,
    live_tx: mpsc::Sender<(u64, LiveEvent)>,
}

impl RelaySession {
    async fn run(
        mut self,
        mut socket_rx: SplitStream<WebSocket>,
        mut live_rx: mpsc::Receiver<(u64, LiveEvent)>,
        mut cmd_rx: mpsc::Receiver<RelayCommand>,
        mut progress_rx: mpsc::Receiver<ToolProgress>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                maybe_msg = socket_rx.next() => {
                    match maybe_msg {
                        Some(Ok(Message::Text(text))) => self.handle_client_text(&text).await?,
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Client closed the connection");
                            break;
                        }
                        Some(Ok(_)) => {} // binary/ping/pong carry nothing here
                        Some(Err(e)) => {
                            warn!(error = %e, "Error receiving from client WebSocket");
                            break;
                        }
                    }
                },
                Some((generation, event)) = live_rx.recv() => {
                    self.handle_live_event(generation, event).await?;
                },
                Some(cmd) = cmd_rx.recv() => {
                    self.handle_command(cmd).await?;
                },
                Some(progress) = progress_rx.recv() => {
                    self.handle_progress(progress).await?;
                },
            }
        }

        // Dropping the live client aborts its I/O tasks. In-flight tool
        // tasks are left to finish; their results land in a closed channel
        // and are dropped, while artifact side effects persist.
        self.live.take();
        Ok(())
    }

    async fn send(&mut self, msg: ServerMessage) -> Result<()> {
        let serialized = serde_json::to_string(&msg)?;
        self.socket_tx.send(Message::Text(serialized.into())).await?;
        Ok(())
    }

    // --- Client messages ---

    async fn handle_client_text(&mut self, text: &str) -> Result<()> {
        let msg = match serde_json::from_str::<ClientMessage>(text) {
            Ok(msg) => msg,
            Err(e) => {
                debug!(error = %e, "Unparseable client message");
                return self
                    .send(ServerMessage::Error {
                        kind: Some("bad_request".into()),
                        message: format!("unrecognized message: {e}"),
                    })
                    .await;
            }
        };

        match msg {
            ClientMessage::Connect { config } => self.start_session(config).await,
            ClientMessage::Disconnect => {
                // The generation bump suppresses the adapter's own close
                // echo; the client gets exactly one disconnected event.
                self.teardown_live();
                self.phase = SessionPhase::Idle;
                self.resume_handle = None;
                self.send(ServerMessage::Disconnected {
                    reason: "client requested".into(),
                })
                .await
            }
            ClientMessage::Audio { data, mime_type } => {
                if let Some(live) = &self.live {
                    match BASE64.decode(&data) {
                        Ok(bytes) => live
                            .send_audio(&bytes, mime_type.as_deref().unwrap_or(DEFAULT_AUDIO_MIME)),
                        Err(e) => trace!(error = %e, "Dropping undecodable audio chunk"),
                    }
                }
                Ok(())
            }
            ClientMessage::Video { data, mime_type } => {
                if let Some(live) = &self.live {
                    match BASE64.decode(&data) {
                        Ok(bytes) => live.send_video(&bytes, &mime_type),
                        Err(e) => trace!(error = %e, "Dropping undecodable video frame"),
                    }
                }
                Ok(())
            }
            ClientMessage::Text { text } => match &self.live {
                Some(live) => {
                    live.send_text(&text);
                    Ok(())
                }
                None => self.no_session_error().await,
            },
            ClientMessage::Context {
                turns,
                turn_complete,
            } => match &self.live {
                Some(live) => {
                    let turns: Vec<ContextTurn> = turns
                        .into_iter()
                        .map(|t: ContextTurnMessage| ContextTurn {
                            role: t.role,
                            text: t.text,
                        })
                        .collect();
                    live.send_context(&turns, turn_complete);
                    Ok(())
                }
                None => self.no_session_error().await,
            },
            ClientMessage::ToolResponse { responses } => match &self.live {
                Some(live) => {
                    let outcomes: Vec<ToolOutcome> = responses
                        .into_iter()
                        .map(|r| ToolOutcome {
                            id: r.id,
                            name: r.name,
                            response: r.response,
                            scheduling: Scheduling::Default,
                        })
                        .collect();
                    live.send_tool_results(&outcomes);
                    Ok(())
                }
                None => self.no_session_error().await,
            },
            ClientMessage::AudioStreamEnd => {
                if let Some(live) = &self.live {
                    live.send_audio_stream_end();
                }
                Ok(())
            }
            ClientMessage::UpdateConfig { config } => {
                let mut cfg = SessionConfig::merged(&self.state.session_defaults, config);
                self.resolve_declarations(&mut cfg);
                self.config = Some(cfg);
                let view = self.state_view();
                self.send(ServerMessage::State { state: view }).await
            }
            ClientMessage::Reconnect { config } => {
                if let Some(overrides) = config {
                    let mut cfg = SessionConfig::merged(&self.state.session_defaults, overrides);
                    self.resolve_declarations(&mut cfg);
                    self.config = Some(cfg);
                }
                if self.config.is_none() {
                    return self
                        .send(ServerMessage::Error {
                            kind: Some("bad_request".into()),
                            message: "no session configuration; send connect first".into(),
                        })
                        .await;
                }
                self.teardown_live();
                self.connect_live(true).await
            }
            ClientMessage::GetState => {
                let view = self.state_view();
                self.send(ServerMessage::State { state: view }).await
            }
            ClientMessage::GetConfig => {
                let config = self
                    .config
                    .clone()
                    .unwrap_or_else(|| self.state.session_defaults.clone());
                self.send(ServerMessage::ConfigOptions {
                    config: Some(config),
                    tools: None,
                })
                .await
            }
            ClientMessage::GetTools => {
                let enabled = self
                    .config
                    .as_ref()
                    .unwrap_or(&self.state.session_defaults)
                    .tools
                    .enabled
                    .clone();
                let tools = self.state.executor.declarations(&enabled);
                self.send(ServerMessage::ConfigOptions {
                    config: None,
                    tools: Some(tools),
                })
                .await
            }
            ClientMessage::Ping => self.send(ServerMessage::Pong).await,
        }
    }

    async fn no_session_error(&mut self) -> Result<()> {
        self.send(ServerMessage::Error {
            kind: Some("bad_request".into()),
            message: "no active session; send connect first".into(),
        })
        .await
    }

    fn state_view(&self) -> StateView {
        StateView {
            phase: self.phase.as_str().to_string(),
            connected: self.live.is_some(),
            model: self.config.as_ref().map(|c| c.model.clone()),
            modalities: self
                .config
                .as_ref()
                .map(|c| c.response_modalities.clone())
                .unwrap_or_default(),
            has_resumption_handle: self.resume_handle.is_some(),
        }
    }

    fn resolve_declarations(&self, cfg: &mut SessionConfig) {
        cfg.tools.declarations = if cfg.tools.functions {
            self.state.executor.declarations(&cfg.tools.enabled)
        } else {
            Vec::new()
        };
    }

    /// Drops the current upstream client, if any, and invalidates its
    /// event stream. Safe to call with no client.
    fn teardown_live(&mut self) {
        if let Some(live) = self.live.take() {
            live.disconnect();
        }
        self.live_gen += 1;
    }

    async fn start_session(
        &mut self,
        overrides: Option<murmur_core::session::ClientSessionOverrides>,
    ) -> Result<()> {
        // A second connect is a fresh session: the old adapter goes first.
        self.teardown_live();
        self.resume_handle = None;
        let mut cfg =
            SessionConfig::merged(&self.state.session_defaults, overrides.unwrap_or_default());
        self.resolve_declarations(&mut cfg);
        self.config = Some(cfg);
        self.connect_live(false).await
    }

    async fn connect_live(&mut self, reconnecting: bool) -> Result<()> {
        let Some(cfg) = self.config.clone() else {
            return self
                .send(ServerMessage::Error {
                    kind: Some("bad_request".into()),
                    message: "no session configuration".into(),
                })
                .await;
        };

        self.phase = SessionPhase::Connecting;
        let (raw_tx, mut raw_rx) = mpsc::channel(256);
        match LiveClient::connect(
            &self.state.config.gemini_api_key,
            &cfg,
            self.resume_handle.as_deref(),
            raw_tx,
        )
        .await
        {
            Ok(client) => {
                self.live_gen += 1;
                let generation = self.live_gen;
                let live_tx = self.live_tx.clone();
                tokio::spawn(async move {
                    while let Some(event) = raw_rx.recv().await {
                        if live_tx.send((generation, event)).await.is_err() {
                            break;
                        }
                    }
                });
                self.live = Some(client);
                self.phase = SessionPhase::Active;
                self.send(ServerMessage::Connected).await
            }
            Err(e) => {
                warn!(error = %e, reconnecting, "Upstream connect failed");
                // A failed first connect leaves a clean slate; a failed
                // reconnect means an established session was lost for good.
                // Either way the client recovers by sending connect again.
                self.phase = if reconnecting {
                    SessionPhase::Error
                } else {
                    SessionPhase::Idle
                };
                let kind = if reconnecting {
                    "reconnect_failed"
                } else {
                    "connection_failed"
                };
                self.send(ServerMessage::Error {
                    kind: Some(kind.into()),
                    message: e.to_string(),
                })
                .await
            }
        }
    }

    // --- Upstream events ---

    async fn handle_live_event(&mut self, generation: u64, event: LiveEvent) -> Result<()> {
        if generation != self.live_gen {
            trace!(generation, current = self.live_gen, "Discarding stale upstream event");
            return Ok(());
        }

        match event {
            LiveEvent::Closed { reason } => self.handle_upstream_closed(reason).await,
            LiveEvent::Audio { data, mime } => {
                self.send(ServerMessage::Audio {
                    data: BASE64.encode(data),
                    mime_type: mime,
                })
                .await
            }
            LiveEvent::Text { text } => self.send(ServerMessage::Text { text }).await,
            LiveEvent::Thought { text } => self.send(ServerMessage::Thought { text }).await,
            LiveEvent::InputTranscript { text } => {
                self.send(ServerMessage::InputTranscription { text }).await
            }
            LiveEvent::OutputTranscript { text } => {
                self.send(ServerMessage::OutputTranscription { text }).await
            }
            LiveEvent::Interrupted => self.send(ServerMessage::Interrupted).await,
            LiveEvent::TurnComplete => self.send(ServerMessage::TurnComplete).await,
            LiveEvent::GenerationComplete => self.send(ServerMessage::GenerationComplete).await,
            LiveEvent::ToolCall { calls } => self.handle_tool_call(calls).await,
            LiveEvent::GoAway { time_left } => self.handle_go_away(time_left).await,
            LiveEvent::ResumptionUpdate { handle, resumable } => {
                if handle.is_some() {
                    self.resume_handle = handle;
                }
                let has_handle = self.resume_handle.is_some();
                self.send(ServerMessage::SessionResumptionUpdate {
                    resumable,
                    has_handle,
                })
                .await
            }
            LiveEvent::Usage {
                prompt_tokens,
                response_tokens,
                total_tokens,
            } => {
                self.send(ServerMessage::Usage {
                    prompt_tokens,
                    response_tokens,
                    total_tokens,
                })
                .await
            }
            LiveEvent::Error { kind, message } => {
                self.send(ServerMessage::Error {
                    kind: Some(kind),
                    message,
                })
                .await
            }
        }
    }

    /// The upstream closed on us without a client request. During a
    /// planned reconnect this is expected churn and must not reach the
    /// client; otherwise it is forwarded, and if the session is resumable
    /// exactly one delayed reconnect is attempted.
    async fn handle_upstream_closed(&mut self, reason: String) -> Result<()> {
        if self.phase == SessionPhase::Reconnecting {
            debug!(%reason, "Suppressing upstream close during reconnect");
            return Ok(());
        }

        info!(%reason, "Upstream closed unexpectedly");
        self.teardown_live();
        self.send(ServerMessage::Disconnected { reason }).await?;

        let resumable = self.resume_handle.is_some()
            && self.config.as_ref().is_some_and(|c| c.session_resumption);
        if resumable {
            self.phase = SessionPhase::Reconnecting;
            schedule_reconnect(self.cmd_tx.clone());
        } else {
            self.phase = SessionPhase::Idle;
        }
        Ok(())
    }

    async fn handle_go_away(&mut self, time_left: Option<String>) -> Result<()> {
        info!(?time_left, "Upstream announced it is going away");
        self.send(ServerMessage::GoAway {
            time_left: time_left.clone(),
        })
        .await?;

        if self.phase != SessionPhase::Reconnecting {
            self.phase = SessionPhase::Reconnecting;
            schedule_reconnect(self.cmd_tx.clone());
        }
        Ok(())
    }

    // --- Internal commands ---

    async fn handle_command(&mut self, cmd: RelayCommand) -> Result<()> {
        match cmd {
            RelayCommand::Reconnect => {
                if self.phase != SessionPhase::Reconnecting {
                    debug!("Scheduled reconnect aborted; session moved on");
                    return Ok(());
                }
                // On the go-away path the old connection is still up until
                // here; replace it outright.
                self.teardown_live();
                self.connect_live(true).await
            }
            RelayCommand::SyncResult(outcome) => {
                self.flush_results(vec![outcome], ResultMode::Sync).await
            }
            RelayCommand::AsyncResults(outcomes) => {
                self.flush_results(outcomes, ResultMode::Async).await
            }
        }
    }

    async fn flush_results(&mut self, outcomes: Vec<ToolOutcome>, mode: ResultMode) -> Result<()> {
        if outcomes.is_empty() {
            return Ok(());
        }
        match &self.live {
            Some(live) => live.send_tool_results(&outcomes),
            None => debug!("Tool results resolved after session ended; upstream delivery skipped"),
        }
        let results = result_views(&outcomes);
        self.send(ServerMessage::ToolResults { results, mode }).await
    }

    // --- Tool execution ---

    async fn handle_tool_call(&mut self, calls: Vec<ToolCallRequest>) -> Result<()> {
        info!(count = calls.len(), "Model requested tool calls");
        self.send(ServerMessage::ToolCall {
            calls: calls.clone(),
        })
        .await?;

        let Some(cfg) = self.config.as_ref() else {
            // A tool call with no configuration means the session raced
            // teardown; nothing sensible to execute against.
            return Ok(());
        };
        let plan = partition_batch(calls, cfg, &self.state.executor);

        // Sync instant subgroup: resolved inline, one batch, default
        // scheduling.
        if !plan.instant.is_empty() {
            let mut outcomes = Vec::with_capacity(plan.instant.len());
            for call in &plan.instant {
                let response = self
                    .state
                    .executor
                    .execute(call, self.progress_tx.clone())
                    .await;
                outcomes.push(ToolOutcome {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    response,
                    scheduling: Scheduling::Default,
                });
            }
            self.flush_results(outcomes, ResultMode::Sync).await?;
        }

        // Sync long-running subgroup: each call is its own await chain;
        // they block neither each other nor this loop.
        for call in plan.long_running {
            let executor = self.state.executor.clone();
            let progress = self.progress_tx.clone();
            let cmd_tx = self.cmd_tx.clone();
            tokio::spawn(async move {
                let response = executor.execute(&call, progress).await;
                let _ = cmd_tx
                    .send(RelayCommand::SyncResult(ToolOutcome {
                        id: call.id,
                        name: call.name,
                        response,
                        scheduling: Scheduling::Default,
                    }))
                    .await;
            });
        }

        // Async group: dispatched concurrently, awaited together, every
        // result tagged to interrupt whatever the model is saying when it
        // lands.
        if !plan.async_group.is_empty() {
            let executor = self.state.executor.clone();
            let progress = self.progress_tx.clone();
            let cmd_tx = self.cmd_tx.clone();
            tokio::spawn(async move {
                let outcomes = futures_util::future::join_all(plan.async_group.into_iter().map(
                    |call| {
                        let executor = executor.clone();
                        let progress = progress.clone();
                        async move {
                            let response = executor.execute(&call, progress).await;
                            ToolOutcome {
                                id: call.id,
                                name: call.name,
                                response,
                                scheduling: Scheduling::Interrupt,
                            }
                        }
                    },
                ))
                .await;
                let _ = cmd_tx.send(RelayCommand::AsyncResults(outcomes)).await;
            });
        }

        Ok(())
    }

    async fn handle_progress(&mut self, progress: ToolProgress) -> Result<()> {
        let msg = match progress.family {
            ToolFamily::Canvas => ServerMessage::CanvasProgress {
                tool_call_id: progress.call_id,
                status: progress.status,
                message: progress.message,
            },
            ToolFamily::Interpreter => ServerMessage::InterpreterProgress {
                tool_call_id: progress.call_id,
                status: progress.status,
                message: progress.message,
            },
            ToolFamily::Web => ServerMessage::WebProgress {
                tool_call_id: progress.call_id,
                status: progress.status,
                message: progress.message,
            },
        };
        self.send(msg).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use murmur_core::session::{
        ClientSessionOverrides, MediaResolution, ResponseModality, ThinkingSettings, ToolSettings,
    };
    use murmur_core::tools::{Tool, ToolContext};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    struct StubTool {
        name: &'static str,
        long_running: bool,
    }

    #[async_trait]
    impl Tool for StubTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "stub"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        fn long_running(&self) -> bool {
            self.long_running
        }
        async fn run(&self, _args: Value, _ctx: &ToolContext) -> anyhow::Result<Value> {
            Ok(json!({"success": true}))
        }
    }

    fn executor() -> ToolExecutor {
        ToolExecutor::new(vec![
            Arc::new(StubTool {
                name: "get_current_time",
                long_running: false,
            }),
            Arc::new(StubTool {
                name: "run_code",
                long_running: true,
            }),
            Arc::new(StubTool {
                name: "create_app",
                long_running: true,
            }),
        ])
    }

    fn config(async_tools: &[&str]) -> SessionConfig {
        let defaults = SessionConfig {
            model: "models/test".into(),
            system_instruction: String::new(),
            response_modalities: vec![ResponseModality::Audio],
            voice: "Puck".into(),
            temperature: 0.8,
            context_compression: false,
            session_resumption: true,
            affective_dialog: false,
            proactive_audio: false,
            thinking: ThinkingSettings::default(),
            input_transcription: false,
            output_transcription: false,
            media_resolution: MediaResolution::Medium,
            tools: ToolSettings::default(),
            async_tools: async_tools.iter().map(|n| (n.to_string(), true)).collect(),
        };
        SessionConfig::merged(&defaults, ClientSessionOverrides::default())
    }

    fn call(id: &str, name: &str) -> ToolCallRequest {
        ToolCallRequest {
            id: id.into(),
            name: name.into(),
            args: json!({}),
        }
    }

    #[test]
    fn batch_partition_covers_every_call_exactly_once() {
        let calls = vec![
            call("c1", "get_current_time"),
            call("c2", "run_code"),
            call("c3", "create_app"),
            call("c4", "unheard_of"),
        ];
        let plan = partition_batch(calls, &config(&["run_code"]), &executor());

        let mut ids: Vec<&str> = plan
            .instant
            .iter()
            .chain(&plan.long_running)
            .chain(&plan.async_group)
            .map(|c| c.id.as_str())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["c1", "c2", "c3", "c4"]);
    }

    #[test]
    fn sync_batch_splits_instant_from_long_running() {
        let calls = vec![
            call("c1", "get_current_time"),
            call("c2", "run_code"),
            call("c3", "create_app"),
        ];
        let plan = partition_batch(calls, &config(&[]), &executor());

        assert_eq!(plan.instant, vec![call("c1", "get_current_time")]);
        assert_eq!(
            plan.long_running,
            vec![call("c2", "run_code"), call("c3", "create_app")]
        );
        assert!(plan.async_group.is_empty());
    }

    #[test]
    fn async_map_overrides_long_running_classification() {
        // Scenario: one sync instant call, one async long-running call.
        let calls = vec![call("c1", "get_current_time"), call("c2", "run_code")];
        let plan = partition_batch(calls, &config(&["run_code"]), &executor());

        assert_eq!(plan.instant, vec![call("c1", "get_current_time")]);
        assert!(plan.long_running.is_empty());
        assert_eq!(plan.async_group, vec![call("c2", "run_code")]);
    }

    #[test]
    fn unknown_names_count_as_instant_so_failures_flush_immediately() {
        let plan = partition_batch(vec![call("c9", "nope")], &config(&[]), &executor());
        assert_eq!(plan.instant.len(), 1);
        assert!(plan.long_running.is_empty());
        assert!(plan.async_group.is_empty());
    }

    #[test]
    fn async_instant_tools_still_go_to_the_async_group() {
        // The async/sync split is decided by the map alone; instant vs
        // long-running only matters inside the sync group.
        let plan = partition_batch(
            vec![call("c1", "get_current_time")],
            &config(&["get_current_time"]),
            &executor(),
        );
        assert_eq!(plan.async_group.len(), 1);
        assert!(plan.instant.is_empty());
    }

    #[test]
    fn phase_names_are_stable_for_state_reporting() {
        assert_eq!(SessionPhase::Idle.as_str(), "idle");
        assert_eq!(SessionPhase::Reconnecting.as_str(), "reconnecting");
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_reconnect_fires_after_the_grace_period() {
        let (tx, mut rx) = mpsc::channel(1);
        schedule_reconnect(tx);

        tokio::time::advance(Duration::from_millis(1900)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());

        tokio::time::advance(Duration::from_millis(200)).await;
        let cmd = rx.recv().await.expect("timer posts a command");
        assert!(matches!(cmd, RelayCommand::Reconnect));
    }
}
