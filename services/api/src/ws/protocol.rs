//! Defines the WebSocket message protocol between the mobile client and the
//! relay. Both directions are closed sum types: unknown discriminators fail
//! to decode at the boundary and are answered with an `error` event instead
//! of being silently ignored.

use murmur_core::session::{ClientSessionOverrides, FunctionSpec, ResponseModality, SessionConfig};
use murmur_core::tools::ToolCallRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent from the client to the relay.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Starts a fresh upstream session, optionally overriding the server's
    /// session defaults.
    Connect {
        #[serde(default)]
        config: Option<ClientSessionOverrides>,
    },
    /// Ends the upstream session. The WebSocket stays open.
    Disconnect,
    /// One chunk of input audio, base64-encoded.
    Audio {
        data: String,
        #[serde(default, rename = "mimeType")]
        mime_type: Option<String>,
    },
    /// One video/image frame, base64-encoded.
    Video {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    /// A text turn. Interrupts any in-flight model speech.
    Text { text: String },
    /// Injects prior conversational turns into the session context.
    Context {
        turns: Vec<ContextTurnMessage>,
        #[serde(default, rename = "turnComplete")]
        turn_complete: bool,
    },
    /// Client-computed tool results, forwarded verbatim.
    ToolResponse { responses: Vec<ClientToolResponse> },
    /// Signals a pause in the input audio stream.
    AudioStreamEnd,
    /// Replaces the stored configuration. Takes effect on the next
    /// (re)connect.
    UpdateConfig { config: ClientSessionOverrides },
    /// Forces a reconnect, optionally with a replacement configuration.
    Reconnect {
        #[serde(default)]
        config: Option<ClientSessionOverrides>,
    },
    GetState,
    GetConfig,
    GetTools,
    Ping,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ContextTurnMessage {
    pub role: String,
    pub text: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ClientToolResponse {
    pub id: String,
    pub name: String,
    pub response: Value,
}

/// How a batch of tool results was scheduled.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultMode {
    Sync,
    Async,
}

/// One resolved tool call, as shown to the client.
#[derive(Serialize, Debug, Clone)]
pub struct ToolResultView {
    pub id: String,
    pub name: String,
    pub response: Value,
}

/// Introspection snapshot returned for `get_state`.
#[derive(Serialize, Debug, Clone)]
pub struct StateView {
    pub phase: String,
    pub connected: bool,
    pub model: Option<String>,
    pub modalities: Vec<ResponseModality>,
    #[serde(rename = "hasResumptionHandle")]
    pub has_resumption_handle: bool,
}

/// Messages sent from the relay to the client.
#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The upstream session is established and streaming.
    Connected,
    /// The upstream session ended, with the reason.
    Disconnected { reason: String },
    /// A chunk of generated audio, base64-encoded.
    Audio {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Text {
        text: String,
    },
    Thought {
        text: String,
    },
    InputTranscription {
        text: String,
    },
    OutputTranscription {
        text: String,
    },
    /// The user barged in; the client must discard buffered audio.
    Interrupted,
    TurnComplete,
    GenerationComplete,
    /// The model requested tool invocations; informational, results follow.
    ToolCall {
        calls: Vec<ToolCallRequest>,
    },
    ToolResults {
        results: Vec<ToolResultView>,
        mode: ResultMode,
    },
    CanvasProgress {
        tool_call_id: String,
        status: String,
        message: String,
    },
    InterpreterProgress {
        tool_call_id: String,
        status: String,
        message: String,
    },
    WebProgress {
        tool_call_id: String,
        status: String,
        message: String,
    },
    /// The upstream will close the connection shortly; the relay is
    /// already arranging a transparent reconnect.
    GoAway {
        #[serde(rename = "timeLeft")]
        time_left: Option<String>,
    },
    SessionResumptionUpdate {
        resumable: bool,
        #[serde(rename = "hasHandle")]
        has_handle: bool,
    },
    Usage {
        prompt_tokens: Option<u64>,
        response_tokens: Option<u64>,
        total_tokens: Option<u64>,
    },
    State {
        state: StateView,
    },
    ConfigOptions {
        #[serde(skip_serializing_if = "Option::is_none")]
        config: Option<SessionConfig>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tools: Option<Vec<FunctionSpec>>,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        message: String,
    },
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_messages_decode_by_discriminator() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "audio", "data": "AAEC", "mimeType": "audio/pcm"}"#)
                .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Audio { ref data, ref mime_type }
                if data == "AAEC" && mime_type.as_deref() == Some("audio/pcm")
        ));

        let msg: ClientMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));

        let msg: ClientMessage = serde_json::from_str(
            r#"{"type": "connect", "config": {"voice": "Kore", "responseModalities": ["TEXT"]}}"#,
        )
        .unwrap();
        let ClientMessage::Connect {
            config: Some(overrides),
        } = msg
        else {
            panic!("expected connect with config");
        };
        assert_eq!(overrides.voice.as_deref(), Some("Kore"));
    }

    #[test]
    fn unknown_discriminator_is_a_decode_error() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type": "self_destruct"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn context_defaults_turn_complete_to_false() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type": "context", "turns": [{"role": "user", "text": "earlier"}]}"#,
        )
        .unwrap();
        let ClientMessage::Context {
            turns,
            turn_complete,
        } = msg
        else {
            panic!("expected context");
        };
        assert_eq!(turns.len(), 1);
        assert!(!turn_complete);
    }

    #[test]
    fn server_messages_serialize_with_snake_case_tags() {
        let value = serde_json::to_value(ServerMessage::GoAway {
            time_left: Some("30s".into()),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "go_away", "timeLeft": "30s"}));

        let value = serde_json::to_value(ServerMessage::SessionResumptionUpdate {
            resumable: true,
            has_handle: true,
        })
        .unwrap();
        assert_eq!(
            value,
            json!({"type": "session_resumption_update", "resumable": true, "hasHandle": true})
        );

        let value = serde_json::to_value(ServerMessage::ToolResults {
            results: vec![ToolResultView {
                id: "c1".into(),
                name: "get_current_time".into(),
                response: json!({"success": true}),
            }],
            mode: ResultMode::Async,
        })
        .unwrap();
        assert_eq!(value["type"], json!("tool_results"));
        assert_eq!(value["mode"], json!("async"));
    }

    #[test]
    fn error_omits_kind_when_absent() {
        let value = serde_json::to_value(ServerMessage::Error {
            kind: None,
            message: "boom".into(),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "error", "message": "boom"}));
    }

    #[test]
    fn progress_events_carry_the_call_id() {
        let value = serde_json::to_value(ServerMessage::CanvasProgress {
            tool_call_id: "call-4".into(),
            status: "generating".into(),
            message: "attempt 1 of 3".into(),
        })
        .unwrap();
        assert_eq!(value["type"], json!("canvas_progress"));
        assert_eq!(value["tool_call_id"], json!("call-4"));
    }
}
