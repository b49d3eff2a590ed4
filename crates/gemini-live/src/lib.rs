//! Typed client for the Gemini `BidiGenerateContent` live WebSocket API.
//!
//! The relay never touches the wire protocol directly: it drives a
//! [`LiveClient`] through typed send operations and consumes a single
//! stream of [`LiveEvent`]s. One `LiveClient` is one upstream connection;
//! reconnecting means dropping the old client and connecting a new one,
//! passing the stored resumption handle back in.

pub mod client;
pub mod types;

pub use client::{LiveClient, LiveConnectError};

use murmur_core::tools::ToolCallRequest;

/// Everything the upstream can tell us, as one closed union. Events arrive
/// on the channel in the order the upstream emitted them.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// The upstream closed the connection. Carries the close reason when
    /// one was provided.
    Closed { reason: String },
    /// A chunk of generated audio.
    Audio { data: Vec<u8>, mime: String },
    /// A chunk of generated text.
    Text { text: String },
    /// A chunk of thought summary. Only emitted when the session was
    /// configured with `include_thoughts`; otherwise filtered at the
    /// reader, before the relay ever sees it.
    Thought { text: String },
    /// Transcription of the user's input audio.
    InputTranscript { text: String },
    /// Transcription of the model's output audio.
    OutputTranscript { text: String },
    /// The user barged in; buffered output audio must be discarded.
    Interrupted,
    TurnComplete,
    GenerationComplete,
    /// The model requests one or more tool invocations.
    ToolCall { calls: Vec<ToolCallRequest> },
    /// The connection will be administratively closed shortly.
    GoAway { time_left: Option<String> },
    /// A new resumption handle was issued for this session.
    ResumptionUpdate {
        handle: Option<String>,
        resumable: bool,
    },
    Usage {
        prompt_tokens: Option<u64>,
        response_tokens: Option<u64>,
        total_tokens: Option<u64>,
    },
    /// A malformed or unprocessable frame. The connection may still be
    /// usable; the reader keeps going.
    Error { kind: String, message: String },
}

/// One prior conversational turn injected as context.
#[derive(Debug, Clone)]
pub struct ContextTurn {
    pub role: String,
    pub text: String,
}
