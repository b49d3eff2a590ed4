//! WebSocket Session Management
//!
//! This module contains the endpoints for real-time sessions over
//! WebSockets. It is structured into submodules for clarity:
//!
//! - `protocol`: the JSON message format between client and relay.
//! - `relay`: the live audio/video/tool relay session and its state machine.
//! - `chat`: the simpler text-only conversational endpoint.

mod chat;
pub mod protocol;
mod relay;

pub use chat::chat_handler;
pub use relay::live_handler;
