//! Murmur API Library Crate
//!
//! This library contains all the logic for the Murmur relay service: the
//! application state, configuration, tool backends, WebSocket endpoints
//! and routing. The `api` binary is a thin wrapper around this library.

pub mod backends;
pub mod config;
pub mod router;
pub mod state;
pub mod ws;
