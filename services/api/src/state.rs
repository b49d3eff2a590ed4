//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources: the loaded configuration, the tool executor with
//! its injected stores, and the server-side session defaults.

use crate::config::Config;
use murmur_core::session::SessionConfig;
use murmur_core::tools::ToolExecutor;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. Relay sessions share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub executor: Arc<ToolExecutor>,
    pub session_defaults: SessionConfig,
}
