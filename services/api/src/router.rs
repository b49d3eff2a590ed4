//! Axum Router Configuration
//!
//! One listener, two upgrade endpoints: the live relay and the text chat.
//! Anything else 404s before an upgrade is attempted.

use crate::{
    state::AppState,
    ws::{chat_handler, live_handler},
};

use axum::{Router, routing::get};
use std::sync::Arc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws/live", get(live_handler))
        .route("/ws/chat", get(chat_handler))
        .with_state(app_state)
}
