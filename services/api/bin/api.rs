//! Main Entrypoint for the Murmur API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the tool backends and their artifact stores.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use murmur_api::{
    backends::{HttpCanvasBackend, HttpInterpreterBackend, HttpWebBackend},
    config::Config,
    router::create_router,
    state::AppState,
};
use murmur_core::{
    artifacts::ArtifactStore,
    session::{
        MediaResolution, ResponseModality, SessionConfig, ThinkingSettings, ToolSettings,
    },
    tools::{
        CreateAppTool, CurrentTimeTool, EditAppTool, EditCodeTool, FetchUrlTool, RunCodeTool,
        Tool, ToolExecutor,
    },
};
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

/// Server-side session defaults; clients override these at connect time.
fn default_session_config(config: &Config) -> SessionConfig {
    SessionConfig {
        model: config.live_model.clone(),
        system_instruction: config.system_prompt.clone(),
        response_modalities: vec![ResponseModality::Audio],
        voice: config.voice.clone(),
        temperature: 0.8,
        context_compression: true,
        session_resumption: true,
        affective_dialog: false,
        proactive_audio: false,
        thinking: ThinkingSettings::default(),
        input_transcription: true,
        output_transcription: true,
        media_resolution: MediaResolution::Medium,
        tools: ToolSettings {
            search: true,
            functions: true,
            enabled: vec![
                "get_current_time".into(),
                "create_app".into(),
                "edit_app".into(),
                "run_code".into(),
                "edit_code".into(),
                "fetch_url".into(),
            ],
            declarations: vec![],
        },
        // The artifact-producing tools answer out-of-band by default so
        // the model keeps talking while they run.
        async_tools: HashMap::from([
            ("create_app".into(), true),
            ("edit_app".into(), true),
            ("run_code".into(), true),
            ("edit_code".into(), true),
        ]),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Tool Backends and Stores ---
    let http = reqwest::Client::new();
    let canvas = Arc::new(HttpCanvasBackend::new(
        http.clone(),
        config.canvas_url.clone(),
    ));
    let interpreter = Arc::new(HttpInterpreterBackend::new(
        http.clone(),
        config.interpreter_url.clone(),
    ));
    let web = Arc::new(HttpWebBackend::new(http, config.summarizer_url.clone()));

    let app_store = ArtifactStore::new();
    let code_store = ArtifactStore::new();
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(CurrentTimeTool),
        Arc::new(CreateAppTool::new(
            canvas.clone(),
            app_store.clone(),
            config.canvas_retry_limit,
        )),
        Arc::new(EditAppTool::new(
            canvas,
            app_store,
            config.canvas_retry_limit,
        )),
        Arc::new(RunCodeTool::new(interpreter.clone(), code_store.clone())),
        Arc::new(EditCodeTool::new(interpreter, code_store)),
        Arc::new(FetchUrlTool::new(web)),
    ];
    let executor = Arc::new(ToolExecutor::new(tools));

    let app_state = Arc::new(AppState {
        session_defaults: default_session_config(&config),
        executor,
        config: Arc::new(config.clone()),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        live_model = %config.live_model,
        chat_model = %config.chat_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
