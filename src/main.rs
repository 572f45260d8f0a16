use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use stt_server::application::services::{FileValidator, TranscriptionService};
use stt_server::infrastructure::audio::OpenAiWhisperEngine;
use stt_server::infrastructure::observability::init_tracing;
use stt_server::infrastructure::storage::LocalStagingStore;
use stt_server::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env();
    init_tracing(&settings.logging);

    let engine = Arc::new(OpenAiWhisperEngine::new(
        settings.whisper.api_key.clone(),
        settings.whisper.api_base_url.clone(),
        Some(settings.whisper.model.clone()),
    ));
    // One-time warm-up before accepting requests. A failure here leaves the
    // server up with /health reporting model_loaded=false; transcription
    // requests are rejected with ModelNotLoaded until a restart.
    if let Err(e) = engine.load().await {
        tracing::error!(error = %e, "engine warm-up failed; transcription requests will be rejected");
    }

    let staging = Arc::new(
        LocalStagingStore::new(settings.upload.staging_dir.clone())
            .context("failed to initialize staging store")?,
    );
    let validator = FileValidator::new(
        settings.upload.allowed_extensions.iter().cloned(),
        settings.upload.max_file_size,
    );
    let transcription_service = Arc::new(TranscriptionService::new(
        engine,
        staging,
        validator,
        settings.whisper.language.clone(),
        Duration::from_secs(settings.whisper.timeout_secs),
    ));

    let state = AppState {
        transcription_service,
        settings: settings.clone(),
    };
    let router = create_router(state);

    let ip: IpAddr = settings
        .server
        .host
        .parse()
        .with_context(|| format!("invalid HOST: {}", settings.server.host))?;
    let addr = SocketAddr::new(ip, settings.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
