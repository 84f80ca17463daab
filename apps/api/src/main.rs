mod config;
mod crm;
mod dashboard;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod records;
mod routes;
mod search;
mod state;
mod transcription;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::records::store::{FixtureRecordStore, PgRecordStore, RecordStore};
use crate::routes::build_router;
use crate::state::AppState;
use crate::transcription::{GoogleSpeechTranscriber, ProxyTranscriber, Transcriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Nova API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = match &config.google_api_key {
        Some(key) => {
            let llm = LlmClient::new(
                key.clone(),
                config.gemini_model.clone(),
                config.gemini_api_base.clone(),
            )?;
            info!("LLM client initialized (model: {})", llm.model());
            Some(llm)
        }
        None => {
            warn!("GOOGLE_API_KEY not set; extraction and AI search are disabled");
            None
        }
    };

    let transcriber = build_transcriber(&config)?;
    let records = build_record_store(&config).await?;

    let state = AppState {
        llm,
        transcriber,
        records,
        config: config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_allowed_origin
                .parse::<HeaderValue>()
                .context("CORS_ALLOWED_ORIGIN must be a valid header value")?,
        )
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// The transcription proxy wins over Google Speech when both are configured.
fn build_transcriber(config: &Config) -> Result<Option<Arc<dyn Transcriber>>> {
    if let Some(url) = &config.transcribe_proxy_url {
        info!("Transcription via proxy at {url}");
        return Ok(Some(Arc::new(ProxyTranscriber::new(url.clone())?)));
    }
    if let Some(key) = &config.google_api_key {
        info!("Transcription via Google Speech-to-Text");
        return Ok(Some(Arc::new(GoogleSpeechTranscriber::new(
            key.clone(),
            config.speech_api_base.clone(),
        )?)));
    }
    warn!("No transcription backend configured; voice endpoints are disabled");
    Ok(None)
}

async fn build_record_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    match &config.database_url {
        Some(url) if !config.demo_data => {
            let pool = create_pool(url).await?;
            info!("Records served from PostgreSQL");
            Ok(Arc::new(PgRecordStore::new(pool)))
        }
        _ => {
            info!("Records served from demo fixtures");
            Ok(Arc::new(FixtureRecordStore::demo()))
        }
    }
}
