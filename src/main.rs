use agentdesk::adapters::{
    AcsChatTransport, AcsEventPublisher, HttpWorkItemStore, ReqwestHttpClient,
};
use agentdesk::agent::{AgentApiClient, AgentSession};
use agentdesk::config::{DeskConfig, ENV_TEAMS_USER_ID};
use agentdesk::registry::RegistryViews;
use agentdesk::service::ThreadsService;
use agentdesk::traits::HttpClient;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One line of the signalling bridge on stdin.
#[derive(Debug, Deserialize)]
struct SignallingLine {
    kind: String,
    payload: serde_json::Value,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agentdesk=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Feed ACS signalling events, one JSON object per line, into the transport.
async fn run_signalling_bridge(publisher: AcsEventPublisher) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => {
                let parsed: SignallingLine = match serde_json::from_str(&line) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        tracing::warn!("Skipping malformed signalling line: {}", e);
                        continue;
                    }
                };
                if let Err(e) =
                    publisher.publish_signalling(&parsed.kind, &parsed.payload.to_string())
                {
                    tracing::warn!("Skipping {} event: {}", parsed.kind, e);
                }
            }
            Ok(None) => {
                tracing::debug!("Signalling bridge closed");
                break;
            }
            Err(e) => {
                tracing::error!("Signalling bridge failed: {}", e);
                break;
            }
        }
    }
}

/// Log projection changes so a headless desk shows what a UI would render.
async fn log_views(mut views: RegistryViews) {
    loop {
        tokio::select! {
            changed = views.threads.changed() => {
                if changed.is_err() { break; }
                let threads = views.threads.borrow_and_update().clone();
                let active = threads.iter().filter(|t| t.is_active()).count();
                tracing::info!("{} threads ({} active, {} resolved)", threads.len(), active, threads.len() - active);
            }
            changed = views.selected_thread_id.changed() => {
                if changed.is_err() { break; }
                let selected = views.selected_thread_id.borrow_and_update().clone();
                tracing::info!("Selected thread: {}", selected.as_deref().unwrap_or("none"));
            }
            changed = views.resolved_thread_id.changed() => {
                if changed.is_err() { break; }
                if let Some(id) = views.resolved_thread_id.borrow_and_update().clone() {
                    tracing::info!("Thread {} was resolved", id);
                }
            }
        }
    }
}

async fn run(config: DeskConfig) -> Result<()> {
    let teams_user_id = config
        .teams_user_id
        .clone()
        .ok_or_else(|| eyre!("{} is not set", ENV_TEAMS_USER_ID))?;

    let http: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::with_timeout(config.request_timeout)?);

    let api = AgentApiClient::new(Arc::clone(&http), config.api_base_url.clone());
    let session = AgentSession::bootstrap(&api, &teams_user_id).await?;
    tracing::info!(
        "Signed in as {}",
        session.display_name.as_deref().unwrap_or(&session.user_id)
    );

    let transport = AcsChatTransport::new(
        Arc::clone(&http),
        session.endpoint_url.clone(),
        session.token.clone(),
    )
    .with_page_size(config.max_threads_per_page);
    let publisher = transport.publisher();
    let store = HttpWorkItemStore::new(http, config.work_items_base_url());

    let service = ThreadsService::new(Arc::new(transport), Arc::new(store), config);
    tokio::spawn(log_views(service.views()));

    // A failed first fetch is retried by the auto refresh
    if let Err(e) = service.initialize(&session.user_id).await {
        tracing::error!("[{}] {} ({})", e.error_code(), e, e.category().recovery_hint());
    }
    service.spawn_auto_refresh();
    tokio::spawn(run_signalling_bridge(publisher));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    service.shutdown();
    Ok(())
}

fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("agentdesk {}", VERSION);
        return Ok(());
    }

    color_eyre::install()?;
    init_logging();

    let config = DeskConfig::load()?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config))
}
