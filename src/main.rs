//! Samtal - a Telegram dialogue engine
//!
//! Drives multi-step conversations through a declaratively defined node
//! graph: topic selection, topic classification, municipality lookup, and
//! vote/feedback collection.

mod api;
mod db;
mod engine;
mod municipality;
mod telegram;
mod topics;

use api::{create_router, AppState};
use db::Database;
use engine::traits::{DatabaseAudit, DatabaseSessions};
use engine::{ConversationDriver, NodeDeps, NodeRegistry, RejectTarget};
use municipality::MunicipalityDirectory;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use telegram::BotApi;
use topics::KeywordClassifier;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "samtal=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let token = std::env::var("TELEGRAM_BOT_TOKEN")
        .map_err(|_| "TELEGRAM_BOT_TOKEN must be set")?;

    let db_path = std::env::var("SAMTAL_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.samtal/samtal.db")
    });

    let port: u16 = std::env::var("SAMTAL_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let flows_paths =
        std::env::var("SAMTAL_FLOWS_PATH").unwrap_or_else(|_| "conversations/flows.json".into());
    let municipalities_path =
        std::env::var("SAMTAL_MUNICIPALITIES_PATH").unwrap_or_else(|_| "data/kommuner.json".into());
    let initial_node =
        std::env::var("SAMTAL_INITIAL_NODE").unwrap_or_else(|_| "static_topic".into());

    let reject_target = match std::env::var("SAMTAL_ON_REJECT").as_deref() {
        Ok("home") => RejectTarget::Home,
        _ => RejectTarget::Reselect(initial_node.clone()),
    };

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize collaborators
    tracing::info!(path = %db_path, "Opening database");
    let db = Database::open(&db_path)?;

    tracing::info!(path = %municipalities_path, "Loading municipality directory");
    let municipalities = MunicipalityDirectory::load(&municipalities_path)?;
    tracing::info!(count = municipalities.len(), "Municipality directory loaded");

    let deps = NodeDeps {
        classifier: Arc::new(KeywordClassifier::new()),
        municipalities: Arc::new(municipalities),
        votes: Arc::new(DatabaseAudit::new(db.clone())),
        feedback: Arc::new(DatabaseAudit::new(db.clone())),
    };

    // Build the node graph: built-ins plus the declarative files. A broken
    // file aborts startup.
    let mut registry = NodeRegistry::new(reject_target, &deps);
    for path in flows_paths.split(':').filter(|p| !p.is_empty()) {
        tracing::info!(path = %path, "Loading conversation definitions");
        registry.load_file(path, &deps)?;
    }
    tracing::info!(nodes = registry.len(), initial = %initial_node, "Node registry built");

    let driver = Arc::new(ConversationDriver::new(
        Arc::new(registry),
        Arc::new(DatabaseSessions::new(db)),
        Arc::new(BotApi::new(&token)),
        initial_node,
    ));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState::new(driver))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Samtal webhook server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
