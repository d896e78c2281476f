//! LPH Desk - back office service for LPH UNISMA

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lph_desk::{config::StoreBackend, server, Args, Desk};
use lph_store::{redact_uri, MemoryStore, MongoRecordStore, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "lph_desk={level},lph_store={level},lph_assistant={level},lph_core={level},info",
                    level = log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  LPH Desk - LPH UNISMA back office");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Store: {:?}", args.store);
    if args.store == StoreBackend::Mongo {
        info!("MongoDB: {} / {}", redact_uri(&args.mongodb_uri), args.mongodb_db);
    }
    info!(
        "Assistant: {}",
        if args.llm_configured() { args.llm_model.as_str() } else { "not configured" }
    );
    info!("Task refresh: {}s", args.task_refresh_secs);
    info!("======================================");

    let store: Arc<dyn RecordStore> = match args.store {
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Mongo => {
            match MongoRecordStore::connect(&args.mongodb_uri, &args.mongodb_db).await {
                Ok(store) => {
                    info!("MongoDB connected successfully");
                    Arc::new(store)
                }
                Err(e) => {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let assistant = match args.assistant() {
        Ok(assistant) => assistant,
        Err(e) => {
            warn!("Assistant disabled: {}", e);
            lph_assistant::AssistantService::unconfigured()
        }
    };
    if assistant.is_configured() && !assistant.is_reachable().await {
        warn!("Assistant backend is not reachable; replies will fall back to canned text");
    }

    let desk = Desk::new(store, assistant, args.desk_config());

    match desk.bootstrap_admin().await {
        Ok(Some(admin)) => info!("Created bootstrap admin '{}'", admin.username),
        Ok(None) => {}
        Err(e) => {
            error!("Bootstrap admin failed: {}", e);
            std::process::exit(1);
        }
    }

    tokio::select! {
        result = server::run(desk, args.listen) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    Ok(())
}
