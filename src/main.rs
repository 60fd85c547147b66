//! # Session Booking Bot Main Entry Point
//!
//! Initializes logging, loads configuration, prepares the database
//! and runs the Telegram bot next to the health server.

use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session_booking_bot::bot::handlers::BotHandler;
use session_booking_bot::config::Config;
use session_booking_bot::database::connection::DatabaseManager;
use session_booking_bot::flow::DialogueState;
use session_booking_bot::services::health::HealthService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_booking_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Session Booking Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, Admins: {}",
        config.database_url,
        config.http_port,
        config.admins.len()
    );
    if config.admins.is_empty() {
        tracing::warn!("ADMIN_IDS is empty: the admin panel is unreachable and no one is notified of bookings");
    }

    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    db_manager.run_migrations().await?;
    let seeded = db_manager.seed_defaults().await?;
    info!(
        "Database ready ({} specialists and {} time slots seeded)",
        seeded.specialists, seeded.time_slots
    );
    let db_arc = Arc::new(db_manager);

    let bot = Bot::new(&config.telegram_bot_token);
    let handler = BotHandler::new(
        db_arc.as_ref().clone(),
        config.admins.clone(),
        config.logo_path.clone(),
    );

    let health_service = HealthService::new(db_arc.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    let bot_task = tokio::spawn(async move {
        let storage = InMemStorage::<DialogueState>::new();
        Dispatcher::builder(bot, handler.schema())
            .dependencies(dptree::deps![storage])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Either task finishing means shutdown
    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    info!("Application stopped");
    Ok(())
}
