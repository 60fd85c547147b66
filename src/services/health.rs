use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::database::connection::DatabaseManager;
use crate::database::models::Stats;
use crate::utils::logging::log_database_error;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: DatabaseHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: String,
    pub connection_pool_size: u32,
    pub response_time_ms: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub start_time: DateTime<Utc>,
}

/// Operational HTTP surface that runs next to the bot.
pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        let state = AppState {
            db,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .route("/stats", get(booking_stats))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let started = Instant::now();
    let reachable = ping(&state.db).await.is_ok();
    let response_time_ms = started.elapsed().as_millis() as u64;

    if !reachable {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let uptime_seconds = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds()
        .max(0) as u64;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            status: "healthy".to_string(),
            connection_pool_size: state.db.pool.size(),
            response_time_ms,
        },
        uptime_seconds,
    }))
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    match ping(&state.db).await {
        Ok(_) => Ok(Json("ready")),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}

/// Dashboard counters, relative to the server's local date.
async fn booking_stats(State(state): State<AppState>) -> Result<Json<Stats>, StatusCode> {
    match Stats::current(&state.db.pool).await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => {
            log_database_error("stats endpoint", &e.to_string(), None);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn ping(db: &DatabaseManager) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(&db.pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{BookingType, NewBooking, Specialist};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use tempfile::TempDir;

    async fn create_test_health_service() -> (HealthService, Arc<DatabaseManager>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let db = Arc::new(
            DatabaseManager::new(&db_url)
                .await
                .expect("Failed to create test database"),
        );
        db.run_migrations().await.expect("Failed to run migrations");

        (HealthService::new(db.clone()), db, temp_dir)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (health_service, _db, _temp_dir) = create_test_health_service().await;
        let server = TestServer::new(health_service.router).expect("Failed to create test server");

        let response = server.get("/health").await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let health: HealthResponse = response.json();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.database.status, "healthy");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
        assert!(health.uptime_seconds < 60);
    }

    #[tokio::test]
    async fn test_readiness_and_liveness() {
        let (health_service, _db, _temp_dir) = create_test_health_service().await;
        let server = TestServer::new(health_service.router).expect("Failed to create test server");

        let ready: String = server.get("/health/ready").await.json();
        assert_eq!(ready, "ready");

        let alive: String = server.get("/health/live").await.json();
        assert_eq!(alive, "alive");
    }

    #[tokio::test]
    async fn test_stats_endpoint_counts_bookings() {
        let (health_service, db, _temp_dir) = create_test_health_service().await;
        Specialist::create(&db.pool, "anna", "Anna Ivanova", "", None)
            .await
            .unwrap();
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
        crate::database::models::Booking::create(
            &db.pool,
            &NewBooking {
                specialist_id: "anna".into(),
                date: today,
                time: "10:00".into(),
                booking_type: BookingType::Scheduled,
                client_name: "Ivan".into(),
                client_phone: "+79990000000".into(),
                client_username: None,
                client_user_id: 1,
            },
        )
        .await
        .unwrap();

        let server = TestServer::new(health_service.router).expect("Failed to create test server");
        let response = server.get("/stats").await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let stats: Stats = response.json();
        assert_eq!(stats.active_specialists, 1);
        assert_eq!(stats.total_bookings, 1);
        assert_eq!(stats.today_bookings, 1);
        assert_eq!(stats.cancelled_bookings, 0);
    }
}
