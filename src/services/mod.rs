/// HTTP health, readiness, liveness and stats endpoints
pub mod health;
