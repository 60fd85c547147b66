/// Pool setup, schema migrations and default data
pub mod connection;
/// Record types and their queries
pub mod models;
