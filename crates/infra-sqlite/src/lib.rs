// LeadSignal Infrastructure - SQLite Adapter
// Implements the `Store` port (leadsignal_core::port::store::Store).

mod connection;
mod migration;
mod store;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use store::SqliteStore;

// Note: sqlx::Error conversion happens inside `store::map_sqlx_error`, per
// Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here,
// AppError lives in leadsignal-core).
