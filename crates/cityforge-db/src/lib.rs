//! Persistence layer: models, connection pool, embedded migrations,
//! per-table queries, and the [`store::ProjectStore`] interface the
//! execution engine consumes.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
pub mod store;
