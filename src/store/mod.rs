//! SQLite-backed persistence for locations, weather records, and search history
//!
//! The store is the single owner of the database connection. All queries the
//! rest of the service needs are exposed as methods on [`Store`]; callers
//! never see SQL. An in-memory constructor exists for tests.

mod schema;
mod store;

pub use store::Store;
