//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - tables(id, name, source) / fields(id, table_id, name, field_type, ...)
//! - raw_relationships(id, payload) - unclassified records as JSON
//! - one collection per relationship variant: direct_relationships,
//!   inverse_relationships, indirect_relationships, self_relationships

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SqliteStore};
