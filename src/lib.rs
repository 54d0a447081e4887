//! # Relgraph - Relationship Graph & Derivation Engine
//!
//! Catalogs tabular data sources (tables, fields) and derives typed
//! relationships between them for projection into a knowledge graph.
//!
//! Relgraph provides:
//! - A table/field catalog model with a closed field-type vocabulary
//! - Four typed relationship variants (direct, inverse, indirect, self)
//! - An in-memory directed multigraph of tables built from direct relationships
//! - Bounded simple-path discovery for indirect-relationship candidates
//! - A lenient classifier that normalizes raw legacy records into typed variants
//! - A partial-success migration pass with per-record skip/error accounting
//! - SQLite-backed storage with one collection per relationship variant

pub mod table;
pub mod relationship;
pub mod graph;
pub mod discovery;
pub mod classify;
pub mod migrate;
pub mod storage;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use table::{Field, FieldType, Table};
pub use relationship::{EntityRef, RelationKind, Relationship, RelationshipBase, TablePath};
pub use graph::RelationGraph;
pub use discovery::{PathCandidate, find_indirect_paths};
pub use classify::{RawRelationshipRecord, Skip, SkipReason, classify};
pub use migrate::{MigrationReport, Migrator, RelationshipStore};
pub use storage::SqliteStore;

/// Result type alias for Relgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Relgraph operations
///
/// Data-quality problems in raw records are deliberately NOT errors; they are
/// [`classify::Skip`] outcomes so a migration batch can keep going. This enum
/// covers infrastructure failures and caller mistakes (malformed paths).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid table path: {0}")]
    InvalidPath(String),

    #[error("Unknown relationship kind: {0}")]
    UnknownKind(String),

    #[error("Relationship kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: relationship::RelationKind,
        actual: relationship::RelationKind,
    },

    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
