//! SQLite storage implementation

use super::schema;
use crate::classify::RawRelationshipRecord;
use crate::migrate::RelationshipStore;
use crate::relationship::{PathEdge, RelationKind, Relationship, RelationshipBase, TablePath};
use crate::table::{Field, FieldType, Table};
use crate::{Error, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::str::FromStr;

/// Column list shared by every typed relationship collection
const BASE_COLUMNS: &str = "id, name, description, alternative_names, \
     source_table, source_field, target_table, target_field, in_knowledge_graph";

/// SQLite-backed storage for the catalog and relationship collections
pub struct SqliteStore {
    conn: Connection,
}

/// Intermediate row shape before JSON columns are decoded
struct BaseRow {
    id: String,
    name: String,
    description: String,
    alternative_names: String,
    source_table: String,
    source_field: String,
    target_table: String,
    target_field: String,
    in_knowledge_graph: bool,
}

impl BaseRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            alternative_names: row.get(3)?,
            source_table: row.get(4)?,
            source_field: row.get(5)?,
            target_table: row.get(6)?,
            target_field: row.get(7)?,
            in_knowledge_graph: row.get(8)?,
        })
    }

    fn into_base(self) -> Result<RelationshipBase> {
        Ok(RelationshipBase {
            id: self.id,
            name: self.name,
            description: self.description,
            alternative_names: serde_json::from_str(&self.alternative_names)?,
            source_table: serde_json::from_str(&self.source_table)?,
            source_field: serde_json::from_str(&self.source_field)?,
            target_table: serde_json::from_str(&self.target_table)?,
            target_field: serde_json::from_str(&self.target_field)?,
            in_knowledge_graph: self.in_knowledge_graph,
        })
    }
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(&stmt, [])?;
        }
        Ok(())
    }

    // ========== Catalog Operations ==========

    /// Insert or replace a table
    pub fn insert_table(&self, table: &Table) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO tables (id, name, source) VALUES (?1, ?2, ?3)",
            params![table.id, table.name, table.source],
        )?;
        Ok(())
    }

    /// Insert or replace a field
    pub fn insert_field(&self, field: &Field) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO fields (id, table_id, name, field_type, alternative_names, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                field.id,
                field.table_id,
                field.name,
                field.field_type.as_str(),
                serde_json::to_string(&field.alternative_names)?,
                field.description,
            ],
        )?;
        Ok(())
    }

    /// All cataloged tables, ordered by source then name
    pub fn list_tables(&self) -> Result<Vec<Table>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, source FROM tables ORDER BY source, name")?;
        let tables = stmt
            .query_map([], |row| {
                Ok(Table {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    source: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tables)
    }

    /// All fields of a table
    pub fn list_fields(&self, table_id: &str) -> Result<Vec<Field>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, table_id, name, field_type, alternative_names, description \
             FROM fields WHERE table_id = ?1 ORDER BY name",
        )?;
        let rows = stmt
            .query_map([table_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut fields = Vec::with_capacity(rows.len());
        for (id, table_id, name, field_type, alternative_names, description) in rows {
            fields.push(Field {
                id,
                table_id,
                name,
                field_type: FieldType::from_str(&field_type)?,
                alternative_names: serde_json::from_str(&alternative_names)?,
                description,
            });
        }
        Ok(fields)
    }

    // ========== Raw Relationship Operations ==========

    /// Append a raw record to the unclassified collection
    pub fn insert_raw(&self, record: &RawRelationshipRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO raw_relationships (payload) VALUES (?1)",
            params![serde_json::to_string(record)?],
        )?;
        Ok(())
    }

    // ========== Typed Relationship Operations ==========

    /// Load every relationship of one variant
    pub fn load_relationships(&self, kind: RelationKind) -> Result<Vec<Relationship>> {
        let table = schema::relationship_table(kind);

        if kind == RelationKind::Indirect {
            let sql =
                format!("SELECT {BASE_COLUMNS}, table_path, path_edges FROM {table} ORDER BY name");
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        BaseRow::from_row(row)?,
                        row.get::<_, String>(9)?,
                        row.get::<_, String>(10)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut relationships = Vec::with_capacity(rows.len());
            for (base_row, tables_json, edges_json) in rows {
                let base = base_row.into_base()?;
                let tables: Vec<String> = serde_json::from_str(&tables_json)?;
                let edges: Vec<PathEdge> = serde_json::from_str(&edges_json)?;
                let path = TablePath::new(tables, edges)?;
                relationships.push(Relationship::indirect(base, path)?);
            }
            return Ok(relationships);
        }

        let sql = format!("SELECT {BASE_COLUMNS} FROM {table} ORDER BY name");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], BaseRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut relationships = Vec::with_capacity(rows.len());
        for row in rows {
            let base = row.into_base()?;
            relationships.push(match kind {
                RelationKind::Direct => Relationship::Direct(base),
                RelationKind::Inverse => Relationship::Inverse(base),
                RelationKind::SelfRef => Relationship::SelfRef(base),
                RelationKind::Indirect => unreachable!("handled above"),
            });
        }
        Ok(relationships)
    }

    fn insert_relationship(&self, kind: RelationKind, rel: &Relationship) -> Result<()> {
        if rel.kind() != kind {
            return Err(Error::KindMismatch {
                expected: kind,
                actual: rel.kind(),
            });
        }
        let base = rel.base();
        let table = schema::relationship_table(kind);

        if let Some(path) = rel.path() {
            let sql = format!(
                "INSERT OR REPLACE INTO {table} ({BASE_COLUMNS}, table_path, path_edges) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            );
            self.conn.execute(
                &sql,
                params![
                    base.id,
                    base.name,
                    base.description,
                    serde_json::to_string(&base.alternative_names)?,
                    serde_json::to_string(&base.source_table)?,
                    serde_json::to_string(&base.source_field)?,
                    serde_json::to_string(&base.target_table)?,
                    serde_json::to_string(&base.target_field)?,
                    base.in_knowledge_graph,
                    serde_json::to_string(path.tables())?,
                    serde_json::to_string(path.edges())?,
                ],
            )?;
        } else {
            let sql = format!(
                "INSERT OR REPLACE INTO {table} ({BASE_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            );
            self.conn.execute(
                &sql,
                params![
                    base.id,
                    base.name,
                    base.description,
                    serde_json::to_string(&base.alternative_names)?,
                    serde_json::to_string(&base.source_table)?,
                    serde_json::to_string(&base.source_field)?,
                    serde_json::to_string(&base.target_table)?,
                    serde_json::to_string(&base.target_field)?,
                    base.in_knowledge_graph,
                ],
            )?;
        }
        Ok(())
    }

    /// Get statistics about the stored catalog
    pub fn stats(&self) -> Result<DbStats> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok(DbStats {
            tables: count("tables")?,
            fields: count("fields")?,
            raw: count("raw_relationships")?,
            direct: count(schema::relationship_table(RelationKind::Direct))?,
            inverse: count(schema::relationship_table(RelationKind::Inverse))?,
            indirect: count(schema::relationship_table(RelationKind::Indirect))?,
            self_ref: count(schema::relationship_table(RelationKind::SelfRef))?,
        })
    }
}

impl RelationshipStore for SqliteStore {
    fn read_all_raw(&self) -> Result<Vec<RawRelationshipRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM raw_relationships ORDER BY id")?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut records = Vec::with_capacity(payloads.len());
        for payload in payloads {
            records.push(serde_json::from_str(&payload)?);
        }
        Ok(records)
    }

    fn bulk_insert(&self, kind: RelationKind, relationships: &[Relationship]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for rel in relationships {
            self.insert_relationship(kind, rel)?;
        }
        tx.commit()?;
        Ok(relationships.len())
    }

    fn clear(&self, kind: RelationKind) -> Result<usize> {
        let removed = self.conn.execute(
            &format!("DELETE FROM {}", schema::relationship_table(kind)),
            [],
        )?;
        Ok(removed)
    }
}

/// Row counts per stored collection
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub tables: usize,
    pub fields: usize,
    pub raw: usize,
    pub direct: usize,
    pub inverse: usize,
    pub indirect: usize,
    pub self_ref: usize,
}

impl DbStats {
    /// Total of the four typed collections
    pub fn typed_total(&self) -> usize {
        self.direct + self.inverse + self.indirect + self.self_ref
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Catalog Statistics:")?;
        writeln!(f, "  Tables: {}", self.tables)?;
        writeln!(f, "  Fields: {}", self.fields)?;
        writeln!(f, "  Raw relationships: {}", self.raw)?;
        writeln!(
            f,
            "  Typed relationships: {} (direct: {}, inverse: {}, indirect: {}, self: {})",
            self.typed_total(),
            self.direct,
            self.inverse,
            self.indirect,
            self.self_ref
        )
    }
}
