//! Database schema definitions

use crate::relationship::RelationKind;

/// SQL to create the tables catalog
pub const CREATE_TABLES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tables (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    source TEXT NOT NULL,
    UNIQUE(source, name)
)
"#;

/// SQL to create the fields catalog
pub const CREATE_FIELDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS fields (
    id TEXT PRIMARY KEY,
    table_id TEXT NOT NULL,
    name TEXT NOT NULL,
    field_type TEXT NOT NULL,
    alternative_names TEXT NOT NULL DEFAULT '[]',
    description TEXT
)
"#;

/// SQL to create the raw (unclassified) relationship table.
/// Records are kept as opaque JSON until the migration pass classifies them.
pub const CREATE_RAW_RELATIONSHIPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS raw_relationships (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL
)
"#;

/// Name of the typed collection for a relationship kind
pub fn relationship_table(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Direct => "direct_relationships",
        RelationKind::Inverse => "inverse_relationships",
        RelationKind::Indirect => "indirect_relationships",
        RelationKind::SelfRef => "self_relationships",
    }
}

/// SQL to create one typed relationship collection. Table/field references
/// and list-valued columns are stored as JSON text; only the indirect
/// collection carries path columns.
fn create_relationship_table(kind: RelationKind) -> String {
    let path_columns = if kind == RelationKind::Indirect {
        "\n    table_path TEXT NOT NULL,\n    path_edges TEXT NOT NULL,"
    } else {
        ""
    };
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {} (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    alternative_names TEXT NOT NULL DEFAULT '[]',
    source_table TEXT NOT NULL,
    source_field TEXT NOT NULL,
    target_table TEXT NOT NULL,
    target_field TEXT NOT NULL,{}
    in_knowledge_graph INTEGER NOT NULL DEFAULT 0
)
"#,
        relationship_table(kind),
        path_columns
    )
}

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_tables_source ON tables(source)",
    "CREATE INDEX IF NOT EXISTS idx_fields_table ON fields(table_id)",
    "CREATE INDEX IF NOT EXISTS idx_fields_type ON fields(field_type)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<String> {
    let mut stmts = vec![
        CREATE_TABLES_TABLE.to_string(),
        CREATE_FIELDS_TABLE.to_string(),
        CREATE_RAW_RELATIONSHIPS_TABLE.to_string(),
    ];
    for kind in RelationKind::all() {
        stmts.push(create_relationship_table(*kind));
    }
    stmts.extend(CREATE_INDEXES.iter().map(|s| s.to_string()));
    stmts
}
