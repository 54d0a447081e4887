//! Relationship types - the four typed variants and their shared shape
//!
//! Every relationship connects a (table, field) pair to another (table, field)
//! pair. The four variants are:
//! - `Direct`: explicitly declared source -> target connection
//! - `Inverse`: the reversed narrative view of a direct connection
//! - `Indirect`: inferred by chaining direct connections through intermediates
//! - `SelfRef`: source and target table are the same table
//!
//! Only `Indirect` carries a table path; the payload is statically unreachable
//! for the other three variants.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum number of tables in an indirect path (3 hops).
pub const MAX_PATH_TABLES: usize = 4;

/// Discriminant of the four relationship variants.
///
/// Never changes once a relationship has been classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Direct,
    Inverse,
    Indirect,
    #[serde(rename = "self")]
    SelfRef,
}

impl RelationKind {
    /// Get the string representation of the relationship kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Direct => "direct",
            RelationKind::Inverse => "inverse",
            RelationKind::Indirect => "indirect",
            RelationKind::SelfRef => "self",
        }
    }

    /// Get all relationship kinds
    pub fn all() -> &'static [RelationKind] {
        &[
            RelationKind::Direct,
            RelationKind::Inverse,
            RelationKind::Indirect,
            RelationKind::SelfRef,
        ]
    }
}

impl FromStr for RelationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(RelationKind::Direct),
            "inverse" | "reverse" => Ok(RelationKind::Inverse),
            "indirect" => Ok(RelationKind::Indirect),
            "self" => Ok(RelationKind::SelfRef),
            _ => Err(Error::UnknownKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Knowledge-graph projection status.
///
/// Mutated only by the external KG sync process, never by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KgStatus {
    #[serde(rename = "Added to KG")]
    Added,
    #[serde(rename = "Not Added")]
    NotAdded,
}

impl KgStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KgStatus::Added => "Added to KG",
            KgStatus::NotAdded => "Not Added",
        }
    }
}

impl From<bool> for KgStatus {
    fn from(in_kg: bool) -> Self {
        if in_kg { KgStatus::Added } else { KgStatus::NotAdded }
    }
}

impl std::fmt::Display for KgStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An (id, name) pair denoting the table or field on one side of a
/// relationship. Records ingested from legacy storage carry names only,
/// so the id is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

impl EntityRef {
    /// Reference with both id and name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
        }
    }

    /// Name-only reference (no catalog id known)
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// One hop of an indirect path: a direct connection flattened to its
/// table/field endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEdge {
    pub from_table: String,
    pub from_field: String,
    pub to_table: String,
    pub to_field: String,
}

/// The ordered table chain of an indirect relationship plus the edges
/// connecting consecutive tables.
///
/// Validated at construction: 2 to [`MAX_PATH_TABLES`] tables, no table
/// repeated, one edge per consecutive pair, each edge's endpoints matching
/// the tables it connects. Violations are caller errors, not data-quality
/// skips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePath {
    tables: Vec<String>,
    edges: Vec<PathEdge>,
}

impl TablePath {
    /// Build a validated table path
    pub fn new(tables: Vec<String>, edges: Vec<PathEdge>) -> Result<Self> {
        if tables.len() < 2 || tables.len() > MAX_PATH_TABLES {
            return Err(Error::InvalidPath(format!(
                "path must span 2 to {} tables, got {}",
                MAX_PATH_TABLES,
                tables.len()
            )));
        }
        if edges.len() != tables.len() - 1 {
            return Err(Error::InvalidPath(format!(
                "{} tables require {} edges, got {}",
                tables.len(),
                tables.len() - 1,
                edges.len()
            )));
        }
        for (i, table) in tables.iter().enumerate() {
            if tables[i + 1..].contains(table) {
                return Err(Error::InvalidPath(format!("table '{table}' repeats in path")));
            }
        }
        for (i, edge) in edges.iter().enumerate() {
            if edge.from_table != tables[i] || edge.to_table != tables[i + 1] {
                return Err(Error::InvalidPath(format!(
                    "edge {} connects '{}' -> '{}' but path expects '{}' -> '{}'",
                    i, edge.from_table, edge.to_table, tables[i], tables[i + 1]
                )));
            }
        }
        Ok(Self { tables, edges })
    }

    /// Ordered table names, first is the source table, last is the target
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Edges connecting consecutive tables
    pub fn edges(&self) -> &[PathEdge] {
        &self.edges
    }

    /// Number of hops (edges) in the path
    pub fn hops(&self) -> usize {
        self.edges.len()
    }
}

impl std::fmt::Display for TablePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tables.join(" -> "))
    }
}

/// Shape shared by all four relationship variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipBase {
    /// Unique identifier for this relationship
    pub id: String,
    /// Relationship name
    pub name: String,
    /// Alternative names (uniqueness not enforced)
    #[serde(default)]
    pub alternative_names: Vec<String>,
    /// Description, empty when none was supplied
    #[serde(default)]
    pub description: String,
    pub source_table: EntityRef,
    pub source_field: EntityRef,
    pub target_table: EntityRef,
    pub target_field: EntityRef,
    /// Whether the external sync has projected this into the knowledge graph
    #[serde(default)]
    pub in_knowledge_graph: bool,
}

impl RelationshipBase {
    /// Minimal base with a fresh id and defaulted optional fields
    pub fn new(
        name: impl Into<String>,
        source_table: EntityRef,
        source_field: EntityRef,
        target_table: EntityRef,
        target_field: EntityRef,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            alternative_names: Vec::new(),
            description: String::new(),
            source_table,
            source_field,
            target_table,
            target_field,
            in_knowledge_graph: false,
        }
    }

    /// Projection status derived from `in_knowledge_graph`
    pub fn kg_status(&self) -> KgStatus {
        KgStatus::from(self.in_knowledge_graph)
    }
}

/// A classified relationship - tagged by variant.
///
/// Once constructed, the variant never changes; editors may update name,
/// description and alternative names but not source/target identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Relationship {
    Direct(RelationshipBase),
    Inverse(RelationshipBase),
    #[serde(rename = "self")]
    SelfRef(RelationshipBase),
    Indirect {
        #[serde(flatten)]
        base: RelationshipBase,
        path: TablePath,
    },
}

impl Relationship {
    /// Create a direct relationship
    pub fn direct(base: RelationshipBase) -> Self {
        Relationship::Direct(base)
    }

    /// Create an inverse relationship
    pub fn inverse(base: RelationshipBase) -> Self {
        Relationship::Inverse(base)
    }

    /// Create a self relationship. The target table is forced to the source
    /// table; self relationships are intra-table by construction.
    pub fn self_ref(mut base: RelationshipBase) -> Self {
        base.target_table = base.source_table.clone();
        Relationship::SelfRef(base)
    }

    /// Create an indirect relationship. The path endpoints must match the
    /// base's source and target table names.
    pub fn indirect(base: RelationshipBase, path: TablePath) -> Result<Self> {
        let tables = path.tables();
        if tables.first().map(String::as_str) != Some(base.source_table.name.as_str()) {
            return Err(Error::InvalidPath(format!(
                "path starts at '{}' but source table is '{}'",
                tables.first().map(String::as_str).unwrap_or(""),
                base.source_table.name
            )));
        }
        if tables.last().map(String::as_str) != Some(base.target_table.name.as_str()) {
            return Err(Error::InvalidPath(format!(
                "path ends at '{}' but target table is '{}'",
                tables.last().map(String::as_str).unwrap_or(""),
                base.target_table.name
            )));
        }
        Ok(Relationship::Indirect { base, path })
    }

    /// The variant discriminant
    pub fn kind(&self) -> RelationKind {
        match self {
            Relationship::Direct(_) => RelationKind::Direct,
            Relationship::Inverse(_) => RelationKind::Inverse,
            Relationship::SelfRef(_) => RelationKind::SelfRef,
            Relationship::Indirect { .. } => RelationKind::Indirect,
        }
    }

    /// The shared base shape
    pub fn base(&self) -> &RelationshipBase {
        match self {
            Relationship::Direct(base)
            | Relationship::Inverse(base)
            | Relationship::SelfRef(base) => base,
            Relationship::Indirect { base, .. } => base,
        }
    }

    /// The table path, present only for indirect relationships
    pub fn path(&self) -> Option<&TablePath> {
        match self {
            Relationship::Indirect { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn source_table(&self) -> &EntityRef {
        &self.base().source_table
    }

    pub fn target_table(&self) -> &EntityRef {
        &self.base().target_table
    }

    pub fn source_field(&self) -> &EntityRef {
        &self.base().source_field
    }

    pub fn target_field(&self) -> &EntityRef {
        &self.base().target_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_base(from: &str, to: &str) -> RelationshipBase {
        RelationshipBase::new(
            format!("{from}-{to}"),
            EntityRef::named(from),
            EntityRef::named(format!("{to}_id")),
            EntityRef::named(to),
            EntityRef::named("id"),
        )
    }

    fn edge(from: &str, to: &str) -> PathEdge {
        PathEdge {
            from_table: from.to_string(),
            from_field: format!("{to}_id"),
            to_table: to.to_string(),
            to_field: "id".to_string(),
        }
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in RelationKind::all() {
            let parsed: RelationKind = kind.as_str().parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_kg_status_tracks_flag() {
        let mut base = sample_base("a", "b");
        assert_eq!(base.kg_status(), KgStatus::NotAdded);
        base.in_knowledge_graph = true;
        assert_eq!(base.kg_status(), KgStatus::Added);
        assert_eq!(base.kg_status().to_string(), "Added to KG");
    }

    #[test]
    fn test_self_forces_target_table() {
        let base = sample_base("employees", "departments");
        let rel = Relationship::self_ref(base);
        assert_eq!(rel.target_table().name, "employees");
        assert_eq!(rel.kind(), RelationKind::SelfRef);
    }

    #[test]
    fn test_table_path_rejects_repeats() {
        let tables = vec!["a".into(), "b".into(), "a".into()];
        let edges = vec![edge("a", "b"), edge("b", "a")];
        assert!(TablePath::new(tables, edges).is_err());
    }

    #[test]
    fn test_table_path_rejects_mismatched_edges() {
        let tables = vec!["a".into(), "b".into(), "c".into()];
        let edges = vec![edge("a", "b"), edge("b", "d")];
        assert!(TablePath::new(tables, edges).is_err());
    }

    #[test]
    fn test_table_path_rejects_too_long() {
        let tables: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("c", "d"), edge("d", "e")];
        assert!(TablePath::new(tables, edges).is_err());
    }

    #[test]
    fn test_indirect_endpoints_must_match() {
        let base = sample_base("orders", "products");
        let path = TablePath::new(
            vec!["orders".into(), "line_items".into(), "products".into()],
            vec![edge("orders", "line_items"), edge("line_items", "products")],
        )
        .unwrap();
        let rel = Relationship::indirect(base, path).unwrap();
        assert_eq!(rel.kind(), RelationKind::Indirect);
        assert_eq!(rel.path().unwrap().hops(), 2);

        let wrong = sample_base("orders", "customers");
        let path = TablePath::new(
            vec!["orders".into(), "products".into()],
            vec![edge("orders", "products")],
        )
        .unwrap();
        assert!(Relationship::indirect(wrong, path).is_err());
    }
}
