//! Relationship Classifier / Normalizer
//!
//! Turns a raw, loosely-typed relationship record into one of the four typed
//! variants, or into a [`Skip`] describing why the record cannot be migrated.
//!
//! The ingest policy is deliberately lenient and deliberately asymmetric:
//! missing names default to placeholder values and the record still migrates,
//! but a record with a missing or unknown `type` is rejected outright - it is
//! never assumed to be direct. This replicates the behavior of the legacy
//! catalog this engine ingests from.

use crate::relationship::{
    EntityRef, PathEdge, RelationKind, Relationship, RelationshipBase, TablePath,
};
use serde::{Deserialize, Serialize};

/// Placeholder for a missing relationship name.
pub const DEFAULT_NAME: &str = "Unnamed Relationship";
/// Placeholder for a missing table or field name.
pub const DEFAULT_ENDPOINT: &str = "Unknown";

/// A relationship record as it arrives from legacy storage: every field
/// optional, nothing validated yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRelationshipRecord {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub relation_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub alternative_names: Option<Vec<String>>,
    pub from_table: Option<String>,
    pub from_field: Option<String>,
    pub to_table: Option<String>,
    pub to_field: Option<String>,
    pub intermediate_table: Option<String>,
    pub intermediate_from_field: Option<String>,
    pub intermediate_to_field: Option<String>,
    pub in_knowledge_graph: Option<bool>,
}

/// Why a raw record was skipped during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// `type` missing or not one of direct/inverse/indirect/self
    UnknownType,
    /// A required field was present but empty
    MissingRequiredFields,
    /// An indirect record lacked an intermediate table or field
    MissingIntermediateFields,
    /// An indirect record's table chain is not a simple path
    InvalidTablePath,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::UnknownType => "unknown type",
            SkipReason::MissingRequiredFields => "missing required fields",
            SkipReason::MissingIntermediateFields => "missing intermediate fields",
            SkipReason::InvalidTablePath => "invalid table path",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A skipped record: the reason plus the offending raw record, so callers
/// can log or quarantine it.
#[derive(Debug, Clone)]
pub struct Skip {
    pub reason: SkipReason,
    pub record: RawRelationshipRecord,
}

impl Skip {
    fn new(reason: SkipReason, record: RawRelationshipRecord) -> Self {
        Self { reason, record }
    }
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "skipped '{}': {}",
            self.record.name.as_deref().unwrap_or("<unnamed>"),
            self.reason
        )
    }
}

/// Substitute a placeholder for a missing value. A value that is present but
/// empty is NOT defaulted - that is a rejection, not a gap to paper over.
fn or_placeholder(value: &Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) => v.clone(),
        None => placeholder.to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Classify a raw record into a typed relationship.
///
/// Never panics for data-quality problems; those come back as `Err(Skip)`.
pub fn classify(raw: RawRelationshipRecord) -> Result<Relationship, Skip> {
    let kind = match raw.relation_type.as_deref() {
        Some(t) => match t.parse::<RelationKind>() {
            Ok(kind) => kind,
            Err(_) => return Err(Skip::new(SkipReason::UnknownType, raw)),
        },
        None => return Err(Skip::new(SkipReason::UnknownType, raw)),
    };

    // Defaulting: missing values become placeholders, then everything
    // required must be non-empty.
    let name = or_placeholder(&raw.name, DEFAULT_NAME);
    let from_table = or_placeholder(&raw.from_table, DEFAULT_ENDPOINT);
    let from_field = or_placeholder(&raw.from_field, DEFAULT_ENDPOINT);
    let to_table = or_placeholder(&raw.to_table, DEFAULT_ENDPOINT);
    let to_field = or_placeholder(&raw.to_field, DEFAULT_ENDPOINT);

    if [&name, &from_table, &from_field, &to_table, &to_field]
        .iter()
        .any(|v| v.is_empty())
    {
        return Err(Skip::new(SkipReason::MissingRequiredFields, raw));
    }

    let mut base = RelationshipBase::new(
        name,
        EntityRef::named(from_table.clone()),
        EntityRef::named(from_field.clone()),
        EntityRef::named(to_table.clone()),
        EntityRef::named(to_field.clone()),
    );
    if let Some(id) = non_empty(&raw.id) {
        base.id = id.to_string();
    }
    base.description = raw.description.clone().unwrap_or_default();
    base.alternative_names = raw.alternative_names.clone().unwrap_or_default();
    base.in_knowledge_graph = raw.in_knowledge_graph.unwrap_or(false);

    match kind {
        RelationKind::Direct => Ok(Relationship::direct(base)),
        RelationKind::Inverse => Ok(Relationship::inverse(base)),
        // Self relationships are intra-table by construction; a mismatched
        // toTable in the source data is corrected, not flagged.
        RelationKind::SelfRef => Ok(Relationship::self_ref(base)),
        RelationKind::Indirect => {
            let mid_table = non_empty(&raw.intermediate_table).map(str::to_string);
            let mid_from = non_empty(&raw.intermediate_from_field).map(str::to_string);
            let mid_to = non_empty(&raw.intermediate_to_field).map(str::to_string);
            let (Some(mid_table), Some(mid_from), Some(mid_to)) = (mid_table, mid_from, mid_to)
            else {
                return Err(Skip::new(SkipReason::MissingIntermediateFields, raw));
            };

            let edges = vec![
                PathEdge {
                    from_table: from_table.clone(),
                    from_field: from_field.clone(),
                    to_table: mid_table.clone(),
                    to_field: mid_from,
                },
                PathEdge {
                    from_table: mid_table.clone(),
                    from_field: mid_to,
                    to_table: to_table.clone(),
                    to_field: to_field.clone(),
                },
            ];
            let tables = vec![from_table, mid_table, to_table];
            let path = match TablePath::new(tables, edges) {
                Ok(path) => path,
                Err(err) => {
                    tracing::debug!(error = %err, "indirect record has a degenerate table chain");
                    return Err(Skip::new(SkipReason::InvalidTablePath, raw));
                }
            };
            match Relationship::indirect(base, path) {
                Ok(rel) => Ok(rel),
                Err(_) => Err(Skip::new(SkipReason::InvalidTablePath, raw)),
            }
        }
    }
}
