//! Migration Orchestrator - bulk classification of raw records into the
//! four typed collections
//!
//! Reads raw records in source order, classifies each, buckets the survivors
//! by variant and bulk-inserts one bucket at a time. A failed bucket insert is
//! counted and logged but never stops the other buckets.
//!
//! Running the pass twice without clearing the destination collections first
//! duplicates records; idempotence is the caller's job (`clear_typed` exists
//! for exactly that).

use crate::classify::{classify, RawRelationshipRecord};
use crate::relationship::{RelationKind, Relationship};
use crate::Result;
use serde::Serialize;
use std::fmt;

/// Minimal persistence surface the orchestrator needs.
///
/// Implemented by [`crate::SqliteStore`]; tests inject failing stands-ins to
/// exercise bucket independence.
pub trait RelationshipStore {
    /// Read every raw record, in stored order. Failure here is fatal to a
    /// migration run - there is nothing to classify.
    fn read_all_raw(&self) -> Result<Vec<RawRelationshipRecord>>;

    /// Insert a batch of classified relationships into the collection for
    /// `kind`. Returns the number inserted.
    fn bulk_insert(&self, kind: RelationKind, relationships: &[Relationship]) -> Result<usize>;

    /// Remove every relationship from the collection for `kind`. Returns the
    /// number removed.
    fn clear(&self, kind: RelationKind) -> Result<usize>;
}

/// Per-variant migrated counts.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BucketCounts {
    pub direct: usize,
    pub inverse: usize,
    pub indirect: usize,
    pub self_ref: usize,
}

impl BucketCounts {
    pub fn for_kind(&self, kind: RelationKind) -> usize {
        match kind {
            RelationKind::Direct => self.direct,
            RelationKind::Inverse => self.inverse,
            RelationKind::Indirect => self.indirect,
            RelationKind::SelfRef => self.self_ref,
        }
    }

    fn add(&mut self, kind: RelationKind, count: usize) {
        match kind {
            RelationKind::Direct => self.direct += count,
            RelationKind::Inverse => self.inverse += count,
            RelationKind::Indirect => self.indirect += count,
            RelationKind::SelfRef => self.self_ref += count,
        }
    }
}

/// Outcome of one migration pass.
///
/// `migrated + skipped + errored == total_processed` always holds.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub total_processed: usize,
    pub migrated_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    pub per_bucket: BucketCounts,
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Migration Report:")?;
        writeln!(f, "  Total Processed: {}", self.total_processed)?;
        writeln!(f, "  ✅ Migrated: {}", self.migrated_count)?;
        writeln!(f, "  ⏭️ Skipped: {}", self.skipped_count)?;
        writeln!(f, "  ❌ Errors: {}", self.error_count)?;
        writeln!(
            f,
            "  Buckets: direct={} inverse={} indirect={} self={}",
            self.per_bucket.direct,
            self.per_bucket.inverse,
            self.per_bucket.indirect,
            self.per_bucket.self_ref
        )
    }
}

/// Drives a bulk classification pass against a store.
pub struct Migrator<'a, S: RelationshipStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RelationshipStore + ?Sized> Migrator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Read every raw record from the store and migrate it.
    ///
    /// Propagates a hard error only when the raw source cannot be read at
    /// all; everything downstream is counted, not thrown.
    pub fn run(&self) -> Result<MigrationReport> {
        let records = self.store.read_all_raw()?;
        Ok(self.run_records(records))
    }

    /// Migrate an already-materialized sequence of raw records, in order.
    pub fn run_records(
        &self,
        records: impl IntoIterator<Item = RawRelationshipRecord>,
    ) -> MigrationReport {
        let mut total = 0;
        let mut skipped = 0;
        let mut buckets: [(RelationKind, Vec<Relationship>); 4] = [
            (RelationKind::Direct, Vec::new()),
            (RelationKind::Inverse, Vec::new()),
            (RelationKind::Indirect, Vec::new()),
            (RelationKind::SelfRef, Vec::new()),
        ];

        for record in records {
            total += 1;
            match classify(record) {
                Ok(rel) => {
                    let slot = match rel.kind() {
                        RelationKind::Direct => 0,
                        RelationKind::Inverse => 1,
                        RelationKind::Indirect => 2,
                        RelationKind::SelfRef => 3,
                    };
                    buckets[slot].1.push(rel);
                }
                Err(skip) => {
                    tracing::warn!(reason = %skip.reason, "{}", skip);
                    skipped += 1;
                }
            }
        }

        let mut migrated = 0;
        let mut errored = 0;
        let mut per_bucket = BucketCounts::default();

        for (kind, bucket) in &buckets {
            if bucket.is_empty() {
                continue;
            }
            match self.store.bulk_insert(*kind, bucket) {
                Ok(count) => {
                    migrated += count;
                    per_bucket.add(*kind, count);
                }
                Err(err) => {
                    // Bucket independence: count the loss and keep going
                    tracing::error!(kind = %kind, error = %err, "bulk insert failed");
                    errored += bucket.len();
                }
            }
        }

        MigrationReport {
            total_processed: total,
            migrated_count: migrated,
            skipped_count: skipped,
            error_count: errored,
            per_bucket,
        }
    }

    /// Clear all four typed collections. Callers wanting an idempotent
    /// migrate run this first.
    pub fn clear_typed(&self) -> Result<usize> {
        let mut removed = 0;
        for kind in RelationKind::all() {
            removed += self.store.clear(*kind)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory store that can be told to fail inserts for chosen kinds.
    #[derive(Default)]
    struct MemoryStore {
        raw: Vec<RawRelationshipRecord>,
        fail_kinds: Vec<RelationKind>,
        fail_read: bool,
        inserted: RefCell<HashMap<&'static str, Vec<Relationship>>>,
    }

    impl RelationshipStore for MemoryStore {
        fn read_all_raw(&self) -> Result<Vec<RawRelationshipRecord>> {
            if self.fail_read {
                return Err(Error::InvalidPath("raw source unavailable".into()));
            }
            Ok(self.raw.clone())
        }

        fn bulk_insert(&self, kind: RelationKind, relationships: &[Relationship]) -> Result<usize> {
            if self.fail_kinds.contains(&kind) {
                return Err(Error::InvalidPath(format!("insert refused for {kind}")));
            }
            self.inserted
                .borrow_mut()
                .entry(kind.as_str())
                .or_default()
                .extend_from_slice(relationships);
            Ok(relationships.len())
        }

        fn clear(&self, kind: RelationKind) -> Result<usize> {
            Ok(self
                .inserted
                .borrow_mut()
                .remove(kind.as_str())
                .map(|v| v.len())
                .unwrap_or(0))
        }
    }

    fn record(kind: &str, from: &str, to: &str) -> RawRelationshipRecord {
        RawRelationshipRecord {
            relation_type: Some(kind.into()),
            name: Some(format!("{from}-{to}")),
            from_table: Some(from.into()),
            from_field: Some(format!("{to}_id")),
            to_table: Some(to.into()),
            to_field: Some("id".into()),
            ..Default::default()
        }
    }

    fn indirect_record() -> RawRelationshipRecord {
        let mut raw = record("indirect", "orders", "products");
        raw.intermediate_table = Some("line_items".into());
        raw.intermediate_from_field = Some("order_id".into());
        raw.intermediate_to_field = Some("product_id".into());
        raw
    }

    #[test]
    fn test_counters_are_conserved() {
        let store = MemoryStore {
            raw: vec![
                record("direct", "a", "b"),
                record("inverse", "b", "a"),
                record("self", "c", "c"),
                indirect_record(),
                record("sideways", "x", "y"), // unknown type
                RawRelationshipRecord::default(), // no type at all
            ],
            ..Default::default()
        };

        let report = Migrator::new(&store).run().unwrap();
        assert_eq!(report.total_processed, 6);
        assert_eq!(report.migrated_count, 4);
        assert_eq!(report.skipped_count, 2);
        assert_eq!(report.error_count, 0);
        assert_eq!(
            report.migrated_count + report.skipped_count + report.error_count,
            report.total_processed
        );
        assert_eq!(report.per_bucket.direct, 1);
        assert_eq!(report.per_bucket.inverse, 1);
        assert_eq!(report.per_bucket.indirect, 1);
        assert_eq!(report.per_bucket.self_ref, 1);
        for kind in RelationKind::all() {
            assert_eq!(report.per_bucket.for_kind(*kind), 1);
        }
    }

    #[test]
    fn test_each_record_lands_in_its_own_bucket() {
        let store = MemoryStore {
            raw: vec![record("direct", "a", "b"), record("direct", "a", "c"), indirect_record()],
            ..Default::default()
        };

        Migrator::new(&store).run().unwrap();
        let inserted = store.inserted.borrow();
        assert_eq!(inserted.get("direct").map(Vec::len), Some(2));
        assert_eq!(inserted.get("indirect").map(Vec::len), Some(1));
        assert!(inserted.get("inverse").is_none());
    }

    #[test]
    fn test_bucket_independence() {
        let store = MemoryStore {
            raw: vec![
                record("direct", "a", "b"),
                record("inverse", "b", "a"),
                record("self", "c", "c"),
                indirect_record(),
            ],
            fail_kinds: vec![RelationKind::Indirect],
            ..Default::default()
        };

        let report = Migrator::new(&store).run().unwrap();
        assert_eq!(report.migrated_count, 3);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.per_bucket.indirect, 0);

        let inserted = store.inserted.borrow();
        assert_eq!(inserted.get("direct").map(Vec::len), Some(1));
        assert_eq!(inserted.get("inverse").map(Vec::len), Some(1));
        assert_eq!(inserted.get("self").map(Vec::len), Some(1));
        assert!(inserted.get("indirect").is_none());
    }

    #[test]
    fn test_unreadable_source_is_fatal() {
        let store = MemoryStore {
            fail_read: true,
            ..Default::default()
        };
        assert!(Migrator::new(&store).run().is_err());
    }

    #[test]
    fn test_rerun_duplicates_unless_cleared() {
        let store = MemoryStore {
            raw: vec![record("direct", "a", "b")],
            ..Default::default()
        };
        let migrator = Migrator::new(&store);

        migrator.run().unwrap();
        migrator.run().unwrap();
        assert_eq!(store.inserted.borrow().get("direct").map(Vec::len), Some(2));

        migrator.clear_typed().unwrap();
        migrator.run().unwrap();
        assert_eq!(store.inserted.borrow().get("direct").map(Vec::len), Some(1));
    }
}
