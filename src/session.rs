//! Session facade: one run over the record store.
//!
//! A [`Session`] is constructed once per run and owns everything the UI layer
//! needs: the store handle, the parsed document, and the classified, ranked
//! valid record list. There is no process-global state; `now` is injected
//! through [`SessionConfig`] so classification is repeatable under test.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::error::IncidentResult;
use crate::export::{ExportMode, ExportReport, export_records};
use crate::mutate::{EditableField, apply_edit};
use crate::rank::rank;
use crate::record::{Record, fields};
use crate::stats::{GroupCount, TemporalBreakdown, count_by, filter_by};
use crate::store::StoreDocument;
use crate::temporal::{Classification, classify};

/// Configuration for opening a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Path of the hierarchical record store.
    pub store_path: PathBuf,
    /// Classification reference time, injected by the caller.
    pub now: NaiveDateTime,
}

/// One run's view of the record universe.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    doc: StoreDocument,
    valid: Vec<Record>,
    undated: usize,
    future: usize,
}

impl Session {
    /// Load the store, classify every record against `config.now`, and rank
    /// the valid set.
    ///
    /// Future-dated records are dropped from the valid list and only
    /// tallied; undated records stay in, unordered by date.
    pub fn open(config: SessionConfig) -> IncidentResult<Self> {
        let doc = StoreDocument::load(&config.store_path)?;

        let mut valid = Vec::with_capacity(doc.records.len());
        let mut undated = 0usize;
        let mut future = 0usize;
        for node in &doc.records {
            let mut record = Record::from_node(node);
            match classify(
                record.field(fields::DATE),
                record.field(fields::TIME),
                config.now,
            ) {
                Classification::Dated(dt) => {
                    record.timestamp = Some(dt);
                    valid.push(record);
                }
                Classification::Undated => {
                    undated += 1;
                    valid.push(record);
                }
                Classification::Future => future += 1,
            }
        }
        rank(&mut valid);

        tracing::info!(
            store = %config.store_path.display(),
            records = doc.records.len(),
            valid = valid.len(),
            undated,
            future,
            "session opened"
        );
        Ok(Self {
            config,
            doc,
            valid,
            undated,
            future,
        })
    }

    /// The ranked valid record list (dated and undated).
    pub fn valid(&self) -> &[Record] {
        &self.valid
    }

    /// Look up a valid record by identity.
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.valid.iter().find(|r| r.id == id)
    }

    /// Valid records whose field (or placeholder) equals `value`, in rank order.
    pub fn filter_by(&self, tag: &str, label: &str, value: &str) -> Vec<&Record> {
        filter_by(&self.valid, tag, label, value)
    }

    /// Grouped frequency counts over a field of the valid set.
    pub fn count_by(&self, tag: &str, label: &str) -> Vec<GroupCount> {
        count_by(&self.valid, tag, label)
    }

    /// Classification tallies for the whole ingested universe.
    pub fn breakdown(&self) -> TemporalBreakdown {
        TemporalBreakdown {
            valid: self.valid.len(),
            undated: self.undated,
            future: self.future,
        }
    }

    /// Edit one record's field in both representations and persist the store.
    pub fn set_field(
        &mut self,
        id: &str,
        field: EditableField,
        value: &str,
    ) -> IncidentResult<()> {
        apply_edit(&mut self.valid, &mut self.doc, id, field, value)?;
        self.doc.save(&self.config.store_path)?;
        Ok(())
    }

    /// Export the valid set to the secondary collection at `path`.
    pub fn export(&self, path: &std::path::Path, mode: ExportMode) -> IncidentResult<ExportReport> {
        Ok(export_records(&self.valid, path, mode)?)
    }

    /// Path of the backing store.
    pub fn store_path(&self) -> &std::path::Path {
        &self.config.store_path
    }
}
