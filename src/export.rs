//! Reconciled export to a secondary JSON collection.
//!
//! The secondary format is an array of flat string-valued objects, one per
//! record, independent of the hierarchical store. A resolved timestamp is
//! rendered as `YYYY-MM-DD HH:MM:SS` text (lexically sortable), never as an
//! internal value.
//!
//! Merge mode reconciles by identity with an existing-wins policy: the batch
//! never overwrites a previously persisted entry. Records without a usable
//! identity are tagged with synthetic placeholders scoped to the single
//! reconciliation pass and are never deduplicated against each other.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::ExportError;
use crate::record::Record;
use crate::store::write_atomic;
use crate::temporal::EXPORT_FORMAT;

pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Key carrying the record identity in exported entries.
pub const ID_KEY: &str = "id";
/// Key carrying the rendered timestamp, present only when resolved.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// How the exporter treats the target collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Target must not exist; the batch is written verbatim.
    Create,
    /// Target is replaced entirely with the batch.
    Overwrite,
    /// Union by identity; existing entries win on conflict.
    Merge,
}

impl FromStr for ExportMode {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "overwrite" => Ok(Self::Overwrite),
            "merge" => Ok(Self::Merge),
            other => Err(ExportError::UnknownMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ExportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Overwrite => write!(f, "overwrite"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// Counts reported after an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// New-batch records admitted under their own identity.
    pub admitted: usize,
    /// New-batch records dropped because their identity already existed.
    pub skipped_duplicates: usize,
    /// New-batch records admitted under a synthetic placeholder identity.
    pub unidentified: usize,
    /// Entries in the resulting collection.
    pub total: usize,
}

/// Export a record batch to `path` under the given mode.
pub fn export_records(
    records: &[Record],
    path: &Path,
    mode: ExportMode,
) -> ExportResult<ExportReport> {
    match mode {
        ExportMode::Create => {
            if path.exists() {
                return Err(ExportError::TargetExists {
                    path: path.display().to_string(),
                });
            }
            write_batch(records, path)
        }
        ExportMode::Overwrite => write_batch(records, path),
        ExportMode::Merge => merge(records, path),
    }
}

fn write_batch(records: &[Record], path: &Path) -> ExportResult<ExportReport> {
    let entries: Vec<Map<String, Value>> = records.iter().map(entry_for).collect();
    write_collection(&entries, path)?;
    tracing::info!(path = %path.display(), total = entries.len(), "wrote export collection");
    Ok(ExportReport {
        admitted: records.len(),
        total: records.len(),
        ..Default::default()
    })
}

fn merge(records: &[Record], path: &Path) -> ExportResult<ExportReport> {
    let text = std::fs::read_to_string(path).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let existing = parse_collection(&text)?;

    // Synthetic identity counters are scoped to this single pass. Every
    // natural identity in the collection is registered before any placeholder
    // is minted, so a placeholder can never shadow an identity that appears
    // later in document order.
    let mut seen: HashSet<String> = existing
        .iter()
        .filter_map(|entry| entry.get(ID_KEY).and_then(Value::as_str))
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    let mut existing_unidentified = 0usize;
    let mut new_unidentified = 0usize;

    let mut result: Vec<Map<String, Value>> = Vec::with_capacity(existing.len() + records.len());
    for mut entry in existing {
        let blank = entry
            .get(ID_KEY)
            .and_then(Value::as_str)
            .is_none_or(|id| id.trim().is_empty());
        if blank {
            let synthetic =
                synthetic_id("existing-unidentified", &mut existing_unidentified, &seen);
            entry.insert(ID_KEY.to_string(), Value::String(synthetic.clone()));
            seen.insert(synthetic);
        }
        result.push(entry);
    }

    let mut report = ExportReport::default();
    for record in records {
        let id = record.id.trim();
        if id.is_empty() {
            let synthetic = synthetic_id("new-unidentified", &mut new_unidentified, &seen);
            let mut entry = entry_for(record);
            entry.insert(ID_KEY.to_string(), Value::String(synthetic.clone()));
            seen.insert(synthetic);
            result.push(entry);
            report.unidentified += 1;
        } else if seen.contains(id) {
            report.skipped_duplicates += 1;
        } else {
            seen.insert(id.to_string());
            result.push(entry_for(record));
            report.admitted += 1;
        }
    }

    write_collection(&result, path)?;
    report.total = result.len();
    tracing::info!(
        path = %path.display(),
        admitted = report.admitted,
        skipped = report.skipped_duplicates,
        unidentified = report.unidentified,
        total = report.total,
        "reconciled export collection"
    );
    Ok(report)
}

/// Next placeholder identity from a pass-scoped counter, skipping any value
/// already present in the collection so placeholders never collide.
fn synthetic_id(prefix: &str, counter: &mut usize, seen: &HashSet<String>) -> String {
    loop {
        *counter += 1;
        let candidate = format!("{prefix}-{counter}");
        if !seen.contains(&candidate) {
            return candidate;
        }
    }
}

/// One flat entry: identity, every field, plus the rendered timestamp.
fn entry_for(record: &Record) -> Map<String, Value> {
    let mut entry = Map::new();
    entry.insert(ID_KEY.to_string(), Value::String(record.id.clone()));
    for (tag, value) in record.fields() {
        entry.insert(tag.clone(), Value::String(value.clone()));
    }
    if let Some(dt) = record.timestamp {
        entry.insert(
            TIMESTAMP_KEY.to_string(),
            Value::String(dt.format(EXPORT_FORMAT).to_string()),
        );
    }
    entry
}

fn parse_collection(text: &str) -> ExportResult<Vec<Map<String, Value>>> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ExportError::InvalidCollection {
            message: e.to_string(),
        })?;
    let Value::Array(items) = value else {
        return Err(ExportError::InvalidCollection {
            message: "top-level value is not an array".to_string(),
        });
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            other => Err(ExportError::InvalidCollection {
                message: format!("entry is not an object: {other}"),
            }),
        })
        .collect()
}

fn write_collection(entries: &[Map<String, Value>], path: &Path) -> ExportResult<()> {
    let mut json = serde_json::to_string_pretty(entries).map_err(|e| {
        ExportError::InvalidCollection {
            message: format!("failed to serialize collection: {e}"),
        }
    })?;
    json.push('\n');
    write_atomic(path, json.as_bytes()).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
