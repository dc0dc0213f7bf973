//! Field edits applied to both record representations.
//!
//! Only priority and type are editable. An edit locates the record in the
//! in-memory list AND the store document before touching either, so a
//! Not-Found attempt leaves both representations unchanged. Any text value is
//! accepted; priorities outside the documented vocabulary simply rank in the
//! unrecognized tier.

use std::str::FromStr;

use crate::error::MutateError;
use crate::record::{Record, fields};
use crate::store::StoreDocument;

pub type MutateResult<T> = std::result::Result<T, MutateError>;

/// The fixed set of editable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    Priority,
    IncidentType,
}

impl EditableField {
    /// The store tag this field writes to.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Priority => fields::PRIORITY,
            Self::IncidentType => fields::INCIDENT_TYPE,
        }
    }
}

impl FromStr for EditableField {
    type Err = MutateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "priority" | "prioridad" => Ok(Self::Priority),
            "type" | "tipo" => Ok(Self::IncidentType),
            other => Err(MutateError::UnknownField {
                name: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for EditableField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Priority => write!(f, "prioridad"),
            Self::IncidentType => write!(f, "tipo"),
        }
    }
}

/// Apply one field edit to the in-memory record and its store node.
///
/// Both targets are located before either is written. The caller persists
/// the store afterwards.
pub fn apply_edit(
    records: &mut [Record],
    doc: &mut StoreDocument,
    id: &str,
    field: EditableField,
    value: &str,
) -> MutateResult<()> {
    let record_idx = records
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| MutateError::RecordNotFound { id: id.to_string() })?;
    let node_idx = doc
        .records
        .iter()
        .position(|n| n.id == id)
        .ok_or_else(|| MutateError::NodeNotFound { id: id.to_string() })?;

    let value = value.trim();
    records[record_idx].set_field(field.tag(), value);
    doc.records[node_idx].set_field(field.tag(), value);
    tracing::debug!(id, field = %field, value, "applied field edit");
    Ok(())
}
