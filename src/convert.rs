//! Tabular-to-hierarchical conversion: CSV in, record store out.
//!
//! Each data row becomes one record node whose identity is the row's 1-based
//! position; each declared header becomes a child holding the row's trimmed
//! value (empty input maps to empty text, never omitted). Headers that
//! collide after normalization abort the conversion instead of silently
//! overwriting each other.

use std::path::Path;

use crate::error::ConvertError;
use crate::store::{RecordNode, StoreDocument};
use crate::tag::safe_tag;

pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// Counts reported after a successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertReport {
    pub records: usize,
    pub fields: usize,
}

/// Convert a CSV file into a store document without writing it out.
pub fn read_table(input: &Path) -> ConvertResult<StoreDocument> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(input)
        .map_err(|e| ConvertError::Csv { source: e })?;

    let headers = reader
        .headers()
        .map_err(|e| ConvertError::Csv { source: e })?
        .clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ConvertError::MissingHeader);
    }

    let tags: Vec<String> = headers.iter().map(safe_tag).collect();
    for (i, tag) in tags.iter().enumerate() {
        if let Some(j) = tags[..i].iter().position(|t| t == tag) {
            return Err(ConvertError::DuplicateTag {
                tag: tag.clone(),
                first: headers.get(j).unwrap_or("").to_string(),
                second: headers.get(i).unwrap_or("").to_string(),
            });
        }
    }

    let mut doc = StoreDocument::new();
    for (row_idx, row) in reader.records().enumerate() {
        let row = row.map_err(|e| ConvertError::Csv { source: e })?;
        let mut node = RecordNode::new((row_idx + 1).to_string());
        for (col, tag) in tags.iter().enumerate() {
            let value = row.get(col).unwrap_or("").trim();
            node.fields.push((tag.clone(), value.to_string()));
        }
        doc.records.push(node);
    }
    Ok(doc)
}

/// Convert a CSV file and write the store document to `output`.
pub fn csv_to_store(input: &Path, output: &Path) -> ConvertResult<ConvertReport> {
    let doc = read_table(input)?;
    let fields = doc.records.first().map(|n| n.fields.len()).unwrap_or(0);
    let records = doc.records.len();
    doc.save(output)?;
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        records,
        fields,
        "converted tabular input to record store"
    );
    Ok(ConvertReport { records, fields })
}
