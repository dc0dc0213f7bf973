//! Rich diagnostic error types for the incidencias pipeline.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know exactly what went wrong and
//! how to fix it. Every error is recoverable at the process level: the triggering
//! operation aborts cleanly and leaves the persisted stores untouched.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the incidencias pipeline.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source chains) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum IncidentError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Mutate(#[from] MutateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Conversion errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConvertError {
    #[error("tabular input has no header row")]
    #[diagnostic(
        code(incid::convert::missing_header),
        help(
            "The first row of the CSV must name the columns. \
             An empty file or a blank first row cannot be converted."
        )
    )]
    MissingHeader,

    #[error("headers \"{first}\" and \"{second}\" both normalize to tag <{tag}>")]
    #[diagnostic(
        code(incid::convert::duplicate_tag),
        help(
            "Two column headers differ only in characters that are stripped during \
             tag normalization, so their values would overwrite each other. \
             Rename one of the columns to make it distinct."
        )
    )]
    DuplicateTag {
        tag: String,
        first: String,
        second: String,
    },

    #[error("failed to read tabular input: {source}")]
    #[diagnostic(
        code(incid::convert::csv),
        help("Check that the input file exists and is valid CSV.")
    )]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("record store not found: {path}")]
    #[diagnostic(
        code(incid::store::missing),
        help(
            "A session cannot start without the record store. \
             Create it first with `incidencias convert --input <csv>`."
        )
    )]
    Missing { path: String },

    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(incid::store::io),
        help(
            "A filesystem operation failed. Check that the path is valid, \
             you have read/write permissions, and the disk is not full."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record store: {message}")]
    #[diagnostic(
        code(incid::store::malformed),
        help(
            "The store document could not be parsed as a root container of \
             record nodes. If it was edited by hand, restore it or re-run the \
             conversion from the original tabular input."
        )
    )]
    Malformed { message: String },
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("export target already exists: {path}")]
    #[diagnostic(
        code(incid::export::target_exists),
        help(
            "Create mode refuses to replace an existing collection. \
             Use overwrite mode to replace it, or merge mode to reconcile into it."
        )
    )]
    TargetExists { path: String },

    #[error("existing collection is not a sequence of records: {message}")]
    #[diagnostic(
        code(incid::export::invalid_collection),
        help(
            "Merge mode expects the target to be a JSON array of flat record \
             objects. Nothing was written. Fix or remove the target file, \
             or export with overwrite mode."
        )
    )]
    InvalidCollection { message: String },

    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(incid::export::io),
        help("Check that the destination path is valid and writable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown export mode: \"{mode}\"")]
    #[diagnostic(
        code(incid::export::unknown_mode),
        help("Valid modes are: create, overwrite, merge.")
    )]
    UnknownMode { mode: String },
}

// ---------------------------------------------------------------------------
// Mutation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum MutateError {
    #[error("no record with id \"{id}\" in the valid set")]
    #[diagnostic(
        code(incid::mutate::record_not_found),
        help(
            "The identity must match a record in the current session's valid \
             list. Future-dated records are excluded from it. \
             List records with `incidencias list` to see the known identities."
        )
    )]
    RecordNotFound { id: String },

    #[error("no store node with id \"{id}\"")]
    #[diagnostic(
        code(incid::mutate::node_not_found),
        help(
            "The record exists in memory but its node is missing from the \
             store document. The store file may have been modified externally; \
             re-open the session."
        )
    )]
    NodeNotFound { id: String },

    #[error("field \"{name}\" is not editable")]
    #[diagnostic(
        code(incid::mutate::unknown_field),
        help("Editable fields are: priority (prioridad), type (tipo).")
    )]
    UnknownField { name: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    #[diagnostic(
        code(incid::config::io),
        help("Check that the config file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    #[diagnostic(
        code(incid::config::parse),
        help("The config file must be valid TOML with string path fields.")
    )]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Convenience alias for functions returning incidencias results.
pub type IncidentResult<T> = std::result::Result<T, IncidentError>;
