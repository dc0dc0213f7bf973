//! # incidencias
//!
//! An incident record store: flat spreadsheet exports become a tag-based
//! hierarchical XML store, with browsing, aggregate statistics, limited
//! mutation, and reconciled export to a secondary JSON collection.
//!
//! ## Pipeline
//!
//! - **Conversion** (`convert`): CSV rows → identity-bearing record nodes,
//!   column headers normalized into structural tags (`tag`)
//! - **Classification** (`temporal`): tolerant two-format date parsing with
//!   a reject-future policy, against an injected `now`
//! - **Ranking** (`rank`): priority tier, then timestamp, stable
//! - **Aggregation** (`stats`): grouped counts and floor percentages
//! - **Reconciled export** (`export`): identity-based merge into a JSON
//!   collection, existing entries win
//! - **Mutation** (`mutate`): priority/type edits applied to both the
//!   in-memory view and the persisted store
//!
//! ## Library usage
//!
//! ```no_run
//! use incidencias::session::{Session, SessionConfig};
//! use incidencias::record::fields;
//!
//! let session = Session::open(SessionConfig {
//!     store_path: "incidencies.xml".into(),
//!     now: chrono::Local::now().naive_local(),
//! }).unwrap();
//! for group in session.count_by(fields::INCIDENT_TYPE, "tipo") {
//!     println!("{}: {} ({}%)", group.value, group.count, group.pct);
//! }
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod mutate;
pub mod rank;
pub mod record;
pub mod session;
pub mod stats;
pub mod store;
pub mod tag;
pub mod temporal;
