//! Core library for the price-audit command line application.
//!
//! The library reconciles a catalogue export carrying markup descriptions
//! with a marketplace listing carrying plain-text descriptions. Text
//! transformations live under [`text`], the identifier join in [`join`], the
//! batch scheduler in [`reconcile`], file adapters under [`io`] and the
//! file-to-file orchestration in [`sync`].

pub mod cache;
pub mod config;
pub mod error;
pub mod io;
pub mod join;
pub mod model;
pub mod reconcile;
pub mod sync;
pub mod text;

pub use config::{ReadOptions, ReconcileConfig};
pub use error::{Result, RowError, ToolError};
pub use model::{MatchedPair, ReconciliationResult, Table};
pub use reconcile::{BatchProgress, Reconciler};
