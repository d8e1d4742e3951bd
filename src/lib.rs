//! Dircat - catalog dataset directories into labeled tables
//!
//! This crate scans a directory tree, turns each entry's parent folders
//! into label columns, filters and sorts the result with a dataset-aware
//! ordering, and encodes label columns into integer codes.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

// Re-export primary types for convenience
pub use config::UserConfig;
pub use domain::{
    build_table, encode_labels, scan, CodedLabels, EncodeMode, Encoded, Entry, EntryFilter,
    Inspection, LabelHierarchy, OutputShape, ScanOptions, ScanReport, SemanticOrder, Table,
    TableOptions,
};
pub use error::{DircatError, Result};
