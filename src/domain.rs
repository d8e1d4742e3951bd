pub mod encoder;
pub mod filter;
pub mod inspect;
pub mod labeler;
pub mod ordering;
pub mod scanner;
pub mod table;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub use encoder::{encode_labels, CodeTable, CodedLabels, EncodeMode, Encoded, OutputShape};
pub use filter::EntryFilter;
pub use inspect::Inspection;
pub use labeler::LabelHierarchy;
pub use ordering::{natural_cmp, SemanticOrder};
pub use scanner::{scan, ScanOptions, ScanReport, SkippedDir};
pub use table::{build_table, Row, Table, TableOptions, Value};

/// One filesystem node found during a scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub absolute_path: PathBuf,
    /// Parent directory relative to the scan root, `/`-separated; `""` at the root
    pub relative_dir: String,
    pub name: String,
    /// Lower-cased, without the leading dot; empty for directories
    pub extension: String,
    pub is_file: bool,
    pub size: Option<u64>,
    pub accessed_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Builds an entry without touching file metadata.
    pub fn new(absolute_path: PathBuf, relative_dir: String, is_file: bool) -> Self {
        let name = absolute_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = if is_file {
            extension_of(&absolute_path)
        } else {
            String::new()
        };

        Entry {
            absolute_path,
            relative_dir,
            name,
            extension,
            is_file,
            size: None,
            accessed_at: None,
            modified_at: None,
            created_at: None,
        }
    }

    /// Fills size and timestamps from a stat call.
    pub fn with_metadata(mut self, metadata: &fs::Metadata) -> Self {
        self.size = Some(metadata.len());
        self.accessed_at = metadata.accessed().ok().map(DateTime::<Utc>::from);
        self.modified_at = metadata.modified().ok().map(DateTime::<Utc>::from);
        self.created_at = metadata.created().ok().map(DateTime::<Utc>::from);
        self
    }

    /// Number of directory levels between the scan root and this entry
    pub fn depth(&self) -> usize {
        labeler::depth_of(&self.relative_dir)
    }

    /// `relative_dir` joined with the entry name
    pub fn relative_path(&self) -> String {
        if self.relative_dir.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.relative_dir, self.name)
        }
    }
}

/// Lower-cased extension without the dot; dotfiles like `.bashrc` have none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
