//! Allow/deny filtering of scanned entries.

use super::Entry;

/// Extension groups commonly found in datasets
pub const EXTS_IMAGE: &[&str] = &["jpg", "png", "gif", "bmp", "tiff"];
pub const EXTS_SIGNAL: &[&str] = &["wav", "mp3", "tmds"];
pub const EXTS_TEXT: &[&str] = &["csv", "txt", "xls", "xlsx"];

/// Criteria combine with AND; entries within one list combine with OR.
/// `None` means no constraint. An exclude list always wins over the
/// include list of the same category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Keep only files (`true`) or only directories (`false`)
    pub is_file: Option<bool>,
    /// Extensions to keep, case-insensitive, leading dots ignored
    pub extensions: Option<Vec<String>>,
    pub extensions_ignore: Option<Vec<String>>,
    /// Relative directories to keep, exact match
    pub subdirs: Option<Vec<String>>,
    pub subdirs_ignore: Option<Vec<String>>,
}

impl EntryFilter {
    /// Filter that keeps only files
    pub fn files() -> Self {
        Self {
            is_file: Some(true),
            ..Default::default()
        }
    }

    /// True when no criterion is set besides `is_file`
    pub fn is_unconstrained(&self) -> bool {
        self.extensions.is_none()
            && self.extensions_ignore.is_none()
            && self.subdirs.is_none()
            && self.subdirs_ignore.is_none()
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        if let Some(is_file) = self.is_file {
            if entry.is_file != is_file {
                return false;
            }
        }

        if let Some(ref exts) = self.extensions {
            if !exts.iter().any(|e| extension_matches(e, &entry.extension)) {
                return false;
            }
        }

        if let Some(ref exts) = self.extensions_ignore {
            if exts.iter().any(|e| extension_matches(e, &entry.extension)) {
                return false;
            }
        }

        if let Some(ref subdirs) = self.subdirs {
            if !subdirs.iter().any(|s| *s == entry.relative_dir) {
                return false;
            }
        }

        if let Some(ref subdirs) = self.subdirs_ignore {
            if subdirs.iter().any(|s| *s == entry.relative_dir) {
                return false;
            }
        }

        true
    }

    /// One flag per entry, aligned with the input
    pub fn mask(&self, entries: &[Entry]) -> Vec<bool> {
        entries.iter().map(|e| self.matches(e)).collect()
    }

    /// Matching entries, source order preserved
    pub fn apply<'a>(&self, entries: &'a [Entry]) -> Vec<&'a Entry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Strips spaces and leading dots from an extension token and lower-cases it.
pub fn normalize_extension(token: &str) -> String {
    token.trim().trim_start_matches('.').trim().to_lowercase()
}

/// Splits `jpg, .png` style lists into normalized extensions.
pub fn parse_extensions(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(normalize_extension)
        .filter(|e| !e.is_empty())
        .collect()
}

fn extension_matches(token: &str, extension: &str) -> bool {
    normalize_extension(token) == extension.to_lowercase()
}
