//! Directory health summary: depth, empty folders, extensions, duplicates.

use super::scanner::ScanReport;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Files sharing a name and size
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub name: String,
    pub size: u64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub n_dirs: usize,
    pub n_files: usize,
    /// Deepest directory level below the root
    pub max_depth: usize,
    /// Directories with no entries at all
    pub empty_dirs: Vec<PathBuf>,
    /// (extension, file count), most common first
    pub extensions: Vec<(String, usize)>,
    /// Possibly duplicated files, most repeated first
    pub duplicates: Vec<DuplicateGroup>,
}

impl Inspection {
    /// Summarizes a scan. Duplicate detection needs entry sizes, so scan
    /// with metadata to get it.
    pub fn from_report(report: &ScanReport) -> Self {
        let non_empty: HashSet<&str> = report
            .entries
            .iter()
            .map(|e| e.relative_dir.as_str())
            .collect();
        // Unreadable directories have unknown contents.
        let unreadable: HashSet<&PathBuf> = report.skipped.iter().map(|s| &s.path).collect();

        let mut n_dirs = 0;
        let mut max_depth = 0;
        let mut empty_dirs = Vec::new();
        for dir in report.dirs() {
            n_dirs += 1;
            let path = dir.relative_path();
            max_depth = max_depth.max(dir.depth() + 1);
            if !non_empty.contains(path.as_str()) && !unreadable.contains(&dir.absolute_path) {
                empty_dirs.push(dir.absolute_path.clone());
            }
        }

        let mut ext_counts: HashMap<&str, usize> = HashMap::new();
        let mut dup_counts: HashMap<(&str, u64), usize> = HashMap::new();
        let mut n_files = 0;
        for file in report.files() {
            n_files += 1;
            *ext_counts.entry(file.extension.as_str()).or_default() += 1;
            if let Some(size) = file.size {
                *dup_counts.entry((file.name.as_str(), size)).or_default() += 1;
            }
        }

        let mut extensions: Vec<(String, usize)> = ext_counts
            .into_iter()
            .map(|(ext, n)| (ext.to_string(), n))
            .collect();
        extensions.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut duplicates: Vec<DuplicateGroup> = dup_counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|((name, size), count)| DuplicateGroup {
                name: name.to_string(),
                size,
                count,
            })
            .collect();
        duplicates.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        Inspection {
            n_dirs,
            n_files,
            max_depth,
            empty_dirs,
            extensions,
            duplicates,
        }
    }

    /// Human-readable report lines
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Total {} directories are found.", self.n_dirs),
            format!("  - Maximum depth is {}.", self.max_depth),
        ];
        if !self.empty_dirs.is_empty() {
            lines.push(format!("  - {} directories are empty.", self.empty_dirs.len()));
            for dir in &self.empty_dirs {
                lines.push(format!("    . '{}' is empty", dir.display()));
            }
        }

        lines.push(format!("Total {} files are found.", self.n_files));
        lines.push(format!("  - {} extensions are found.", self.extensions.len()));
        for (ext, n) in &self.extensions {
            let shown = if ext.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{ext}")
            };
            lines.push(format!("    . '{shown}' {n} files."));
        }

        if !self.duplicates.is_empty() {
            lines.push(format!(
                "  - {} files might be duplicated.",
                self.duplicates.len()
            ));
            for dup in &self.duplicates {
                lines.push(format!(
                    "    . {} '{}' ({} bytes) found.",
                    dup.count, dup.name, dup.size
                ));
            }
        }
        lines
    }
}
