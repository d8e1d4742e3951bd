//! Recursive directory scanning.

use super::Entry;
use crate::error::{DircatError, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Options for a scan
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Stat every entry for size and timestamps
    pub with_metadata: bool,
}

/// A subtree left out of the scan because it could not be read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDir {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything one scan found
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Canonical scan root
    pub root: PathBuf,
    /// Every file and directory below the root, in traversal order
    pub entries: Vec<Entry>,
    /// Subtrees skipped because of permission errors
    pub skipped: Vec<SkippedDir>,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_file)
    }

    pub fn dirs(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.is_file)
    }
}

/// Walks `root` depth-first and records every entry below it.
///
/// Symlinks are followed. A link that does not resolve (dangling, or
/// pointing at itself) is recorded as neither file nor directory.
///
/// # Errors
/// - `NotFound` if `root` is missing or not a directory
/// - `PermissionDenied` if `root` itself cannot be read
/// - `SymlinkCycle` if a link points back at one of its ancestors
/// - `DirectoryRevisited` if a directory is reached a second time
/// - `Io` for any other filesystem failure
///
/// Entries that cannot be read for lack of permission are skipped,
/// logged, and listed in [`ScanReport::skipped`].
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanReport> {
    if !root.is_dir() {
        return Err(DircatError::NotFound(root.to_path_buf()));
    }
    let root = fs::canonicalize(root).map_err(|e| DircatError::io(root, e))?;

    let mut walker = Walker {
        visited: HashSet::from([root.clone()]),
        root,
        options: *options,
        entries: Vec::new(),
        skipped: Vec::new(),
    };

    for item in WalkDir::new(&walker.root).follow_links(true).min_depth(1) {
        match item {
            Ok(dir_entry) => walker.record(&dir_entry)?,
            Err(err) => walker.recover(err)?,
        }
    }

    debug!(
        root = %walker.root.display(),
        entries = walker.entries.len(),
        skipped = walker.skipped.len(),
        "scan finished"
    );

    Ok(ScanReport {
        root: walker.root,
        entries: walker.entries,
        skipped: walker.skipped,
    })
}

struct Walker {
    root: PathBuf,
    options: ScanOptions,
    /// Canonical paths of every directory reached so far
    visited: HashSet<PathBuf>,
    entries: Vec<Entry>,
    skipped: Vec<SkippedDir>,
}

impl Walker {
    fn record(&mut self, dir_entry: &DirEntry) -> Result<()> {
        let path = dir_entry.path();
        let file_type = dir_entry.file_type();

        if file_type.is_dir() {
            let canonical = fs::canonicalize(path).map_err(|e| DircatError::io(path, e))?;
            if self.visited.contains(&canonical) {
                return Err(DircatError::DirectoryRevisited {
                    path: path.to_path_buf(),
                    target: canonical,
                });
            }
            self.visited.insert(canonical);
        }

        let mut entry = Entry::new(
            path.to_path_buf(),
            self.relative_dir(path),
            file_type.is_file(),
        );
        if self.options.with_metadata {
            let metadata = dir_entry
                .metadata()
                .map_err(|e| DircatError::io(path, e.into()))?;
            entry = entry.with_metadata(&metadata);
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Decides whether a walk error ends the scan.
    fn recover(&mut self, err: walkdir::Error) -> Result<()> {
        let path = err
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        if err.loop_ancestor().is_some() {
            return Err(DircatError::SymlinkCycle(path));
        }

        let depth = err.depth();
        let source = match err.into_io_error() {
            Some(source) => source,
            None => return Err(DircatError::SymlinkCycle(path)),
        };

        if source.kind() == io::ErrorKind::PermissionDenied {
            if depth == 0 {
                return Err(DircatError::PermissionDenied(path));
            }
            warn!("Skipping unreadable entry {}: {}", path.display(), source);
            self.skipped.push(SkippedDir {
                path,
                reason: source.to_string(),
            });
            return Ok(());
        }

        if path.is_symlink() && fs::metadata(&path).is_err() {
            debug!(link = %path.display(), error = %source, "unresolved symlink");
            let entry = Entry::new(path.clone(), self.relative_dir(&path), false);
            self.entries.push(entry);
            return Ok(());
        }

        Err(DircatError::io(path, source))
    }

    /// `/`-joined directory of `path` relative to the root
    fn relative_dir(&self, path: &Path) -> String {
        path.parent()
            .and_then(|parent| parent.strip_prefix(&self.root).ok())
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_tree(files: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for file in files {
            let path = temp_dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"data").unwrap();
        }
        temp_dir
    }

    fn find<'a>(report: &'a ScanReport, name: &str) -> &'a Entry {
        report.entries.iter().find(|e| e.name == name).unwrap()
    }

    #[test]
    fn test_scan_records_files_and_directories() {
        let temp_dir = make_tree(&["train/OK/a.jpg", "train/NG/b.jpg", "test/OK/c.png"]);

        let report = scan(temp_dir.path(), &ScanOptions::default()).unwrap();

        // 2 splits + 3 label dirs + 3 files
        assert_eq!(report.entries.len(), 8);
        assert_eq!(report.files().count(), 3);
        assert_eq!(report.dirs().count(), 5);
        assert!(report.is_complete());
    }

    #[test]
    fn test_scan_relative_dirs() {
        let temp_dir = make_tree(&["train/OK/a.jpg", "top.txt"]);

        let report = scan(temp_dir.path(), &ScanOptions::default()).unwrap();

        assert_eq!(find(&report, "train").relative_dir, "");
        assert_eq!(find(&report, "OK").relative_dir, "train");
        assert_eq!(find(&report, "a.jpg").relative_dir, "train/OK");
        assert_eq!(find(&report, "a.jpg").depth(), 2);
        assert_eq!(find(&report, "top.txt").relative_dir, "");
    }

    #[test]
    fn test_scan_absolute_paths_under_canonical_root() {
        let temp_dir = make_tree(&["sub/a.txt"]);

        let report = scan(temp_dir.path(), &ScanOptions::default()).unwrap();
        let entry = find(&report, "a.txt");

        assert_eq!(report.root, fs::canonicalize(temp_dir.path()).unwrap());
        assert!(entry.absolute_path.starts_with(&report.root));
        assert!(entry.absolute_path.is_absolute());
    }

    #[test]
    fn test_scan_extension_and_type() {
        let temp_dir = make_tree(&["a/photo.JPEG"]);

        let report = scan(temp_dir.path(), &ScanOptions::default()).unwrap();

        let file = find(&report, "photo.JPEG");
        assert!(file.is_file);
        assert_eq!(file.extension, "jpeg");

        let dir = find(&report, "a");
        assert!(!dir.is_file);
        assert_eq!(dir.extension, "");
    }

    #[test]
    fn test_scan_metadata_is_optional() {
        let temp_dir = make_tree(&["a.txt"]);

        let without = scan(temp_dir.path(), &ScanOptions::default()).unwrap();
        assert!(find(&without, "a.txt").size.is_none());

        let with = scan(temp_dir.path(), &ScanOptions { with_metadata: true }).unwrap();
        let entry = find(&with, "a.txt");
        assert_eq!(entry.size, Some(4));
        assert!(entry.modified_at.is_some());
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let report = scan(temp_dir.path(), &ScanOptions::default()).unwrap();

        assert!(report.entries.is_empty());
    }

    #[test]
    fn test_scan_nonexistent_root() {
        let result = scan(Path::new("/nonexistent/directory/12345"), &ScanOptions::default());
        assert!(matches!(result, Err(DircatError::NotFound(_))));
    }

    #[test]
    fn test_scan_root_is_a_file() {
        let temp_dir = make_tree(&["a.txt"]);
        let result = scan(&temp_dir.path().join("a.txt"), &ScanOptions::default());
        assert!(matches!(result, Err(DircatError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_symlink_cycle_aborts() {
        use std::os::unix::fs::symlink;

        let temp_dir = make_tree(&["a/file.txt"]);
        symlink(temp_dir.path(), temp_dir.path().join("a").join("loop")).unwrap();

        let result = scan(temp_dir.path(), &ScanOptions::default());
        assert!(matches!(result, Err(DircatError::SymlinkCycle(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_dangling_symlink_is_not_a_file() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        symlink(temp_dir.path().join("missing"), temp_dir.path().join("broken")).unwrap();

        let report = scan(temp_dir.path(), &ScanOptions::default()).unwrap();
        let entry = find(&report, "broken");
        assert!(!entry.is_file);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_self_referencing_symlink_is_kept() {
        use std::os::unix::fs::symlink;

        let temp_dir = make_tree(&["a.jpg"]);
        let me = temp_dir.path().join("me");
        symlink(&me, &me).unwrap();

        let report = scan(temp_dir.path(), &ScanOptions::default()).unwrap();

        assert!(!find(&report, "me").is_file);
        assert!(find(&report, "a.jpg").is_file);
        assert!(report.is_complete());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_directory_reached_twice_aborts() {
        use std::os::unix::fs::symlink;

        let temp_dir = make_tree(&["a/x.txt", "b/y.txt"]);
        symlink(temp_dir.path().join("b"), temp_dir.path().join("a").join("link")).unwrap();

        let err = scan(temp_dir.path(), &ScanOptions::default()).unwrap_err();

        assert!(matches!(err, DircatError::DirectoryRevisited { .. }));
        assert!(err.to_string().contains("already visited"));
    }

    #[cfg(unix)]
    mod permission_tests {
        use super::*;
        use crate::domain::table::{table_from_report, TableOptions};
        use std::os::unix::fs::{symlink, PermissionsExt};

        fn set_mode(path: &Path, mode: u32) {
            fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
        }

        #[test]
        fn test_unreadable_subdirectory_is_skipped() {
            let temp_dir = make_tree(&["open/a.jpg", "locked/b.jpg"]);
            let locked = temp_dir.path().join("locked");
            set_mode(&locked, 0o000);
            if fs::read_dir(&locked).is_ok() {
                // Permission bits do not bind this user (root).
                set_mode(&locked, 0o755);
                return;
            }

            let report = scan(temp_dir.path(), &ScanOptions::default());
            set_mode(&locked, 0o755);
            let report = report.unwrap();

            assert_eq!(report.skipped.len(), 1);
            assert_eq!(report.skipped[0].path, report.root.join("locked"));
            assert!(!report.is_complete());
            assert!(report.entries.iter().any(|e| e.name == "locked"));
            assert!(report.entries.iter().any(|e| e.name == "a.jpg"));
            assert!(!report.entries.iter().any(|e| e.name == "b.jpg"));

            let skipped = report.skipped.clone();
            let table = table_from_report(report, &TableOptions::default()).unwrap();
            assert_eq!(table.skipped, skipped);
            assert_eq!(table.len(), 1);
        }

        #[test]
        fn test_symlink_into_unreadable_directory_is_skipped() {
            let outer = TempDir::new().unwrap();
            let data = outer.path().join("data");
            let locked = outer.path().join("locked");
            fs::create_dir_all(locked.join("target")).unwrap();
            fs::create_dir_all(&data).unwrap();
            fs::write(data.join("a.jpg"), b"data").unwrap();
            symlink(locked.join("target"), data.join("link")).unwrap();

            set_mode(&locked, 0o000);
            if fs::metadata(data.join("link")).is_ok() {
                set_mode(&locked, 0o755);
                return;
            }

            let report = scan(&data, &ScanOptions::default());
            set_mode(&locked, 0o755);
            let report = report.unwrap();

            assert_eq!(report.skipped.len(), 1);
            assert_eq!(report.skipped[0].path, report.root.join("link"));
            assert!(report.entries.iter().any(|e| e.name == "a.jpg"));
            assert!(!report.entries.iter().any(|e| e.name == "link"));
        }

        #[test]
        fn test_unreadable_root_is_an_error() {
            let temp_dir = make_tree(&["a.jpg"]);
            set_mode(temp_dir.path(), 0o000);
            if fs::read_dir(temp_dir.path()).is_ok() {
                set_mode(temp_dir.path(), 0o755);
                return;
            }

            let result = scan(temp_dir.path(), &ScanOptions::default());
            set_mode(temp_dir.path(), 0o755);

            assert!(matches!(result, Err(DircatError::PermissionDenied(_))));
        }
    }
}
