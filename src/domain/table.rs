//! The labeled file table: scan, label, filter, sort.

use super::filter::EntryFilter;
use super::labeler::LabelHierarchy;
use super::ordering::{natural_cmp, SemanticOrder};
use super::scanner::{scan, ScanOptions, ScanReport, SkippedDir};
use super::Entry;
use crate::error::{DircatError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const COL_FILENAME: &str = "filename";
pub const COL_FILEPATH: &str = "filepath";
pub const META_COLUMNS: [&str; 4] = ["size", "modified", "accessed", "created"];

/// How to build a [`Table`]
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Names for the label columns, shallowest first
    pub hierarchy: Option<Vec<String>>,
    pub filter: EntryFilter,
    /// Add size and timestamp columns
    pub include_meta: bool,
    /// Emit `filepath` relative to the scan root
    pub relpath: bool,
    pub order: SemanticOrder,
    /// Fail with `EmptyResult` instead of returning an empty table
    pub require_non_empty: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            hierarchy: None,
            filter: EntryFilter::files(),
            include_meta: false,
            relpath: false,
            order: SemanticOrder::default(),
            require_non_empty: false,
        }
    }
}

/// A single cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Str(String),
    Int(u64),
    DateTime(DateTime<Utc>),
}

impl Value {
    fn from_opt_str(value: Option<&String>) -> Self {
        value.map_or(Value::Null, |s| Value::Str(s.clone()))
    }

    fn from_opt_time(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Value::Null, Value::DateTime)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Str(s) => write!(f, "{s}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::DateTime(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

/// One table row: an entry plus its label columns
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub labels: Vec<Option<String>>,
    pub entry: Entry,
    pub filepath: String,
}

impl Row {
    pub fn filename(&self) -> &str {
        &self.entry.name
    }
}

/// Labeled, sorted view over one scan
#[derive(Debug, Clone)]
pub struct Table {
    pub root: PathBuf,
    pub hierarchy: LabelHierarchy,
    pub include_meta: bool,
    pub rows: Vec<Row>,
    /// Category order of every label column
    pub categories: Vec<Vec<String>>,
    /// Subtrees the scan could not read
    pub skipped: Vec<SkippedDir>,
}

impl Table {
    /// Label columns, then `filename` and `filepath`, then metadata columns
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.hierarchy.columns().to_vec();
        columns.push(COL_FILENAME.to_string());
        columns.push(COL_FILEPATH.to_string());
        if self.include_meta {
            columns.extend(META_COLUMNS.iter().map(|c| c.to_string()));
        }
        columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of row `index`, aligned with [`Table::columns`]
    pub fn values(&self, index: usize) -> Option<Vec<Value>> {
        let row = self.rows.get(index)?;
        let mut values: Vec<Value> = row
            .labels
            .iter()
            .map(|l| Value::from_opt_str(l.as_ref()))
            .collect();
        values.push(Value::Str(row.entry.name.clone()));
        values.push(Value::Str(row.filepath.clone()));
        if self.include_meta {
            let entry = &row.entry;
            values.push(entry.size.map_or(Value::Null, Value::Int));
            values.push(Value::from_opt_time(entry.modified_at));
            values.push(Value::from_opt_time(entry.accessed_at));
            values.push(Value::from_opt_time(entry.created_at));
        }
        Some(values)
    }

    /// Values of one label column, row order
    pub fn column(&self, name: &str) -> Option<Vec<Option<String>>> {
        let idx = self.hierarchy.position(name)?;
        Some(self.rows.iter().map(|r| r.labels[idx].clone()).collect())
    }

    /// Categories of one label column
    pub fn categories_of(&self, name: &str) -> Option<&[String]> {
        let idx = self.hierarchy.position(name)?;
        self.categories.get(idx).map(Vec::as_slice)
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_records(&self) -> Vec<Map<String, JsonValue>> {
        let columns = self.columns();
        (0..self.rows.len())
            .filter_map(|i| self.values(i))
            .map(|values| {
                columns
                    .iter()
                    .cloned()
                    .zip(values.iter().map(|v| serde_json::to_value(v).unwrap_or(JsonValue::Null)))
                    .collect()
            })
            .collect()
    }
}

/// Scans `root` and builds its table.
pub fn build_table(root: &Path, options: &TableOptions) -> Result<Table> {
    let report = scan(
        root,
        &ScanOptions {
            with_metadata: options.include_meta,
        },
    )?;
    table_from_report(report, options)
}

/// Builds a table from an existing scan.
///
/// The label hierarchy covers every scanned entry, so its depth does not
/// change with the filter.
pub fn table_from_report(report: ScanReport, options: &TableOptions) -> Result<Table> {
    let ScanReport {
        root,
        entries,
        skipped,
    } = report;

    let hierarchy = LabelHierarchy::derive(
        entries.iter().map(|e| e.relative_dir.as_str()),
        options.hierarchy.as_deref(),
    );

    let mut rows: Vec<Row> = entries
        .into_iter()
        .filter(|e| options.filter.matches(e))
        .map(|entry| Row {
            labels: hierarchy.decompose(&entry.relative_dir),
            filepath: if options.relpath {
                entry.relative_path()
            } else {
                entry.absolute_path.to_string_lossy().into_owned()
            },
            entry,
        })
        .collect();

    if rows.is_empty() && options.require_non_empty {
        return Err(DircatError::EmptyResult(format!(
            "no entries under {} match the filter",
            root.display()
        )));
    }

    sort_rows(&mut rows, &options.order);
    let categories = categories(&rows, hierarchy.depth(), &options.order);

    debug!(
        rows = rows.len(),
        columns = hierarchy.depth(),
        "table built"
    );

    Ok(Table {
        root,
        hierarchy,
        include_meta: options.include_meta,
        rows,
        categories,
        skipped,
    })
}

/// Orders rows level by level with `order`, shallower first on a tie,
/// then by filename.
pub fn sort_rows(rows: &mut [Row], order: &SemanticOrder) {
    rows.sort_by(|a, b| {
        compare_labels(&a.labels, &b.labels, order)
            .then_with(|| natural_cmp(&a.entry.name, &b.entry.name))
            .then_with(|| a.entry.name.cmp(&b.entry.name))
    });
}

fn compare_labels(a: &[Option<String>], b: &[Option<String>], order: &SemanticOrder) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => order.compare(x, y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

// Collect distinct values per column, then sort them.
fn categories(rows: &[Row], depth: usize, order: &SemanticOrder) -> Vec<Vec<String>> {
    (0..depth)
        .map(|level| {
            let mut values: Vec<String> = rows
                .iter()
                .filter_map(|r| r.labels[level].clone())
                .collect();
            values.sort();
            values.dedup();
            order.sort(&mut values);
            values
        })
        .collect()
}
