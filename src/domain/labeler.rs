//! Label hierarchy derived from relative directory paths.
//!
//! `train/OK` at depth two becomes two label columns. Column names come
//! from the caller where given and are generated as `lv1`, `lv2`, ...
//! otherwise.

use serde::Serialize;

/// Ordered label column names, one per directory depth level.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LabelHierarchy {
    columns: Vec<String>,
}

impl LabelHierarchy {
    /// Derives the hierarchy from every relative directory seen in a scan.
    ///
    /// The number of columns equals the deepest directory. Names beyond
    /// that depth are ignored; missing names are generated.
    pub fn derive<'a, I>(relative_dirs: I, names: Option<&[String]>) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let depth = relative_dirs.into_iter().map(depth_of).max().unwrap_or(0);
        Self::with_depth(depth, names)
    }

    /// Builds a hierarchy with exactly `depth` columns.
    pub fn with_depth(depth: usize, names: Option<&[String]>) -> Self {
        let names = names.unwrap_or(&[]);
        let columns = (0..depth)
            .map(|i| match names.get(i) {
                Some(name) if !name.trim().is_empty() => name.trim().to_string(),
                _ => format!("lv{}", i + 1),
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn depth(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Index of the column called `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Splits `relative_dir` into one value per column; levels deeper than
    /// the path are `None`.
    pub fn decompose(&self, relative_dir: &str) -> Vec<Option<String>> {
        let mut segments = segments(relative_dir);
        (0..self.depth())
            .map(|_| segments.next().map(str::to_string))
            .collect()
    }
}

/// Splits a `user/supplied/names` hierarchy string.
pub fn parse_names(spec: &str) -> Vec<String> {
    spec.trim_matches('/')
        .split('/')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Number of non-empty `/`-separated segments
pub fn depth_of(relative_dir: &str) -> usize {
    segments(relative_dir).count()
}

fn segments(relative_dir: &str) -> impl Iterator<Item = &str> {
    relative_dir.split('/').filter(|s| !s.is_empty())
}
