//! Semantic ordering for dataset folder and label names.
//!
//! Dataset trees are usually split and labeled with a small vocabulary
//! (`train`, `val`, `test`, `OK`, `NG`, ...). A [`SemanticOrder`] ranks
//! strings by the first group of that vocabulary they mention, then falls
//! back to a numeric-aware comparison so `NG2` sorts before `NG10`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default group table, highest priority first
pub const DEFAULT_GROUPS: &[&[&str]] = &[
    &["train"],
    &["val", "valid", "validation"],
    &["dev", "develop", "development"],
    &["test"],
    &["eval", "evaluate", "evaluation"],
    &["ok", "neg", "nega", "negative"],
    &["ng", "pos", "posi", "positive"],
];

// Wraps the group index inside a transformed key so it never merges with
// digits that follow the token in the original string.
const MARK: char = '\u{1}';

/// A prioritized table of synonym groups.
///
/// Immutable once built; pass it explicitly to anything that sorts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct SemanticOrder {
    groups: Vec<Vec<String>>,
    // (token, group index), longest token first
    tokens: Vec<(String, usize)>,
}

impl Default for SemanticOrder {
    fn default() -> Self {
        Self::new(
            DEFAULT_GROUPS
                .iter()
                .map(|group| group.iter().map(|t| t.to_string()).collect())
                .collect(),
        )
    }
}

impl From<Vec<Vec<String>>> for SemanticOrder {
    fn from(groups: Vec<Vec<String>>) -> Self {
        Self::new(groups)
    }
}

impl From<SemanticOrder> for Vec<Vec<String>> {
    fn from(order: SemanticOrder) -> Self {
        order.groups
    }
}

impl SemanticOrder {
    /// Builds an ordering from groups of synonymous tokens, highest priority first.
    ///
    /// Tokens are matched case-insensitively; empty tokens are dropped.
    pub fn new(groups: Vec<Vec<String>>) -> Self {
        let groups: Vec<Vec<String>> = groups
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .collect();

        let mut tokens: Vec<(String, usize)> = groups
            .iter()
            .enumerate()
            .flat_map(|(i, group)| group.iter().map(move |t| (t.clone(), i)))
            .collect();
        // Longer tokens replace first so `evaluation` is not shadowed by `val`.
        // The sort is stable, so equal lengths keep group priority.
        tokens.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

        Self { groups, tokens }
    }

    /// Parses `train;val|valid;test` style group tables.
    pub fn parse(spec: &str) -> Self {
        Self::new(
            spec.split(';')
                .map(|group| group.split('|').map(str::to_string).collect())
                .collect(),
        )
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    /// Priority class of `s`: the highest-priority group it mentions, or
    /// `groups().len()` when it matches nothing.
    pub fn priority(&self, s: &str) -> usize {
        self.sort_key(s).priority
    }

    /// Lower-cases `s` and replaces every token with its group marker.
    pub fn translate(&self, s: &str) -> String {
        self.sort_key(s).translated
    }

    /// Computes the comparison key for `s`.
    pub fn sort_key(&self, s: &str) -> SortKey {
        let mut translated = s.to_lowercase();
        let mut priority = self.groups.len();
        for (token, i) in &self.tokens {
            if translated.contains(token.as_str()) {
                translated = translated.replace(token.as_str(), &format!("{MARK}{i}{MARK}"));
                priority = priority.min(*i);
            }
        }
        SortKey {
            priority,
            translated,
            original: s.to_string(),
        }
    }

    /// Total order: priority class, then natural order of the translated
    /// key, then natural order of the original string.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.sort_key(a).cmp(&self.sort_key(b))
    }

    /// Sorts `items` in place by this ordering.
    pub fn sort<S: AsRef<str>>(&self, items: &mut [S]) {
        items.sort_by_cached_key(|s| self.sort_key(s.as_ref()));
    }

    /// Returns a sorted copy of `items`.
    pub fn sorted<S: AsRef<str> + Clone>(&self, items: &[S]) -> Vec<S> {
        let mut out = items.to_vec();
        self.sort(&mut out);
        out
    }
}

/// Comparison key produced by [`SemanticOrder::sort_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub priority: usize,
    pub translated: String,
    pub original: String,
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| natural_cmp(&self.translated, &other.translated))
            .then_with(|| natural_cmp(&self.original, &other.original))
            .then_with(|| self.original.cmp(&other.original))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Numeric-aware string comparison: digit runs compare by value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().peekable();
    let mut b_chars = b.chars().peekable();

    loop {
        match (a_chars.peek().copied(), b_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let run_a = take_digits(&mut a_chars);
                let run_b = take_digits(&mut b_chars);
                let ord = compare_digit_runs(&run_a, &run_b);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.cmp(&y);
                if ord != Ordering::Equal {
                    return ord;
                }
                a_chars.next();
                b_chars.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        // "01" after "1"
        .then_with(|| a.len().cmp(&b.len()))
}
