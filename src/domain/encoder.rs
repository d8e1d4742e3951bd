//! Label encoding for multi-class and multi-label problems.

use super::ordering::SemanticOrder;
use crate::error::{DircatError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

pub const DEFAULT_SEPARATOR: &str = "|";

/// Encoding problem type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum EncodeMode {
    /// Exactly one label per item
    #[default]
    MultiClass,
    /// Any number of labels per item, joined by a separator
    MultiLabel,
}

impl FromStr for EncodeMode {
    type Err = DircatError;

    /// Accepts `multi-class`, `multiclasses`, `mc`, `Multi_Label`, `ml`, ...
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "multiclass" | "multiclasses" | "mc" => Ok(EncodeMode::MultiClass),
            "multilabel" | "multilabels" | "ml" => Ok(EncodeMode::MultiLabel),
            _ => Err(DircatError::InvalidMode(s.to_string())),
        }
    }
}

/// Requested shape of the coded labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputShape {
    /// One code (multi-class) or one 0/1 vector (multi-label) per input
    #[default]
    Sequence,
    /// Named columns: `y` for multi-class, one per class for multi-label
    Table,
}

/// Column-named frame of codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<usize>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CodedLabels {
    /// `None` where the input label was missing or empty
    MultiClass(Vec<Option<usize>>),
    MultiLabel(Vec<Vec<u8>>),
    Table(CodeTable),
}

impl CodedLabels {
    pub fn len(&self) -> usize {
        match self {
            CodedLabels::MultiClass(codes) => codes.len(),
            CodedLabels::MultiLabel(vectors) => vectors.len(),
            CodedLabels::Table(table) => table.rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of [`encode_labels`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Encoded {
    pub mode: EncodeMode,
    /// Classes in code order
    pub classes: Vec<String>,
    pub coded: CodedLabels,
}

impl Encoded {
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// label -> code
    pub fn encoder(&self) -> HashMap<String, usize> {
        self.classes
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code))
            .collect()
    }

    /// code -> label
    pub fn decoder(&self) -> BTreeMap<usize, String> {
        self.classes.iter().cloned().enumerate().collect()
    }

    pub fn code_of(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    pub fn label_of(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }
}

/// Encodes `labels` into dense integer codes.
///
/// Classes are the distinct non-empty labels (or `sep`-separated tokens in
/// multi-label mode) sorted by `order`; a class's code is its position.
/// Missing and empty labels stay `None` in multi-class mode and become
/// all-zero vectors in multi-label mode.
pub fn encode_labels<S: AsRef<str>>(
    labels: &[Option<S>],
    mode: EncodeMode,
    sep: &str,
    order: &SemanticOrder,
    shape: OutputShape,
) -> Result<Encoded> {
    if mode == EncodeMode::MultiLabel && sep.is_empty() {
        return Err(DircatError::InvalidArgument(
            "multi-label separator must not be empty".to_string(),
        ));
    }

    let present = labels.iter().filter_map(label_str);

    let mut classes: Vec<String> = match mode {
        EncodeMode::MultiClass => present.map(str::to_string).collect(),
        EncodeMode::MultiLabel => present
            .flat_map(|s| split_tokens(s, sep))
            .map(str::to_string)
            .collect(),
    };
    classes.sort();
    classes.dedup();
    order.sort(&mut classes);

    let lookup: HashMap<&str, usize> = classes
        .iter()
        .enumerate()
        .map(|(code, class)| (class.as_str(), code))
        .collect();

    let coded = match mode {
        EncodeMode::MultiClass => {
            let codes: Vec<Option<usize>> = labels
                .iter()
                .map(|l| label_str(l).and_then(|s| lookup.get(s).copied()))
                .collect();
            match shape {
                OutputShape::Sequence => CodedLabels::MultiClass(codes),
                OutputShape::Table => CodedLabels::Table(CodeTable {
                    columns: vec!["y".to_string()],
                    rows: codes.into_iter().map(|c| vec![c]).collect(),
                }),
            }
        }
        EncodeMode::MultiLabel => {
            let vectors: Vec<Vec<u8>> = labels
                .iter()
                .map(|l| {
                    let mut vector = vec![0u8; classes.len()];
                    if let Some(s) = label_str(l) {
                        for token in split_tokens(s, sep) {
                            if let Some(&code) = lookup.get(token) {
                                vector[code] = 1;
                            }
                        }
                    }
                    vector
                })
                .collect();
            match shape {
                OutputShape::Sequence => CodedLabels::MultiLabel(vectors),
                OutputShape::Table => CodedLabels::Table(CodeTable {
                    columns: classes.clone(),
                    rows: vectors
                        .into_iter()
                        .map(|v| v.into_iter().map(|b| Some(b as usize)).collect())
                        .collect(),
                }),
            }
        }
    };

    Ok(Encoded {
        mode,
        classes,
        coded,
    })
}

// Missing and empty labels are both treated as absent.
fn label_str<S: AsRef<str>>(label: &Option<S>) -> Option<&str> {
    label.as_ref().map(|s| s.as_ref()).filter(|s| !s.is_empty())
}

fn split_tokens<'a>(label: &'a str, sep: &'a str) -> impl Iterator<Item = &'a str> {
    label.split(sep).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<Option<String>> {
        items.iter().map(|s| Some(s.to_string())).collect()
    }

    fn encode(items: &[Option<String>], mode: EncodeMode) -> Encoded {
        encode_labels(
            items,
            mode,
            DEFAULT_SEPARATOR,
            &SemanticOrder::default(),
            OutputShape::Sequence,
        )
        .unwrap()
    }

    mod mode_tests {
        use super::*;

        #[test]
        fn test_mode_aliases() {
            assert_eq!("multi-class".parse::<EncodeMode>().unwrap(), EncodeMode::MultiClass);
            assert_eq!("Multi_Classes".parse::<EncodeMode>().unwrap(), EncodeMode::MultiClass);
            assert_eq!("mc".parse::<EncodeMode>().unwrap(), EncodeMode::MultiClass);
            assert_eq!("multi label".parse::<EncodeMode>().unwrap(), EncodeMode::MultiLabel);
            assert_eq!("ML".parse::<EncodeMode>().unwrap(), EncodeMode::MultiLabel);
        }

        #[test]
        fn test_invalid_mode() {
            let result = "one-hot".parse::<EncodeMode>();
            assert!(matches!(result, Err(DircatError::InvalidMode(m)) if m == "one-hot"));
        }
    }

    mod multi_class_tests {
        use super::*;

        #[test]
        fn test_semantic_class_order() {
            let encoded = encode(&labels(&["OK", "OK", "NG1", "NG2", "OK"]), EncodeMode::MultiClass);

            assert_eq!(encoded.classes, vec!["OK", "NG1", "NG2"]);
            assert_eq!(
                encoded.coded,
                CodedLabels::MultiClass(vec![Some(0), Some(0), Some(1), Some(2), Some(0)])
            );
        }

        #[test]
        fn test_round_trip() {
            let input = labels(&["dog", "train", "NG10", "OK", "NG2", "dog", "cat"]);
            let encoded = encode(&input, EncodeMode::MultiClass);
            let encoder = encoded.encoder();
            let decoder = encoded.decoder();

            for label in input.iter().flatten() {
                assert_eq!(&decoder[&encoder[label]], label);
            }
            assert_eq!(encoder.len(), 6);
            assert_eq!(decoder.len(), 6);
        }

        #[test]
        fn test_missing_and_empty_pass_through() {
            let input = vec![
                Some("OK".to_string()),
                None,
                Some(String::new()),
                Some("NG".to_string()),
            ];
            let encoded = encode(&input, EncodeMode::MultiClass);

            assert_eq!(encoded.n_classes(), 2);
            assert_eq!(
                encoded.coded,
                CodedLabels::MultiClass(vec![Some(0), None, None, Some(1)])
            );
        }

        #[test]
        fn test_table_shape() {
            let encoded = encode_labels(
                &labels(&["NG", "OK"]),
                EncodeMode::MultiClass,
                DEFAULT_SEPARATOR,
                &SemanticOrder::default(),
                OutputShape::Table,
            )
            .unwrap();

            assert_eq!(
                encoded.coded,
                CodedLabels::Table(CodeTable {
                    columns: vec!["y".to_string()],
                    rows: vec![vec![Some(1)], vec![Some(0)]],
                })
            );
        }

        #[test]
        fn test_empty_input() {
            let input: Vec<Option<String>> = vec![];
            let encoded = encode(&input, EncodeMode::MultiClass);

            assert!(encoded.classes.is_empty());
            assert!(encoded.coded.is_empty());
        }
    }

    mod multi_label_tests {
        use super::*;

        #[test]
        fn test_multi_hot_vectors() {
            let encoded = encode(&labels(&["dog", "cat", "dog|cat"]), EncodeMode::MultiLabel);

            assert_eq!(encoded.classes, vec!["cat", "dog"]);
            assert_eq!(encoded.code_of("cat"), Some(0));
            assert_eq!(encoded.label_of(1), Some("dog"));
            assert_eq!(
                encoded.coded,
                CodedLabels::MultiLabel(vec![vec![0, 1], vec![1, 0], vec![1, 1]])
            );
        }

        #[test]
        fn test_missing_gives_all_zero() {
            let input = vec![Some("ok|ng".to_string()), None, Some(String::new())];
            let encoded = encode(&input, EncodeMode::MultiLabel);

            assert_eq!(encoded.classes, vec!["ok", "ng"]);
            assert_eq!(
                encoded.coded,
                CodedLabels::MultiLabel(vec![vec![1, 1], vec![0, 0], vec![0, 0]])
            );
        }

        #[test]
        fn test_custom_separator_and_table_shape() {
            let encoded = encode_labels(
                &labels(&["a,b", "b"]),
                EncodeMode::MultiLabel,
                ",",
                &SemanticOrder::default(),
                OutputShape::Table,
            )
            .unwrap();

            assert_eq!(
                encoded.coded,
                CodedLabels::Table(CodeTable {
                    columns: vec!["a".to_string(), "b".to_string()],
                    rows: vec![vec![Some(1), Some(1)], vec![Some(0), Some(1)]],
                })
            );
        }

        #[test]
        fn test_empty_separator_rejected() {
            let result = encode_labels(
                &labels(&["a"]),
                EncodeMode::MultiLabel,
                "",
                &SemanticOrder::default(),
                OutputShape::Sequence,
            );
            assert!(matches!(result, Err(DircatError::InvalidArgument(_))));
        }
    }
}
