// CLI module for argument parsing and configuration

use crate::config::UserConfig;
use crate::domain::filter::{parse_extensions, EXTS_IMAGE, EXTS_SIGNAL, EXTS_TEXT};
use crate::domain::labeler::parse_names;
use crate::domain::{EncodeMode, EntryFilter, SemanticOrder, TableOptions};
use crate::error::{DircatError, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::collections::HashSet;
use std::path::PathBuf;

/// Dircat - catalog a dataset directory into a labeled table
///
/// Folder names become label columns (e.g. split/label), rows are sorted
/// train -> val -> test and OK -> NG, and a label column can be encoded
/// into integer codes.
#[derive(Parser, Debug, Clone)]
#[command(name = "dircat")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Root directory to catalog
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Names of each directory level, e.g. "split/label"
    #[arg(short = 'H', long = "hierarchy")]
    pub hierarchy: Option<String>,

    /// Extensions to include (comma-separated or repeated)
    #[arg(short = 'e', long = "ext")]
    pub extensions: Vec<String>,

    /// Extensions to exclude
    #[arg(long = "ext-ignore")]
    pub extensions_ignore: Vec<String>,

    /// Include a predefined extension group
    #[arg(long = "preset", value_enum)]
    pub presets: Vec<ExtensionPreset>,

    /// Relative directories to include, e.g. "train/OK" (comma-separated or repeated)
    #[arg(long = "subdir", value_delimiter = ',')]
    pub subdirs: Vec<String>,

    /// Relative directories to exclude
    #[arg(long = "subdir-ignore", value_delimiter = ',')]
    pub subdirs_ignore: Vec<String>,

    /// Add size and timestamp columns
    #[arg(short = 'm', long = "meta", action = ArgAction::SetTrue)]
    pub include_meta: bool,

    /// Print file paths relative to the root
    #[arg(long = "relpath", action = ArgAction::SetTrue)]
    pub relpath: bool,

    /// Which entries become rows
    #[arg(long = "entries", value_enum, default_value = "files")]
    pub entries: EntryKind,

    /// Custom ordering groups, e.g. "train;val|valid;test"
    #[arg(long = "order")]
    pub order: Option<String>,

    /// Label column to encode into integer codes
    #[arg(long = "encode")]
    pub encode: Option<String>,

    /// Encoding mode: multi-class or multi-label
    #[arg(long = "mode", default_value = "multi-class")]
    pub mode: String,

    /// Separator between labels in multi-label mode
    #[arg(long = "sep", default_value = "|")]
    pub sep: String,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print a directory summary instead of the table
    #[arg(long = "inspect", action = ArgAction::SetTrue)]
    pub inspect: bool,

    /// Config file (defaults to ~/.config/dircat/config.json)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Verbose diagnostics on stderr
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,
}

/// Predefined extension groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExtensionPreset {
    /// jpg, png, gif, bmp, tiff
    Image,
    /// wav, mp3, tmds
    Signal,
    /// csv, txt, xls, xlsx
    Text,
}

impl ExtensionPreset {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ExtensionPreset::Image => EXTS_IMAGE,
            ExtensionPreset::Signal => EXTS_SIGNAL,
            ExtensionPreset::Text => EXTS_TEXT,
        }
    }
}

/// Entry kinds listed in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum EntryKind {
    #[default]
    Files,
    Dirs,
    All,
}

impl EntryKind {
    pub fn is_file(self) -> Option<bool> {
        match self {
            EntryKind::Files => Some(true),
            EntryKind::Dirs => Some(false),
            EntryKind::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Tab-separated columns with a header line
    #[default]
    Text,
    /// JSON document
    Json,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Included extensions from `--ext` and `--preset`, `None` when neither is given
    pub fn get_extensions(&self) -> Option<Vec<String>> {
        let mut exts: Vec<String> = self
            .extensions
            .iter()
            .flat_map(|e| parse_extensions(e))
            .collect();
        exts.extend(
            self.presets
                .iter()
                .flat_map(|p| p.extensions().iter().map(|e| e.to_string())),
        );
        let mut seen = HashSet::new();
        exts.retain(|e| seen.insert(e.clone()));
        non_empty(exts)
    }

    pub fn get_extensions_ignore(&self) -> Option<Vec<String>> {
        let exts: Vec<String> = self
            .extensions_ignore
            .iter()
            .flat_map(|e| parse_extensions(e))
            .collect();
        non_empty(exts)
    }

    pub fn get_subdirs(&self) -> Option<Vec<String>> {
        non_empty(trimmed(&self.subdirs))
    }

    pub fn get_subdirs_ignore(&self) -> Option<Vec<String>> {
        non_empty(trimmed(&self.subdirs_ignore))
    }

    pub fn get_mode(&self) -> Result<EncodeMode> {
        self.mode.parse()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(DircatError::NotFound(self.root.clone()));
        }

        self.get_mode()?;

        if self.sep.is_empty() {
            return Err(DircatError::InvalidArgument(
                "--sep must not be empty".to_string(),
            ));
        }

        if self.encode.is_some() && self.inspect {
            return Err(DircatError::InvalidArgument(
                "--encode cannot be combined with --inspect".to_string(),
            ));
        }

        Ok(())
    }
}

fn trimmed(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Configuration merged from CLI arguments and the config file
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub root: PathBuf,
    pub table: TableOptions,
    pub encode: Option<String>,
    pub mode: EncodeMode,
    pub sep: String,
    pub format: OutputFormat,
    pub inspect: bool,
}

impl AppConfig {
    /// Merges validated `args` over `user`; flags win over file settings.
    pub fn merge(args: Args, user: UserConfig) -> Result<Self> {
        let mode = args.get_mode()?;

        let order = match args.order {
            Some(ref spec) => SemanticOrder::parse(spec),
            None => user.order.unwrap_or_default(),
        };

        let hierarchy = args
            .hierarchy
            .as_deref()
            .map(parse_names)
            .or(user.hierarchy);

        let filter = EntryFilter {
            is_file: args.entries.is_file(),
            extensions: args.get_extensions().or(user.extensions),
            extensions_ignore: args.get_extensions_ignore().or(user.extensions_ignore),
            subdirs: args.get_subdirs(),
            subdirs_ignore: args.get_subdirs_ignore(),
        };

        let table = TableOptions {
            hierarchy,
            // An empty result is only an error when the user narrowed it down
            require_non_empty: !filter.is_unconstrained(),
            filter,
            include_meta: args.include_meta || user.include_meta.unwrap_or(false),
            relpath: args.relpath,
            order,
        };

        Ok(AppConfig {
            root: args.root,
            table,
            encode: args.encode,
            mode,
            sep: args.sep,
            format: args.format,
            inspect: args.inspect,
        })
    }
}
