//! Source tree scanning and file grouping.
//!
//! Walks an object root and groups every file into the logical object it
//! belongs to. The group key is the file's basename (see
//! [`naming::object_key`]), so all of these land in the same group:
//!
//! ```text
//! content/
//! ├── about.yaml          # metadata        → key "about"
//! ├── about.html          # default content → key "about"
//! ├── about.fr.html       # fr content      → key "about"
//! └── blog/
//!     ├── index.yaml      # metadata        → key "blog"
//!     └── index.de.md     # de content      → key "blog"
//! ```
//!
//! ## Validation
//!
//! Each group must have:
//! - zero or one metadata file (`.yaml`)
//! - at most `max(1, available locales)` content files
//! - a single content extension shared by all its content files
//!
//! Anything else is a [`ShapeError`]; nothing is silently dropped.
//!
//! Backup files (`~`, `.orig`, `.rej`, `.bak`) and hidden entries are ignored.

use crate::locale::LocaleConfig;
use crate::naming;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Extension of metadata files.
pub const META_EXTENSION: &str = "yaml";

const BACKUP_SUFFIXES: &[&str] = &["~", ".orig", ".rej", ".bak"];

#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("Found {count} meta files for {key}; expected 0 or 1")]
    AmbiguousMetadata { key: String, count: usize },
    #[error("Found {count} content files for {key}; expected 0 to {max}")]
    TooManyVariants {
        key: String,
        count: usize,
        max: usize,
    },
    #[error("Found multiple content extensions for `{key}`: {extensions:?}")]
    MixedExtension {
        key: String,
        extensions: Vec<String>,
    },
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// The files making up one logical object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileGroup {
    /// Extension of the metadata file, if there is one.
    pub meta_ext: Option<String>,
    /// Extension shared by the content files, if there are any.
    pub content_ext: Option<String>,
    /// Locale suffixes seen on content files. The unsuffixed file adds nothing.
    pub locales: BTreeSet<String>,
}

/// Group every file under `root` by logical object key.
pub fn group_files(
    root: &Path,
    locales: &LocaleConfig,
    allow_periods: bool,
) -> Result<BTreeMap<String, FileGroup>, ScanError> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for relative in collect_files(root)? {
        let key = naming::object_key(&relative, allow_periods).to_string();
        grouped.entry(key).or_default().push(relative);
    }

    let max_variants = locales.max_variants();
    let mut groups = BTreeMap::new();
    for (key, files) in grouped {
        let group = build_group(&key, &files, max_variants, allow_periods)?;
        debug!(
            key = %key,
            meta = ?group.meta_ext,
            content = ?group.content_ext,
            locales = ?group.locales,
            "grouped object"
        );
        groups.insert(key, group);
    }
    Ok(groups)
}

fn build_group(
    key: &str,
    files: &[String],
    max_variants: usize,
    allow_periods: bool,
) -> Result<FileGroup, ShapeError> {
    let (meta_files, content_files): (Vec<&String>, Vec<&String>) = files
        .iter()
        .partition(|f| naming::extension_of(f, allow_periods).1 == META_EXTENSION);

    if meta_files.len() > 1 {
        return Err(ShapeError::AmbiguousMetadata {
            key: key.to_string(),
            count: meta_files.len(),
        });
    }
    if content_files.len() > max_variants {
        return Err(ShapeError::TooManyVariants {
            key: key.to_string(),
            count: content_files.len(),
            max: max_variants,
        });
    }

    let extensions: BTreeSet<&str> = content_files
        .iter()
        .map(|f| naming::extension_of(f, allow_periods).1)
        .collect();
    if extensions.len() > 1 {
        return Err(ShapeError::MixedExtension {
            key: key.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        });
    }

    Ok(FileGroup {
        meta_ext: meta_files.first().map(|_| META_EXTENSION.to_string()),
        content_ext: extensions.first().map(|e| e.to_string()),
        locales: content_files
            .iter()
            .filter_map(|f| naming::extension_of(f, allow_periods).0)
            .map(String::from)
            .collect(),
    })
}

/// All regular files under `root`, as sorted `/`-separated relative paths.
///
/// A missing root yields no files.
pub fn collect_files(root: &Path) -> Result<Vec<String>, ScanError> {
    if !root.is_dir() {
        debug!(root = %root.display(), "object root missing, nothing to scan");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || is_backup(&entry) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map(PathBuf::from)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        files.push(to_slash_path(&relative));
    }
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_backup(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    BACKUP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
