//! Writing new objects to an object root.
//!
//! A new object becomes one metadata file plus one content file per available
//! locale (a single unsuffixed content file on a site without locales):
//!
//! ```text
//! identifier /about/ on an en/fr site, extension html
//!
//! content/
//! ├── about.yaml
//! ├── about.en.html
//! └── about.fr.html
//! ```
//!
//! The root identifier `/` maps to `index.yaml` and `index[.<locale>].<ext>`.
//! Existing files at those paths are overwritten; callers coordinate writers.

use crate::config::{ConfigError, SiteConfig};
use crate::identifier::clean_identifier;
use crate::locale::LocaleConfig;
use crate::metadata::Metadata;
use crate::scan::META_EXTENSION;
use crate::types::ObjectKind;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Content extension used when none is given.
pub const DEFAULT_EXTENSION: &str = "html";

#[derive(Error, Debug)]
pub enum CreateError {
    #[error(
        "Cannot create {kind} `{identifier}`: the identifier contains a period, \
         but allow_periods_in_identifiers is not enabled"
    )]
    IdentifierConflict { kind: ObjectKind, identifier: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// What to write.
#[derive(Debug, Clone)]
pub struct NewObject<'a> {
    pub identifier: &'a str,
    pub content: &'a str,
    pub attributes: &'a Metadata,
    /// Content extension, with or without the leading dot.
    pub extension: Option<&'a str>,
}

/// Paths written for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedFiles {
    pub kind: ObjectKind,
    pub identifier: String,
    pub meta_filename: PathBuf,
    pub content_filenames: Vec<PathBuf>,
}

/// Write `new` under `root`.
pub fn create_object(
    root: &Path,
    kind: ObjectKind,
    new: &NewObject<'_>,
    locales: &LocaleConfig,
    allow_periods: bool,
) -> Result<CreatedFiles, CreateError> {
    let identifier = clean_identifier(new.identifier);
    if !allow_periods && identifier.contains('.') {
        return Err(CreateError::IdentifierConflict { kind, identifier });
    }

    let base = match identifier.trim_matches('/') {
        "" => "index",
        inner => inner,
    };
    let extension = normalize_extension(new.extension);

    let meta_filename = root.join(format!("{base}.{META_EXTENSION}"));
    let content_filenames: Vec<PathBuf> = if locales.is_localized_site() {
        locales
            .available()
            .iter()
            .map(|code| root.join(format!("{base}.{code}.{extension}")))
            .collect()
    } else {
        vec![root.join(format!("{base}.{extension}"))]
    };

    if let Some(parent) = meta_filename.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&meta_filename, serde_yaml::to_string(new.attributes)?)?;
    info!(%kind, path = %meta_filename.display(), "created metadata file");
    for path in &content_filenames {
        fs::write(path, new.content)?;
        info!(%kind, path = %path.display(), "created content file");
    }

    Ok(CreatedFiles {
        kind,
        identifier,
        meta_filename,
        content_filenames,
    })
}

/// Create an item under the site's content root.
pub fn create_item(
    site_root: &Path,
    config: &SiteConfig,
    new: &NewObject<'_>,
) -> Result<CreatedFiles, CreateError> {
    create_in_site(site_root, config, ObjectKind::Item, new)
}

/// Create a layout under the site's layouts root.
pub fn create_layout(
    site_root: &Path,
    config: &SiteConfig,
    new: &NewObject<'_>,
) -> Result<CreatedFiles, CreateError> {
    create_in_site(site_root, config, ObjectKind::Layout, new)
}

fn create_in_site(
    site_root: &Path,
    config: &SiteConfig,
    kind: ObjectKind,
    new: &NewObject<'_>,
) -> Result<CreatedFiles, CreateError> {
    let locales = LocaleConfig::from_section(&config.locale)?;
    let root = match kind {
        ObjectKind::Item => site_root.join(&config.content_root),
        ObjectKind::Layout => site_root.join(&config.layouts_root),
    };
    create_object(
        &root,
        kind,
        new,
        &locales,
        config.allow_periods_in_identifiers,
    )
}

fn normalize_extension(extension: Option<&str>) -> &str {
    match extension.map(|e| e.trim_start_matches('.')) {
        Some(ext) if !ext.is_empty() => ext,
        _ => DEFAULT_EXTENSION,
    }
}
