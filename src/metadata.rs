//! Object metadata: parsing, front matter, and locale-aware merging.
//!
//! Metadata comes either from a separate `.yaml` file next to the content
//! file, or from a front matter block at the top of the content file itself:
//!
//! ```text
//! ---
//! title: About
//! ---
//! Page body starts here.
//! ```
//!
//! The delimiter is a line starting with three or five dashes.
//!
//! ## Locale layers
//!
//! Localized objects may carry per-locale overrides under the `locale` key:
//!
//! ```yaml
//! title: About
//! locale:
//!   en: { title: About us }
//!   fr: { title: À propos }
//! ```
//!
//! [`locale_layers`] splits such a document into named layers and
//! [`merge_layers`] folds them, later layers winning:
//!
//! 1. `default-locale`: the default locale's block, filling gaps
//! 2. `top-level`: everything except the `locale` key
//! 3. `current-locale`: the resolving locale's block, unless it is the
//!    default (whose block already sits under the top level)

use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Parsed metadata mapping. Keys are always strings.
pub type Metadata = BTreeMap<String, Value>;

/// Metadata key holding the locale marker and per-locale override blocks.
pub const LOCALE_KEY: &str = "locale";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Metadata in {0} is not a mapping")]
    NotMapping(PathBuf),
    #[error("Metadata key in {0} is not a scalar")]
    ComplexKey(PathBuf),
    #[error("The file {path} does not seem to be a {kind}: front matter is not closed")]
    MalformedFrontMatter { path: PathBuf, kind: String },
}

static DELIMITER: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?m)^(?:-{5}|-{3})").expect("delimiter pattern must compile")
});

/// Parse a YAML document into metadata. An empty document is an empty map.
pub fn parse_metadata(text: &str, path: &Path) -> Result<Metadata, MetadataError> {
    if text.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let value: Value = serde_yaml::from_str(text).map_err(|source| MetadataError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Null => Ok(Metadata::new()),
        Value::Mapping(mapping) => mapping_to_metadata(mapping, path),
        _ => Err(MetadataError::NotMapping(path.to_path_buf())),
    }
}

fn mapping_to_metadata(
    mapping: serde_yaml::Mapping,
    path: &Path,
) -> Result<Metadata, MetadataError> {
    mapping
        .into_iter()
        .map(|(key, value)| Ok((scalar_key(&key, path)?, value)))
        .collect()
}

fn scalar_key(key: &Value, path: &Path) -> Result<String, MetadataError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(MetadataError::ComplexKey(path.to_path_buf())),
    }
}

/// Split a content file into metadata and body.
///
/// Files that don't start with a delimiter have no front matter and come back
/// whole. Otherwise the text between the first two delimiters is parsed as
/// metadata and the rest, trimmed, is the body. Later delimiter lines belong
/// to the body.
pub fn split_front_matter(
    data: &str,
    path: &Path,
    kind: &str,
) -> Result<(Metadata, String), MetadataError> {
    let mut delimiters = DELIMITER.find_iter(data);
    let Some(opening) = delimiters.next().filter(|m| m.start() == 0) else {
        return Ok((Metadata::new(), data.to_string()));
    };
    let closing = delimiters
        .next()
        .ok_or_else(|| MetadataError::MalformedFrontMatter {
            path: path.to_path_buf(),
            kind: kind.to_string(),
        })?;

    let meta = parse_metadata(&data[opening.end()..closing.start()], path)?;
    let body = data[closing.end()..].trim().to_string();
    Ok((meta, body))
}

/// A named slice of metadata taking part in a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataLayer {
    pub name: &'static str,
    pub values: Metadata,
}

/// Split metadata into the ordered layers for one locale.
///
/// The `locale` key is consumed: its nested blocks feed the locale layers and
/// it never reaches the top-level layer. A `locale` value that is not a
/// mapping (e.g. `true`) contributes no blocks.
pub fn locale_layers(
    mut meta: Metadata,
    current: Option<&str>,
    default: Option<&str>,
    path: &Path,
) -> Result<Vec<MetadataLayer>, MetadataError> {
    let blocks = match meta.remove(LOCALE_KEY) {
        Some(Value::Mapping(mapping)) => mapping,
        _ => serde_yaml::Mapping::new(),
    };
    let block_for = |code: Option<&str>| -> Result<Metadata, MetadataError> {
        match code.and_then(|c| blocks.get(c)) {
            Some(Value::Mapping(block)) => mapping_to_metadata(block.clone(), path),
            _ => Ok(Metadata::new()),
        }
    };

    let mut layers = vec![
        MetadataLayer {
            name: "default-locale",
            values: block_for(default)?,
        },
        MetadataLayer {
            name: "top-level",
            values: meta,
        },
    ];
    if current != default {
        layers.push(MetadataLayer {
            name: "current-locale",
            values: block_for(current)?,
        });
    }
    Ok(layers)
}

/// Fold layers in order; keys from later layers replace earlier ones.
pub fn merge_layers(layers: Vec<MetadataLayer>) -> Metadata {
    layers.into_iter().fold(Metadata::new(), |mut merged, layer| {
        merged.extend(layer.values);
        merged
    })
}

/// How the `locale` key of an object's metadata affects locale expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleMarker {
    /// Absent or null: exclusion patterns decide.
    Unset,
    /// Any truthy value, including an override block: always expand.
    Force,
    /// `locale: false`: never expand, whatever the patterns say.
    Disable,
}

pub fn locale_marker(meta: &Metadata) -> LocaleMarker {
    match meta.get(LOCALE_KEY) {
        None | Some(Value::Null) => LocaleMarker::Unset,
        Some(Value::Bool(false)) => LocaleMarker::Disable,
        Some(_) => LocaleMarker::Force,
    }
}
