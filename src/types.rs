//! Shared types produced by the resolver.
//!
//! A [`ContentRecord`] is one logical object materialized in one locale. The
//! [`Manifest`] is what the `scan` command serializes to JSON.

use crate::metadata::Metadata;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// Which root an object was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Item,
    Layout,
}

impl ObjectKind {
    /// Key used for this kind in `locale.exclude`.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Item => "item",
            ObjectKind::Layout => "layout",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "item" => Some(ObjectKind::Item),
            "layout" => Some(ObjectKind::Layout),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object body. Binary objects are only referenced, never read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Content {
    Text(String),
    Binary(PathBuf),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Binary(_) => None,
        }
    }

    pub fn binary_path(&self) -> Option<&PathBuf> {
        match self {
            Content::Binary(path) => Some(path),
            Content::Text(_) => None,
        }
    }
}

/// One logical object in one locale.
///
/// `identifier` always starts with `/`. Objects that take part in locale
/// expansion carry a `/{locale}` prefix.
#[derive(Debug, Clone, Serialize)]
pub struct ContentRecord {
    pub identifier: String,
    pub kind: ObjectKind,
    /// `None` on a site without locales.
    pub locale: Option<String>,
    pub content_filename: Option<PathBuf>,
    pub meta_filename: Option<PathBuf>,
    /// Content file extension without the leading dot.
    pub extension: Option<String>,
    pub is_binary: bool,
    pub modified_at: SystemTime,
    /// Merged metadata plus the derived filename fields.
    pub attributes: Metadata,
    pub content: Content,
}

impl ContentRecord {
    pub fn attribute(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.attributes.get(key)
    }

    /// String attribute lookup; `None` when missing or not a string.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(|v| v.as_str())
    }

    /// Whether this record is one locale's copy of an expanded object.
    pub fn is_localized(&self) -> bool {
        self.locale
            .as_deref()
            .is_some_and(|code| self.identifier.starts_with(&format!("/{code}/")))
    }
}

/// Everything resolved from one site.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub items: Vec<ContentRecord>,
    pub layouts: Vec<ContentRecord>,
}
