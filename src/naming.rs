//! Filename convention parsing and per-locale file lookup.
//!
//! Every source file is named `<stem>[.<locale>].<extension>`:
//!
//! - `about.html` → stem `about`, no locale, extension `html`
//! - `about.fr.html` → stem `about`, locale `fr`, extension `html`
//! - `layout.html.erb` → stem `layout`, extension `html.erb`
//!
//! The last example depends on `allow_periods_in_identifiers`. When periods
//! are not allowed (the default), everything after the first dot of the file
//! name is the extension chain. When they are allowed, only the last segment
//! is the extension and `foo.bar.css` has the stem `foo.bar`.
//!
//! A locale is exactly two lowercase ASCII letters sitting directly in front
//! of the extension.
//!
//! All paths handled here are relative to an object root and use `/` as the
//! separator, whatever the host platform.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static EXTENSION_CHAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\.[a-z]{2})?(\.[^/]+)$").expect("extension pattern must compile")
});

static LAST_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\.[a-z]{2})?(\.[^/.]+)$").expect("extension pattern must compile")
});

/// A filename split into its convention parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitName<'a> {
    /// Path with locale and extension removed.
    pub stem: &'a str,
    pub locale: Option<&'a str>,
    /// Extension without the leading dot; empty when the file has none.
    pub extension: &'a str,
}

/// Split a relative path into stem, locale suffix and extension.
pub fn split_name(path: &str, allow_periods: bool) -> SplitName<'_> {
    let regex = if allow_periods {
        &*LAST_EXTENSION
    } else {
        &*EXTENSION_CHAIN
    };
    match regex.captures(path) {
        Some(caps) => {
            let whole = caps.get(0).expect("group 0 always participates");
            SplitName {
                stem: &path[..whole.start()],
                locale: caps.get(1).map(|m| &m.as_str()[1..]),
                extension: caps.get(2).map(|m| &m.as_str()[1..]).unwrap_or(""),
            }
        }
        None => SplitName {
            stem: path,
            locale: None,
            extension: "",
        },
    }
}

/// Locale suffix and extension of a path.
pub fn extension_of(path: &str, allow_periods: bool) -> (Option<&str>, &str) {
    let split = split_name(path, allow_periods);
    (split.locale, split.extension)
}

/// Path with locale suffix and extension removed.
pub fn basename_of(path: &str, allow_periods: bool) -> &str {
    split_name(path, allow_periods).stem
}

/// Grouping key: the basename with a trailing `index` segment removed, so
/// `blog/index.html` and `blog.html` both belong to `blog`.
pub fn object_key(path: &str, allow_periods: bool) -> &str {
    let base = basename_of(path, allow_periods);
    if base == "index" {
        ""
    } else {
        base.strip_suffix("/index").unwrap_or(base)
    }
}

/// The candidate files for an object, in lookup order.
///
/// Two path shapes (index file in the key's directory, then the key itself)
/// each tried with three locale suffixes (current, none, default). Within a
/// shape the locale order applies. Duplicate candidates, which appear when
/// the current locale is the default, are dropped.
///
/// Candidates are built from the key alone, so a lookup never reaches a file
/// that belongs to another key: `foo/foo.html` has the key `foo/foo` and is
/// found through the second shape.
pub fn candidate_paths(
    key: &str,
    extension: &str,
    current: Option<&str>,
    default: Option<&str>,
) -> Vec<String> {
    let shapes = if key.is_empty() {
        vec!["index".to_string()]
    } else {
        vec![format!("{key}/index"), key.to_string()]
    };

    let mut suffixes = Vec::with_capacity(3);
    if let Some(code) = current {
        suffixes.push(format!(".{code}"));
    }
    suffixes.push(String::new());
    if let Some(code) = default {
        suffixes.push(format!(".{code}"));
    }

    let mut candidates: Vec<String> = Vec::with_capacity(shapes.len() * suffixes.len());
    for shape in &shapes {
        for suffix in &suffixes {
            let candidate = if extension.is_empty() {
                format!("{shape}{suffix}")
            } else {
                format!("{shape}{suffix}.{extension}")
            };
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Find the file representing object `key` in the `current` locale.
///
/// Returns `None` when `extension` is `None` or no candidate exists under
/// `root`. The returned path is relative to `root`.
pub fn resolve_file(
    root: &Path,
    key: &str,
    extension: Option<&str>,
    current: Option<&str>,
    default: Option<&str>,
) -> Option<String> {
    let extension = extension?;
    candidate_paths(key, extension, current, default)
        .into_iter()
        .find(|candidate| root.join(candidate).is_file())
}

/// Last dot-separated extension of a file name, used for binary detection.
pub fn last_extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}
