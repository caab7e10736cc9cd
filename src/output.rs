//! CLI output formatting.
//!
//! Output is identifier-first: each record leads with its positional index,
//! identifier and locale, and the files it was built from follow as indented
//! context lines. Paths are shown relative to the site root.
//!
//! ## Scan / check
//!
//! ```text
//! Items
//! 001 /en/about/ [en]
//!     Title: About
//!     Source: content/about.html
//!     Meta: content/about.yaml
//! 002 /logo/ (binary)
//!     Source: content/logo.png
//!
//! Layouts
//! 001 /default/
//!     Source: layouts/default.html
//!
//! Resolved 2 items, 1 layout
//! ```
//!
//! ## Create
//!
//! ```text
//! Created item /about/
//!     content/about.yaml
//!     content/about.en.html
//! ```
//!
//! Each `format_*` function returns lines and has no side effects; the
//! `print_*` wrappers write them to stdout.

use crate::create::CreatedFiles;
use crate::types::{ContentRecord, Manifest};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn display_path(path: &Path, site_root: &Path) -> String {
    path.strip_prefix(site_root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Header line for one record.
///
/// ```text
/// 001 /fr/about/ [fr]
/// 002 /logo/ (binary)
/// ```
fn record_header(index: usize, record: &ContentRecord) -> String {
    let mut header = format!("{} {}", format_index(index), record.identifier);
    if record.is_localized()
        && let Some(locale) = &record.locale
    {
        header.push_str(&format!(" [{locale}]"));
    }
    if record.is_binary {
        header.push_str(" (binary)");
    }
    header
}

fn format_records(records: &[ContentRecord], site_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, record) in records.iter().enumerate() {
        lines.push(record_header(i + 1, record));
        if let Some(title) = record.attribute_str("title") {
            lines.push(format!("{}Title: {}", indent(1), title));
        }
        if let Some(path) = &record.content_filename {
            lines.push(format!("{}Source: {}", indent(1), display_path(path, site_root)));
        }
        if let Some(path) = &record.meta_filename {
            lines.push(format!("{}Meta: {}", indent(1), display_path(path, site_root)));
        }
    }
    lines
}

/// Format a resolved site: items, then layouts, then a summary line.
pub fn format_manifest(manifest: &Manifest, site_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Items".to_string());
    lines.extend(format_records(&manifest.items, site_root));
    lines.push(String::new());

    lines.push("Layouts".to_string());
    lines.extend(format_records(&manifest.layouts, site_root));
    lines.push(String::new());

    lines.push(format!(
        "Resolved {}, {}",
        plural(manifest.items.len(), "item"),
        plural(manifest.layouts.len(), "layout")
    ));
    lines
}

pub fn print_manifest(manifest: &Manifest, site_root: &Path) {
    for line in format_manifest(manifest, site_root) {
        println!("{}", line);
    }
}

/// Format the files written for a new object.
pub fn format_created(created: &CreatedFiles, site_root: &Path) -> Vec<String> {
    let mut lines = vec![format!("Created {} {}", created.kind, created.identifier)];
    lines.push(format!(
        "{}{}",
        indent(1),
        display_path(&created.meta_filename, site_root)
    ));
    for path in &created.content_filenames {
        lines.push(format!("{}{}", indent(1), display_path(path, site_root)));
    }
    lines
}

pub fn print_created(created: &CreatedFiles, site_root: &Path) {
    for line in format_created(created, site_root) {
        println!("{}", line);
    }
}
