//! Shared test utilities.
//!
//! Fixture writers for building source trees inside a `TempDir`, locale
//! config shortcuts, and record lookups that panic with the list of available
//! identifiers on a miss.
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_file(tmp.path(), "content/foo/foo.html", "Lorem");
//! let records = resolver(localized(&["en", "fr"], "en")).load_objects(...).unwrap();
//! let foo = find_record(&records, "/fr/foo/");
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use crate::assemble::Resolver;
use crate::config::SiteConfig;
use crate::locale::LocaleConfig;
use crate::types::ContentRecord;

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Locale config with the given locales and default, no exclusions.
pub fn localized(codes: &[&str], default: &str) -> LocaleConfig {
    LocaleConfig::new(
        codes.iter().map(|c| c.to_string()).collect(),
        Some(default.to_string()),
        BTreeMap::new(),
    )
    .unwrap()
}

/// Resolver over stock site settings with the given locales.
pub fn resolver(locales: LocaleConfig) -> Resolver {
    Resolver::new(locales, &SiteConfig::default())
}

// =========================================================================
// Record lookups
// =========================================================================

/// Find a record by identifier. Panics if not found.
pub fn find_record<'a>(records: &'a [ContentRecord], identifier: &str) -> &'a ContentRecord {
    records
        .iter()
        .find(|r| r.identifier == identifier)
        .unwrap_or_else(|| {
            panic!(
                "record '{identifier}' not found. Available: {:?}",
                identifiers(records)
            )
        })
}

/// All identifiers, in record order.
pub fn identifiers(records: &[ContentRecord]) -> Vec<&str> {
    records.iter().map(|r| r.identifier.as_str()).collect()
}
