//! Logical identifiers derived from source paths.
//!
//! A file path relative to its object root maps to an identifier by dropping
//! the part that only exists because of the file layout:
//!
//! | Path | Shape | Identifier |
//! |------|-------|------------|
//! | `blog/index.fr.html` | index file | `/blog/` |
//! | `about/about.yaml` | named file in own directory | `/about/` |
//! | `contact.html` | plain file | `/contact/` |
//!
//! Locale prefixes are added by the assembler, never here.

use crate::naming::basename_of;
use regex::Regex;
use std::sync::LazyLock;

struct StripPatterns {
    index: Regex,
    named: Regex,
    plain: Regex,
}

impl StripPatterns {
    fn new(ext: &str) -> Self {
        let compile = |pattern: String| Regex::new(&pattern).expect("strip pattern must compile");
        Self {
            index: compile(format!(r"(^|/)index(?:\.[a-z]{{2}})?{ext}$")),
            named: compile(format!(r"(?:/[^/]+)?(?:\.[a-z]{{2}})?{ext}$")),
            plain: compile(format!(r"(?:\.[a-z]{{2}})?{ext}$")),
        }
    }
}

static CHAIN_PATTERNS: LazyLock<StripPatterns> =
    LazyLock::new(|| StripPatterns::new(r"\.[^/]+"));

static PERIOD_PATTERNS: LazyLock<StripPatterns> =
    LazyLock::new(|| StripPatterns::new(r"\.[^/.]+"));

/// Derive the identifier for a path relative to its object root.
pub fn identifier_for(relative: &str, allow_periods: bool) -> String {
    let patterns = if allow_periods {
        &*PERIOD_PATTERNS
    } else {
        &*CHAIN_PATTERNS
    };

    let stripped = if patterns.index.is_match(relative) {
        patterns.index.replace(relative, "${1}")
    } else if is_named_file(relative, allow_periods) {
        patterns.named.replace(relative, "")
    } else {
        patterns.plain.replace(relative, "")
    };

    clean_identifier(&stripped)
}

/// `foo/foo.html`: a file named after the directory holding it.
fn is_named_file(relative: &str, allow_periods: bool) -> bool {
    let mut segments = basename_of(relative, allow_periods).rsplit('/');
    match (segments.next(), segments.next()) {
        (Some(last), Some(parent)) => last == parent,
        _ => false,
    }
}

/// Normalize to the canonical `/a/b/` form: exactly one slash at each end.
///
/// Slashes inside the identifier are left alone.
pub fn clean_identifier(raw: &str) -> String {
    let inner = raw.trim_matches('/');
    if inner.is_empty() {
        "/".to_string()
    } else {
        format!("/{inner}/")
    }
}
