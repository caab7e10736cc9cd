//! Site configuration module.
//!
//! Handles loading, validating, and merging the site's `config.toml`. Stock
//! defaults are serialized to a TOML table and the user file is merged on top,
//! so a config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! `config.toml` lives at the site root, next to the two object roots:
//!
//! ```text
//! site/
//! ├── config.toml
//! ├── content/          # items
//! └── layouts/          # layouts
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! content_root = "content"
//! layouts_root = "layouts"
//! allow_periods_in_identifiers = false
//! text_extensions = ["html", "md", "css"]   # binary detection
//!
//! [locale]
//! default = "en"                # optional, must name an available locale
//!
//! [locale.availables.en]
//! default = true
//! name = "English"
//!
//! [locale.availables.fr]
//! name = "Français"
//!
//! [locale.exclude]
//! item = ["/css*", "/js*"]
//! layout = ["*"]
//!
//! [processing]
//! max_processes = 4
//! ```
//!
//! An empty `[locale.availables]` table means the site is not localized:
//! every object is emitted once, with no locale prefix.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Default locale `{0}` is not listed in locale.availables")]
    UnknownDefaultLocale(String),
    #[error("Invalid locale code `{0}`: expected two lowercase ASCII letters")]
    InvalidLocaleCode(String),
    #[error("Invalid entry for locale `{code}`: {source}")]
    InvalidLocaleEntry {
        code: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Unknown object kind `{0}` in locale.exclude (expected `item` or `layout`)")]
    UnknownObjectKind(String),
    #[error("Invalid exclusion pattern `{pattern}`: {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding items, relative to the site root.
    pub content_root: String,
    /// Directory holding layouts, relative to the site root.
    pub layouts_root: String,
    /// When false, every dot in a filename separates extensions.
    pub allow_periods_in_identifiers: bool,
    /// Extensions (without the dot) whose content is read as text.
    pub text_extensions: Vec<String>,
    pub locale: LocaleSection,
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_root: "content".to_string(),
            layouts_root: "layouts".to_string(),
            allow_periods_in_identifiers: false,
            text_extensions: default_text_extensions(),
            locale: LocaleSection::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

fn default_text_extensions() -> Vec<String> {
    [
        "css", "erb", "haml", "htm", "html", "js", "less", "markdown", "md", "php", "rb", "sass",
        "scss", "txt", "xhtml", "xml", "coffee", "hb", "handlebars", "mustache", "ms", "slim",
        "rdoc",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl SiteConfig {
    /// Validate config values that don't depend on locale resolution.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_root.trim().is_empty() || self.layouts_root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "content_root and layouts_root must not be empty".into(),
            ));
        }
        if self.content_root == self.layouts_root {
            return Err(ConfigError::Validation(
                "content_root and layouts_root must differ".into(),
            ));
        }
        if self.text_extensions.iter().any(|e| e.starts_with('.')) {
            return Err(ConfigError::Validation(
                "text_extensions are listed without the leading dot".into(),
            ));
        }
        Ok(())
    }
}

/// The `[locale]` section as written by the user.
///
/// This is the raw surface; [`crate::locale::LocaleConfig::from_section`]
/// turns it into the validated, immutable form the resolver reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocaleSection {
    /// Explicitly declared default locale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Locale code → entry, in document order.
    pub availables: toml::Table,
    /// Object kind (`item`, `layout`) → exclusion glob patterns.
    pub exclude: BTreeMap<String, Vec<String>>,
}

/// One `[locale.availables.<code>]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocaleEntry {
    /// Marks this locale as the site default.
    pub default: bool,
    /// Human-readable name, informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel resolver workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                let merged = match table.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                table.insert(key, merged);
            }
            toml::Value::Table(table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `config.toml` from the site root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(site_root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = site_root.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the site config, falling back to stock defaults when absent.
pub fn load_config(site_root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(site_root)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# i18n-source configuration
# ==========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directories (relative to the site root) holding items and layouts.
content_root = "content"
layouts_root = "layouts"

# When false, `foo.bar.html` has the extension chain `.bar.html` and the
# identifier `/foo/`. When true, only the last segment is the extension and
# the identifier keeps its periods (`/foo.bar/`).
allow_periods_in_identifiers = false

# Content files with any other extension are treated as binary: they are
# referenced by path and never decoded.
text_extensions = [
    "css", "erb", "haml", "htm", "html", "js", "less", "markdown", "md",
    "php", "rb", "sass", "scss", "txt", "xhtml", "xml", "coffee", "hb",
    "handlebars", "mustache", "ms", "slim", "rdoc",
]

# ---------------------------------------------------------------------------
# Localization
# ---------------------------------------------------------------------------
# Leave `availables` empty for a site without translations.
[locale]
# default = "en"   # optional; otherwise the locale marked `default = true`,
#                  # otherwise the first one listed.

[locale.availables]
# [locale.availables.en]
# default = true
# name = "English"
#
# [locale.availables.fr]
# name = "Français"

# Objects whose identifier or source path matches one of these patterns are
# emitted once, in the default locale. `*` matches anything, `+` matches at
# least one character. A metadata `locale: true` still forces expansion.
[locale.exclude]
# item = ["/css*", "/js*"]
# layout = ["*"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel resolver workers (omit to use every CPU core).
# max_processes = 4
"##
}
