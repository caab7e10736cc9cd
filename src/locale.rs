//! Locale configuration and exclusion patterns.
//!
//! [`LocaleConfig`] is built once per resolver run from the `[locale]` section
//! of the site config and never changes afterwards. Workers resolving
//! different objects in parallel all read the same instance.
//!
//! ## Default locale
//!
//! The default is picked in this order:
//!
//! 1. `locale.default`, which must name an available locale
//! 2. the first available locale with `default = true`
//! 3. the first available locale in document order
//!
//! With no available locales the site is not localized and there is no
//! default at all.
//!
//! ## Exclusion patterns
//!
//! Patterns are small globs compiled into an [`ExcludePattern`]:
//!
//! - a missing leading `/` is added
//! - a trailing `/` is added unless the pattern already ends in `/` or `*`
//! - `*` matches any run of characters (slashes included), `+` matches one or
//!   more characters
//! - the whole target must match, after an optional leading segment that
//!   contains no `/`
//!
//! On a site without locales every kind is excluded with `*`.

use crate::config::{ConfigError, LocaleEntry, LocaleSection};
use crate::types::ObjectKind;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static MATCH_ALL: LazyLock<ExcludePattern> =
    LazyLock::new(|| ExcludePattern::compile("*").expect("match-all pattern must compile"));

/// Validated, immutable locale settings for one resolver run.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    available: Vec<String>,
    default: Option<String>,
    exclude: BTreeMap<ObjectKind, Vec<ExcludePattern>>,
}

impl LocaleConfig {
    /// A site without translations: no locales, every kind excluded.
    pub fn unlocalized() -> Self {
        let exclude = [ObjectKind::Item, ObjectKind::Layout]
            .into_iter()
            .map(|kind| (kind, vec![MATCH_ALL.clone()]))
            .collect();
        Self {
            available: Vec::new(),
            default: None,
            exclude,
        }
    }

    /// Build a config from explicit values.
    ///
    /// `default` must be one of `available` when given. When `None`, the
    /// first available locale becomes the default.
    pub fn new(
        available: Vec<String>,
        default: Option<String>,
        exclude: BTreeMap<ObjectKind, Vec<String>>,
    ) -> Result<Self, ConfigError> {
        if let Some(code) = available.iter().find(|c| !is_locale_code(c)) {
            return Err(ConfigError::InvalidLocaleCode(code.clone()));
        }
        if available.is_empty() {
            return Ok(Self::unlocalized());
        }

        let default = match default {
            Some(code) if available.contains(&code) => code,
            Some(code) => return Err(ConfigError::UnknownDefaultLocale(code)),
            None => available[0].clone(),
        };

        let exclude = exclude
            .into_iter()
            .map(|(kind, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| ExcludePattern::compile(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((kind, compiled))
            })
            .collect::<Result<_, ConfigError>>()?;

        Ok(Self {
            available,
            default: Some(default),
            exclude,
        })
    }

    /// Build from the raw `[locale]` config section.
    pub fn from_section(section: &LocaleSection) -> Result<Self, ConfigError> {
        let mut available = Vec::with_capacity(section.availables.len());
        let mut marked_default = None;
        for (code, value) in &section.availables {
            let entry = value.clone().try_into::<LocaleEntry>().map_err(|source| {
                ConfigError::InvalidLocaleEntry {
                    code: code.clone(),
                    source,
                }
            })?;
            if entry.default && marked_default.is_none() {
                marked_default = Some(code.clone());
            }
            available.push(code.clone());
        }

        let mut exclude = BTreeMap::new();
        for (kind, patterns) in &section.exclude {
            let kind = ObjectKind::parse(kind)
                .ok_or_else(|| ConfigError::UnknownObjectKind(kind.clone()))?;
            exclude.insert(kind, patterns.clone());
        }

        if available.is_empty()
            && let Some(code) = &section.default
        {
            return Err(ConfigError::UnknownDefaultLocale(code.clone()));
        }

        Self::new(available, section.default.clone().or(marked_default), exclude)
    }

    /// True iff at least one locale is available.
    pub fn is_localized_site(&self) -> bool {
        !self.available.is_empty()
    }

    /// Available locale codes, in configuration order.
    pub fn available(&self) -> &[String] {
        &self.available
    }

    /// The default locale, `None` on a site without locales.
    pub fn default_locale(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Upper bound on content variants per logical object.
    pub fn max_variants(&self) -> usize {
        self.available.len().max(1)
    }

    /// Exclusion patterns for a kind.
    ///
    /// Unconfigured kinds get no patterns on a localized site and `*` on a
    /// site without locales.
    pub fn exclude_patterns(&self, kind: ObjectKind) -> &[ExcludePattern] {
        self.exclude.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any of the kind's patterns matches `target`.
    pub fn is_excluded(&self, kind: ObjectKind, target: &str) -> bool {
        self.exclude_patterns(kind)
            .iter()
            .any(|pattern| pattern.matches(target))
    }
}

/// Two lowercase ASCII letters, the only shape the filename convention
/// recognizes as a locale suffix.
pub fn is_locale_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_lowercase())
}

/// A compiled exclusion glob.
///
/// Compiled once into an anchored regex: `*` becomes `.*?`, `+` becomes
/// `.+?`, and the optional leading segment becomes `[^/]*`.
#[derive(Debug, Clone)]
pub struct ExcludePattern {
    normalized: String,
    regex: Regex,
}

impl ExcludePattern {
    pub fn compile(pattern: &str) -> Result<Self, ConfigError> {
        let mut normalized = String::with_capacity(pattern.len() + 2);
        if !pattern.starts_with('/') {
            normalized.push('/');
        }
        normalized.push_str(pattern);
        if !normalized.ends_with('*') && !normalized.ends_with('/') {
            normalized.push('/');
        }

        let mut source = String::from(r"(?s)\A[^/]*");
        for c in normalized.chars() {
            match c {
                '*' => source.push_str(".*?"),
                '+' => source.push_str(".+?"),
                c => source.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            }
        }
        source.push_str(r"\z");

        let regex = Regex::new(&source).map_err(|source| ConfigError::InvalidExcludePattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { normalized, regex })
    }

    /// The pattern after anchoring, e.g. `css*` → `/css*`.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn matches(&self, target: &str) -> bool {
        self.regex.is_match(target)
    }
}
