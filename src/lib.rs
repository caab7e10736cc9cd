//! # i18n-source
//!
//! A localized filesystem content resolver for static site toolchains. The
//! filesystem is the data source: a site's `content/` and `layouts/` roots are
//! scanned, files are grouped into logical objects, and every object is
//! materialized once per locale it needs.
//!
//! # Resolution Pipeline
//!
//! ```text
//! 1. Scan       root/       →  file groups     (filename convention, shape checks)
//! 2. Assemble   groups      →  records         (metadata merge, locale expansion)
//! 3. Emit       records     →  manifest.json   (CLI only)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, stock defaults, validation |
//! | [`locale`] | Available locales, default locale, exclusion patterns |
//! | [`naming`] | `<stem>[.<locale>].<ext>` filename convention and per-locale file lookup |
//! | [`scan`] | Walks an object root and groups files by logical object |
//! | [`identifier`] | Derives `/a/b/` identifiers from source paths |
//! | [`metadata`] | YAML metadata, front matter, locale-layered merging |
//! | [`assemble`] | Turns file groups into per-locale [`types::ContentRecord`]s |
//! | [`create`] | Writes new objects in the same layout |
//! | [`types`] | Records and the site manifest |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Object, Many Files
//!
//! A logical object is one optional `.yaml` metadata file plus up to one
//! content file per locale. Translations live next to the original
//! (`about.html`, `about.fr.html`) rather than in per-locale trees, so a
//! missing translation falls back to the default content with no extra
//! bookkeeping.
//!
//! ## Locale Prefixes in Identifiers
//!
//! Expanded objects get a `/{locale}` identifier prefix (`/fr/about/`).
//! Objects left out of expansion, such as stylesheets or feeds, keep their
//! plain identifier and are emitted once in the default locale.
//!
//! ## Shape Errors Are Fatal
//!
//! Two metadata files for one object, more content files than locales, or
//! mixed content extensions abort the run. Silently picking one file would
//! make the site depend on directory listing order.
//!
//! ## Stateless Assembly
//!
//! Objects share nothing but the read-only [`locale::LocaleConfig`], so the
//! assembler runs on the rayon pool and sorts the records afterwards.

pub mod assemble;
pub mod config;
pub mod create;
pub mod identifier;
pub mod locale;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
