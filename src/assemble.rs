//! Content assembly: from grouped files to locale-specific records.
//!
//! For every logical object found by [`scan::group_files`] the resolver:
//!
//! 1. resolves the default-locale metadata and content files
//! 2. decides whether the object is binary (items only; layouts are text)
//! 3. parses metadata and content, splitting front matter when there is no
//!    separate metadata file
//! 4. decides whether the object takes part in locale expansion
//! 5. for each locale to emit, re-resolves and re-parses the files, merges
//!    the metadata layers, and builds a [`ContentRecord`]
//!
//! ## Locale participation
//!
//! An object is expanded into one record per available locale when its
//! metadata sets a truthy `locale`, or when `locale` is absent and neither
//! its identifier nor its source path matches an exclusion pattern.
//! `locale: false` always wins. Otherwise a single record is emitted in the
//! default locale, without a locale prefix.
//!
//! Participation is decided once, from the default-locale files. A
//! `locale: false` that only appears in a translated file is not seen.
//!
//! ## Parallelism
//!
//! Objects are independent, so they are assembled on the rayon pool. Each
//! worker only reads the shared [`LocaleConfig`] and returns its own records;
//! the results are concatenated and sorted by identifier.

use crate::config::{ConfigError, SiteConfig};
use crate::identifier::identifier_for;
use crate::locale::LocaleConfig;
use crate::metadata::{
    self, LOCALE_KEY, LocaleMarker, Metadata, MetadataError, locale_marker, merge_layers,
    parse_metadata, split_front_matter,
};
use crate::naming::{self, resolve_file};
use crate::scan::{self, FileGroup, ScanError};
use crate::types::{Content, ContentRecord, Manifest, ObjectKind};
use rayon::prelude::*;
use serde_yaml::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("No metadata or content file found for {kind} `{key}`")]
    MissingSource { kind: ObjectKind, key: String },
}

/// Resolves object roots into content records.
///
/// Holds only immutable state, so one resolver can serve many roots and
/// many threads.
#[derive(Debug, Clone)]
pub struct Resolver {
    locales: LocaleConfig,
    allow_periods: bool,
    text_extensions: HashSet<String>,
    content_root: PathBuf,
    layouts_root: PathBuf,
}

/// Relative paths (from the object root) of one object's files in one locale.
#[derive(Debug, Clone, Default)]
struct SourceFiles {
    meta: Option<String>,
    content: Option<String>,
}

impl SourceFiles {
    /// File the identifier is derived from: metadata first.
    fn identifier_source(&self) -> Option<&str> {
        self.meta.as_deref().or(self.content.as_deref())
    }

    /// File matched against exclusion patterns: content first.
    fn exclusion_source(&self) -> Option<&str> {
        self.content.as_deref().or(self.meta.as_deref())
    }
}

#[derive(Debug)]
struct Parsed {
    meta: Metadata,
    content: Content,
}

impl Resolver {
    pub fn new(locales: LocaleConfig, config: &SiteConfig) -> Self {
        Self {
            locales,
            allow_periods: config.allow_periods_in_identifiers,
            text_extensions: config.text_extensions.iter().cloned().collect(),
            content_root: PathBuf::from(&config.content_root),
            layouts_root: PathBuf::from(&config.layouts_root),
        }
    }

    pub fn from_site_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(LocaleConfig::from_section(&config.locale)?, config))
    }

    pub fn locales(&self) -> &LocaleConfig {
        &self.locales
    }

    /// Items under `<site_root>/<content_root>`.
    pub fn items(&self, site_root: &Path) -> Result<Vec<ContentRecord>, ResolveError> {
        self.load_objects(&site_root.join(&self.content_root), ObjectKind::Item)
    }

    /// Layouts under `<site_root>/<layouts_root>`.
    pub fn layouts(&self, site_root: &Path) -> Result<Vec<ContentRecord>, ResolveError> {
        self.load_objects(&site_root.join(&self.layouts_root), ObjectKind::Layout)
    }

    /// Resolve every object under `root` into records, sorted by identifier.
    pub fn load_objects(
        &self,
        root: &Path,
        kind: ObjectKind,
    ) -> Result<Vec<ContentRecord>, ResolveError> {
        let groups = scan::group_files(root, &self.locales, self.allow_periods)?;
        debug!(root = %root.display(), %kind, objects = groups.len(), "assembling objects");

        let per_object: Vec<Vec<ContentRecord>> = groups
            .par_iter()
            .map(|(key, group)| self.assemble_object(root, kind, key, group))
            .collect::<Result<_, _>>()?;

        let mut records: Vec<ContentRecord> = per_object.into_iter().flatten().collect();
        records.sort_by(|a, b| {
            a.identifier
                .cmp(&b.identifier)
                .then_with(|| a.locale.cmp(&b.locale))
        });
        Ok(records)
    }

    fn assemble_object(
        &self,
        root: &Path,
        kind: ObjectKind,
        key: &str,
        group: &FileGroup,
    ) -> Result<Vec<ContentRecord>, ResolveError> {
        let default = self.locales.default_locale();
        let files = self.resolve_files(root, key, group, default);
        let is_binary = kind == ObjectKind::Item
            && files.content.as_deref().is_some_and(|p| !self.is_text(p));
        let parsed = self.parse(root, kind, key, &files, is_binary)?;
        let expand = self.participates(kind, key, &files, &parsed.meta)?;
        debug!(%kind, key, expand, is_binary, "locale participation");

        if !expand {
            let record = self.build_record(root, kind, key, files, parsed, default, false, is_binary)?;
            return Ok(vec![record]);
        }

        self.locales
            .available()
            .iter()
            .map(|locale| {
                let files = self.resolve_files(root, key, group, Some(locale));
                let parsed = self.parse(root, kind, key, &files, is_binary)?;
                self.build_record(root, kind, key, files, parsed, Some(locale), true, is_binary)
            })
            .collect()
    }

    fn resolve_files(
        &self,
        root: &Path,
        key: &str,
        group: &FileGroup,
        current: Option<&str>,
    ) -> SourceFiles {
        let default = self.locales.default_locale();
        SourceFiles {
            meta: resolve_file(root, key, group.meta_ext.as_deref(), current, default),
            content: resolve_file(root, key, group.content_ext.as_deref(), current, default),
        }
    }

    fn is_text(&self, path: &str) -> bool {
        naming::last_extension(path).is_some_and(|ext| self.text_extensions.contains(ext))
    }

    fn parse(
        &self,
        root: &Path,
        kind: ObjectKind,
        key: &str,
        files: &SourceFiles,
        is_binary: bool,
    ) -> Result<Parsed, ResolveError> {
        if files.meta.is_some() || is_binary {
            let meta = match &files.meta {
                Some(relative) => {
                    let path = root.join(relative);
                    parse_metadata(&fs::read_to_string(&path)?, &path)?
                }
                None => Metadata::new(),
            };
            let content = match &files.content {
                Some(relative) if is_binary => Content::Binary(root.join(relative)),
                Some(relative) => Content::Text(fs::read_to_string(root.join(relative))?),
                None => Content::Text(String::new()),
            };
            return Ok(Parsed { meta, content });
        }

        let relative = files
            .content
            .as_deref()
            .ok_or_else(|| missing_source(kind, key))?;
        let path = root.join(relative);
        let data = fs::read_to_string(&path)?;
        let (meta, body) = split_front_matter(&data, &path, kind.as_str())?;
        Ok(Parsed {
            meta,
            content: Content::Text(body),
        })
    }

    fn participates(
        &self,
        kind: ObjectKind,
        key: &str,
        files: &SourceFiles,
        meta: &Metadata,
    ) -> Result<bool, ResolveError> {
        if !self.locales.is_localized_site() {
            return Ok(false);
        }
        match locale_marker(meta) {
            LocaleMarker::Force => Ok(true),
            LocaleMarker::Disable => Ok(false),
            LocaleMarker::Unset => {
                let id_source = files
                    .identifier_source()
                    .ok_or_else(|| missing_source(kind, key))?;
                let path_source = files
                    .exclusion_source()
                    .ok_or_else(|| missing_source(kind, key))?;
                let identifier = identifier_for(id_source, self.allow_periods);
                let path = format!("/{path_source}");
                let excluded = self.locales.is_excluded(kind, &identifier)
                    || self.locales.is_excluded(kind, &path);
                Ok(!excluded)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_record(
        &self,
        root: &Path,
        kind: ObjectKind,
        key: &str,
        files: SourceFiles,
        parsed: Parsed,
        locale: Option<&str>,
        expand: bool,
        is_binary: bool,
    ) -> Result<ContentRecord, ResolveError> {
        let meta = if expand {
            let path = root.join(files.identifier_source().unwrap_or(key));
            merge_layers(metadata::locale_layers(
                parsed.meta,
                locale,
                self.locales.default_locale(),
                &path,
            )?)
        } else {
            let mut meta = parsed.meta;
            meta.remove(LOCALE_KEY);
            meta
        };

        let source = files
            .identifier_source()
            .ok_or_else(|| missing_source(kind, key))?;
        let mut identifier = identifier_for(source, self.allow_periods);
        if expand && let Some(code) = locale {
            identifier = format!("/{code}{identifier}");
        }

        let content_filename = files.content.as_ref().map(|p| root.join(p));
        let meta_filename = files.meta.as_ref().map(|p| root.join(p));
        let extension = files
            .content
            .as_deref()
            .map(|p| naming::extension_of(p, self.allow_periods).1)
            .filter(|ext| !ext.is_empty())
            .map(String::from);

        let mut attributes = Metadata::new();
        attributes.insert("filename".into(), path_value(content_filename.as_deref()));
        attributes.insert(
            "content_filename".into(),
            path_value(content_filename.as_deref()),
        );
        attributes.insert("meta_filename".into(), path_value(meta_filename.as_deref()));
        attributes.insert("extension".into(), string_value(extension.as_deref()));
        attributes.insert("locale".into(), string_value(locale));
        attributes.extend(meta);

        let modified_at = modified_at(root, &files).ok_or_else(|| missing_source(kind, key))??;

        debug!(%identifier, locale = ?locale, "emitting record");
        Ok(ContentRecord {
            identifier,
            kind,
            locale: locale.map(String::from),
            content_filename,
            meta_filename,
            extension,
            is_binary,
            modified_at,
            attributes,
            content: parsed.content,
        })
    }
}

fn missing_source(kind: ObjectKind, key: &str) -> ResolveError {
    ResolveError::MissingSource {
        kind,
        key: key.to_string(),
    }
}

/// The newer of the two files' modification times; `None` without files.
fn modified_at(root: &Path, files: &SourceFiles) -> Option<std::io::Result<SystemTime>> {
    let stamp = |relative: &Option<String>| {
        relative
            .as_ref()
            .map(|p| fs::metadata(root.join(p)).and_then(|m| m.modified()))
    };
    match (stamp(&files.meta), stamp(&files.content)) {
        (Some(Ok(meta)), Some(Ok(content))) => Some(Ok(meta.max(content))),
        (Some(Err(e)), _) | (_, Some(Err(e))) => Some(Err(e)),
        (Some(stamp), None) | (None, Some(stamp)) => Some(stamp),
        (None, None) => None,
    }
}

fn path_value(path: Option<&Path>) -> Value {
    path.map(|p| Value::String(p.to_string_lossy().into_owned()))
        .unwrap_or(Value::Null)
}

fn string_value(s: Option<&str>) -> Value {
    s.map(|s| Value::String(s.to_string())).unwrap_or(Value::Null)
}

/// Resolve both object roots of a site.
pub fn resolve_site(site_root: &Path, config: &SiteConfig) -> Result<Manifest, ResolveError> {
    let resolver = Resolver::from_site_config(config)?;
    let items = resolver.items(site_root)?;
    let layouts = resolver.layouts(site_root)?;
    info!(
        items = items.len(),
        layouts = layouts.len(),
        localized = resolver.locales().is_localized_site(),
        "resolved site"
    );
    Ok(Manifest { items, layouts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{find_record, identifiers, localized, resolver, write_file};
    use std::collections::BTreeMap;
    use std::time::Duration;
    use tempfile::TempDir;

    fn items(resolver: &Resolver, site: &Path) -> Vec<ContentRecord> {
        resolver.items(site).unwrap()
    }

    fn unlocalized() -> Resolver {
        resolver(LocaleConfig::unlocalized())
    }

    fn with_periods(locales: LocaleConfig) -> Resolver {
        let config = SiteConfig {
            allow_periods_in_identifiers: true,
            ..SiteConfig::default()
        };
        Resolver::new(locales, &config)
    }

    // =========================================================================
    // Unlocalized sites
    // =========================================================================

    #[test]
    fn named_directory_object() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/foo/foo.yaml", "---\ntitle: Foo\n");
        write_file(tmp.path(), "content/foo/foo.html", "Lorem ipsum dolor sit amet...");

        let records = items(&unlocalized(), tmp.path());
        assert_eq!(records.len(), 1);
        let foo = &records[0];
        assert_eq!(foo.identifier, "/foo/");
        assert_eq!(foo.extension.as_deref(), Some("html"));
        assert_eq!(foo.attribute_str("title"), Some("Foo"));
        assert_eq!(foo.attribute_str("extension"), Some("html"));
        assert_eq!(foo.locale, None);
        assert_eq!(
            foo.content_filename.as_deref(),
            Some(tmp.path().join("content/foo/foo.html").as_path())
        );
        assert_eq!(
            foo.meta_filename.as_deref(),
            Some(tmp.path().join("content/foo/foo.yaml").as_path())
        );
        assert_eq!(
            foo.content.as_text(),
            Some("Lorem ipsum dolor sit amet...")
        );
        assert!(!foo.is_binary);
    }

    #[test]
    fn items_with_different_extensions() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/foo/foo.yaml", "title: Foo\n");
        write_file(tmp.path(), "content/foo/foo.html", "Lorem");
        write_file(tmp.path(), "content/bar/bar.yaml", "title: Bar\n");
        write_file(tmp.path(), "content/bar/bar.xml", "Lorem");

        let records = items(&unlocalized(), tmp.path());
        assert_eq!(identifiers(&records), vec!["/bar/", "/foo/"]);
        assert_eq!(find_record(&records, "/bar/").extension.as_deref(), Some("xml"));
        assert_eq!(find_record(&records, "/foo/").extension.as_deref(), Some("html"));
    }

    #[test]
    fn content_without_metadata_file() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/bar/bar.html", "Lorem");

        let records = items(&unlocalized(), tmp.path());
        let bar = find_record(&records, "/bar/");
        assert_eq!(bar.meta_filename, None);
        assert_eq!(bar.attribute("meta_filename"), Some(&Value::Null));
        let keys: Vec<&str> = bar.attributes.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["content_filename", "extension", "filename", "locale", "meta_filename"]
        );
    }

    #[test]
    fn metadata_without_content_file() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/bar/bar.yaml", "title: Bar\n");

        let records = items(&unlocalized(), tmp.path());
        let bar = find_record(&records, "/bar/");
        assert_eq!(bar.attribute_str("title"), Some("Bar"));
        assert_eq!(bar.extension, None);
        assert_eq!(bar.content_filename, None);
        assert_eq!(bar.content.as_text(), Some(""));
    }

    #[test]
    fn front_matter_is_parsed_without_metadata_file() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "content/post.md",
            "---\ntitle: Post\ntags: [a, b]\n---\n\n# Heading\n",
        );

        let records = items(&unlocalized(), tmp.path());
        let post = find_record(&records, "/post/");
        assert_eq!(post.attribute_str("title"), Some("Post"));
        assert_eq!(post.content.as_text(), Some("# Heading"));
    }

    #[test]
    fn metadata_file_disables_front_matter_parsing() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/post.yaml", "title: Outer\n");
        write_file(tmp.path(), "content/post.md", "---\ntitle: Inner\n---\nBody\n");

        let records = items(&unlocalized(), tmp.path());
        let post = find_record(&records, "/post/");
        assert_eq!(post.attribute_str("title"), Some("Outer"));
        assert_eq!(post.content.as_text(), Some("---\ntitle: Inner\n---\nBody\n"));
    }

    #[test]
    fn malformed_front_matter_is_error() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/post.md", "---\ntitle: Post\n");

        let result = unlocalized().items(tmp.path());
        assert!(matches!(
            result,
            Err(ResolveError::Metadata(MetadataError::MalformedFrontMatter { .. }))
        ));
    }

    #[test]
    fn binary_item_keeps_path_reference() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "foo/stuff.dat", "random binary data");

        let records = unlocalized()
            .load_objects(&tmp.path().join("foo"), ObjectKind::Item)
            .unwrap();
        assert_eq!(records.len(), 1);
        let stuff = &records[0];
        assert!(stuff.is_binary);
        assert_eq!(stuff.identifier, "/stuff/");
        assert_eq!(
            stuff.content.binary_path(),
            Some(&tmp.path().join("foo/stuff.dat"))
        );
        assert_eq!(stuff.content.as_text(), None);
    }

    #[test]
    fn binary_item_with_metadata_is_not_decoded() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/logo.yaml", "alt: Logo\n");
        write_file(tmp.path(), "content/logo.png", "not really a png");

        let records = items(&unlocalized(), tmp.path());
        let logo = find_record(&records, "/logo/");
        assert!(logo.is_binary);
        assert_eq!(logo.attribute_str("alt"), Some("Logo"));
        assert!(logo.content.binary_path().is_some());
    }

    #[test]
    fn layouts_are_never_binary() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "layouts/foo/foo.yaml", "filter: erb\n");
        write_file(tmp.path(), "layouts/foo/foo.rhtml", "Lorem ipsum");

        let layouts = unlocalized().layouts(tmp.path()).unwrap();
        assert_eq!(layouts.len(), 1);
        let foo = &layouts[0];
        assert_eq!(foo.kind, ObjectKind::Layout);
        assert!(!foo.is_binary);
        assert_eq!(foo.attribute_str("filter"), Some("erb"));
        assert_eq!(foo.extension.as_deref(), Some("rhtml"));
        assert_eq!(foo.content.as_text(), Some("Lorem ipsum"));
    }

    #[test]
    fn extension_chain_layouts_without_periods() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "layouts/foo/foo.yaml", "dog: woof\n");
        write_file(tmp.path(), "layouts/foo/foo.html", "body.foo {}");
        write_file(tmp.path(), "layouts/bar/bar.yaml", "cat: meow\n");
        write_file(tmp.path(), "layouts/bar/bar.html.erb", "body.foobar {}");

        let layouts = unlocalized().layouts(tmp.path()).unwrap();
        assert_eq!(identifiers(&layouts), vec!["/bar/", "/foo/"]);
        assert_eq!(layouts[0].attribute_str("cat"), Some("meow"));
        assert_eq!(layouts[0].extension.as_deref(), Some("html.erb"));
        assert_eq!(layouts[1].attribute_str("dog"), Some("woof"));
    }

    #[test]
    fn periods_in_identifiers() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/foo/foo.yaml", "title: Foo\n");
        write_file(tmp.path(), "content/foo/foo.css", "body.foo {}");
        write_file(tmp.path(), "content/foo.bar/foo.bar.yaml", "title: Foo Bar\n");
        write_file(tmp.path(), "content/foo.bar/foo.bar.css", "body.foobar {}");

        let records = items(&with_periods(LocaleConfig::unlocalized()), tmp.path());
        assert_eq!(identifiers(&records), vec!["/foo.bar/", "/foo/"]);
        let foobar = find_record(&records, "/foo.bar/");
        assert_eq!(foobar.attribute_str("title"), Some("Foo Bar"));
        assert_eq!(
            foobar.content_filename.as_deref(),
            Some(tmp.path().join("content/foo.bar/foo.bar.css").as_path())
        );
    }

    #[test]
    fn root_index_object() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/index.yaml", "title: Home\n");
        write_file(tmp.path(), "content/index.html", "Welcome");

        let records = items(&unlocalized(), tmp.path());
        let home = find_record(&records, "/");
        assert_eq!(home.attribute_str("title"), Some("Home"));
        assert_eq!(home.content.as_text(), Some("Welcome"));
    }

    #[test]
    fn each_group_emits_its_own_file_when_identifiers_collide() {
        for other in ["content/foo.html", "content/foo/index.html"] {
            let tmp = TempDir::new().unwrap();
            write_file(tmp.path(), other, "other");
            write_file(tmp.path(), "content/foo/foo.html", "named");

            let records = items(&unlocalized(), tmp.path());
            assert_eq!(identifiers(&records), vec!["/foo/", "/foo/"], "{other}");

            let mut sources: Vec<PathBuf> = records
                .iter()
                .filter_map(|r| r.content_filename.clone())
                .collect();
            sources.sort();
            let mut expected = vec![
                tmp.path().join(other),
                tmp.path().join("content/foo/foo.html"),
            ];
            expected.sort();
            assert_eq!(sources, expected, "{other}");

            let mut bodies: Vec<&str> = records.iter().filter_map(|r| r.content.as_text()).collect();
            bodies.sort();
            assert_eq!(bodies, vec!["named", "other"], "{other}");
        }
    }

    #[test]
    fn locale_marker_not_copied_into_attributes() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/page.html", "---\nlocale: false\n---\nBody");

        let records = items(&unlocalized(), tmp.path());
        assert_eq!(records[0].attribute("locale"), Some(&Value::Null));
    }

    #[test]
    fn modified_at_is_newest_file() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/page.yaml", "title: Page\n");
        write_file(tmp.path(), "content/page.html", "Body");

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        let new = SystemTime::UNIX_EPOCH + Duration::from_secs(2_000_000);
        let set = |relative: &str, time: SystemTime| {
            fs::File::options()
                .write(true)
                .open(tmp.path().join(relative))
                .unwrap()
                .set_modified(time)
                .unwrap();
        };
        set("content/page.yaml", new);
        set("content/page.html", old);
        assert_eq!(items(&unlocalized(), tmp.path())[0].modified_at, new);

        set("content/page.yaml", old);
        set("content/page.html", new);
        assert_eq!(items(&unlocalized(), tmp.path())[0].modified_at, new);
    }

    #[test]
    fn missing_root_resolves_to_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(unlocalized().layouts(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn many_objects_resolve() {
        let tmp = TempDir::new().unwrap();
        for i in 0..300 {
            write_file(tmp.path(), &format!("content/{i}/{i}.html"), &format!("Item {i}."));
            write_file(tmp.path(), &format!("content/{i}/{i}.yaml"), &format!("title: Item {i}"));
        }
        let records = items(&unlocalized(), tmp.path());
        assert_eq!(records.len(), 300);
        assert_eq!(find_record(&records, "/42/").attribute_str("title"), Some("Item 42"));
    }

    // =========================================================================
    // Localized sites
    // =========================================================================

    #[test]
    fn localized_object_expands_per_locale() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/about.yaml", "title: About\n");
        write_file(tmp.path(), "content/about.html", "Default body");
        write_file(tmp.path(), "content/about.fr.html", "Corps français");

        let records = items(&resolver(localized(&["en", "fr"], "en")), tmp.path());
        assert_eq!(identifiers(&records), vec!["/en/about/", "/fr/about/"]);

        let en = find_record(&records, "/en/about/");
        assert_eq!(en.locale.as_deref(), Some("en"));
        assert_eq!(en.attribute_str("locale"), Some("en"));
        assert_eq!(en.content.as_text(), Some("Default body"));

        let fr = find_record(&records, "/fr/about/");
        assert_eq!(fr.content.as_text(), Some("Corps français"));
        assert_eq!(
            fr.content_filename.as_deref(),
            Some(tmp.path().join("content/about.fr.html").as_path())
        );
        assert_eq!(fr.attribute_str("title"), Some("About"));
    }

    #[test]
    fn missing_translation_falls_back_to_default_locale_file() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/news.en.md", "English news");

        let records = items(&resolver(localized(&["en", "fr", "de"], "en")), tmp.path());
        assert_eq!(records.len(), 3);
        for record in &records {
            assert_eq!(record.content.as_text(), Some("English news"));
        }
        assert_eq!(find_record(&records, "/de/news/").locale.as_deref(), Some("de"));
    }

    #[test]
    fn nested_locale_blocks_merge() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "content/page.yaml",
            "title: A\nlocale:\n  en:\n    title: Default\n  fr:\n    title: Français\n",
        );
        write_file(tmp.path(), "content/page.html", "Body");

        let records = items(&resolver(localized(&["en", "fr"], "en")), tmp.path());
        assert_eq!(find_record(&records, "/fr/page/").attribute_str("title"), Some("Français"));
        assert_eq!(find_record(&records, "/en/page/").attribute_str("title"), Some("A"));
        assert_eq!(find_record(&records, "/fr/page/").attribute("locale"), Some(&Value::String("fr".into())));
    }

    #[test]
    fn per_locale_metadata_files_are_reparsed() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/page/index.md", "---\ntitle: Hello\n---\nHi");
        write_file(tmp.path(), "content/page/index.fr.md", "---\ntitle: Bonjour\n---\nSalut");

        let records = items(&resolver(localized(&["en", "fr"], "en")), tmp.path());
        assert_eq!(find_record(&records, "/en/page/").attribute_str("title"), Some("Hello"));
        assert_eq!(find_record(&records, "/fr/page/").attribute_str("title"), Some("Bonjour"));
        assert_eq!(find_record(&records, "/fr/page/").content.as_text(), Some("Salut"));
    }

    #[test]
    fn locale_false_forces_single_default_record() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/feed.yaml", "locale: false\ntitle: Feed\n");
        write_file(tmp.path(), "content/feed.xml", "<feed/>");

        let records = items(&resolver(localized(&["en", "fr"], "en")), tmp.path());
        assert_eq!(identifiers(&records), vec!["/feed/"]);
        assert_eq!(records[0].locale.as_deref(), Some("en"));
        assert_eq!(records[0].attribute_str("locale"), Some("en"));
    }

    #[test]
    fn excluded_objects_are_not_expanded() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/css/style.css", "body {}");
        write_file(tmp.path(), "content/page.html", "Page");

        let mut exclude = BTreeMap::new();
        exclude.insert(ObjectKind::Item, vec!["/css*".to_string()]);
        let locales =
            LocaleConfig::new(vec!["en".into(), "fr".into()], Some("en".into()), exclude).unwrap();

        let records = items(&resolver(locales), tmp.path());
        assert_eq!(
            identifiers(&records),
            vec!["/css/style/", "/en/page/", "/fr/page/"]
        );
    }

    #[test]
    fn exclusion_matches_identifier() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/sitemap/sitemap.xml", "<urlset/>");

        let mut exclude = BTreeMap::new();
        exclude.insert(ObjectKind::Item, vec!["sitemap".to_string()]);
        let locales =
            LocaleConfig::new(vec!["en".into(), "fr".into()], Some("en".into()), exclude).unwrap();

        let records = items(&resolver(locales), tmp.path());
        assert_eq!(identifiers(&records), vec!["/sitemap/"]);
    }

    #[test]
    fn truthy_locale_overrides_exclusion() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "layouts/default.html", "---\nlocale: true\n---\n<html/>");
        write_file(tmp.path(), "layouts/plain.html", "<html/>");

        let mut exclude = BTreeMap::new();
        exclude.insert(ObjectKind::Layout, vec!["*".to_string()]);
        let locales =
            LocaleConfig::new(vec!["en".into(), "fr".into()], Some("en".into()), exclude).unwrap();

        let layouts = resolver(locales).layouts(tmp.path()).unwrap();
        assert_eq!(
            identifiers(&layouts),
            vec!["/en/default/", "/fr/default/", "/plain/"]
        );
    }

    #[test]
    fn participation_decided_from_default_locale_file() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/page.md", "---\ntitle: Page\n---\nBody");
        write_file(tmp.path(), "content/page.fr.md", "---\nlocale: false\n---\nCorps");

        let records = items(&resolver(localized(&["en", "fr"], "en")), tmp.path());
        assert_eq!(identifiers(&records), vec!["/en/page/", "/fr/page/"]);
        assert_eq!(find_record(&records, "/fr/page/").content.as_text(), Some("Corps"));
    }

    #[test]
    fn binary_items_expand_per_locale() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/brochure.pdf", "%PDF default");
        write_file(tmp.path(), "content/brochure.fr.pdf", "%PDF fr");

        let records = items(&resolver(localized(&["en", "fr"], "en")), tmp.path());
        let fr = find_record(&records, "/fr/brochure/");
        assert!(fr.is_binary);
        assert_eq!(
            fr.content.binary_path(),
            Some(&tmp.path().join("content/brochure.fr.pdf"))
        );
    }

    #[test]
    fn resolve_site_reads_config() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "src/home.html", "Home");
        write_file(tmp.path(), "templates/base.html", "<html/>");
        let config = SiteConfig {
            content_root: "src".into(),
            layouts_root: "templates".into(),
            ..SiteConfig::default()
        };

        let manifest = resolve_site(tmp.path(), &config).unwrap();
        assert_eq!(identifiers(&manifest.items), vec!["/home/"]);
        assert_eq!(identifiers(&manifest.layouts), vec!["/base/"]);
    }

    #[test]
    fn shape_errors_surface() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/a.html", "1");
        write_file(tmp.path(), "content/a.en.html", "2");

        let result = unlocalized().items(tmp.path());
        assert!(matches!(result, Err(ResolveError::Scan(ScanError::Shape(_)))));
    }
}
