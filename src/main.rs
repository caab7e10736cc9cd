use clap::{Parser, Subcommand};
use i18n_source::create::{self, NewObject};
use i18n_source::metadata::Metadata;
use i18n_source::{assemble, config, output};
use serde_yaml::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flags shared by the object creation commands.
#[derive(clap::Args, Clone)]
struct CreateArgs {
    /// Identifier of the new object, e.g. /about/
    identifier: String,

    /// Content written to every content file
    #[arg(long, default_value = "")]
    content: String,

    /// Metadata attribute as key=value (repeatable; values are YAML scalars)
    #[arg(long = "attr", value_parser = parse_attr)]
    attrs: Vec<(String, Value)>,

    /// Content file extension (html or .html)
    #[arg(long)]
    extension: Option<String>,
}

#[derive(Parser)]
#[command(name = "i18n-source")]
#[command(about = "Resolve a localized filesystem content tree")]
#[command(long_about = "\
Resolve a localized filesystem content tree

Each logical object is an optional YAML metadata file plus one content file
per locale, named <stem>[.<locale>].<ext>:

  site/
  ├── config.toml                  # Locales, exclusions, roots (optional)
  ├── content/
  │   ├── index.yaml               # Metadata for /
  │   ├── index.html               # Default content for /
  │   ├── index.fr.html            # French content for /
  │   ├── about/
  │   │   ├── about.yaml           # Metadata for /about/
  │   │   └── about.md             # Content with front matter allowed
  │   └── css/style.css            # Usually excluded from locale expansion
  └── layouts/
      └── default.html

Localized objects are emitted once per available locale under a /{locale}
prefix (/fr/about/). Missing translations fall back to the default content.

Run 'i18n-source gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site directory holding config.toml and the object roots
    #[arg(long, default_value = ".", global = true)]
    site: PathBuf,

    /// Where `scan` writes the JSON manifest, relative to the site
    #[arg(long, default_value = ".i18n-source/manifest.json", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve all items and layouts into a manifest
    Scan,
    /// Validate the site without writing anything
    Check,
    /// Create a new item under the content root
    CreateItem(CreateArgs),
    /// Create a new layout under the layouts root
    CreateLayout(CreateArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let site_config = config::load_config(&cli.site)?;
            init_thread_pool(&site_config.processing);
            let manifest = assemble::resolve_site(&cli.site, &site_config)?;
            let manifest_path = cli.site.join(&cli.output);
            if let Some(parent) = manifest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_manifest(&manifest, &cli.site);
            println!("==> Manifest written to {}", manifest_path.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.site.display());
            let site_config = config::load_config(&cli.site)?;
            init_thread_pool(&site_config.processing);
            let manifest = assemble::resolve_site(&cli.site, &site_config)?;
            output::print_manifest(&manifest, &cli.site);
            println!("==> Site is valid");
        }
        Command::CreateItem(args) => {
            let site_config = config::load_config(&cli.site)?;
            let attributes: Metadata = args.attrs.iter().cloned().collect();
            let created =
                create::create_item(&cli.site, &site_config, &new_object(&args, &attributes))?;
            output::print_created(&created, &cli.site);
        }
        Command::CreateLayout(args) => {
            let site_config = config::load_config(&cli.site)?;
            let attributes: Metadata = args.attrs.iter().cloned().collect();
            let created =
                create::create_layout(&cli.site, &site_config, &new_object(&args, &attributes))?;
            output::print_created(&created, &cli.site);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn new_object<'a>(args: &'a CreateArgs, attributes: &'a Metadata) -> NewObject<'a> {
    NewObject {
        identifier: &args.identifier,
        content: &args.content,
        attributes,
        extension: args.extension.as_deref(),
    }
}

/// Parse `key=value`, reading the value as a YAML scalar (`3`, `true`, `Hello`).
fn parse_attr(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty attribute key in `{s}`"));
    }
    let value = match serde_yaml::from_str::<Value>(value) {
        Ok(Value::Mapping(_) | Value::Sequence(_) | Value::Tagged(_)) | Err(_) => {
            Value::String(value.to_string())
        }
        Ok(scalar) => scalar,
    };
    Ok((key.to_string(), value))
}

/// Log to stderr so stdout stays reserved for command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
