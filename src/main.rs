use clap::{Parser, Subcommand};
use sitemeta::config::HostConfig;
use sitemeta::context::{RequestScope, ResolutionContext};
use sitemeta::definition::{FieldDecl, MetadataDef};
use sitemeta::engine::{Engine, MetadataGroup};
use sitemeta::store::MetadataStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sitemeta")]
#[command(about = "Resolve page metadata for content-driven sites")]
#[command(long_about = "\
Resolve page metadata for content-driven sites

Metadata records live in a JSON store file and attach to targets: exact
paths, named views (via the config's route table), individual content
objects, or whole content types. The resolve command runs the same
match-then-resolve pipeline a site would run at render time, which makes it
a quick way to answer \"what title does this URL actually get?\".

The store file:

  {
    \"version\": 1,
    \"records\": [
      { \"backend\": \"path\", \"path\": \"/about/\",
        \"values\": { \"title\": \"About us\" } },
      { \"backend\": \"model\", \"content_type\": \"product\",
        \"values\": { \"title\": \"Buy {{ product.name }}\" } }
    ]
  }

The built-in field set is title, description, keywords, plus og_title and
og_description aliased to their plain counterparts. Hosts embedding the
library declare their own fields in code.")]
#[command(version)]
struct Cli {
    /// Host config file
    #[arg(long, default_value = "sitemeta.toml", global = true)]
    config: PathBuf,

    /// Record store file (overrides the config's `store` entry)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log engine debug output (which backend matched, canonicalized paths)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve metadata for a path and print the fields
    Resolve {
        /// Path to resolve, e.g. "/products/7/?ref=home"
        path: String,
        /// Site to resolve under (defaults to the config's default_site)
        #[arg(long)]
        site: Option<String>,
        /// Language to resolve under
        #[arg(long)]
        language: Option<String>,
        /// Subdomain to resolve under
        #[arg(long)]
        subdomain: Option<String>,
        /// Template variables for substitution, KEY=VALUE (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },
    /// Print the derived record schemas as JSON
    Schema,
    /// Validate the config and store files without resolving anything
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut clog = colog::default_builder();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    clog.filter(None, level);
    clog.init();

    let config = if cli.config.exists() {
        HostConfig::load(&cli.config)?
    } else {
        HostConfig::default()
    };

    let store_path = cli
        .store
        .clone()
        .or_else(|| config.store.as_ref().map(PathBuf::from));

    match cli.command {
        Command::Resolve {
            path,
            site,
            language,
            subdomain,
            vars,
        } => {
            let engine = build_engine(config, store_path.as_deref())?;
            let mut scope = RequestScope::new();
            scope.site = site;
            scope.language = language;
            scope.subdomain = subdomain;

            let mut ctx = ResolutionContext::new();
            for var in &vars {
                let (key, value) = var
                    .split_once('=')
                    .ok_or_else(|| format!("--var {var:?} is not KEY=VALUE"))?;
                ctx.view_context.insert(key.to_string(), value.to_string());
            }

            match engine.get_metadata(Some(&path), None, &mut ctx, &scope)? {
                Some(resolved) => print!("{resolved}"),
                None => println!("No metadata matched {path}"),
            }
        }
        Command::Schema => {
            let engine = build_engine(config, None)?;
            let group = engine.group(None)?;
            let schemas: Vec<_> = group.schemas().collect();
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
        Command::Check => {
            let engine = build_engine(config, store_path.as_deref())?;
            let group = engine.group(None)?;
            println!(
                "==> Config OK: backends [{}]",
                group.options().backends().join(", ")
            );
            println!("==> Store OK: {} record(s)", group.store().len());
        }
    }

    Ok(())
}

/// The CLI's built-in field set. Hosts embedding the library declare their
/// own via [`MetadataDef::builder`].
fn default_def() -> Result<MetadataDef, Box<dyn std::error::Error>> {
    Ok(MetadataDef::builder("seo")
        .field(FieldDecl::new("title"))
        .field(FieldDecl::new("description"))
        .field(FieldDecl::new("keywords"))
        .field(FieldDecl::new("og_title").alias("title"))
        .field(FieldDecl::new("og_description").alias("description"))
        .build()?)
}

fn build_engine(
    config: HostConfig,
    store_path: Option<&std::path::Path>,
) -> Result<Engine, Box<dyn std::error::Error>> {
    let options = config.options.build()?;
    let group = MetadataGroup::new(default_def()?, options)?;
    let mut engine = Engine::new(config).with_group(group);

    if let Some(store_path) = store_path {
        for record in MetadataStore::load_records(store_path)? {
            engine.insert_record(None, record)?;
        }
    }
    Ok(engine)
}
