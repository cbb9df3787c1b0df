//! Command-line interface over the docsite content pipeline.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use docsite_config::{Config, LoadOptions};
use docsite_repo::Repository;
use tracing_subscriber::EnvFilter;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing();

    let mut options = LoadOptions::default();
    if let Some(path) = cli.config {
        options = options.with_override_path(path);
    }
    let mut config = Config::load(options)?;
    if let Some(root) = cli.root {
        config.content.root = if root.is_absolute() {
            root
        } else {
            config.working_dir.join(root)
        };
    }
    let repo = Repository::new(config);

    match cli.command {
        Command::List(args) => handle_list(&repo, args),
        Command::Show(args) => handle_show(&repo, args),
        Command::Render(args) => handle_render(&repo, args),
        Command::Catalog(args) => handle_catalog(&repo, args),
        Command::Version => handle_version(&repo),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "docsite",
    about = "Content pipeline tooling for the documentation site"
)]
struct Cli {
    /// Configuration file overriding the working-directory lookup
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Content root override
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List navigable documents with title and section
    List(ListArgs),
    /// Print one document's normalized content
    Show(ShowArgs),
    /// Dump the visual tree for one document
    Render(RenderArgs),
    /// Extract the DLC catalog
    Catalog(CatalogArgs),
    /// Summarise the newest entry of the release feed
    Version,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,
}

#[derive(Args)]
struct ShowArgs {
    /// Slash-separated document slug, e.g. start/install
    slug: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,
}

#[derive(Args)]
struct RenderArgs {
    /// Slash-separated document slug, e.g. start/install
    slug: String,
}

#[derive(Args)]
struct CatalogArgs {
    #[arg(long, value_enum, default_value_t = CatalogFormat::Markdown)]
    format: CatalogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum CatalogFormat {
    Markdown,
    Json,
}

fn handle_list(repo: &Repository, args: ListArgs) -> Result<i32> {
    let metas = repo.list_documents();
    match args.format {
        OutputFormat::Plain => {
            for meta in &metas {
                emit(&format!(
                    "{}\t{}\t{}",
                    meta.slug.join("/"),
                    meta.title,
                    meta.section
                ))?;
            }
        }
        OutputFormat::Json => emit(&serde_json::to_string_pretty(&metas)?)?,
    }
    Ok(0)
}

fn handle_show(repo: &Repository, args: ShowArgs) -> Result<i32> {
    let slug = parse_slug(&args.slug);
    let Some(doc) = repo.get_document(&slug) else {
        eprintln!("document not found: {}", args.slug);
        return Ok(1);
    };
    match args.format {
        OutputFormat::Plain => emit(&doc.content)?,
        OutputFormat::Json => emit(&serde_json::to_string_pretty(&doc)?)?,
    }
    Ok(0)
}

fn handle_render(repo: &Repository, args: RenderArgs) -> Result<i32> {
    let slug = parse_slug(&args.slug);
    let Some(doc) = repo.get_document(&slug) else {
        eprintln!("document not found: {}", args.slug);
        return Ok(1);
    };
    let tree = docsite_render::render(&doc.content);
    emit(&format!("{tree:#?}"))?;
    Ok(0)
}

fn handle_catalog(repo: &Repository, args: CatalogArgs) -> Result<i32> {
    let config = repo.config();
    match args.format {
        CatalogFormat::Json => {
            let sections = docsite_catalog::load_catalog(config);
            emit(&serde_json::to_string_pretty(&sections)?)?;
        }
        CatalogFormat::Markdown => {
            let path = config.content.root.join(&config.content.catalog_file);
            let source = fs::read_to_string(path).unwrap_or_default();
            emit(&docsite_catalog::render_catalog_markdown(&source))?;
        }
    }
    Ok(0)
}

fn handle_version(repo: &Repository) -> Result<i32> {
    let latest = repo.latest_version();
    let marker = if latest.is_recent { "\tnew" } else { "" };
    emit(&format!(
        "{}\t{}\t{}{}",
        latest.version, latest.date, latest.link, marker
    ))?;
    Ok(0)
}

fn parse_slug(raw: &str) -> Vec<String> {
    raw.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Write a line to stdout, swallowing broken pipes so piping into `head`
/// does not surface an error.
fn emit(line: &str) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if let Err(err) = writeln!(handle, "{line}") {
        if err.kind() == std::io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}
