//! pkgtree - Concurrent, depth-bounded package directory tree scanner.
//!
//! Usage:
//!   pkgtree tree <DIR>            Print the package tree of a source root
//!   pkgtree lookup <DIR> <PATH>   Show one directory from a full build
//!   pkgtree export <DIR>          Export the package tree to JSON
//!   pkgtree --help                Show help

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use tracing_subscriber::EnvFilter;

use pkgtree_core::{BuildConfig, DirectoryNode, RootType};
use pkgtree_scan::Corpus;
use pkgtree_vfs::OsFs;

#[derive(Parser)]
#[command(
    name = "pkgtree",
    version,
    about = "Concurrent, depth-bounded package directory tree scanner",
    long_about = "pkgtree walks a Go-style source root and shows the directories \
                  that hold packages, each with a one-line synopsis.\n\n\
                  DIR is mounted as the virtual root `/`; paths given to other \
                  options are virtual paths such as `/src/net/http`."
)]
struct Cli {
    /// Log per-directory and per-file failures
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Load build settings from a TOML file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Root type recorded for directories no --root-prefix covers
    #[arg(long, global = true, default_value = "unknown")]
    root_type: RootType,

    /// Root type for a virtual path prefix, e.g. `/goroot=standard`
    #[arg(long = "root-prefix", value_name = "PATH=TYPE", global = true, value_parser = parse_root_prefix)]
    root_prefixes: Vec<(String, RootType)>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print an indented package tree
    Tree {
        /// Directory mounted as the virtual root
        dir: PathBuf,

        /// Virtual path to start from
        #[arg(short, long)]
        path: Option<String>,

        /// Maximum depth to scan
        #[arg(short, long)]
        depth: Option<u32>,
    },

    /// Build the full tree, then show a single directory
    Lookup {
        /// Directory mounted as the virtual root
        dir: PathBuf,

        /// Virtual path of the directory to show
        path: String,
    },

    /// Export the package tree to JSON
    Export {
        /// Directory mounted as the virtual root
        dir: PathBuf,

        /// Maximum depth to scan
        #[arg(short, long)]
        depth: Option<u32>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    config.verbose |= cli.verbose;

    match cli.command {
        Command::Tree { dir, path, depth } => {
            if let Some(path) = path {
                config.root = path;
                config.validate()?;
            }
            if depth.is_some() {
                config.max_depth = depth;
            }
            run_tree(&mount(&dir, cli.root_type, &cli.root_prefixes)?, config).await?;
        }
        Command::Lookup { dir, path } => {
            run_lookup(&mount(&dir, cli.root_type, &cli.root_prefixes)?, config, &path).await?;
        }
        Command::Export { dir, depth, output } => {
            if depth.is_some() {
                config.max_depth = depth;
            }
            run_export(&mount(&dir, cli.root_type, &cli.root_prefixes)?, config, output).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pkgtree=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pkgtree=info,warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Read a TOML config file, or fall back to defaults.
fn load_config(path: Option<&Path>) -> Result<BuildConfig> {
    let Some(path) = path else {
        return Ok(BuildConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config {}", path.display()))?;
    let config: BuildConfig = toml::from_str(&text)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Parse a `PATH=TYPE` root prefix.
fn parse_root_prefix(arg: &str) -> std::result::Result<(String, RootType), String> {
    let (path, root_type) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected PATH=TYPE, found {arg:?}"))?;
    let root_type = root_type
        .parse()
        .map_err(|_| format!("unknown root type {root_type:?}"))?;
    Ok((path.to_string(), root_type))
}

/// Mount `dir` at the virtual root with the requested root types.
fn mount(dir: &Path, root_type: RootType, prefixes: &[(String, RootType)]) -> Result<OsFs> {
    let dir = dir.canonicalize().context("Invalid path")?;
    if !dir.is_dir() {
        return Err(eyre!("{} is not a directory", dir.display()));
    }
    let fs = OsFs::new(dir).with_root_type(root_type);
    Ok(prefixes
        .iter()
        .fold(fs, |fs, (prefix, root_type)| fs.with_root_type_under(prefix, *root_type)))
}

/// Wrap a mounted filesystem in a corpus.
fn open_corpus(fs: &OsFs, config: BuildConfig) -> Corpus {
    Corpus::new(Arc::new(fs.clone())).with_config(config)
}

/// Build a tree without caching it.
async fn build(corpus: &Corpus) -> Result<DirectoryNode> {
    let config = corpus.config();
    corpus
        .new_directory(&config.root, config.max_depth)
        .await
        .ok_or_else(|| eyre!("No packages found under {}", config.root))
}

/// Print the package tree as an indented listing.
async fn run_tree(fs: &OsFs, config: BuildConfig) -> Result<()> {
    let corpus = open_corpus(fs, config);
    eprintln!("Scanning {}...", corpus.config().root);

    let tree = build(&corpus).await?;
    let Some(listing) = tree.listing(false, |_| true) else {
        return Ok(());
    };

    let width = listing
        .entries
        .iter()
        .map(|e| 2 * e.depth as usize + e.name.len())
        .max()
        .unwrap_or(0);

    println!();
    println!("{}", "─".repeat(60));
    println!(" {} ({})", tree.path, tree.root_type);
    println!(
        " {} directories, {} packages, {} levels",
        listing.entries.len(),
        listing.entries.iter().filter(|e| e.has_pkg).count(),
        tree.max_depth() + 1
    );
    println!("{}", "─".repeat(60));
    println!();

    for entry in &listing.entries {
        let label = format!("{}{}", "  ".repeat(entry.depth as usize), entry.name);
        let marker = if entry.has_pkg { "•" } else { " " };
        println!("{marker} {label:<width$}  {}", entry.synopsis);
    }

    Ok(())
}

/// Build the full tree into a corpus and show one directory.
async fn run_lookup(fs: &OsFs, config: BuildConfig, path: &str) -> Result<()> {
    let corpus = open_corpus(fs, config);
    corpus.init().await.context("Build failed")?;

    let dir = corpus
        .directory(path)
        .await
        .ok_or_else(|| eyre!("{path}: no package directory"))?;
    let node = dir.node();

    println!("Path:        {}", node.path);
    println!("Import path: {}", node.import_path);
    println!("Root type:   {}", node.root_type);
    println!("Package:     {}", if node.has_pkg { "yes" } else { "no" });
    if !node.synopsis.is_empty() {
        println!("Synopsis:    {}", node.synopsis);
    }
    println!(
        "Built at:    {}",
        DateTime::<Local>::from(dir.built_at()).format("%Y-%m-%d %H:%M:%S")
    );

    if !node.children.is_empty() {
        println!();
        for child in &node.children {
            println!("  {:<24} {}", child.name, child.synopsis);
        }
    }

    if let Some(snapshot) = corpus.snapshot() {
        let progress = snapshot.progress();
        tracing::debug!(
            dirs = progress.dirs_listed,
            files = progress.files_parsed,
            dirs_per_second = progress.dirs_per_second(),
            "snapshot statistics"
        );
    }

    Ok(())
}

/// Export the package tree to JSON.
async fn run_export(fs: &OsFs, config: BuildConfig, output: Option<PathBuf>) -> Result<()> {
    let corpus = open_corpus(fs, config);
    eprintln!("Scanning {}...", corpus.config().root);

    let tree = build(&corpus).await?;
    let json = serde_json::to_string_pretty(&tree)?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .with_context(|| format!("Cannot write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{json}");
        }
    }

    Ok(())
}
