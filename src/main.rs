use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use content_tree::config::DEFAULT_CONFIG_FILE;
use content_tree::{BuildOutput, Config, ContentBuilder};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Build the site content model from git history
#[derive(Parser)]
#[command(name = "content-tree", version, long_version = LONG_VERSION)]
struct Cli {
    /// Configuration file (defaults to ./content-tree.toml when present)
    #[arg(short, long, global = true, env = "CONTENT_TREE_CONFIG")]
    config: Option<PathBuf>,

    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the content model and write it as JSON
    Build {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Run the whole build without writing output
    Check,
    /// Print the JSON Schema of the build output
    Schema,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON output
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Build { output, pretty } => {
            let mut config = load_config(cli.config.as_deref())?;
            if output.is_some() {
                config.output.path = output;
            }
            config.output.pretty |= pretty;

            let result = run_build(&config)?;
            match &config.output.path {
                Some(path) => result.write_to(path, config.output.pretty)?,
                None => println!("{}", result.to_json(config.output.pretty)?),
            }
        }
        Command::Check => {
            let config = load_config(cli.config.as_deref())?;
            let stats = run_build(&config)?.stats();
            println!(
                "OK: {} article(s), {} author(s), {} group(s), {} cover(s)",
                stats.articles, stats.authors, stats.groups, stats.covers
            );
        }
        Command::Schema => {
            let schema = schemars::schema_for!(BuildOutput);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::Init { force } => {
            let path = cli
                .config
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                );
            }
            Config::default().save(&path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::load_or_default()?,
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn run_build(config: &Config) -> Result<BuildOutput> {
    let builder = ContentBuilder::new(config.clone()).context("Failed to set up the build")?;
    builder
        .build()
        .context("Build failed; fix the content repository and rebuild")
}
