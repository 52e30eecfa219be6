//! File Cache CLI
//!
//! Inspects and edits a cache file from the shell.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use file_cache::config::expiry_after;
use file_cache::{Cache, CacheItem, Config, FileCache};

#[derive(Parser, Debug)]
#[command(name = "file_cache", version, about = "Inspect and edit a file backed cache")]
struct Cli {
    /// Cache file to operate on (defaults to CACHE_FILE or cache.json)
    #[arg(short, long)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value stored under a key
    Get { key: String },
    /// Store a value, optionally expiring after a TTL
    Set {
        key: String,
        value: String,
        /// TTL in seconds (defaults to DEFAULT_TTL, none = never expires)
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Remove a key
    Del { key: String },
    /// Print the seconds left before a key expires, or "never"
    Ttl { key: String },
    /// List live keys
    Keys,
    /// Print the raw persisted payload
    Dump,
}

fn main() -> ExitCode {
    // Logs go to stderr so command output stays clean on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "file_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::from_env();
    if let Some(file) = cli.file {
        config.cache_file = file;
    }
    debug!(?config, "configuration loaded");

    let cache = FileCache::from_config(&config)
        .with_context(|| format!("could not open cache {}", config.cache_file.display()))?;

    let code = execute(&cache, &config, cli.command, &mut std::io::stdout().lock())?;

    cache.close().context("could not close cache")?;
    Ok(code)
}

fn execute(
    cache: &FileCache,
    config: &Config,
    command: Command,
    out: &mut impl Write,
) -> Result<ExitCode> {
    match command {
        Command::Get { key } => {
            let Some(item) = cache.get(&key).into_item() else {
                eprintln!("{key}: not found");
                return Ok(ExitCode::FAILURE);
            };
            writeln!(out, "{}", item.value)?;
        }
        Command::Set { key, value, ttl } => {
            let now = Utc::now();
            let expires_at = match ttl {
                Some(secs) => Some(expiry_after(now, secs).context("ttl is too large")?),
                None => config.default_expiry(now),
            };

            let item = CacheItem {
                key: key.clone(),
                value,
                expires_at,
            };
            cache
                .save(item)
                .with_context(|| format!("could not save {key}"))?;
        }
        Command::Del { key } => {
            cache
                .delete(&key)
                .with_context(|| format!("could not delete {key}"))?;
        }
        Command::Ttl { key } => {
            let Some(item) = cache.get(&key).into_item() else {
                eprintln!("{key}: not found");
                return Ok(ExitCode::FAILURE);
            };
            match item.ttl_remaining() {
                Some(remaining) => writeln!(out, "{}", remaining.num_seconds())?,
                None => writeln!(out, "never")?,
            }
        }
        Command::Keys => {
            for key in cache.keys() {
                writeln!(out, "{key}")?;
            }
        }
        Command::Dump => {
            let bytes = cache.serialize().context("could not encode cache")?;
            out.write_all(&bytes)?;
            writeln!(out)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
