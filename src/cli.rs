//! The `dvidkv` command line tool
//!
//! Argument parsing and command execution live here so the binary only
//! installs the error report handler and the tracing subscriber.

use crate::config::BackendConfig;
use crate::storage::{EngineRegistry, KeyValueSync, SimpleStore, Store};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::info;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Store and fetch values through a storage engine", long_about = None)]
pub struct Args {
    /// Backend configuration document (JSON)
    #[arg(long, short, env = "DVIDKV_CONFIG")]
    pub config: PathBuf,

    /// Override the per-request timeout, in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// What to do with the store
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print database location, version and datasets as JSON
    Info,
    /// Store a value, read from --value or stdin
    Put {
        /// Key (accepted for interface parity, the endpoint is fixed)
        #[arg(long, default_value = "")]
        key: String,
        /// Value to store; stdin is read when absent
        #[arg(long)]
        value: Option<String>,
    },
    /// Fetch the value and write it to stdout
    Get {
        /// Key (accepted for interface parity, the endpoint is fixed)
        #[arg(long, default_value = "")]
        key: String,
    },
}

/// Load the backend document and build its store through the builtin registry
///
/// `--timeout-secs` replaces the document's `timeout-secs`.
pub fn open_store(args: &Args) -> Result<Box<dyn Store>> {
    let mut config = BackendConfig::from_file(&args.config)
        .wrap_err_with(|| format!("loading {}", args.config.display()))?;
    if let Some(secs) = args.timeout_secs {
        config.timeout_secs = Some(secs);
    }

    let registry = EngineRegistry::with_builtin_engines()?;
    Ok(config.open(&registry)?)
}

/// Identity of a store as printed by `info`
pub fn info_json(store: &dyn Store) -> Result<serde_json::Value> {
    let (location, description) = store.database()?;
    Ok(serde_json::json!({
        "location": location,
        "description": description,
        "version": store.version_string()?,
        "type": store.type_name(),
        "instance": store.instance(),
        "datasets": store.datasets()?,
    }))
}

/// Execute the parsed command, reading values from `input` and writing results to `output`
pub fn run<R: Read, W: Write>(args: &Args, mut input: R, mut output: W) -> Result<()> {
    let store = open_store(args)?;

    match &args.command {
        Command::Info => {
            let info = info_json(store.as_ref())?;
            writeln!(output, "{}", serde_json::to_string_pretty(&info)?)?;
        }
        Command::Put { key, value } => {
            let value = match value {
                Some(value) => value.clone().into_bytes(),
                None => {
                    let mut buf = Vec::new();
                    input.read_to_end(&mut buf)?;
                    buf
                }
            };
            store.put(key.as_bytes(), &value)?;
            info!(bytes = value.len(), "value stored");
        }
        Command::Get { key } => {
            let data = store.get(key.as_bytes())?;
            output.write_all(&data)?;
        }
    }

    output.flush()?;
    Ok(())
}
