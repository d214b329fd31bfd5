use clap::Parser;
use color_eyre::eyre::Result;
use dvid_kv_rust::cli::{run, Args};
use std::io;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    run(&args, io::stdin().lock(), io::stdout().lock())
}
