//! Powchain CLI
//!
//! Builds a chain of `--blocks` mined records on top of an anchor record,
//! prints it, reports whether it validates and optionally writes it as JSON.
//!
//! Logging goes to stderr and follows `RUST_LOG` when set, `--log-level`
//! otherwise.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use powchain::{write_chain_json, CancelToken, Chain, ChainConfig, Record, DEFAULT_DIFFICULTY};
use tracing_subscriber::EnvFilter;

const GENESIS_PAYLOAD: &str = "Genesis";

#[derive(Debug, Parser)]
#[command(name = "powchain")]
#[command(about = "Build and validate a proof-of-work record chain")]
#[command(version)]
struct Cli {
    /// Number of records to mine after the anchor
    #[arg(long, default_value_t = 2)]
    blocks: usize,

    /// Required leading zero bits of each mined digest
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: u32,

    /// Validation workers (0 = available parallelism)
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// Give up mining after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Write the chain as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Re-check proof-of-work during validation
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    verify_work: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn chain_config(&self) -> ChainConfig {
        let mut config = ChainConfig::with_difficulty(self.difficulty);
        config.concurrent.workers = self.workers;
        config.verify_work = self.verify_work;
        config
    }

    fn cancel_token(&self) -> CancelToken {
        match self.timeout_secs {
            Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
            None => CancelToken::new(),
        }
    }
}

/// One line of the chain listing.
fn describe(record: &Record) -> String {
    let hash = record.digest.to_hex();
    format!(
        "Index: {}, Data: {}, Hash: {}...",
        record.sequence_number,
        String::from_utf8_lossy(&record.payload),
        &hash[..10]
    )
}

fn build(cli: &Cli) -> Result<Chain> {
    let cancel = cli.cancel_token();
    tracing::info!(
        blocks = cli.blocks,
        difficulty = cli.difficulty,
        timeout_secs = ?cli.timeout_secs,
        "building chain"
    );
    let mut chain = Chain::new(GENESIS_PAYLOAD, cli.chain_config())
        .context("failed to create the anchor record")?;

    for i in 1..=cli.blocks {
        chain
            .append_until(format!("Block {i}"), &cancel)
            .with_context(|| format!("failed to mine block {i}"))?;
    }
    Ok(chain)
}

fn run(cli: &Cli) -> Result<()> {
    let chain = build(cli)?;

    println!("Blockchain:");
    for record in chain.records() {
        println!("{}", describe(record));
    }

    let valid = chain.validate_concurrent(cli.workers);
    println!("\nIs blockchain valid? {valid}");

    if let Some(path) = &cli.output {
        write_chain_json(chain.records(), path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Blockchain written to {}", path.display());
    }

    if !valid {
        bail!("chain failed validation");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(&cli)
}
