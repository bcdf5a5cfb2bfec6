mod render;

use anyhow::{Context, Result};
use clap::Parser;
use ledger_core::{Chain, Difficulty, IntegrityError, PendingBlock};
use render::{render_chain, Format};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger")]
#[command(about = "Build, mine and verify a hash-chained ledger")]
struct Args {
    /// Leading hex zeros every mined digest must carry (0-64)
    #[arg(long, default_value_t = Difficulty::default())]
    difficulty: Difficulty,

    /// JSON payload to append as a block; repeat for more blocks.
    /// Without any, three sample transfers are appended.
    #[arg(long = "payload", value_name = "JSON")]
    payloads: Vec<String>,

    /// Timestamp recorded on appended blocks (default: current UNIX seconds)
    #[arg(long)]
    timestamp: Option<String>,

    /// Output format for the rendered chain
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn sample_transfers() -> Vec<Value> {
    vec![
        json!({"sender": "John Doe", "recepient": "Satoshi Nakomoto", "output": 14}),
        json!({"sender": "John Doe", "recepient": "Tony Doe", "output": 15}),
        json!({"sender": "John Doe", "recepient": "Alice", "output": 15}),
    ]
}

fn parse_payloads(raw: &[String]) -> Result<Vec<Value>> {
    raw.iter()
        .map(|text| {
            serde_json::from_str(text).with_context(|| format!("payload {text:?} is not valid JSON"))
        })
        .collect()
}

fn unix_seconds() -> Result<String> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is set before the UNIX epoch")?;
    Ok(elapsed.as_secs().to_string())
}

fn run(args: Args) -> Result<()> {
    let payloads = if args.payloads.is_empty() {
        sample_transfers()
    } else {
        parse_payloads(&args.payloads)?
    };
    let timestamp = match args.timestamp {
        Some(timestamp) => timestamp,
        None => unix_seconds()?,
    };

    let mut chain: Chain<Value> = Chain::new(args.difficulty)?;
    info!(difficulty = %args.difficulty, blocks = payloads.len(), "building chain");
    for payload in payloads {
        let index = chain.last_block().index() + 1;
        let candidate = PendingBlock::new(index, timestamp.clone(), payload)?;
        chain.append(candidate)?;
    }

    let verdict = chain.verify();
    println!("{}", render_chain(chain.blocks(), args.format)?);
    check_verdict(verdict)?;
    info!(len = chain.len(), "chain verified");
    Ok(())
}

/// Blocks are rendered either way; a failed check still ends the run with an error.
fn check_verdict(verdict: std::result::Result<(), IntegrityError>) -> Result<()> {
    verdict.context("Invalid blockchain")
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    run(Args::parse())
}
