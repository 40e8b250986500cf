//! Tribunal CLI: inspect parameters, compute commitments, simulate cases.

mod simulate;

use anyhow::Context;
use clap::Parser;
use simulate::{SimVote, SimulationPlan, SimulationReport};
use std::path::PathBuf;
use tribunal_court::CourtConfig;
use tribunal_types::{ProtocolParams, Verdict};
use tribunal_utils::{format_duration, init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "tribunal", about = "Judge-consensus escrow protocol tools")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, global = true, env = "TRIBUNAL_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "TRIBUNAL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "TRIBUNAL_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the protocol parameters as TOML.
    Params,

    /// Compute the commitment a judge submits for a sealed vote.
    #[command(name = "commit-hash")]
    CommitHash {
        /// pass, fail or partial.
        #[arg(long)]
        verdict: Verdict,

        /// Worker share for a partial verdict.
        #[arg(long, default_value_t = 0)]
        percent: u8,

        /// 32-byte salt, hex encoded.
        #[arg(long)]
        salt: String,
    },

    /// Run one case through its whole lifecycle on a simulated clock.
    Simulate {
        /// Judges to register.
        #[arg(long, default_value_t = 7)]
        judges: usize,

        /// Escrowed amount (raw units).
        #[arg(long, default_value_t = 1_000)]
        amount: u128,

        /// Standard-round votes in seating order: pass, fail, partial:N, silent, absent.
        #[arg(long, value_delimiter = ',', default_value = "pass,pass,pass,pass,fail")]
        votes: Vec<SimVote>,

        /// Expanded-round votes, used if the standard round is disputed.
        #[arg(long, value_delimiter = ',')]
        escalate: Vec<SimVote>,

        /// Arbitrator ruling for a case still disputed, e.g. "partial:30".
        #[arg(long, value_parser = simulate::parse_ruling)]
        arbitrate: Option<(Verdict, u8)>,

        /// Hex seed for a hash-chain randomness beacon.
        #[arg(long)]
        seed: Option<String>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CourtConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CourtConfig {
            params: ProtocolParams::simulation_defaults(),
            ..CourtConfig::default()
        },
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;
    config.validate()?;
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    match cli.command {
        Command::Params => {
            print!("{}", toml::to_string_pretty(&config.params)?);
        }
        Command::CommitHash {
            verdict,
            percent,
            salt,
        } => {
            verdict.validate_percent(percent)?;
            let bytes = hex::decode(salt.trim_start_matches("0x")).context("salt is not hex")?;
            let salt: [u8; 32] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| anyhow::anyhow!("salt must be 32 bytes, got {}", bytes.len()))?;
            println!("{}", tribunal_crypto::commit_hash(verdict, percent, &salt));
        }
        Command::Simulate {
            judges,
            amount,
            votes,
            escalate,
            arbitrate,
            seed,
            json,
        } => {
            let seed = seed
                .map(|s| hex::decode(s.trim_start_matches("0x")))
                .transpose()
                .context("seed is not hex")?;
            let plan = SimulationPlan {
                judges,
                amount,
                votes,
                escalation_votes: escalate,
                ruling: arbitrate,
                seed,
            };
            tracing::info!(
                judges,
                amount,
                commit_window = %format_duration(config.params.commit_window_secs),
                reveal_window = %format_duration(config.params.reveal_window_secs),
                "starting simulation"
            );
            let report = simulate::run(&config, &plan)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report)?;
            }
        }
    }

    Ok(())
}

fn print_report(report: &SimulationReport) -> anyhow::Result<()> {
    println!("{}: {}", report.case, report.status);
    let panel: Vec<&str> = report.panel.iter().map(|m| m.as_str()).collect();
    println!("final panel: {}", panel.join(", "));
    println!();
    println!("events:");
    for event in &report.events {
        println!("  {}", serde_json::to_string(event)?);
    }
    println!();
    println!("balances:");
    for balance in &report.balances {
        println!("  {:<12} {:>10}", balance.account.as_str(), balance.amount);
    }
    Ok(())
}
