//! qd-reward: review a quadratic reward round and disburse it.

mod config;
mod gateway;
mod operators;
mod report;

use anyhow::Context;
use clap::Parser;
use qd_payments::{DisbursementSession, EventBus, PaymentOutcome, PaymentStateMachine};
use qd_rewards::{
    QuadraticShares, RewardDistributor, RewardError, RoundFile, RoundReport, VoteTally,
};
use qd_types::WalletAddress;
use qd_utils::LogFormat;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::RewardConfig;
use crate::gateway::HttpGateway;
use crate::operators::OperatorList;
use crate::report::{render_outcome, render_report, render_summary, EventLog, LogNotifier};

#[derive(Parser)]
#[command(name = "qd-reward", about = "Quadratic reward allocation and disbursement")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override
    /// its values.
    #[arg(long, env = "QD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "QD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "QD_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print a configuration file with every default filled in.
    DefaultConfig,

    /// Show a round's allocation without paying anyone.
    Report {
        /// Round export (JSON with `votes` and `contributors`).
        #[arg(long)]
        round: PathBuf,

        /// Reward pool in ether (defaults to the config value).
        #[arg(long)]
        pool: Option<f64>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Pay one recipient (`--to`) or every recipient in the round.
    ///
    /// Payment statuses live only for this invocation: a second invocation
    /// starts a fresh session and does not know who was already paid.
    Pay {
        /// Round export (JSON with `votes` and `contributors`).
        #[arg(long)]
        round: PathBuf,

        /// Operator wallet triggering the payments.
        #[arg(long, env = "QD_CALLER")]
        caller: WalletAddress,

        /// Pay only this recipient.
        #[arg(long)]
        to: Option<WalletAddress>,

        /// Reward pool in ether (defaults to the config value).
        #[arg(long)]
        pool: Option<f64>,

        /// Signer service endpoint (defaults to the config value).
        #[arg(long, env = "QD_GATEWAY_URL")]
        gateway_url: Option<String>,

        /// Extra passes over failed recipients within this session.
        #[arg(long, default_value_t = 0)]
        retries: u32,

        /// Seconds to wait between retry passes.
        #[arg(long, default_value_t = 5)]
        retry_delay_secs: u64,

        /// Print session metrics in Prometheus text format when done.
        #[arg(long)]
        metrics: bool,

        /// Append every payment event to this file as JSON lines.
        #[arg(long)]
        events: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RewardConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RewardConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    qd_utils::init_logging(config.log_format, &config.log_level);

    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::DefaultConfig => {
            print!("{}", RewardConfig::default().to_toml_string());
            Ok(())
        }
        Command::Report { round, pool, json } => {
            show_report(&round, pool.unwrap_or(config.reward_pool), json)
        }
        Command::Pay {
            round,
            caller,
            to,
            pool,
            gateway_url,
            retries,
            retry_delay_secs,
            metrics,
            events,
        } => {
            if let Some(url) = gateway_url {
                config.gateway_url = url;
            }
            if let Some(pool) = pool {
                config.reward_pool = pool;
            }
            let plan = PayPlan {
                caller,
                to,
                retries,
                retry_delay: Duration::from_secs(retry_delay_secs),
                print_metrics: metrics,
                events,
            };
            run_payments(&config, &round, plan).await
        }
    }
}

fn show_report(round_path: &Path, reward_pool: f64, json: bool) -> anyhow::Result<()> {
    let round = RoundFile::from_json_file(round_path)?;
    let tally = VoteTally::from_records(&round.votes)?;
    let missing = tally.missing_participants(&round.contributors);

    let distribution = match QuadraticShares::compute(&tally) {
        Ok(shares) => Some((
            shares.total_squared_sum(),
            RewardDistributor::distribute(&tally, &shares, reward_pool, &round.contributors)?,
        )),
        Err(RewardError::NoVotesCast) => None,
        Err(e) => return Err(e.into()),
    };

    if json {
        let value = match distribution {
            Some((total_squared_sum, distribution)) => serde_json::to_value(RoundReport {
                total_sqrt_votes: tally.total_sqrt_votes(),
                total_squared_sum,
                distribution,
            })?,
            None => serde_json::json!({
                "total_sqrt_votes": tally.total_sqrt_votes(),
                "missing_participants": missing,
                "error": RewardError::NoVotesCast.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!(
            "{}",
            render_report(
                tally.total_sqrt_votes(),
                &missing,
                distribution.as_ref().map(|(_, d)| d)
            )
        );
    }
    Ok(())
}

struct PayPlan {
    caller: WalletAddress,
    to: Option<WalletAddress>,
    retries: u32,
    retry_delay: Duration,
    print_metrics: bool,
    events: Option<PathBuf>,
}

async fn run_payments(config: &RewardConfig, round_path: &Path, plan: PayPlan) -> anyhow::Result<()> {
    let round = RoundFile::from_json_file(round_path)?;
    let gateway = HttpGateway::new(
        config.gateway_url.clone(),
        Duration::from_secs(config.gateway_timeout_secs),
    )?;
    tracing::info!("Using signer service at {}", gateway.url());

    let mut notifier = EventBus::new().with(Arc::new(LogNotifier));
    if let Some(path) = &plan.events {
        let log = EventLog::open(path)
            .with_context(|| format!("opening event log {}", path.display()))?;
        notifier.subscribe(Arc::new(log));
    }

    let machine = PaymentStateMachine::new(
        Arc::new(gateway),
        Arc::new(OperatorList::new(config.operators.iter().cloned())),
        Arc::new(notifier),
    );
    let session = DisbursementSession::from_source(&round, config.reward_pool, machine)?;

    print!(
        "{}",
        render_report(
            session.total_sqrt_votes(),
            &session.missing_participants(),
            Some(&session.distribution().await)
        )
    );
    println!();

    let mut pass = 0;
    loop {
        let outcomes = match &plan.to {
            Some(wallet) => vec![session.pay(&plan.caller, wallet).await?],
            None => session.pay_all(&plan.caller).await?,
        };
        for outcome in &outcomes {
            println!("{}", render_outcome(outcome));
        }

        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, PaymentOutcome::Failed { .. }))
            .count();
        if failed == 0 || pass >= plan.retries {
            break;
        }
        pass += 1;
        tracing::warn!(
            "{failed} payment(s) failed; retry pass {pass}/{} in {:?}",
            plan.retries,
            plan.retry_delay
        );
        tokio::time::sleep(plan.retry_delay).await;
    }

    println!("\n{}", render_summary(&session.summary().await));
    if plan.print_metrics {
        print!("{}", session.metrics().encode_text());
    }
    Ok(())
}
