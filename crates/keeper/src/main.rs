use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use nextcopper_core::{Clock, RebaseEngine};
use tokio::sync::Mutex;
use tokio::time;

use nextcopper_keeper::replay::{format_row, table_header};
use nextcopper_keeper::{
    create_example_config, replay, run_scheduled_oracle, ChannelFeed, Keeper, KeeperConfig, ScheduledOracle,
    StateStore, WallClock,
};

#[derive(Parser, Debug)]
#[command(name = "nextcopper-keeper")]
#[command(about = "NextCopper elastic supply rebase keeper")]
struct Args {
    /// Path to keeper configuration file
    #[arg(short, long, default_value = "keeper.toml")]
    config: String,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the keeper loop
    Run {
        /// Dry run mode - evaluate but don't request or rebase
        #[arg(long)]
        dry_run: bool,

        /// Override poll_interval_ms from the config
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },
    /// Print a summary of the saved state
    Status,
    /// Replay the oracle schedule on a manual clock
    Replay,
    /// Write an example configuration to --config
    InitConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    match args.command {
        Command::InitConfig => {
            create_example_config(&args.config)?;
            log::info!("Wrote example configuration to {}", args.config);
            Ok(())
        }
        Command::Status => status(&args.config),
        Command::Replay => run_replay(&args.config),
        Command::Run { dry_run, interval_ms } => run(&args.config, dry_run, interval_ms).await,
    }
}

async fn run(config_path: &str, dry_run: bool, interval_ms: Option<u64>) -> anyhow::Result<()> {
    log::info!("Starting NextCopper keeper");

    if dry_run {
        log::warn!("Running in DRY RUN mode - no requests or rebases will be committed");
    }

    // Load configuration
    let config = KeeperConfig::load(config_path).with_context(|| format!("loading {}", config_path))?;
    let interval = Duration::from_millis(interval_ms.unwrap_or(config.poll_interval_ms).max(1));
    log::info!(
        "Period length {} blocks, block time {}ms, poll interval {:?}",
        config.engine.period_length,
        config.clock.block_time_ms,
        interval
    );

    let store = StateStore::new(&config.state_path);
    let state = Arc::new(Mutex::new(store.load_or_genesis(config.to_genesis_params())?));

    // Oracle task answers requests on its own schedule
    let (feed, requests) = ChannelFeed::channel();
    let oracle = ScheduledOracle::from_config(&config.oracle)?;
    tokio::spawn(run_scheduled_oracle(
        oracle,
        requests,
        state.clone(),
        (!dry_run).then(|| store.clone()),
        Duration::from_millis(config.oracle.delivery_delay_ms),
    ));

    let clock = WallClock::from_config(&config.clock)?;
    let engine = RebaseEngine::with_policy(config.build_policy()?);
    log::info!("Rebase policy: {}", engine.policy_name());

    let mut keeper = Keeper::new(state, engine, clock, feed, Some(store), dry_run);
    log::info!("Keeper initialized successfully");

    // Start main loop
    let mut interval_timer = time::interval(interval);
    let mut iteration = 0u64;

    loop {
        interval_timer.tick().await;
        iteration += 1;

        log::debug!("Starting keeper iteration {}", iteration);

        match keeper.tick().await {
            Ok(report) => {
                if let Some(outcome) = &report.rebased {
                    log::info!(
                        "Iteration {}: rebased period {} at block {}",
                        iteration, outcome.period_index, report.block_height
                    );
                }
                if let Some(request) = &report.requested {
                    log::info!(
                        "Iteration {}: requested oracle data for period {}",
                        iteration, request.period_index
                    );
                }
                if !report.changed_state() {
                    log::debug!("Iteration {}: nothing due at block {}", iteration, report.block_height);
                }
            }
            Err(e) if e.is_fatal() => {
                log::error!("Fatal error in keeper iteration {}: {}", iteration, e);
                return Err(e.into());
            }
            Err(e) => {
                log::error!("Error in keeper iteration {}: {}", iteration, e);
                // Re-evaluated on the next tick
            }
        }

        // Basic health metrics every 100 iterations
        if iteration % 100 == 0 {
            log::info!("Keeper health check - iteration {}", iteration);
            if let Err(e) = keeper.health_check().await {
                log::warn!("Health check warning: {}", e);
            }
        }
    }
}

fn status(config_path: &str) -> anyhow::Result<()> {
    let config = KeeperConfig::load(config_path).with_context(|| format!("loading {}", config_path))?;
    let store = StateStore::new(&config.state_path);
    let state = store.load_or_genesis(config.to_genesis_params())?;
    let clock = WallClock::from_config(&config.clock)?;

    let block_height = clock.current_block_height();
    let time = clock.current_time();
    let (baseline_quantity, baseline_price) = state.current_baseline();

    let summary = serde_json::json!({
        "block_height": block_height,
        "period_index": state.current_period_index(block_height),
        "rebase_count": state.period().rebase_count(),
        "last_rebase_block": state.period().last_rebase_block(),
        "need_rebase": state.need_rebase(block_height),
        "need_request_oracle": state.need_request_oracle(block_height, time),
        "is_rebase_ready": state.is_rebase_ready(block_height),
        "baseline_quantity": baseline_quantity.to_string(),
        "baseline_price": baseline_price.to_string(),
        "total_supply": state.total_supply().to_string(),
        "block_reward_rate": state.block_reward_rate().to_string(),
        "holders": state.ledger().holder_count(),
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_replay(config_path: &str) -> anyhow::Result<()> {
    let config = KeeperConfig::load(config_path).with_context(|| format!("loading {}", config_path))?;
    let engine = RebaseEngine::with_policy(config.build_policy()?);
    let report = replay(config.to_genesis_params(), &engine, &config.schedule())?;

    println!("{}", table_header());
    for (i, outcome) in report.outcomes.iter().enumerate() {
        println!("{}", format_row(i + 1, outcome));
    }
    println!(
        "Final supply {}, reward rate {}",
        report.final_state.total_supply(),
        report.final_state.block_reward_rate()
    );
    Ok(())
}
