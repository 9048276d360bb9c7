use oi_tracker::analysis::FreshnessPolicy;
use oi_tracker::api::NiftyTraderClient;
use oi_tracker::config::Settings;
use oi_tracker::output::ReportTable;
use oi_tracker::pipeline::{Pipeline, RunOutcome};
use oi_tracker::store::SnapshotStore;

use chrono::Local;
use clap::Parser;
use std::time::Instant;
use tracing::{info, warn};

/// Option-chain open-interest change tracker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Symbol id, e.g. NIFTY or BANKNIFTY
    symbol: Option<String>,

    /// Strikes to keep on each side of the at-the-money strike
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    strikes: Option<u32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("oi_tracker=info".parse()?),
        )
        .init();

    let started = Instant::now();
    let now = Local::now().naive_local();
    info!("Start: {}", now);

    let args = Args::parse();
    let settings = Settings::load()?;

    if args.symbol.is_none() || args.strikes.is_none() {
        warn!("Not all parameters were passed, using defaults for the missing ones");
    }
    let symbol_id = args.symbol.unwrap_or_else(|| settings.defaults.symbol.clone());
    let strikes = args.strikes.unwrap_or(settings.defaults.strikes);
    info!("Symbol: {} and Strikes: {}", symbol_id, strikes);

    let symbol = settings.symbol(&symbol_id)?;
    let provider = NiftyTraderClient::new(&settings.provider)?;
    let store = SnapshotStore::new(&settings.storage.data_dir);
    let policy = FreshnessPolicy::new(settings.freshness.max_stale_minutes);

    let pipeline = Pipeline::new(&provider, symbol, &store, policy, strikes);

    match pipeline.run(now).await? {
        RunOutcome::Baseline { snapshot, .. } => {
            info!("First snapshot of the day saved as {}; run again later for a comparison", snapshot);
        }
        RunOutcome::Report(report) => {
            let table = ReportTable::new(&report.current, &report.previous);
            println!("{}", table.render(&report.rows));
        }
    }

    info!("Run took {:.2} ms", started.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}
