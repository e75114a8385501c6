use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::time::{Duration, sleep};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use herald_core::campaign::{Campaigns, RegionalBroadcast};
use herald_core::config::HeraldConfig;
use herald_core::control::QueueControl;
use herald_core::dispatch::{BatchDispatcher, Jitter};
use herald_core::domain::Recipient;
use herald_core::impls::TracingSender;
use herald_core::queue::TaskQueue;

/// Run a regional broadcast against the log sender and follow its progress.
#[derive(Debug, Parser)]
#[command(name = "herald", version)]
struct Cli {
    /// TOML config file; missing means defaults.
    #[arg(short, long, default_value = "herald.toml")]
    config: PathBuf,

    /// Number of synthetic employees in the region.
    #[arg(short = 'n', long, default_value_t = 5)]
    recipients: usize,

    #[arg(short, long, default_value = "north")]
    region: String,

    /// Skip the inter-message delay.
    #[arg(long)]
    fast: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "herald=debug,herald_core=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn synthetic_staff(count: usize, region: &str) -> Vec<Recipient> {
    (0..count)
        .map(|i| Recipient::new(format!("employee-{i:03}"), format!("+506 8800 {:04}", i % 10_000), region))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = HeraldConfig::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // (A) queue / dispatcher / control を組み立てる
    let mut options = config.dispatch.options();
    if cli.fast {
        options.pacing = Jitter::none();
    }
    let queue = TaskQueue::default();
    let dispatcher = BatchDispatcher::with_options(queue.clone(), options);
    let control = QueueControl::new(queue);
    let campaigns = Campaigns::new(dispatcher, Arc::new(TracingSender::new()), config.dispatch.send_policy());

    // (B) キャンペーン投入（即座に返る）
    let accepted = campaigns.regional_broadcast(RegionalBroadcast {
        region: cli.region.clone(),
        message: "Hi {name}, this is a test broadcast from HR.".into(),
        recipients: synthetic_staff(cli.recipients, &cli.region),
    })?;
    println!("{}", serde_json::to_string_pretty(&accepted)?);

    // (C) 完了をポーリングで待つ。Ctrl-C で残りをキャンセル
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        let progress = control.progress();
        println!("{}", serde_json::to_string(&progress)?);
        if !progress.is_active {
            info!(completed = progress.completed, failed = progress.failed, "broadcast finished");
            break;
        }

        tokio::select! {
            _ = sleep(Duration::from_millis(500)) => {}
            signal = &mut ctrl_c => {
                signal.context("listening for ctrl-c")?;
                warn!("interrupted");
                let response = control.cancel();
                println!("{}", serde_json::to_string(&response)?);
                break;
            }
        }
    }

    Ok(())
}
