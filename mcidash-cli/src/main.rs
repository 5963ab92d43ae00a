mod feeds;
mod poller;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;

use mcidash_core::config::{ConfigError, DashConfig};
use mcidash_core::dashboard::{ControlOutcome, Dashboard};
use mcidash_core::feed::{ControlAction, ControlScope, FeedAdapter};

use feeds::FakeFeed;
use poller::Poller;

#[derive(Parser)]
#[command(name = "mcidash")]
#[command(about = "Watch a multi-cloud VM fleet from the terminal", long_about = None)]
struct Cli {
    /// Path to a config file (otherwise discovered from the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed and print the view model on every rebuild
    Watch {
        /// Override the configured refresh interval
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Stop after this many applied snapshots (0 = run until Ctrl-C)
        #[arg(long, default_value_t = 0)]
        ticks: u64,
        /// Emit the view model as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Fetch one snapshot and print the view model
    Show {
        /// Focus this MCI before printing
        #[arg(long)]
        select: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Send a control action to an MCI or VM
    Control {
        /// Target kind: mci or vm
        #[arg(long, default_value = "mci")]
        scope: String,
        /// Target id
        #[arg(long)]
        id: String,
        /// One of: resume, suspend, restart, delete
        #[arg(long)]
        action: String,
    },
}

fn parse_scope(s: &str) -> Option<ControlScope> {
    match s.to_lowercase().as_str() {
        "mci" => Some(ControlScope::Mci),
        "vm" => Some(ControlScope::Vm),
        _ => None,
    }
}

fn parse_action(s: &str) -> Option<ControlAction> {
    match s.to_lowercase().as_str() {
        "resume" => Some(ControlAction::Resume),
        "suspend" => Some(ControlAction::Suspend),
        "restart" => Some(ControlAction::Restart),
        "delete" => Some(ControlAction::Delete),
        _ => None,
    }
}

fn load_config(cli: &Cli) -> Result<DashConfig, ConfigError> {
    if let Some(path) = &cli.config {
        return DashConfig::load(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => match DashConfig::discover(&cwd) {
            Ok((_, config)) => Ok(config),
            // no config anywhere is fine; defaults apply
            Err(ConfigError::NotFound { .. }) => Ok(DashConfig::default()),
            Err(e) => Err(e),
        },
        Err(e) => Err(ConfigError::Io(e)),
    }
}

async fn run_watch(config: DashConfig, interval_ms: Option<u64>, ticks: u64, json: bool) {
    if !config.auto_refresh && ticks == 0 {
        // refresh disabled: no timer may be left pending, so show once
        run_show(&config, None, json).await;
        return;
    }

    let interval = Duration::from_millis(interval_ms.unwrap_or(config.refresh_interval_ms));
    let poller = Poller::new(FakeFeed::new(&config.namespace), interval);
    let mut dashboard = Dashboard::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c_tx.send(true);
        }
    });

    let mut applied = 0u64;
    poller
        .run(&mut dashboard, shutdown_rx, |dash| {
            if json {
                render::print_json(dash.view());
            } else {
                render::print_text(dash.view());
            }
            applied += 1;
            if ticks > 0 && applied >= ticks {
                let _ = shutdown_tx.send(true);
            }
        })
        .await;
}

async fn run_show(config: &DashConfig, select: Option<String>, json: bool) {
    let interval = Duration::from_millis(config.refresh_interval_ms);
    let poller = Poller::new(FakeFeed::new(&config.namespace), interval);
    let mut dashboard = Dashboard::new();

    if let Err(e) = poller.refresh_once(&mut dashboard).await {
        eprintln!("snapshot fetch failed: {}", e);
        std::process::exit(1);
    }

    if let Some(id) = select {
        dashboard.select(&id);
    }

    if json {
        render::print_json(dashboard.view());
    } else {
        render::print_text(dashboard.view());
    }
}

async fn run_control(config: DashConfig, scope: ControlScope, id: String, action: ControlAction) {
    let feed = FakeFeed::new(&config.namespace);
    let feed_name = feed.name();
    let poller = Poller::new(feed, Duration::from_millis(config.refresh_interval_ms));
    let mut dashboard = Dashboard::new();

    // commit a snapshot first so the outcome is stamped against a real
    // generation and the target id can be checked against current rows
    if let Err(e) = poller.refresh_once(&mut dashboard).await {
        eprintln!("snapshot fetch failed: {}", e);
        std::process::exit(1);
    }

    match poller.send_control(&mut dashboard, scope, &id, action).await {
        ControlOutcome::Accepted => {
            println!(
                "[{}] {} {}: accepted; effect arrives with the next snapshot",
                feed_name, action, id
            );
        }
        ControlOutcome::Failed => {
            let view = dashboard.view();
            if let Some(message) = &view.last_action_error {
                eprintln!("[{}] {}", feed_name, message);
            } else if let Some(message) = dashboard.last_transport_error() {
                eprintln!("[{}] {}", feed_name, message);
            }
            std::process::exit(1);
        }
        ControlOutcome::StaleDiscarded => {
            println!("[{}] outcome superseded by a newer snapshot", feed_name);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Watch {
            interval_ms,
            ticks,
            json,
        }) => run_watch(config, interval_ms, ticks, json).await,
        Some(Commands::Show { select, json }) => run_show(&config, select, json).await,
        Some(Commands::Control { scope, id, action }) => {
            let (Some(scope), Some(action)) = (parse_scope(&scope), parse_action(&action)) else {
                eprintln!("unknown scope or action (scope: mci|vm, action: resume|suspend|restart|delete)");
                std::process::exit(2);
            };
            run_control(config, scope, id, action).await;
        }
        None => run_watch(config, None, 0, false).await,
    }
}
