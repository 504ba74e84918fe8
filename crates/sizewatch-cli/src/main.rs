mod cycle;
mod inspect;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sizewatch_core::{AppConfig, Notifier, ProductTarget, ProductsFile, StdoutNotifier};
use sizewatch_scraper::{DebugSink, RenderClient};
use sizewatch_telegram::{TelegramClient, TelegramNotifier};
use tracing_subscriber::EnvFilter;

use crate::cycle::{Watcher, STARTUP_MESSAGE};

#[derive(Debug, Parser)]
#[command(name = "sizewatch")]
#[command(about = "Watches product pages and alerts when a size comes back in stock")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check all products on a fixed interval (the default)
    Run {
        /// Stop after this many cycles
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        cycles: Option<u32>,

        /// Print notifications to stdout instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a single check cycle and exit
    Check {
        /// Only check the product with this name
        #[arg(long)]
        product: Option<String>,

        /// Print notifications to stdout instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Evaluate a saved product page without fetching anything
    Inspect {
        /// HTML file to inspect
        path: PathBuf,

        /// Display size to evaluate
        #[arg(long, env = "SIZEWATCH_TARGET_SIZE")]
        size: Option<String>,
    },
}

/// Stdout for dry runs, Telegram otherwise.
enum CliNotifier {
    Stdout(StdoutNotifier),
    Telegram(TelegramNotifier),
}

impl CliNotifier {
    fn from_config(config: &AppConfig, dry_run: bool) -> anyhow::Result<Self> {
        if dry_run {
            return Ok(Self::Stdout(StdoutNotifier));
        }
        let (token, chat_id) = config.telegram_credentials()?;
        let client = TelegramClient::with_base_url(
            token,
            config.fetch_timeout_secs,
            &config.telegram_api_base,
        )
        .map_err(|e| anyhow::anyhow!("failed to build Telegram client: {e}"))?
        .with_retries(config.notify_max_retries, config.notify_backoff_base_ms);
        Ok(Self::Telegram(TelegramNotifier::new(client, chat_id)))
    }
}

impl Notifier for CliNotifier {
    async fn notify(&self, message: &str) {
        match self {
            Self::Stdout(n) => n.notify(message).await,
            Self::Telegram(n) => n.notify(message).await,
        }
    }
}

/// Collaborators shared by `run` and `check`, built once at startup.
struct Runtime {
    config: AppConfig,
    products: ProductsFile,
    fetcher: RenderClient,
    notifier: CliNotifier,
    debug: DebugSink,
}

impl Runtime {
    fn build(config: AppConfig, dry_run: bool) -> anyhow::Result<Self> {
        let products = sizewatch_core::load_products(&config.products_path)?;
        let fetcher = RenderClient::new(
            config.fetch_mode.clone(),
            config.fetch_timeout_secs,
            &config.user_agent,
        )
        .map_err(|e| anyhow::anyhow!("failed to build page fetcher: {e}"))?;
        let notifier = CliNotifier::from_config(&config, dry_run)?;
        let debug = DebugSink::new(config.debug_dir());

        tracing::info!(
            products = products.products.len(),
            size = %config.target_size,
            fetch_mode = %config.fetch_mode,
            dry_run,
            "sizewatch configured"
        );

        Ok(Self {
            config,
            products,
            fetcher,
            notifier,
            debug,
        })
    }

    fn watcher(&self) -> Watcher<'_, RenderClient, CliNotifier> {
        Watcher {
            fetcher: &self.fetcher,
            notifier: &self.notifier,
            debug: &self.debug,
            target_size: &self.config.target_size,
            notify_out_of_stock: self.config.notify_out_of_stock,
        }
    }
}

fn init_tracing(fallback_directive: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback_directive))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = sizewatch_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

async fn run_loop(cycles: Option<u32>, dry_run: bool) -> anyhow::Result<()> {
    let runtime = Runtime::build(load_config()?, dry_run)?;
    if runtime.config.announce_startup {
        runtime.notifier.notify(STARTUP_MESSAGE).await;
    }

    let interval = Duration::from_secs(runtime.config.check_interval_secs);
    runtime
        .watcher()
        .poll(&runtime.products.products, interval, cycles)
        .await;
    Ok(())
}

async fn run_check(product: Option<&str>, dry_run: bool) -> anyhow::Result<()> {
    let runtime = Runtime::build(load_config()?, dry_run)?;
    let products = select_products(&runtime.products, product)?;

    let Some(outcome) = runtime.watcher().guarded_cycle(&products).await else {
        anyhow::bail!("check cycle aborted unexpectedly");
    };
    for (_, check) in &outcome.checks {
        println!("{}", check.message);
    }
    Ok(())
}

/// Narrows the products file to the one named `filter`, or keeps all of them.
fn select_products(
    products: &ProductsFile,
    filter: Option<&str>,
) -> anyhow::Result<Vec<ProductTarget>> {
    let Some(name) = filter else {
        return Ok(products.products.clone());
    };
    products
        .find(name)
        .map(|p| vec![p.clone()])
        .ok_or_else(|| anyhow::anyhow!("product '{name}' not found in products file"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        None => run_loop(None, false).await,
        Some(Commands::Run { cycles, dry_run }) => run_loop(cycles, dry_run).await,
        Some(Commands::Check { product, dry_run }) => run_check(product.as_deref(), dry_run).await,
        Some(Commands::Inspect { path, size }) => {
            init_tracing("info")?;
            inspect::run_inspect(&path, size.as_deref())
        }
    }
}
