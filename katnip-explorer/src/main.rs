use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use isahc::{prelude::Configurable, HttpClient};
use log::info;
use thiserror::Error;

use katnip_api::client::api::{BlocksQuery, Error as ApiError, KatnipApi, KatnipApiHttpClient, Order};
use katnip_api::client::traced::KatnipApiTracing;
use katnip_explorer::config::{ConfigError, ExplorerConfig};
use katnip_explorer::explorer::Explorer;
use katnip_explorer::poller::{PollerConf, RecentBlocksPoller};
use katnip_explorer::route::{InvalidRoute, Route};
use katnip_explorer::search::SearchResolution;
use katnip_explorer::view::{render_block, render_block_list, render_transaction};

#[tokio::main]
async fn main() -> ExitCode {
    let args = AppArgs::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[derive(Error, Debug)]
enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("cannot initialize logging: {0}")]
    Logging(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("cannot build http client: {0}")]
    HttpClient(#[from] isahc::Error),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Route(#[from] InvalidRoute),
    #[error("{0}")]
    Unresolved(String),
    #[error("recent blocks poller crashed: {0}")]
    PollerCrashed(#[from] tokio::task::JoinError),
    #[error("recent blocks poller stopped unexpectedly")]
    PollerStopped,
}

async fn run(args: AppArgs) -> Result<(), AppError> {
    init_logging(&args.log4rs_path)?;
    let config = ExplorerConfig::load(args.config_path.as_deref())?;
    let api_url = config.api_url()?;
    info!("Using Katnip API at {}", api_url);

    let client = HttpClient::builder()
        .timeout(config.http_client_timeout())
        .build()?;
    let api = KatnipApiTracing::wrap(KatnipApiHttpClient::new(client, api_url));
    let explorer = Explorer::new(api, config.recent_blocks_limit);

    match args.command {
        Command::Blocks { follow: true, .. } => {
            follow_blocks(explorer.into_api(), config.poller_conf()).await
        }
        Command::Blocks {
            limit: None,
            skip: None,
            order: None,
            ..
        } => show(&explorer, Route::Home).await,
        Command::Blocks {
            limit, skip, order, ..
        } => {
            let query = BlocksQuery {
                limit: limit.unwrap_or(config.recent_blocks_limit),
                skip,
                order,
            };
            print!("{}", render_block_list(&explorer.get_blocks(query).await?));
            Ok(())
        }
        Command::Block { hash } => show(&explorer, Route::Block(hash)).await,
        Command::Tx { id, by_hash: false } => show(&explorer, Route::Transaction(id)).await,
        Command::Tx { id, by_hash: true } => {
            print!("{}", render_transaction(&explorer.get_transaction_by_hash(&id).await?));
            Ok(())
        }
        Command::Search { query } => show(&explorer, Route::Search(query)).await,
        Command::Open { route } => show(&explorer, Route::from_str(&route)?).await,
        Command::Count => {
            println!("{}", explorer.get_block_count().await?);
            Ok(())
        }
    }
}

fn init_logging(path: &Path) -> Result<(), AppError> {
    if !path.exists() {
        return Ok(());
    }
    log4rs::init_file(path, Default::default()).map_err(|e| AppError::Logging(e.into()))
}

async fn show<A: KatnipApi>(explorer: &Explorer<A>, route: Route) -> Result<(), AppError> {
    match route {
        Route::Home => print!("{}", render_block_list(&explorer.get_recent_blocks().await?)),
        Route::Block(hash) => print!("{}", render_block(&explorer.get_block(&hash).await?)),
        Route::Transaction(id) => print!("{}", render_transaction(&explorer.get_transaction(&id).await?)),
        Route::Search(query) => {
            let resolution = explorer.resolve_search(&query).await;
            if let Some(route) = resolution.route() {
                println!("-> {}", route);
            }
            match resolution {
                SearchResolution::Block(block) => print!("{}", render_block(&block)),
                SearchResolution::Transaction(tx) => print!("{}", render_transaction(&tx)),
                unresolved => {
                    let message = unresolved.message().unwrap_or_default();
                    return Err(AppError::Unresolved(message));
                }
            }
        }
    }
    Ok(())
}

async fn follow_blocks<A>(api: A, conf: PollerConf) -> Result<(), AppError>
where
    A: KatnipApi + Send + Sync + 'static,
{
    let (poller, mut displayed) = RecentBlocksPoller::start(api, conf);
    let interrupted = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break true,
            changed = displayed.changed() => {
                if changed.is_err() {
                    break false;
                }
                let view = render_block_list(&displayed.borrow_and_update());
                print!("\x1B[2J\x1B[H{}", view);
            }
        }
    };
    poller.join().await?;
    if interrupted {
        Ok(())
    } else {
        Err(AppError::PollerStopped)
    }
}

#[derive(Parser)]
#[command(name = "katnip")]
#[command(version = "1.0")]
#[command(about = "Katnip - Kaspa block explorer", long_about = None)]
struct AppArgs {
    /// Path to the YAML configuration file.
    #[arg(long, short)]
    config_path: Option<PathBuf>,
    /// Path to the log4rs configuration file.
    #[arg(long, default_value = "conf/log4rs.yaml")]
    log4rs_path: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the latest blocks, or a page of blocks.
    Blocks {
        /// Keep refreshing until interrupted.
        #[arg(long, conflicts_with_all = ["limit", "skip", "order"])]
        follow: bool,
        /// Number of blocks to show, at most 100.
        #[arg(long)]
        limit: Option<u16>,
        /// Number of blocks to skip.
        #[arg(long)]
        skip: Option<u64>,
        /// `asc` or `desc`.
        #[arg(long)]
        order: Option<Order>,
    },
    /// Show a block by hash.
    Block { hash: String },
    /// Show a transaction by id.
    Tx {
        id: String,
        /// Look the transaction up by hash instead.
        #[arg(long)]
        by_hash: bool,
    },
    /// Find a block or transaction by hash or id.
    Search { query: String },
    /// Show the view behind a `#/...` route.
    Open { route: String },
    /// Show the total number of blocks.
    Count,
}
