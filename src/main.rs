use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tracing::error;
use tracing_subscriber::EnvFilter;

use taskboard::db::db::Db;
use taskboard::db::tasks::Tasks;
use taskboard::libs::config::Config;
use taskboard::libs::secret;
use taskboard::server::{self, AppState};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to bind, overrides BIND
    #[arg(long)]
    bind: Option<String>,
    /// Port to listen on, overrides PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let tasks = open_store(&config).await?;
    let state = AppState::new(tasks)?;
    server::run(state, &config.addr()).await
}

/// Resolve credentials and open the store, keeping the process alive on
/// failure: any configuration or connection problem downgrades to the
/// disposable in-memory store.
async fn open_store(config: &Config) -> Result<Tasks> {
    let provider = secret::from_config(config);
    let db = match provider.resolve().await {
        Ok(creds) => match Db::open(&creds) {
            Ok(db) => db,
            Err(e) => {
                error!("Failed to open task store: {e:#}; falling back to in-memory store");
                Db::open_in_memory()?
            }
        },
        Err(e) => {
            error!("Failed to resolve store credentials: {e}; falling back to in-memory store");
            Db::open_in_memory()?
        }
    };
    match Tasks::new(db) {
        Ok(tasks) => Ok(tasks),
        Err(e) => {
            error!("Failed to prepare task table: {e:#}; falling back to in-memory store");
            Tasks::new(Db::open_in_memory()?)
        }
    }
}
