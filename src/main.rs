//! Task board server
//!
//! Opens the task database and serves the web UI until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use task_board::cli::Cli;
use task_board::config::Config;
use task_board::db::Database;
use task_board::invalidation::Invalidator;
use task_board::logging::{self, LogTarget};
use task_board::service::TaskService;
use task_board::web;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut config = Config::discover(cli.config.as_deref().map(Path::new))?;
    cli.apply(&mut config);

    config.ensure_db_dir()?;
    let db = Database::open(&config.server.db_path).with_context(|| {
        format!(
            "opening task database {}",
            config.server.db_path.display()
        )
    })?;
    info!(path = %config.server.db_path.display(), "Database ready");

    let service = TaskService::new(Arc::new(db), Invalidator::new());
    let server = web::start_server(service, &config.bind_addr()).await?;
    info!("Open http://{} in a browser", server.addr());

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");
    server.shutdown().await;

    Ok(())
}
