//! shelfmark-ls - Library Service
//!
//! Resolves ISBNs to bibliographic metadata through the external catalog
//! providers and owns the shelf database: users, books, ownership,
//! labels, and reading status. Serves the HTTP API the UI and scanner
//! front ends talk to.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use shelfmark_ls::{build_router, AppState, Resolver};

#[derive(Parser, Debug)]
#[command(name = "shelfmark-ls")]
#[command(about = "Shelfmark library service")]
struct Args {
    /// HTTP listen port
    #[arg(short, long, default_value = "7452", env = "SHELFMARK_LS_PORT")]
    port: u16,

    /// Root folder holding the database (overrides env/config/default)
    #[arg(short, long, env = "SHELFMARK_ROOT_FOLDER")]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!(
        "Starting shelfmark-ls (Library Service) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let root_folder = shelfmark_common::config::resolve_root_folder(args.root_folder.as_deref());
    shelfmark_common::config::ensure_root_folder(&root_folder)?;

    let db_path = shelfmark_common::config::database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let pool = shelfmark_common::db::init::init_database(&db_path).await?;

    let resolver = Resolver::with_default_sources()
        .map_err(|e| anyhow::anyhow!("Failed to build metadata providers: {}", e))?;

    let state = AppState::new(pool, Arc::new(resolver));
    let app = build_router(state);

    let addr = format!("127.0.0.1:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
