mod args;
mod config;
mod data_dir;

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use http_api::HttpState;
use ledger_app::services::DEFAULT_CLEAR_BATCH_SIZE;
use ledger_app::{AppConfig, AppPaths, AppState, ensure_app_data_dir};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    let config = config::load_or_create().map_err(io::Error::other)?;
    if config.created {
        println!(
            "Created config at {} (default port {}).",
            config.paths.file.display(),
            config.config.port
        );
    }

    let data_dir = data_dir::resolve_data_dir(cli.data_dir.clone()).map_err(io::Error::other)?;
    tracing::info!(
        dir = %data_dir.dir.display(),
        existing = data_dir.matched_existing,
        "using data dir"
    );

    let paths = AppPaths::new(data_dir.dir);
    ensure_app_data_dir(&paths).map_err(|err| io::Error::other(err.to_string()))?;

    let log_path = cli
        .log
        .clone()
        .or_else(|| config.config.log_path.clone())
        .unwrap_or_else(ingest::default_log_path);
    let mut app_config = AppConfig::new(paths.db_path, log_path);
    app_config.batch_size = config.config.batch_size.max(1);
    app_config.cache_ttl = Duration::from_secs(config.config.cache_ttl_secs);
    let app_state = AppState::new(app_config);

    match cli.command {
        None => serve(app_state, config.config.port, false).await,
        Some(Commands::Serve { port, no_ingest }) => {
            serve(app_state, port.unwrap_or(config.config.port), no_ingest).await
        }
        Some(Commands::Ingest) => {
            app_state
                .setup_db()
                .map_err(|err| io::Error::other(format!("failed to initialize database: {err}")))?;
            let stats = app_state.services.ingest.run()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Some(Commands::Status) => {
            app_state.setup_db()?;
            match app_state.services.ingest.state()? {
                Some(cursor) => println!("{}", serde_json::to_string_pretty(&cursor)?),
                None => println!("Nothing ingested yet."),
            }
            Ok(())
        }
        Some(Commands::Clear { batch_size }) => {
            app_state.setup_db()?;
            let summary = app_state
                .services
                .admin
                .clear_all(batch_size.unwrap_or(DEFAULT_CLEAR_BATCH_SIZE))?;
            println!("{}", serde_json::to_string_pretty(&summary.to_json())?);
            Ok(())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

async fn serve(
    app_state: AppState,
    port: u16,
    skip_ingest: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = app_state.setup_db() {
        return Err(io::Error::other(format!("failed to initialize database: {}", err)).into());
    }

    if !skip_ingest {
        let ingest_state = app_state.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(err) = ingest_state.initialize(true) {
                tracing::error!(error = %err, "failed to ingest on startup");
            }
        });
    }

    let router = http_api::router(HttpState::new(app_state));

    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    if used_fallback {
        tracing::warn!(
            configured = port,
            actual = actual_port,
            "configured port was unavailable"
        );
    }

    println!("Usage ledger API is running at http://127.0.0.1:{actual_port}/api");
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}
