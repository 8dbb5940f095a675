use std::process;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use wordfeed::config::{Cli, Config, default_config_dir, default_config_path};
use wordfeed::cursor::{CursorStore, MemoryCursorStore};
use wordfeed::db::Database;
use wordfeed::dispatch::SiteRegistry;
use wordfeed::engine::SyncEngine;
use wordfeed::page::ConfiguredPage;
use wordfeed::status::StatusPoller;
use wordfeed::transport::{Transport, http_client};

async fn run<C: CursorStore>(engine: SyncEngine<ConfiguredPage, StatusPoller, Transport, C>) {
    let token = CancellationToken::new();
    tokio::select! {
        _ = engine.run(token.clone()) => {}
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl+c signal received, preparing to shutdown");
            token.cancel();
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    dotenvy::dotenv().ok();

    // --config puts the database next to the config file, otherwise ~/.wordfeed/
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("wordfeed starting");

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        process::exit(1);
    });

    let registry = SiteRegistry::with_entries(&cfg.sites).unwrap_or_else(|e| {
        tracing::error!(error = %e, "invalid site configuration");
        process::exit(1);
    });

    let client = http_client(cfg.app.request_timeout()).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to build http client");
        process::exit(1);
    });

    let page = ConfiguredPage::from_config(&cfg.page, client.clone()).unwrap_or_else(|e| {
        tracing::error!(error = %e, "invalid page configuration");
        process::exit(1);
    });

    let status = StatusPoller::new(client.clone(), cfg.collector.status_url());
    let transport = Transport::new(client, cfg.collector.words_url());
    let interval = cfg.app.tick_interval();

    tracing::info!(
        collector = %cfg.collector.base_url,
        interval_ms = cfg.app.tick_interval_ms,
        sites = registry.sites().len(),
        "sync loop running"
    );

    if args.ephemeral {
        let engine = SyncEngine::new(page, status, transport, MemoryCursorStore::new(), registry, interval);
        run(engine).await;
    } else {
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            tracing::error!(error = %e, dir = ?data_dir, "failed to create data directory");
            process::exit(1);
        }
        let db = Database::new(&cfg, &data_dir).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to setup database");
            process::exit(1);
        });
        let engine = SyncEngine::new(page, status, transport, db, registry, interval);
        run(engine).await;
    }

    tracing::info!("wordfeed going off, shutdown complete");
}
