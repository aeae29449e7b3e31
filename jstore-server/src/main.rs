use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use blob_store::LocalFileBlobStore;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jstore_server::config::ServerConfig;
use jstore_server::id_generator::RandomUuidGenerator;
use jstore_server::params::Args;
use jstore_server::services::document_service::{configure, cors_headers, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_args(&args).map_err(|e| {
        tracing::error!("invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let store = LocalFileBlobStore::open(&config.storage_root, config.write_mode)
        .await
        .map_err(|e| {
            tracing::error!("cannot use storage folder: {}", e);
            std::io::Error::new(std::io::ErrorKind::NotFound, e)
        })?;

    let bind_addr = config.bind_addr.clone();
    let workers = config.workers;
    tracing::info!(
        "Start server on {}:{} (base url {}, storage {}, {:?} writes)",
        bind_addr.0,
        bind_addr.1,
        config.base_url(),
        config.storage_root.display(),
        config.write_mode,
    );

    let state = web::Data::new(AppState::new(Arc::new(store), Arc::new(RandomUuidGenerator), config));

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors_headers())
            .wrap(middleware::Logger::default())
            .configure(configure)
    });
    if let Some(workers) = workers {
        server = server.workers(workers);
    }

    server.bind(bind_addr)?.run().await
}
