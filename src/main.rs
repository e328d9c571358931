use crate::config::Config;
use crate::services::{GatewayOptions, MediaGateway, YtDlpExtractor};
use actix_rt::signal::unix;
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use futures_lite::FutureExt;
use search_providers::YouTubeClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

mod config;
mod http;
mod services;
mod types;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    let mut terminate = unix::signal(unix::SignalKind::terminate())?;
    let mut interrupt = unix::signal(unix::SignalKind::interrupt())?;

    dotenv::dotenv().ok();
    env_logger::init();

    let config = Arc::from(Config::from_env());

    info!("Starting application...");

    let youtube_client = YouTubeClient::create().expect("Unable to initialize YouTube client");
    let extractor = YtDlpExtractor::create(config.ytdlp_path.clone());

    let media_gateway = Arc::new(MediaGateway::new(
        Arc::new(youtube_client),
        Arc::new(extractor),
        GatewayOptions {
            cache_capacity: config.cache_capacity,
            search_limit: config.search_limit,
            suggest_timeout: config.suggest_timeout(),
            resolve_timeout: config.resolve_timeout(),
        },
    ));

    let shutdown_timeout = config.shutdown_timeout;
    let bind_address = config.bind_address.clone();

    let server = HttpServer::new({
        move || {
            App::new()
                .wrap(Logger::default())
                .app_data(Data::new(Arc::clone(&media_gateway)))
                .configure(http::configure)
        }
    })
    .shutdown_timeout(shutdown_timeout)
    .bind(&bind_address)?
    .run();

    let server_handle = server.handle();

    actix_rt::spawn({
        async move {
            if let Err(error) = server.await {
                error!(?error, "Error on http server");
            }
        }
    });

    info!(%bind_address, "Application started");

    interrupt.recv().or(terminate.recv()).await;

    info!("Received shutdown signal. Shutting down gracefully...");

    if actix_rt::time::timeout(
        Duration::from_secs(shutdown_timeout),
        server_handle.stop(true),
    )
    .await
    .is_err()
    {
        warn!(shutdown_timeout, "Server did not stop in time, exiting anyway");
    }

    Ok(())
}
