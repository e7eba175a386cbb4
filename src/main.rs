use actix_web::{App, HttpServer};
use dotenvy::dotenv;
use std::sync::Arc;

use bookmark_service::auth::AuthService;
use bookmark_service::config::AppConfig;
use bookmark_service::database::{DatabaseService, Store};
use bookmark_service::handlers;
use bookmark_service::middleware::LoggingMiddleware;
use bookmark_service::services::AppState;
use bookmark_service::utils;

const MIGRATIONS_DIR: &str = "migrations";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment from .env (if present)
    let _ = dotenv();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let _logger = utils::logging::init(&config.logging);

    log::info!("Starting bookmark service v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Server: {}:{}", config.server.host, config.server.port);
    log::info!("Workers: {}", config.server.workers);

    let db_service = DatabaseService::new(&config.database)
        .await
        .map_err(std::io::Error::other)?;

    match db_service.run_migrations(MIGRATIONS_DIR).await {
        Ok(applied) if applied.is_empty() => log::info!("DB schema up to date"),
        Ok(applied) => log::info!("Applied {} migration(s)", applied.len()),
        Err(e) => {
            log::error!("Failed to apply migrations: {}", e);
            return Err(std::io::Error::other(e));
        }
    }

    let store: Arc<dyn Store> = Arc::new(db_service);
    let auth_service = Arc::new(AuthService::new(config.auth.clone()));
    let state = AppState::new(store, auth_service);
    let max_json_payload_bytes = config.server.max_json_payload_bytes;

    HttpServer::new(move || {
        App::new()
            .wrap(LoggingMiddleware)
            .configure(handlers::configure(state.clone(), max_json_payload_bytes))
    })
    .bind((config.server.host.clone(), config.server.port))?
    .workers(config.server.workers)
    .run()
    .await
}
