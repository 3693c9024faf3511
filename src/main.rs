use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use hemolink_match::config::{LoggingSettings, Settings, StorageBackend};
use hemolink_match::core::Matcher;
use hemolink_match::routes::{self, AppState};
use hemolink_match::services::{DonorStore, InMemoryStore, PostgresStore};
use std::io;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG, when set, takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // HEMOLINK_CONFIG points at a single config file instead of config/
    let settings = match std::env::var("HEMOLINK_CONFIG") {
        Ok(path) => Settings::load_from(path),
        Err(_) => Settings::load(),
    }
    .map_err(|e| {
        eprintln!("Configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging);

    info!("Starting HemoLink matching service...");

    let store: Arc<dyn DonorStore> = match settings.storage.backend {
        StorageBackend::Postgres => {
            let postgres = PostgresStore::from_settings(&settings.database).await.map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                io::Error::new(io::ErrorKind::Other, e.to_string())
            })?;
            info!("PostgreSQL store initialized");
            Arc::new(postgres)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let matcher = Matcher::new(settings.matching.default_radius_km, settings.matching.max_limit);

    info!(
        "Matcher initialized (default radius: {} km, max limit: {})",
        settings.matching.default_radius_km, settings.matching.max_limit
    );

    let app_state = AppState { store, matcher };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
