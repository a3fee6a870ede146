use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use teamup_match::config::{LoggingSettings, Settings, StorageBackend};
use teamup_match::core::Recommender;
use teamup_match::routes::{self, AppState};
use teamup_match::services::{MemoryStore, PostgresStore};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins when set, e.g. RUST_LOG=teamup_match=debug,sqlx=warn
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    // Fall back to default logging so a broken config is still reported
    let logging = settings.as_ref().map(|s| s.logging.clone()).unwrap_or_default();
    init_logging(&logging);

    info!("Starting TeamUp Match recommendation service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    let recommender = match settings.storage.backend {
        StorageBackend::Postgres => {
            let store = Arc::new(PostgresStore::from_settings(&settings.database).await.map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
            })?);
            info!("PostgreSQL store initialized");
            Recommender::new(store.clone(), store)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory store, data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            Recommender::new(store.clone(), store)
        }
    }
    .with_default_limit(settings.recommendations.default_limit);

    info!(
        "Recommender initialized (default limit: {}, max limit: {})",
        settings.recommendations.default_limit,
        settings.recommendations.max_limit
    );

    let app_state = AppState {
        recommender,
        limits: Arc::new(settings.recommendations.clone()),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes::configure_extractors)
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
