use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware};
use breedlens::config::Settings;
use breedlens::core::AnalysisPipeline;
use breedlens::routes::{self, handle_json_payload_error, AppState};
use breedlens::services::{PostgresClient, StatsCache, StatsStore, VisionClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn io_error<E: std::fmt::Display>(context: &str, e: E) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting Breedlens analysis service...");

    if settings.inference.api_key.is_empty() {
        error!("No vision API key configured (set OPENAI_API_KEY); analysis requests will fail");
    }

    let vision = Arc::new(
        VisionClient::new(
            settings.inference.endpoint.clone(),
            settings.inference.api_key.clone(),
            settings.inference.model.clone(),
            settings.inference.max_tokens,
            Duration::from_secs(settings.inference.timeout_secs),
        )
        .map_err(|e| io_error("Failed to create HTTP client", e))?,
    );

    info!(
        "Vision client initialized (model: {}, timeout: {}s)",
        settings.inference.model, settings.inference.timeout_secs
    );

    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let postgres: Arc<dyn StatsStore> = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            Some(db_max_conn),
            settings.database.min_connections,
        )
        .await
        .map_err(|e| io_error("Failed to connect to PostgreSQL", e))?,
    );

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(30);
    let cache_entries = settings.cache.max_entries.unwrap_or(64);
    let cache = Arc::new(StatsCache::new(cache_entries, cache_ttl));

    info!("Stats cache initialized ({} entries, TTL: {}s)", cache_entries, cache_ttl);

    let pipeline = AnalysisPipeline::new(vision, postgres.clone(), settings.analysis.persist_records);

    let max_upload_bytes = settings.server.max_upload_bytes;
    let app_state = AppState {
        pipeline,
        store: postgres,
        cache,
        max_upload_bytes,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        // Base64 inflates uploads by a third
        let json_limit = max_upload_bytes / 3 * 4 + 1024;

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(
                web::JsonConfig::default()
                    .limit(json_limit)
                    .error_handler(handle_json_payload_error),
            )
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
