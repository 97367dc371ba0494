use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use rentrobo_algo::config::{LoggingSettings, Settings};
use rentrobo_algo::core::Recommender;
use rentrobo_algo::routes::{self, recommend::AppState};
use rentrobo_algo::services::{DatasetLoader, DirectionsClient, TransitCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn startup_error<E: std::fmt::Display>(context: &str, err: E) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

fn init_tracing(logging: &LoggingSettings) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level)))
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration; the logging section is needed before the subscriber exists
    let settings = Settings::load();

    // Initialize logging
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default()
        .with_overrides(std::env::var("LOG_LEVEL").ok(), std::env::var("LOG_FORMAT").ok());
    init_tracing(&logging);

    info!("Starting RentRobo recommendation service...");

    let settings = settings.map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    // Load and clean the listings dataset once; it is read-only afterwards
    let loader = DatasetLoader::new(settings.dataset.cleaning_rules());
    let dataset = loader
        .load_path(&settings.dataset.path)
        .map_err(|e| startup_error("Failed to load listings dataset", e))?;

    info!("Dataset loaded: {} listings from {}", dataset.len(), settings.dataset.path);

    if settings.directions.api_key.is_empty() {
        error!("No directions API key configured; uncached commute lookups will fail");
    }

    let timeout = Duration::from_secs(settings.directions.timeout_secs.unwrap_or(10));
    let directions = DirectionsClient::new(
        settings.directions.endpoint.clone(),
        settings.directions.api_key.clone(),
        timeout,
    )
    .map_err(|e| startup_error("Failed to build directions client", e))?;

    info!("Directions client initialized ({})", directions.base_url());

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(3600);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);
    let transit_cache = TransitCache::new(l1_cache_size, cache_ttl);

    info!("Transit cache initialized ({} entries, TTL: {}s)", l1_cache_size, cache_ttl);

    let recommender = Recommender::new(settings.engine.options());

    info!("Recommender initialized with options: {:?}", recommender.options());

    // Build application state
    let app_state = AppState {
        dataset: Arc::new(dataset),
        directions: Arc::new(directions),
        transit_cache: Arc::new(transit_cache),
        recommender,
        recommend: settings.recommend.clone(),
        crime: settings.crime.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
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
