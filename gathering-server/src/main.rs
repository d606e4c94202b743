use dotenvy::dotenv;
use std::sync::Arc;
use tokio::sync::Mutex;

use gathering_server::application::{AuthService, FeedService};
use gathering_server::data::JsonFileStore;
use gathering_server::infrastructure::{ids::IdGenerator, logging::init_logging};
use gathering_server::presentation::http_handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    init_logging();

    // Get configuration from environment
    let data_file = std::env::var("DATA_FILE").unwrap_or_else(|_| "data.json".to_string());
    let http_port = std::env::var("HTTP_PORT").unwrap_or_else(|_| "5000".to_string());

    // Разрешенные CORS домены; по умолчанию открыто для всех, как в оригинале
    let cors_allowed_origins =
        std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let http_addr = format!("0.0.0.0:{}", http_port);

    tracing::info!("Starting Gathering server...");
    tracing::info!("Data file: {}", data_file);
    tracing::info!("HTTP server will listen on {}", http_addr);

    // Initialize the store and services
    tracing::info!("Initializing services...");

    let store = Arc::new(JsonFileStore::new(&data_file));
    let ids = Arc::new(IdGenerator::new());

    // Один глобальный замок на цикл load-mutate-save: конкурирующие записи
    // больше не затирают друг друга
    let write_lock = Arc::new(Mutex::new(()));

    let auth_service = Arc::new(AuthService::new(
        store.clone(),
        ids.clone(),
        write_lock.clone(),
    ));
    let feed_service = Arc::new(FeedService::new(
        store.clone(),
        ids.clone(),
        write_lock.clone(),
    ));

    tracing::info!("Services initialized successfully");

    run_http_server(http_addr, auth_service, feed_service, cors_allowed_origins).await
}

/// Configure CORS for the HTTP server with allowed origins from .env
fn configure_cors(allowed_origins: &str) -> actix_cors::Cors {
    use actix_cors::Cors;
    use actix_web::http::header;

    if allowed_origins.trim() == "*" {
        tracing::info!("CORS: allowing any origin");
        return Cors::permissive();
    }

    tracing::info!("Configuring CORS with allowed origins: {}", allowed_origins);

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600);

    for origin in allowed_origins.split(',').map(|s| s.trim()) {
        if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
            tracing::debug!("Added allowed CORS origin: {}", origin);
        }
    }

    cors
}

async fn run_http_server(
    addr: String,
    auth_service: Arc<AuthService>,
    feed_service: Arc<FeedService>,
    cors_allowed_origins: String,
) -> anyhow::Result<()> {
    use actix_web::{middleware::Logger, web, App, HttpServer};

    tracing::info!("Configuring HTTP server...");

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(configure_cors(&cors_allowed_origins))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(feed_service.clone()))
            .configure(http_handlers::configure_routes)
    })
    .bind(&addr)?
    .run();

    tracing::info!("HTTP server running on {}", addr);

    server.await?;

    Ok(())
}
