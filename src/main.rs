use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use geoclip_nearby::config::{LoggingSettings, Settings};
use geoclip_nearby::core::{InMemoryCollection, ReferenceCollection};
use geoclip_nearby::routes::{self, AppState, MAX_UPLOAD_BYTES};
use geoclip_nearby::services::{CachedCollection, InferenceClient, PostgresCollection};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize logging; `LOG_LEVEL` and `LOG_FORMAT` override the config file
fn init_logging(logging: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

/// Copy the example set into the images table
async fn seed_reference_images(
    examples: &InMemoryCollection,
    images: &CachedCollection<PostgresCollection>,
) {
    let records = match examples.records().await {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to read examples for seeding: {}", e);
            return;
        }
    };

    match images.inner().upsert_records(&records).await {
        Ok(_) => images.invalidate().await,
        Err(e) => error!("Failed to seed reference images: {}", e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();
    init_logging(
        settings
            .as_ref()
            .map(|s| &s.logging)
            .unwrap_or(&LoggingSettings::default()),
    );

    info!("Starting GeoCLIP nearby service...");

    let settings = settings.map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    // Static example set, optionally grid-indexed
    let mut examples = InMemoryCollection::from_json_file(&settings.examples.path)
        .map_err(|e| startup_error("Failed to load examples", e))?;
    if let Some(cell_degrees) = settings.examples.grid_cell_degrees {
        examples = examples.with_grid(cell_degrees);
        info!("Examples indexed on a {}° grid", cell_degrees);
    }

    info!("Loaded {} example images", examples.len());

    // Initialize PostgreSQL-backed reference images
    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let postgres = PostgresCollection::from_settings(
        &settings.database.url,
        Some(db_max_conn),
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .map_err(|e| startup_error("Invalid PostgreSQL settings", e))?;

    info!("PostgreSQL pool configured (max: {} connections)", db_max_conn);

    // An unreachable database only degrades image search; examples keep working
    let images = CachedCollection::new(postgres, settings.cache.ttl_secs);

    match images.inner().run_migrations().await {
        Ok(()) => {
            if settings.database.seed_from_examples {
                seed_reference_images(&examples, &images).await;
            }
            match images.inner().count().await {
                Ok(total) => info!("{} reference images available", total),
                Err(e) => error!("Failed to count reference images: {}", e),
            }
        }
        Err(e) => warn!("PostgreSQL not ready, image search degraded until it is: {}", e),
    }

    info!("Reference snapshot cache TTL: {}s", settings.cache.ttl_secs);

    let inference = InferenceClient::new(settings.inference.endpoint.clone(), settings.inference.timeout_secs)
        .map_err(|e| startup_error("Failed to create inference client", e))?;

    info!("Inference backend: {}", settings.inference.endpoint);

    // Build application state
    let app_state = AppState {
        examples: Arc::new(examples),
        images: Arc::new(images),
        inference: Arc::new(inference),
        search: settings.search.clone(),
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
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
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
