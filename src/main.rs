use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{http::header, web, App, HttpServer};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use balance_reports::config::Settings;
use balance_reports::openapi::ApiDoc;
use balance_reports::report;
use balance_reports::store::{PgReportStore, ReportStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env().map_err(|e| {
        error!("Invalid configuration: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    // Configure connection pool with production-ready settings
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&settings.database_url)
        .await
        .map_err(|e| {
            error!("Failed to create pool: {e}");
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e)
        })?;

    let store: Arc<dyn ReportStore> = Arc::new(PgReportStore::new(pool));
    let store = web::Data::from(store);
    let report_settings = web::Data::new(settings.report);
    let jwt_secret = web::Data::new(settings.jwt_secret.clone());
    let allowed_origins = settings.cors_allowed_origins.clone();

    info!(
        utc_offset = %settings.report.utc_offset,
        fetch_timeout_secs = settings.report.fetch_timeout.as_secs(),
        "Starting server at http://{}:{}",
        settings.bind_address,
        settings.port
    );

    // Rate limit report endpoints: one token per second, burst of 30
    let report_governor_config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(30)
        .finish()
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Invalid rate limiter configuration",
            )
        })?;

    HttpServer::new(move || {
        // Clone allowed_origins for this closure invocation
        let allowed_origins = allowed_origins.clone();

        // Reports are read-only
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origin_str = origin.to_str().unwrap_or("");
                allowed_origins
                    .split(',')
                    .any(|allowed| allowed.trim() == origin_str)
            })
            .allowed_methods(vec!["GET", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            // Middleware (order matters: outer to inner)
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Shared state
            .app_data(store.clone())
            .app_data(report_settings.clone())
            .app_data(jwt_secret.clone())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            // Health endpoint (no rate limiting)
            .service(report::health_check)
            .service(
                web::scope("/reports")
                    .wrap(Governor::new(&report_governor_config))
                    .configure(report::configure),
            )
    })
    .bind((settings.bind_address.as_str(), settings.port))?
    .run()
    .await
}
