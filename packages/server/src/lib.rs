#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the CivicLens assistant.
//!
//! Serves the chat endpoint backed by the assistant core, a CRUD surface
//! for community issue reports, and an administrative endpoint for
//! rebuilding the vector index. Reports live in a local `SQLite` database;
//! the weather, news, geocoding, LLM, and vector-index collaborators are
//! configured from environment variables.

mod handlers;

use std::path::Path;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use civic_lens_assistant::Assistant;
use civic_lens_database::{DEFAULT_DB_PATH, open_db};
use civic_lens_retrieval::config::RetrievalConfig;

/// Shared application state.
pub struct AppState {
    /// The conversational core and its collaborators.
    pub assistant: Assistant,
}

/// Loads the retrieval config from `CIVIC_LENS_CONFIG` when set, falling
/// back to the built-in defaults.
fn load_retrieval_config() -> RetrievalConfig {
    let Ok(path) = std::env::var("CIVIC_LENS_CONFIG") else {
        return RetrievalConfig::default();
    };

    match RetrievalConfig::load(Path::new(&path)) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Failed to load retrieval config from {path}, using defaults: {e}");
            RetrievalConfig::default()
        }
    }
}

/// Starts the CivicLens API server.
///
/// Opens (or creates) the reports database, builds the assistant from
/// environment configuration, and starts the Actix-Web HTTP server. This is
/// a regular async function — the caller is responsible for providing the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the reports database cannot be opened.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let db_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    log::info!("Opening reports database at {db_path}...");
    let db = open_db(Path::new(&db_path))
        .await
        .expect("Failed to open reports database");

    let config = load_retrieval_config();

    log::info!("Building assistant...");
    let assistant = Assistant::from_env(db, config);

    let state = web::Data::new(AppState { assistant });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/chat", web::post().to(handlers::chat))
                    .route("/reports/create", web::post().to(handlers::create_report))
                    .route("/reports", web::get().to(handlers::list_reports))
                    .route("/reports/{id}", web::get().to(handlers::get_report))
                    .route("/reports/{id}", web::put().to(handlers::update_report_status))
                    .route("/sync-index", web::post().to(handlers::sync_index)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
