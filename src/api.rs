//! # API Server Module
//!
//! ## Purpose
//! REST API server exposing the conversational search operations to the web
//! front end.
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests with session identifier and free text
//! - **Output**: JSON responses with preferences, matching trips and
//!   follow-up prompts
//! - **Endpoints**: Start search, refine search, full catalog, health
//!
//! ## Error Mapping
//! User-recoverable failures (unparseable extraction, bad date) map to 422
//! with a Polish user-facing message; catalog backend failures map to 502;
//! everything else becomes a generic 500 — a raw error never leaks to the
//! client.

use crate::errors::{Result, TripSearchError};
use crate::{AppState, TripPreferences, TripRecord};
use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info, warn};

/// API server wrapper
pub struct ApiServer {
    app_state: AppState,
}

/// Turn request payload; a missing session id starts a fresh session
#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub session_id: Option<String>,
    pub text: String,
}

/// Turn response payload
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub session_id: String,
    pub preferences: TripPreferences,
    pub matches: Vec<TripRecord>,
    pub total_matches: usize,
    pub prompt: Option<String>,
    pub query_time_ms: u64,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub extractor: String,
    pub catalog: String,
}

impl ApiServer {
    /// Create new API server
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server
    pub async fn run(self) -> Result<()> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let enable_cors = self.app_state.config.server.enable_cors;

        info!("Starting API server on {}", bind_addr);

        let server = HttpServer::new(move || {
            let cors = if enable_cors {
                Cors::permissive()
            } else {
                Cors::default()
            };

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(self.app_state.clone()))
                .route("/search/start", web::post().to(start_search_handler))
                .route("/search/refine", web::post().to(refine_search_handler))
                .route("/trips", web::get().to(trips_handler))
                .route("/health", web::get().to(health_handler))
        })
        .bind(&bind_addr)
        .map_err(|e| TripSearchError::Internal {
            message: format!("Failed to bind server to {}: {}", bind_addr, e),
        })?
        .run();

        server.await.map_err(|e| TripSearchError::Internal {
            message: format!("Server error: {}", e),
        })?;

        Ok(())
    }
}

/// Resolve the session id, minting a fresh one when the client sent none
fn resolve_session_id(request: &TurnRequest) -> String {
    request
        .session_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Map an engine error onto an HTTP response without leaking internals
fn error_response(err: &TripSearchError) -> HttpResponse {
    match err {
        e if e.is_user_error() => {
            warn!(category = e.category(), "Turn rejected: {}", e);
            HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "error": "invalid_input",
                "message": "Nie udało się odczytać kryteriów z wiadomości. Spróbuj opisać wyjazd inaczej.",
            }))
        }
        TripSearchError::FilterBackend { .. } => {
            error!(category = err.category(), "Catalog backend failure: {}", err);
            HttpResponse::BadGateway().json(serde_json::json!({
                "error": "catalog_unavailable",
                "message": "Katalog wycieczek jest chwilowo niedostępny.",
            }))
        }
        _ => {
            error!(category = err.category(), "Unhandled turn failure: {}", err);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal",
                "message": "Coś poszło nie tak. Spróbuj ponownie.",
            }))
        }
    }
}

/// Start-search endpoint handler
async fn start_search_handler(
    app_state: web::Data<AppState>,
    request: web::Json<TurnRequest>,
) -> ActixResult<HttpResponse> {
    let start_time = Instant::now();
    let session_id = resolve_session_id(&request);

    match app_state.engine.start_search(&session_id, &request.text).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(TurnResponse {
            session_id,
            total_matches: outcome.matches.len(),
            preferences: outcome.preferences,
            matches: outcome.matches,
            prompt: outcome.prompt,
            query_time_ms: start_time.elapsed().as_millis() as u64,
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Refine-search endpoint handler
async fn refine_search_handler(
    app_state: web::Data<AppState>,
    request: web::Json<TurnRequest>,
) -> ActixResult<HttpResponse> {
    let start_time = Instant::now();
    let session_id = resolve_session_id(&request);

    match app_state.engine.refine_search(&session_id, &request.text).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(TurnResponse {
            session_id,
            total_matches: outcome.matches.len(),
            preferences: outcome.preferences,
            matches: outcome.matches,
            prompt: outcome.prompt,
            query_time_ms: start_time.elapsed().as_millis() as u64,
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Full-catalog endpoint handler
async fn trips_handler(app_state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    match app_state.engine.full_catalog().await {
        Ok(trips) => Ok(HttpResponse::Ok().json(trips)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Health check endpoint handler
async fn health_handler(app_state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let status = match app_state.engine.health_check().await {
        Ok(_) => "healthy",
        Err(e) => {
            warn!("Health check failed: {}", e);
            "unhealthy"
        }
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        extractor: app_state.engine.extractor_name().to_string(),
        catalog: app_state.engine.catalog_name().to_string(),
    };

    Ok(HttpResponse::Ok().json(response))
}
