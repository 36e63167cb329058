use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::config::SearchSettings;
use crate::core::{search_nearby, InMemoryCollection, ReferenceCollection, SearchError};
use crate::models::{
    ErrorResponse, ExamplesNearbyQuery, GeoPoint, HealthResponse, NearbyResponse, PredictQuery,
    PredictResponse, SearchNearbyQuery,
};
use crate::services::{CachedCollection, InferenceClient, PostgresCollection};
use super::upload::ImageUpload;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub examples: Arc<InMemoryCollection>,
    pub images: Arc<CachedCollection<PostgresCollection>>,
    pub inference: Arc<InferenceClient>,
    pub search: SearchSettings,
}

/// Configure prediction and nearby-search routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/predict/coords", web::post().to(predict_coords))
        .route("/search/nearby", web::post().to(search_nearby_image))
        .route("/examples/nearby", web::get().to(examples_nearby));
}

fn error_response(status: u16, error: &str, message: String) -> HttpResponse {
    let body = ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status,
    };
    match status {
        400 => HttpResponse::BadRequest().json(body),
        502 => HttpResponse::BadGateway().json(body),
        503 => HttpResponse::ServiceUnavailable().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn search_error_response(err: SearchError) -> HttpResponse {
    match err {
        SearchError::InvalidArgument(message) => {
            error_response(400, "Invalid search parameters", message)
        }
        SearchError::CollectionUnavailable(e) => {
            tracing::error!("Reference collection unavailable: {}", e);
            error_response(
                503,
                "Reference collection unavailable",
                "Reference images are temporarily unavailable".to_string(),
            )
        }
    }
}

fn check_radius(radius_km: f64, search: &SearchSettings) -> Result<(), HttpResponse> {
    if radius_km > search.max_radius_km {
        return Err(error_response(
            400,
            "Validation failed",
            format!("radius_km must not exceed {}", search.max_radius_km),
        ));
    }
    Ok(())
}

async fn run_search<C: ReferenceCollection>(
    center: GeoPoint,
    radius_km: f64,
    source: &C,
) -> HttpResponse {
    match search_nearby(center, radius_km, source).await {
        Ok(matches) => {
            tracing::info!(
                "Found {} matches within {}km of ({}, {})",
                matches.len(),
                radius_km,
                center.lat,
                center.lon
            );
            HttpResponse::Ok().json(NearbyResponse { center, matches })
        }
        Err(e) => search_error_response(e),
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.images.inner().health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Predict coordinates for an uploaded image
///
/// POST /predict/coords?top_k=3
///
/// Body: multipart form with the image in `file`, or the raw image bytes. Response:
/// ```json
/// { "predictions": [{ "lat": 48.85, "lon": 2.29, "prob": 0.71 }] }
/// ```
async fn predict_coords(
    state: web::Data<AppState>,
    query: web::Query<PredictQuery>,
    image: ImageUpload,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return error_response(400, "Validation failed", errors.to_string());
    }
    if query.top_k > state.search.max_top_k {
        return error_response(
            400,
            "Validation failed",
            format!("top_k must not exceed {}", state.search.max_top_k),
        );
    }
    if image.is_empty() {
        return error_response(400, "Missing image", "Request must contain the image".to_string());
    }

    match state.inference.predict_topk(image.into_bytes(), query.top_k).await {
        Ok(predictions) => {
            tracing::info!("Returning {} predictions", predictions.len());
            HttpResponse::Ok().json(PredictResponse { predictions })
        }
        Err(e) => {
            tracing::error!("Prediction failed: {}", e);
            error_response(500, "Prediction failed", "Internal server error".to_string())
        }
    }
}

/// Predict where an image was taken, then list reference images around it
///
/// POST /search/nearby?radius_km=10
///
/// Body: multipart form with the image in `file`, or the raw image bytes. Response:
/// ```json
/// { "center": { "lat": 48.85, "lon": 2.29 }, "matches": [{ "id": "...", "name": "...",
///   "lat": 48.8584, "lon": 2.2945, "url": "...", "distance_km": 0.412 }] }
/// ```
async fn search_nearby_image(
    state: web::Data<AppState>,
    query: web::Query<SearchNearbyQuery>,
    image: ImageUpload,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return error_response(400, "Validation failed", errors.to_string());
    }
    if let Err(response) = check_radius(query.radius_km, &state.search) {
        return response;
    }
    if image.is_empty() {
        return error_response(400, "Missing image", "Request must contain the image".to_string());
    }

    let center = match state.inference.predict_top1(image.into_bytes()).await {
        Ok(Some(prediction)) => prediction.point(),
        Ok(None) => {
            return error_response(502, "No prediction", "Model returned no coordinates".to_string());
        }
        Err(e) => {
            tracing::error!("Prediction failed: {}", e);
            return error_response(500, "Prediction failed", "Internal server error".to_string());
        }
    };

    run_search(center, query.radius_km, state.images.as_ref()).await
}

/// List example images around a coordinate
///
/// GET /examples/nearby?lat=52.51653&lon=13.3775&radius_km=10
async fn examples_nearby(
    state: web::Data<AppState>,
    query: web::Query<ExamplesNearbyQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for examples_nearby: {:?}", errors);
        return error_response(400, "Validation failed", errors.to_string());
    }
    if let Err(response) = check_radius(query.radius_km, &state.search) {
        return response;
    }

    let center = GeoPoint {
        lat: query.lat,
        lon: query.lon,
    };

    run_search(center, query.radius_km, state.examples.as_ref()).await
}
