use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;
use crate::config::{CrimeSettings, RecommendSettings};
use crate::core::{EngineError, Recommender};
use crate::models::{Campus, ErrorResponse, HealthResponse, Listing, RecommendRequest, RecommendResponse};
use crate::services::{DirectionsClient, DirectionsError, TransitCache};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Vec<Listing>>,
    pub directions: Arc<DirectionsClient>,
    pub transit_cache: Arc<TransitCache>,
    pub recommender: Recommender,
    pub recommend: RecommendSettings,
    pub crime: CrimeSettings,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommend", web::post().to(recommend));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        listings: state.dataset.len(),
        transit_cache: state.transit_cache.stats(),
    })
}

/// Recommend listings endpoint
///
/// POST /api/v1/recommend
///
/// Request body:
/// ```json
/// {
///   "current_living_conditions": ["address", "Boston University", 2950, 2, 1],
///   "preference_of_future_house": { "Rent": 1, "Location": 1, "Safety": 1 },
///   "limit": 10
/// }
/// ```
pub async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend request: field_errors={:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let conditions = &req.current_living_conditions;
    let campus: Campus = match conditions.campus.parse() {
        Ok(campus) => campus,
        Err(e) => return engine_error_response(&e),
    };

    let limit = req
        .limit
        .unwrap_or(state.recommend.default_limit)
        .min(state.recommend.max_limit) as usize;

    tracing::info!(
        "Recommending for {} -> {} (limit: {})",
        conditions.current_address,
        campus,
        limit
    );

    let route = match resolve_transit(&state, &conditions.current_address, campus).await {
        Ok(route) => route,
        Err(e) => {
            tracing::error!(
                "Directions lookup failed for {} -> {}: {}",
                conditions.current_address,
                campus,
                e
            );
            return error_response(StatusCode::BAD_GATEWAY, "Failed to resolve commute", e.to_string());
        }
    };

    let query = req.to_query(
        route.map(|r| r.transit_distance),
        (state.crime.default_violent, state.crime.default_overall),
    );

    let mut recommendations = match state.recommender.score_and_rank(&state.dataset, &query) {
        Ok(ranked) => ranked,
        Err(e) => {
            tracing::warn!("Scoring failed for {}: {}", query.current_address, e);
            return engine_error_response(&e);
        }
    };

    let total_results = recommendations.len();
    recommendations.truncate(limit);

    tracing::info!(
        "Returning {} recommendations for {} (from {} listings, {} after filtering)",
        recommendations.len(),
        query.current_address,
        state.dataset.len(),
        total_results
    );

    HttpResponse::Ok().json(RecommendResponse {
        recommendations,
        total_results,
        request_id: uuid::Uuid::new_v4().to_string(),
    })
}

/// Cached route if present, otherwise ask the directions service
async fn resolve_transit(
    state: &AppState,
    origin: &str,
    campus: Campus,
) -> Result<Option<crate::models::TransitRoute>, DirectionsError> {
    if let Some(route) = state.transit_cache.get(origin, campus).await {
        return Ok(Some(route));
    }

    let route = state.directions.get_transit_route(origin, campus.name()).await?;
    if let Some(found) = route {
        state.transit_cache.insert(origin, campus, found).await;
    }
    Ok(route)
}

/// Map an engine failure onto an HTTP status and error body
pub fn engine_error_response(err: &EngineError) -> HttpResponse {
    let (status, error) = match err {
        EngineError::InvalidLocation(_) => (StatusCode::BAD_REQUEST, "Invalid location"),
        EngineError::InvalidWeight { .. } => (StatusCode::BAD_REQUEST, "Invalid preference weight"),
        EngineError::InvalidRoomCount { .. } => (StatusCode::BAD_REQUEST, "Invalid room count"),
        EngineError::MissingField { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "Missing required field"),
        EngineError::EmptyDataset
        | EngineError::DegenerateRange { .. }
        | EngineError::NonFiniteValue { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "Dataset error"),
    };

    error_response(status, error, err.to_string())
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}
