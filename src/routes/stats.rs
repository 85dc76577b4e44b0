use actix_web::{web, HttpResponse, Responder};
use crate::models::{BreedDataResponse, ErrorResponse, HealthResponse, ViewDataResponse};
use crate::routes::AppState;
use crate::services::{CacheKey, StoreError};

/// Configure statistics and service routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/", web::get().to(home))
        .route("/health", web::get().to(health_check))
        .route("/api/dog-breed-data", web::get().to(breed_data))
        .route("/view_data", web::get().to(view_data));
}

async fn home() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Breedlens: dog breed analysis with breed statistics")
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            false
        }
    };

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn store_failure(context: &str, e: StoreError) -> HttpResponse {
    tracing::error!("{}: {}", context, e);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: context.to_string(),
        message: e.to_string(),
        status_code: 500,
    })
}

/// Totals per breed and per breed group
///
/// GET /api/dog-breed-data
///
/// Response body:
/// ```json
/// {
///   "breed_data": [{"_id": "Pug", "count": 3}],
///   "breed_group_data": [{"_id": "Toy", "count": 5}]
/// }
/// ```
async fn breed_data(state: web::Data<AppState>) -> impl Responder {
    let key = CacheKey::breed_data(state.cache.generation());
    if let Ok(cached) = state.cache.get::<BreedDataResponse>(&key).await {
        return HttpResponse::Ok().json(cached);
    }

    let breed_data = match state.store.totals_by_breed().await {
        Ok(data) => data,
        Err(e) => return store_failure("Failed to aggregate breed data", e),
    };
    let breed_group_data = match state.store.totals_by_group().await {
        Ok(data) => data,
        Err(e) => return store_failure("Failed to aggregate breed group data", e),
    };

    let response = BreedDataResponse {
        breed_data,
        breed_group_data,
    };

    if let Err(e) = state.cache.set(&key, &response).await {
        tracing::warn!("Failed to cache breed data: {}", e);
    }

    HttpResponse::Ok().json(response)
}

/// Every (breed, breed_group) counter
///
/// GET /view_data
async fn view_data(state: web::Data<AppState>) -> impl Responder {
    match state.store.list_stats().await {
        Ok(breed_stats) => HttpResponse::Ok().json(ViewDataResponse { breed_stats }),
        Err(e) => store_failure("Failed to fetch breed stats", e),
    }
}
