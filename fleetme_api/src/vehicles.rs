use std::sync::Arc;

use aide::axum::{
    ApiRouter,
    routing::{get, post},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use fleetme_core::{
    actions::vehicles,
    form::FormState,
    model::VehicleDetails,
    store::FleetStore,
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    form::{FormBody, IdPath, payload},
    pagination::{PaginatedResponse, Pagination},
    state::AppState,
};

pub fn vehicle_routes() -> ApiRouter<Arc<AppState>> {
    aide::generate::infer_responses(true);
    let router = ApiRouter::new()
        .api_route(
            "/vehicles",
            get(list_vehicles_handler).post(add_vehicle_handler),
        )
        .api_route(
            "/vehicles/{id}",
            get(get_vehicle_handler).post(update_vehicle_handler),
        )
        .api_route("/vehicles/{id}/delete", post(delete_vehicle_handler));

    aide::generate::infer_responses(false);

    router
}

/// Vehicles newest first, with their type and assigned drivers.
async fn list_vehicles_handler(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<VehicleDetails>>, ApiError> {
    let total = state.store.count_vehicles().await?;
    let vehicles = state
        .store
        .list_vehicles(pagination.offset(), pagination.per_page())
        .await?;

    Ok(Json(PaginatedResponse::new(vehicles, &pagination, total)))
}

async fn get_vehicle_handler(
    State(state): State<Arc<AppState>>,
    Path(IdPath { id }): Path<IdPath<Uuid>>,
) -> Result<Json<VehicleDetails>, ApiError> {
    state
        .store
        .find_vehicle(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("vehicle {id} not found")))
}

async fn add_vehicle_handler(
    State(state): State<Arc<AppState>>,
    form: FormBody,
) -> Json<FormState> {
    Json(vehicles::add_vehicle(&state.store, &payload(form)).await)
}

async fn update_vehicle_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<IdPath>,
    form: FormBody,
) -> Json<FormState> {
    Json(vehicles::update_vehicle(&state.store, &path.id, &payload(form)).await)
}

async fn delete_vehicle_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<IdPath>,
) -> Json<FormState> {
    Json(vehicles::delete_vehicle(&state.store, &path.id).await)
}
