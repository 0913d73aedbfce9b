use std::sync::Arc;

use aide::axum::{
    ApiRouter,
    routing::{get, post},
};
use axum::{
    Json,
    extract::{Path, State},
};
use fleetme_core::{
    actions::vehicle_types, form::FormState, model::VehicleType, store::FleetStore,
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    form::{FormBody, IdPath, payload},
    state::AppState,
};

pub fn vehicle_type_routes() -> ApiRouter<Arc<AppState>> {
    aide::generate::infer_responses(true);
    let router = ApiRouter::new()
        .api_route(
            "/vehicle-types",
            get(list_vehicle_types_handler).post(add_vehicle_type_handler),
        )
        .api_route(
            "/vehicle-types/{id}",
            get(get_vehicle_type_handler).post(update_vehicle_type_handler),
        )
        .api_route(
            "/vehicle-types/{id}/delete",
            post(delete_vehicle_type_handler),
        );

    aide::generate::infer_responses(false);

    router
}

async fn list_vehicle_types_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VehicleType>>, ApiError> {
    Ok(Json(state.store.list_vehicle_types().await?))
}

async fn get_vehicle_type_handler(
    State(state): State<Arc<AppState>>,
    Path(IdPath { id }): Path<IdPath<Uuid>>,
) -> Result<Json<VehicleType>, ApiError> {
    state
        .store
        .find_vehicle_type(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("vehicle type {id} not found")))
}

async fn add_vehicle_type_handler(
    State(state): State<Arc<AppState>>,
    form: FormBody,
) -> Json<FormState> {
    Json(vehicle_types::add_vehicle_type(&state.store, &payload(form)).await)
}

async fn update_vehicle_type_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<IdPath>,
    form: FormBody,
) -> Json<FormState> {
    Json(vehicle_types::update_vehicle_type(&state.store, &path.id, &payload(form)).await)
}

async fn delete_vehicle_type_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<IdPath>,
) -> Json<FormState> {
    Json(vehicle_types::delete_vehicle_type(&state.store, &path.id).await)
}
