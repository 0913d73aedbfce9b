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
    actions::drivers,
    form::FormState,
    model::{Driver, DriverMatch},
    search::{DriverFinder, SearchOutcome},
    store::FleetStore,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    form::{FormBody, IdPath, payload},
    state::AppState,
};

pub fn driver_routes() -> ApiRouter<Arc<AppState>> {
    aide::generate::infer_responses(true);
    let router = ApiRouter::new()
        .api_route("/drivers", get(list_drivers_handler).post(add_driver_handler))
        .api_route("/drivers/search", get(search_drivers_handler))
        .api_route(
            "/drivers/{id}",
            get(get_driver_handler).post(update_driver_handler),
        )
        .api_route("/drivers/{id}/delete", post(delete_driver_handler));

    aide::generate::infer_responses(false);

    router
}

#[derive(Deserialize, JsonSchema)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    Ok,
    Unavailable,
}

/// Search results. `drivers` is empty whenever `status` is `unavailable`.
#[derive(Serialize, Deserialize, JsonSchema, Debug)]
pub struct SearchResponse {
    pub status: SearchStatus,
    pub drivers: Vec<DriverMatch>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        let status = if outcome.is_unavailable() {
            SearchStatus::Unavailable
        } else {
            SearchStatus::Ok
        };
        SearchResponse {
            status,
            drivers: outcome.into_candidates(),
        }
    }
}

async fn search_drivers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let outcome = DriverFinder::new(&state.store).search(&query.q).await;
    Json(SearchResponse::from(outcome))
}

async fn list_drivers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Driver>>, ApiError> {
    Ok(Json(state.store.list_drivers().await?))
}

async fn get_driver_handler(
    State(state): State<Arc<AppState>>,
    Path(IdPath { id }): Path<IdPath<Uuid>>,
) -> Result<Json<Driver>, ApiError> {
    state
        .store
        .find_driver(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("driver {id} not found")))
}

async fn add_driver_handler(
    State(state): State<Arc<AppState>>,
    form: FormBody,
) -> Json<FormState> {
    Json(drivers::add_driver(&state.store, &payload(form)).await)
}

async fn update_driver_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<IdPath>,
    form: FormBody,
) -> Json<FormState> {
    Json(drivers::update_driver(&state.store, &path.id, &payload(form)).await)
}

async fn delete_driver_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<IdPath>,
) -> Json<FormState> {
    Json(drivers::delete_driver(&state.store, &path.id).await)
}
