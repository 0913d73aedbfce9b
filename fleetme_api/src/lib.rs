pub mod config;
pub mod docs;
pub mod drivers;
pub mod error;
pub mod form;
pub mod pagination;
pub mod state;
pub mod vehicle_types;
pub mod vehicles;

use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi, transform::TransformOpenApi};
use axum::{Extension, Router, http::Method};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    docs::docs_routes, drivers::driver_routes, state::AppState,
    vehicle_types::vehicle_type_routes, vehicles::vehicle_routes,
};

/// Every route, still waiting for its state, and the OpenAPI document describing them.
pub fn api_router() -> (Router<Arc<AppState>>, OpenApi) {
    aide::generate::on_error(|error| tracing::error!("{}", error));
    aide::generate::extract_schemas(true);

    let mut api = OpenApi::default();

    let router = ApiRouter::new()
        .nest_api_service("/docs", docs_routes())
        .merge(vehicle_routes())
        .merge(driver_routes())
        .merge(vehicle_type_routes())
        .finish_api_with(&mut api, api_docs);

    (router, api)
}

pub fn app(state: Arc<AppState>) -> Router {
    let (router, api) = api_router();

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    router
        .layer(ServiceBuilder::new().layer(cors_layer))
        .layer(Extension(Arc::new(api)))
        .with_state(state)
}

fn api_docs(api: TransformOpenApi) -> TransformOpenApi {
    api.title("FleetMe Open API")
        .description("Vehicles, vehicle types, drivers and their capacity-limited assignment.")
}
