use std::sync::Arc;

use aide::{
    axum::{
        ApiRouter, IntoApiResponse,
        routing::{get, get_with},
    },
    openapi::OpenApi,
    scalar::Scalar,
    swagger::Swagger,
};
use axum::{Extension, Json, response::IntoResponse};

pub fn docs_routes() -> ApiRouter {
    aide::generate::infer_responses(true);

    let router = ApiRouter::new()
        .api_route(
            "/",
            get_with(
                Scalar::new("/docs/private/api.json")
                    .with_title("FleetMe")
                    .axum_handler(),
                |op| op.description("This documentation page.").tag("docs"),
            ),
        )
        .api_route(
            "/swagger",
            get_with(
                Swagger::new("/docs/private/api.json")
                    .with_title("FleetMe")
                    .axum_handler(),
                |op| op.description("This documentation page.").tag("docs"),
            ),
        )
        .route("/private/api.json", get(serve_docs));

    aide::generate::infer_responses(false);

    router
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
    Json(api).into_response()
}
