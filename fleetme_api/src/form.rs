use axum::Form;
use fleetme_core::form::FormPayload;
use schemars::JsonSchema;
use serde::Deserialize;

/// Url-encoded form body, keeping repeated keys in submission order.
pub type FormBody = Form<Vec<(String, String)>>;

pub fn payload(Form(pairs): FormBody) -> FormPayload {
    FormPayload::from_pairs(pairs)
}

/// `{id}` path segment. Form actions take it raw so that a bad id is
/// reported as form state rather than rejected by the extractor.
#[derive(Deserialize, JsonSchema)]
pub struct IdPath<T = String> {
    pub id: T,
}
