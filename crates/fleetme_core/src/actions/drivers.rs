use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    actions::Operation,
    form::{FormPayload, FormState},
    store::{FleetStore, StoreError},
    validation::{DriverInput, parse_id},
};

pub const DRIVERS_PATH: &str = "/drivers";

pub async fn add_driver<S: FleetStore>(store: &S, payload: &FormPayload) -> FormState {
    submit_driver(store, None, payload).await
}

pub async fn update_driver<S: FleetStore>(
    store: &S,
    raw_id: &str,
    payload: &FormPayload,
) -> FormState {
    let Some(id) = parse_id(raw_id) else {
        return FormState::failure("Error: no driver id was provided for the update.")
            .with_values(payload);
    };
    submit_driver(store, Some(id), payload).await
}

/// Deleting a driver also removes it from every vehicle it was assigned to.
#[instrument(skip(store))]
pub async fn delete_driver<S: FleetStore>(store: &S, raw_id: &str) -> FormState {
    let Some(id) = parse_id(raw_id) else {
        return FormState::failure_with_toast("Error: no driver id was provided.");
    };

    match store.delete_driver(id).await {
        Ok(()) => {
            info!(driver_id = %id, "driver deleted");
            FormState::success("Driver deleted successfully.")
        }
        Err(error) => {
            error!(driver_id = %id, %error, "failed to delete driver");
            FormState::failure_with_toast(store_error_message(&error, Operation::Delete))
        }
    }
}

#[instrument(skip(store, payload))]
async fn submit_driver<S: FleetStore>(
    store: &S,
    id: Option<Uuid>,
    payload: &FormPayload,
) -> FormState {
    let input = match DriverInput::from_payload(payload) {
        Ok(input) => input,
        Err(errors) => {
            warn!(?errors, "driver form failed validation");
            return FormState::invalid(errors).with_values(payload);
        }
    };

    let (operation, result) = match id {
        None => (Operation::Create, store.create_driver(&input).await),
        Some(id) => (Operation::Update, store.update_driver(id, &input).await),
    };

    match result {
        Ok(driver) => {
            info!(driver_id = %driver.id, ?operation, "driver saved");
            let message = match operation {
                Operation::Create => "Driver added successfully.",
                _ => "Driver updated successfully.",
            };
            FormState::success(message).with_redirect(DRIVERS_PATH)
        }
        Err(error) => {
            error!(%error, ?operation, "failed to save driver");
            FormState::failure(store_error_message(&error, operation)).with_values(payload)
        }
    }
}

fn store_error_message(error: &StoreError, operation: Operation) -> String {
    match (error, operation) {
        (StoreError::UniqueViolation { fields }, _) => {
            let fields = if fields.is_empty() {
                String::from("value")
            } else {
                fields.join(", ")
            };
            format!("Error: the provided {fields} already exists.")
        }
        (StoreError::NotFound, Operation::Delete) => {
            "Error: the driver to delete was not found.".to_owned()
        }
        (StoreError::NotFound, _) => "Error: the driver to update was not found.".to_owned(),
        (_, Operation::Create) => "Error: failed to add the driver.".to_owned(),
        (_, Operation::Update) => "Error: failed to update the driver.".to_owned(),
        (_, Operation::Delete) => "Error: failed to delete the driver.".to_owned(),
    }
}
