use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    actions::Operation,
    form::{FormPayload, FormState},
    store::{FleetStore, StoreError},
    validation::{VehicleTypeInput, parse_id},
};

pub const VEHICLE_TYPES_PATH: &str = "/vehicle-types";
pub const REDIRECT_TO_FIELD: &str = "redirectTo";

/// Creates a vehicle type. A local `redirectTo` path in the form overrides
/// where the client goes next, so a type can be created from the vehicle form.
pub async fn add_vehicle_type<S: FleetStore>(store: &S, payload: &FormPayload) -> FormState {
    submit_vehicle_type(store, None, payload).await
}

pub async fn update_vehicle_type<S: FleetStore>(
    store: &S,
    raw_id: &str,
    payload: &FormPayload,
) -> FormState {
    let Some(id) = parse_id(raw_id) else {
        return FormState::failure("Error: no vehicle type id was provided for the update.")
            .with_values(payload);
    };
    submit_vehicle_type(store, Some(id), payload).await
}

/// Refuses to delete a type that vehicles still reference.
#[instrument(skip(store))]
pub async fn delete_vehicle_type<S: FleetStore>(store: &S, raw_id: &str) -> FormState {
    let Some(id) = parse_id(raw_id) else {
        return FormState::failure_with_toast("Error: no vehicle type id was provided.");
    };

    match store.count_vehicles_of_type(id).await {
        Ok(0) => {}
        Ok(count) => {
            warn!(vehicle_type_id = %id, count, "vehicle type still in use");
            return FormState::failure_with_toast(in_use_message(count));
        }
        Err(error) => {
            error!(vehicle_type_id = %id, %error, "failed to count vehicles of type");
            return FormState::failure_with_toast(store_error_message(&error, Operation::Delete));
        }
    }

    match store.delete_vehicle_type(id).await {
        Ok(()) => {
            info!(vehicle_type_id = %id, "vehicle type deleted");
            FormState::success("Vehicle type deleted successfully.")
        }
        Err(error) => {
            error!(vehicle_type_id = %id, %error, "failed to delete vehicle type");
            FormState::failure_with_toast(store_error_message(&error, Operation::Delete))
        }
    }
}

#[instrument(skip(store, payload))]
async fn submit_vehicle_type<S: FleetStore>(
    store: &S,
    id: Option<Uuid>,
    payload: &FormPayload,
) -> FormState {
    let input = match VehicleTypeInput::from_payload(payload) {
        Ok(input) => input,
        Err(errors) => {
            warn!(?errors, "vehicle type form failed validation");
            return FormState::invalid(errors).with_values(payload);
        }
    };

    let (operation, result) = match id {
        None => (Operation::Create, store.create_vehicle_type(&input).await),
        Some(id) => (
            Operation::Update,
            store.update_vehicle_type(id, &input).await,
        ),
    };

    match result {
        Ok(vehicle_type) => {
            info!(vehicle_type_id = %vehicle_type.id, max_drivers = vehicle_type.max_drivers, ?operation, "vehicle type saved");
            let message = match operation {
                Operation::Create => "Vehicle type added successfully.",
                _ => "Vehicle type updated successfully.",
            };
            FormState::success(message).with_redirect(redirect_target(payload))
        }
        Err(error) => {
            error!(%error, ?operation, "failed to save vehicle type");
            FormState::failure(store_error_message(&error, operation)).with_values(payload)
        }
    }
}

/// Only same-site paths are honoured.
fn redirect_target(payload: &FormPayload) -> String {
    payload
        .get(REDIRECT_TO_FIELD)
        .map(str::trim)
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or(VEHICLE_TYPES_PATH)
        .to_owned()
}

fn in_use_message(count: u64) -> String {
    format!("Error: cannot delete the vehicle type because it is used by {count} vehicle(s).")
}

fn store_error_message(error: &StoreError, operation: Operation) -> String {
    match (error, operation) {
        (StoreError::UniqueViolation { .. }, Operation::Update) => {
            "Error: another vehicle type already uses that name.".to_owned()
        }
        (StoreError::UniqueViolation { .. }, _) => {
            "Error: a vehicle type with that name already exists.".to_owned()
        }
        (StoreError::ForeignKeyViolation, _) => {
            "Error: cannot delete the vehicle type because vehicles still reference it.".to_owned()
        }
        (StoreError::NotFound, Operation::Delete) => {
            "Error: the vehicle type to delete was not found.".to_owned()
        }
        (StoreError::NotFound, _) => {
            "Error: the vehicle type to update was not found.".to_owned()
        }
        (_, Operation::Create) => "Error: failed to add the vehicle type.".to_owned(),
        (_, Operation::Update) => "Error: failed to update the vehicle type.".to_owned(),
        (_, Operation::Delete) => "Error: failed to delete the vehicle type.".to_owned(),
    }
}
