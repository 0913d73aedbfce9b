use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    actions::Operation,
    assignment::{AssignmentSet, DRIVER_IDS_FIELD},
    capacity::{CapacityError, validate_capacity},
    form::{FieldErrors, FormPayload, FormState},
    store::{FleetStore, StoreError},
    validation::{VehicleInput, parse_id},
};

pub const VEHICLES_PATH: &str = "/vehicles";

/// Creates a vehicle together with its assignment set.
pub async fn add_vehicle<S: FleetStore>(store: &S, payload: &FormPayload) -> FormState {
    submit_vehicle(store, None, payload).await
}

/// Replaces a vehicle's fields and its whole assignment set.
pub async fn update_vehicle<S: FleetStore>(
    store: &S,
    raw_id: &str,
    payload: &FormPayload,
) -> FormState {
    let Some(id) = parse_id(raw_id) else {
        return FormState::failure("Error: no vehicle id was provided for the update.")
            .with_values(payload);
    };
    submit_vehicle(store, Some(id), payload).await
}

#[instrument(skip(store))]
pub async fn delete_vehicle<S: FleetStore>(store: &S, raw_id: &str) -> FormState {
    let Some(id) = parse_id(raw_id) else {
        return FormState::failure_with_toast("Error: no vehicle id was provided.");
    };

    match store.delete_vehicle(id).await {
        Ok(()) => {
            info!(vehicle_id = %id, "vehicle deleted");
            FormState::success("Vehicle deleted successfully.")
        }
        Err(error) => {
            error!(vehicle_id = %id, %error, "failed to delete vehicle");
            FormState::failure_with_toast(store_error_message(&error, Operation::Delete))
        }
    }
}

/// The vehicle write path.
///
/// Schema validation, then the capacity check, then the write. Each failing
/// stage ends the submission with a state that echoes the submitted values.
#[instrument(skip(store, payload))]
async fn submit_vehicle<S: FleetStore>(
    store: &S,
    id: Option<Uuid>,
    payload: &FormPayload,
) -> FormState {
    let (input, drivers) = match parse_submission(payload) {
        Ok(submission) => submission,
        Err(errors) => {
            warn!(?errors, "vehicle form failed validation");
            return FormState::invalid(errors).with_values(payload);
        }
    };
    let driver_ids = drivers.serialize();
    let operation = match id {
        None => Operation::Create,
        Some(_) => Operation::Update,
    };

    if let Err(error) = validate_capacity(store, input.vehicle_type_id, &driver_ids).await {
        warn!(%error, "vehicle rejected by capacity check");
        return capacity_state(error, operation).with_values(payload);
    }

    let result = match id {
        None => store.create_vehicle(&input, &driver_ids).await,
        Some(id) => store.update_vehicle(id, &input, &driver_ids).await,
    };

    match result {
        Ok(vehicle) => {
            info!(vehicle_id = %vehicle.id, drivers = driver_ids.len(), ?operation, "vehicle saved");
            let message = match operation {
                Operation::Create => "Vehicle added successfully.",
                _ => "Vehicle updated successfully.",
            };
            FormState::success(message).with_redirect(VEHICLES_PATH)
        }
        Err(StoreError::Capacity(error)) => {
            warn!(%error, "vehicle rejected by capacity check inside the write");
            capacity_state(error, operation).with_values(payload)
        }
        Err(error) => {
            error!(%error, ?operation, "failed to save vehicle");
            FormState::failure(store_error_message(&error, operation)).with_values(payload)
        }
    }
}

fn parse_submission(payload: &FormPayload) -> Result<(VehicleInput, AssignmentSet<Uuid>), FieldErrors> {
    let input = VehicleInput::from_payload(payload);
    let drivers = AssignmentSet::<Uuid>::from_payload(payload);

    match (input, drivers) {
        (Ok(input), Ok(drivers)) => Ok((input, drivers)),
        (input, drivers) => {
            let mut errors = FieldErrors::new();
            if let Err(input_errors) = input {
                errors.merge(input_errors);
            }
            if let Err(driver_errors) = drivers {
                errors.merge(driver_errors);
            }
            Err(errors)
        }
    }
}

fn capacity_state(error: CapacityError, operation: Operation) -> FormState {
    match error {
        CapacityError::InvalidVehicleType => {
            let mut state = FormState::invalid(FieldErrors::single(
                "vehicleTypeId",
                error.to_string(),
            ));
            state.message = Some(String::from(
                "Error: the selected vehicle type is not valid.",
            ));
            state
        }
        CapacityError::Exceeded { .. } => {
            let mut state = FormState::invalid(FieldErrors::single(DRIVER_IDS_FIELD, error.to_string()));
            state.message = Some(String::from("Validation failed."));
            state
        }
        CapacityError::Lookup(_) => FormState::failure(match operation {
            Operation::Update => "Error: failed to update the vehicle.",
            _ => "Error: failed to save the vehicle.",
        }),
    }
}

fn store_error_message(error: &StoreError, operation: Operation) -> String {
    match (error, operation) {
        (StoreError::UniqueViolation { .. }, Operation::Update) => {
            "Error: a vehicle with that license plate or VIN already exists for another vehicle."
                .to_owned()
        }
        (StoreError::UniqueViolation { .. }, _) => {
            "Error: a vehicle with that license plate or VIN already exists.".to_owned()
        }
        (StoreError::NotFound, Operation::Delete) => {
            "Error: the vehicle to delete was not found.".to_owned()
        }
        (StoreError::NotFound, _) => "Error: the vehicle to update was not found.".to_owned(),
        (StoreError::ForeignKeyViolation, _) => {
            "Error: a selected vehicle type or driver no longer exists.".to_owned()
        }
        (_, Operation::Create) => "Error: failed to save the vehicle.".to_owned(),
        (_, Operation::Update) => "Error: failed to update the vehicle.".to_owned(),
        (_, Operation::Delete) => "Error: failed to delete the vehicle.".to_owned(),
    }
}
