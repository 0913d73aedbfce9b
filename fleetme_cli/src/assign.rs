use anyhow::{Context, anyhow};
use clap::Args;
use fleetme_core::{
    actions::vehicles::update_vehicle,
    assignment::AssignmentSet,
    form::{FormPayload, FormState},
    model::{DriverMatch, Vehicle},
    store::FleetStore,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::output::{Format, print_state};

#[derive(Args)]
pub struct AssignArgs {
    /// The vehicle whose drivers are edited
    vehicle_id: Uuid,

    /// Driver to assign, may be repeated
    #[arg(short, long = "add", value_name = "DRIVER_ID")]
    add: Vec<Uuid>,

    /// Driver to unassign, may be repeated
    #[arg(short, long = "remove", value_name = "DRIVER_ID")]
    remove: Vec<Uuid>,
}

pub async fn run<S: FleetStore>(store: &S, args: AssignArgs, format: Format) -> anyhow::Result<()> {
    let state = apply(store, &args).await?;
    print_state(&state, format)
}

/// Loads the vehicle's current assignment set, applies the edits and submits
/// the whole vehicle form again.
async fn apply<S: FleetStore>(store: &S, args: &AssignArgs) -> anyhow::Result<FormState> {
    let details = store
        .find_vehicle(args.vehicle_id)
        .await?
        .ok_or_else(|| anyhow!("vehicle {} not found", args.vehicle_id))?;

    let mut assignment = AssignmentSet::from(&details);

    for driver_id in &args.remove {
        if assignment.remove(*driver_id).is_none() {
            warn!(%driver_id, "driver was not assigned to this vehicle");
        }
    }

    for driver_id in &args.add {
        let driver = store
            .find_driver(*driver_id)
            .await?
            .with_context(|| format!("driver {driver_id} not found"))?;
        if !assignment.add(DriverMatch::from(&driver)) {
            warn!(%driver_id, "driver is already assigned to this vehicle");
        }
    }

    info!(
        vehicle_id = %args.vehicle_id,
        drivers = assignment.len(),
        "submitting assignment"
    );

    let mut payload = vehicle_form(&details.vehicle);
    assignment.write_to(&mut payload);

    Ok(update_vehicle(store, &args.vehicle_id.to_string(), &payload).await)
}

fn vehicle_form(vehicle: &Vehicle) -> FormPayload {
    let mut payload = FormPayload::new()
        .with("make", &vehicle.make)
        .with("model", &vehicle.model)
        .with("year", vehicle.year.to_string())
        .with("licensePlate", &vehicle.license_plate)
        .with("vin", &vehicle.vin)
        .with("status", vehicle.status.as_str())
        .with("vehicleTypeId", vehicle.vehicle_type_id.to_string());
    if let Some(purchase_date) = vehicle.purchase_date {
        payload.push("purchaseDate", purchase_date.to_string());
    }
    payload
}
