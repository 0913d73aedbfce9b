use fleetme_core::{search::DriverFinder, store::FleetStore};
use tracing::warn;

use crate::output::{Format, or_dash, print_json, table};

pub async fn vehicles<S: FleetStore>(
    store: &S,
    page: u32,
    per_page: u32,
    format: Format,
) -> anyhow::Result<()> {
    let per_page = per_page.max(1);
    let offset = page.max(1).saturating_sub(1).saturating_mul(per_page);
    let total = store.count_vehicles().await?;
    let vehicles = store.list_vehicles(offset, per_page).await?;

    if format == Format::Json {
        return print_json(&vehicles);
    }

    let mut table = table(&[
        "ID", "Plate", "Make", "Model", "Year", "Status", "Type", "Drivers",
    ]);
    for details in &vehicles {
        let vehicle = &details.vehicle;
        let drivers = details
            .drivers
            .iter()
            .map(|driver| driver.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let vehicle_type = details.vehicle_type.as_ref().map(|vehicle_type| {
            format!(
                "{} ({}/{})",
                vehicle_type.name,
                details.drivers.len(),
                vehicle_type.max_drivers
            )
        });

        table.add_row(vec![
            vehicle.id.to_string(),
            vehicle.license_plate.clone(),
            vehicle.make.clone(),
            vehicle.model.clone(),
            vehicle.year.to_string(),
            vehicle.status.to_string(),
            or_dash(vehicle_type.as_deref()),
            drivers,
        ]);
    }

    println!("{table}");
    println!("{} of {total} vehicle(s)", vehicles.len());
    Ok(())
}

pub async fn drivers<S: FleetStore>(store: &S, format: Format) -> anyhow::Result<()> {
    let drivers = store.list_drivers().await?;

    if format == Format::Json {
        return print_json(&drivers);
    }

    let mut table = table(&["ID", "Name", "License", "Phone", "Email", "Status"]);
    for driver in &drivers {
        table.add_row(vec![
            driver.id.to_string(),
            driver.name.clone(),
            driver.license_number.clone(),
            or_dash(driver.contact_phone.as_deref()),
            or_dash(driver.email.as_deref()),
            driver.status.to_string(),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub async fn vehicle_types<S: FleetStore>(store: &S, format: Format) -> anyhow::Result<()> {
    let vehicle_types = store.list_vehicle_types().await?;

    if format == Format::Json {
        return print_json(&vehicle_types);
    }

    let mut table = table(&["ID", "Name", "Max drivers", "Vehicles"]);
    for vehicle_type in &vehicle_types {
        let count = store.count_vehicles_of_type(vehicle_type.id).await?;
        table.add_row(vec![
            vehicle_type.id.to_string(),
            vehicle_type.name.clone(),
            vehicle_type.max_drivers.to_string(),
            count.to_string(),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub async fn search<S: FleetStore>(store: &S, query: &str, format: Format) -> anyhow::Result<()> {
    let outcome = DriverFinder::new(store).search(query).await;
    if outcome.is_unavailable() {
        warn!("driver search is unavailable, showing no results");
    }

    if format == Format::Json {
        return print_json(&outcome.candidates());
    }

    let mut table = table(&["ID", "Name", "License"]);
    for driver in outcome.candidates() {
        table.add_row(vec![
            driver.id.to_string(),
            driver.name.clone(),
            driver.license_number.clone(),
        ]);
    }

    println!("{table}");
    Ok(())
}
