use fleetme_core::{
    model::{Driver, DriverMatch, Vehicle, VehicleType},
    store::StoreError,
};
use jiff::{Timestamp, civil::Date};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::corrupt;

pub(crate) const DRIVER_COLUMNS: &str =
    "id, name, license_number, contact_phone, email, status, created_at, updated_at";
pub(crate) const VEHICLE_TYPE_COLUMNS: &str = "id, name, max_drivers, created_at, updated_at";
pub(crate) const VEHICLE_COLUMNS: &str = "id, make, model, year, license_plate, vin, purchase_date, status, vehicle_type_id, created_at, updated_at";

// Timestamps are stored as microseconds since the Unix epoch.
pub(crate) fn to_micros(timestamp: Timestamp) -> i64 {
    timestamp.as_microsecond()
}

fn from_micros(micros: i64) -> Result<Timestamp, StoreError> {
    Timestamp::from_microsecond(micros).map_err(|error| corrupt("timestamp", error))
}

#[derive(FromRow)]
pub(crate) struct DriverRow {
    id: Uuid,
    name: String,
    license_number: String,
    contact_phone: Option<String>,
    email: Option<String>,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<DriverRow> for Driver {
    type Error = StoreError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        Ok(Driver {
            id: row.id,
            name: row.name,
            license_number: row.license_number,
            contact_phone: row.contact_phone,
            email: row.email,
            status: row
                .status
                .parse()
                .map_err(|error| corrupt("driver status", error))?,
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct DriverMatchRow {
    id: Uuid,
    name: String,
    license_number: String,
}

impl From<DriverMatchRow> for DriverMatch {
    fn from(row: DriverMatchRow) -> Self {
        DriverMatch {
            id: row.id,
            name: row.name,
            license_number: row.license_number,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct VehicleTypeRow {
    id: Uuid,
    name: String,
    max_drivers: i64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<VehicleTypeRow> for VehicleType {
    type Error = StoreError;

    fn try_from(row: VehicleTypeRow) -> Result<Self, Self::Error> {
        Ok(VehicleType {
            id: row.id,
            name: row.name,
            max_drivers: u32::try_from(row.max_drivers)
                .map_err(|error| corrupt("max_drivers", error))?,
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct VehicleRow {
    id: Uuid,
    make: String,
    model: String,
    year: i64,
    license_plate: String,
    vin: String,
    purchase_date: Option<String>,
    status: String,
    vehicle_type_id: Uuid,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = StoreError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let purchase_date = row
            .purchase_date
            .map(|date| date.parse::<Date>())
            .transpose()
            .map_err(|error| corrupt("purchase date", error))?;

        Ok(Vehicle {
            id: row.id,
            make: row.make,
            model: row.model,
            year: i32::try_from(row.year).map_err(|error| corrupt("year", error))?,
            license_plate: row.license_plate,
            vin: row.vin,
            purchase_date,
            status: row
                .status
                .parse()
                .map_err(|error| corrupt("vehicle status", error))?,
            vehicle_type_id: row.vehicle_type_id,
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
        })
    }
}
