//! SQLite implementation of [`FleetStore`].

mod error;
mod rows;

use std::str::FromStr;

use fleetme_core::{
    capacity::check_capacity,
    model::{Driver, DriverMatch, DriverStatus, Vehicle, VehicleDetails, VehicleType},
    store::{FleetStore, StoreError},
    validation::{DriverInput, VehicleInput, VehicleTypeInput},
};
use jiff::Timestamp;
use sqlx::{
    SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    error::map_sqlx_error,
    rows::{
        DRIVER_COLUMNS, DriverMatchRow, DriverRow, VEHICLE_COLUMNS, VEHICLE_TYPE_COLUMNS,
        VehicleRow, VehicleTypeRow, to_micros,
    },
};

#[derive(Clone)]
pub struct SqliteFleetStore {
    pool: SqlitePool,
}

impl SqliteFleetStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool on `url` with foreign key enforcement turned on.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(map_sqlx_error)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        info!(url, max_connections, "connected to database");
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|error| StoreError::Database(error.to_string()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Writes a vehicle and its whole assignment set in one transaction.
    ///
    /// Capacity is checked again against the vehicle type as read inside the
    /// transaction, so a concurrent change of `max_drivers` cannot slip an
    /// over-capacity set through.
    async fn write_vehicle(
        &self,
        id: Option<Uuid>,
        input: &VehicleInput,
        driver_ids: &[Uuid],
    ) -> Result<Vehicle, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let existing = match id {
            Some(id) => Some(
                fetch_vehicle(&mut *tx, id)
                    .await?
                    .ok_or(StoreError::NotFound)?,
            ),
            None => None,
        };

        let vehicle_type = fetch_vehicle_type(&mut *tx, input.vehicle_type_id).await?;
        check_capacity(vehicle_type.as_ref(), driver_ids.len())?;

        let now = Timestamp::now();
        let (id, created_at) = existing
            .map(|vehicle| (vehicle.id, vehicle.created_at))
            .unwrap_or_else(|| (Uuid::new_v4(), now));

        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            "INSERT INTO vehicles ({VEHICLE_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                make = excluded.make,
                model = excluded.model,
                year = excluded.year,
                license_plate = excluded.license_plate,
                vin = excluded.vin,
                purchase_date = excluded.purchase_date,
                status = excluded.status,
                vehicle_type_id = excluded.vehicle_type_id,
                updated_at = excluded.updated_at
             RETURNING {VEHICLE_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.make)
        .bind(&input.model)
        .bind(i64::from(input.year))
        .bind(&input.license_plate)
        .bind(&input.vin)
        .bind(input.purchase_date.map(|date| date.to_string()))
        .bind(input.status.as_str())
        .bind(input.vehicle_type_id)
        .bind(to_micros(created_at))
        .bind(to_micros(now))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM vehicle_drivers WHERE vehicle_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        for driver_id in driver_ids {
            sqlx::query("INSERT INTO vehicle_drivers (vehicle_id, driver_id) VALUES (?, ?)")
                .bind(id)
                .bind(driver_id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(vehicle_id = %id, drivers = driver_ids.len(), "vehicle written");

        Vehicle::try_from(row)
    }
}

async fn fetch_vehicle_type(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<Option<VehicleType>, StoreError> {
    sqlx::query_as::<_, VehicleTypeRow>(&format!(
        "SELECT {VEHICLE_TYPE_COLUMNS} FROM vehicle_types WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(map_sqlx_error)?
    .map(VehicleType::try_from)
    .transpose()
}

async fn fetch_vehicle(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Vehicle>, StoreError> {
    sqlx::query_as::<_, VehicleRow>(&format!(
        "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(map_sqlx_error)?
    .map(Vehicle::try_from)
    .transpose()
}

async fn load_details(
    conn: &mut SqliteConnection,
    vehicle: Vehicle,
) -> Result<VehicleDetails, StoreError> {
    let vehicle_type = fetch_vehicle_type(conn, vehicle.vehicle_type_id).await?;

    let drivers = sqlx::query_as::<_, DriverRow>(&format!(
        "SELECT {} FROM drivers d
         JOIN vehicle_drivers vd ON vd.driver_id = d.id
         WHERE vd.vehicle_id = ?
         ORDER BY d.name, d.license_number",
        qualified(DRIVER_COLUMNS, "d")
    ))
    .bind(vehicle.id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(Driver::try_from)
    .collect::<Result<Vec<_>, _>>()?;

    Ok(VehicleDetails {
        vehicle,
        vehicle_type,
        drivers,
    })
}

fn qualified(columns: &str, alias: &str) -> String {
    columns
        .split(", ")
        .map(|column| format!("{alias}.{column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escapes LIKE wildcards so the query matches literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl FleetStore for SqliteFleetStore {
    async fn list_drivers(&self) -> Result<Vec<Driver>, StoreError> {
        sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY name, license_number"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .into_iter()
        .map(Driver::try_from)
        .collect()
    }

    async fn find_driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError> {
        sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .map(Driver::try_from)
        .transpose()
    }

    #[instrument(skip(self, input), fields(license_number = %input.license_number))]
    async fn create_driver(&self, input: &DriverInput) -> Result<Driver, StoreError> {
        let now = to_micros(Timestamp::now());
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "INSERT INTO drivers ({DRIVER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {DRIVER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.license_number)
        .bind(&input.contact_phone)
        .bind(&input.email)
        .bind(input.status.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Driver::try_from(row)
    }

    #[instrument(skip(self, input))]
    async fn update_driver(&self, id: Uuid, input: &DriverInput) -> Result<Driver, StoreError> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "UPDATE drivers
             SET name = ?, license_number = ?, contact_phone = ?, email = ?, status = ?, updated_at = ?
             WHERE id = ?
             RETURNING {DRIVER_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.license_number)
        .bind(&input.contact_phone)
        .bind(&input.email)
        .bind(input.status.as_str())
        .bind(to_micros(Timestamp::now()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(StoreError::NotFound)?;

        Driver::try_from(row)
    }

    async fn delete_driver(&self, id: Uuid) -> Result<(), StoreError> {
        // Assignments go with the driver through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM drivers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn search_active_drivers(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<DriverMatch>, StoreError> {
        let pattern = like_pattern(query);
        let rows = sqlx::query_as::<_, DriverMatchRow>(
            "SELECT id, name, license_number FROM drivers
             WHERE status = ?1
               AND (name LIKE ?2 ESCAPE '\\' OR license_number LIKE ?2 ESCAPE '\\')
             ORDER BY name, license_number
             LIMIT ?3",
        )
        .bind(DriverStatus::Active.as_str())
        .bind(&pattern)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(DriverMatch::from).collect())
    }

    async fn list_vehicle_types(&self) -> Result<Vec<VehicleType>, StoreError> {
        sqlx::query_as::<_, VehicleTypeRow>(&format!(
            "SELECT {VEHICLE_TYPE_COLUMNS} FROM vehicle_types ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .into_iter()
        .map(VehicleType::try_from)
        .collect()
    }

    async fn find_vehicle_type(&self, id: Uuid) -> Result<Option<VehicleType>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        fetch_vehicle_type(&mut conn, id).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_vehicle_type(
        &self,
        input: &VehicleTypeInput,
    ) -> Result<VehicleType, StoreError> {
        let now = to_micros(Timestamp::now());
        let row = sqlx::query_as::<_, VehicleTypeRow>(&format!(
            "INSERT INTO vehicle_types ({VEHICLE_TYPE_COLUMNS}) VALUES (?, ?, ?, ?, ?)
             RETURNING {VEHICLE_TYPE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(i64::from(input.max_drivers))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        VehicleType::try_from(row)
    }

    #[instrument(skip(self, input))]
    async fn update_vehicle_type(
        &self,
        id: Uuid,
        input: &VehicleTypeInput,
    ) -> Result<VehicleType, StoreError> {
        let row = sqlx::query_as::<_, VehicleTypeRow>(&format!(
            "UPDATE vehicle_types SET name = ?, max_drivers = ?, updated_at = ?
             WHERE id = ?
             RETURNING {VEHICLE_TYPE_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(i64::from(input.max_drivers))
        .bind(to_micros(Timestamp::now()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(StoreError::NotFound)?;

        VehicleType::try_from(row)
    }

    async fn delete_vehicle_type(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM vehicle_types WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_vehicles_of_type(&self, id: Uuid) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vehicles WHERE vehicle_type_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.unsigned_abs())
    }

    async fn list_vehicles(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<VehicleDetails>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;

        let rows = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles
             ORDER BY created_at DESC, rowid DESC
             LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

        let mut vehicles = Vec::with_capacity(rows.len());
        for row in rows {
            let vehicle = Vehicle::try_from(row)?;
            vehicles.push(load_details(&mut conn, vehicle).await?);
        }
        Ok(vehicles)
    }

    async fn count_vehicles(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vehicles")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.unsigned_abs())
    }

    async fn find_vehicle(&self, id: Uuid) -> Result<Option<VehicleDetails>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        match fetch_vehicle(&mut conn, id).await? {
            Some(vehicle) => Ok(Some(load_details(&mut conn, vehicle).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, input, driver_ids), fields(license_plate = %input.license_plate))]
    async fn create_vehicle(
        &self,
        input: &VehicleInput,
        driver_ids: &[Uuid],
    ) -> Result<Vehicle, StoreError> {
        self.write_vehicle(None, input, driver_ids).await
    }

    #[instrument(skip(self, input, driver_ids))]
    async fn update_vehicle(
        &self,
        id: Uuid,
        input: &VehicleInput,
        driver_ids: &[Uuid],
    ) -> Result<Vehicle, StoreError> {
        self.write_vehicle(Some(id), input, driver_ids).await
    }

    async fn delete_vehicle(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
