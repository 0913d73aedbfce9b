use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    capacity::CapacityError,
    model::{Driver, DriverMatch, Vehicle, VehicleDetails, VehicleType},
    validation::{DriverInput, VehicleInput, VehicleTypeInput},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("unique constraint failed on {}", .fields.join(", "))]
    UniqueViolation { fields: Vec<String> },

    #[error("record not found")]
    NotFound,

    #[error("foreign key constraint failed")]
    ForeignKeyViolation,

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error("database error: {0}")]
    Database(String),
}

/// Relational storage for drivers, vehicle types and vehicles.
///
/// Vehicle writes replace the whole assignment set and must re-check the
/// vehicle type capacity in the same transaction as the write.
pub trait FleetStore: Send + Sync {
    fn list_drivers(&self) -> impl Future<Output = Result<Vec<Driver>, StoreError>> + Send;

    fn find_driver(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Driver>, StoreError>> + Send;

    fn create_driver(
        &self,
        input: &DriverInput,
    ) -> impl Future<Output = Result<Driver, StoreError>> + Send;

    fn update_driver(
        &self,
        id: Uuid,
        input: &DriverInput,
    ) -> impl Future<Output = Result<Driver, StoreError>> + Send;

    fn delete_driver(&self, id: Uuid) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Active drivers whose name or license number contains `query`, at most `limit`.
    fn search_active_drivers(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<DriverMatch>, StoreError>> + Send;

    fn list_vehicle_types(
        &self,
    ) -> impl Future<Output = Result<Vec<VehicleType>, StoreError>> + Send;

    fn find_vehicle_type(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<VehicleType>, StoreError>> + Send;

    fn create_vehicle_type(
        &self,
        input: &VehicleTypeInput,
    ) -> impl Future<Output = Result<VehicleType, StoreError>> + Send;

    fn update_vehicle_type(
        &self,
        id: Uuid,
        input: &VehicleTypeInput,
    ) -> impl Future<Output = Result<VehicleType, StoreError>> + Send;

    fn delete_vehicle_type(&self, id: Uuid)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    fn count_vehicles_of_type(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Vehicles newest first.
    fn list_vehicles(
        &self,
        offset: u32,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<VehicleDetails>, StoreError>> + Send;

    fn count_vehicles(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn find_vehicle(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<VehicleDetails>, StoreError>> + Send;

    fn create_vehicle(
        &self,
        input: &VehicleInput,
        driver_ids: &[Uuid],
    ) -> impl Future<Output = Result<Vehicle, StoreError>> + Send;

    fn update_vehicle(
        &self,
        id: Uuid,
        input: &VehicleInput,
        driver_ids: &[Uuid],
    ) -> impl Future<Output = Result<Vehicle, StoreError>> + Send;

    fn delete_vehicle(&self, id: Uuid) -> impl Future<Output = Result<(), StoreError>> + Send;
}
