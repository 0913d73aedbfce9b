use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use jiff::Timestamp;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::{
    capacity::check_capacity,
    form::FormPayload,
    model::{Driver, DriverMatch, DriverStatus, Vehicle, VehicleDetails, VehicleType},
    store::{FleetStore, StoreError},
    validation::{DriverInput, VehicleInput, VehicleTypeInput},
};

pub fn vehicle_type(name: &str, max_drivers: u32) -> VehicleType {
    let now = Timestamp::now();
    VehicleType {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        max_drivers,
        created_at: now,
        updated_at: now,
    }
}

pub fn driver(name: &str, license_number: &str, status: DriverStatus) -> Driver {
    let now = Timestamp::now();
    Driver {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        license_number: license_number.to_owned(),
        contact_phone: None,
        email: None,
        status,
        created_at: now,
        updated_at: now,
    }
}

pub fn vehicle_payload(plate: &str, vehicle_type_id: Uuid, driver_ids: &[Uuid]) -> FormPayload {
    let mut payload = FormPayload::new()
        .with("make", "Ford")
        .with("model", "Transit")
        .with("year", "2021")
        .with("licensePlate", plate)
        .with("vin", format!("VIN-{plate}"))
        .with("status", "active")
        .with("vehicleTypeId", vehicle_type_id.to_string());
    for driver_id in driver_ids {
        payload.push("driverIds", driver_id.to_string());
    }
    payload
}

#[derive(Default)]
struct State {
    drivers: Vec<Driver>,
    vehicle_types: Vec<VehicleType>,
    vehicles: Vec<Vehicle>,
    assignments: Vec<(Uuid, Uuid)>,
}

impl State {
    fn details(&self, vehicle: &Vehicle) -> VehicleDetails {
        let mut drivers: Vec<Driver> = self
            .assignments
            .iter()
            .filter(|(vehicle_id, _)| *vehicle_id == vehicle.id)
            .filter_map(|(_, driver_id)| self.drivers.iter().find(|d| d.id == *driver_id))
            .cloned()
            .collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name));

        VehicleDetails {
            vehicle: vehicle.clone(),
            vehicle_type: self
                .vehicle_types
                .iter()
                .find(|t| t.id == vehicle.vehicle_type_id)
                .cloned(),
            drivers,
        }
    }

    fn check_vehicle_write(
        &self,
        id: Option<Uuid>,
        input: &VehicleInput,
        driver_ids: &[Uuid],
    ) -> Result<(), StoreError> {
        let clash = self.vehicles.iter().any(|v| {
            Some(v.id) != id && (v.license_plate == input.license_plate || v.vin == input.vin)
        });
        if clash {
            return Err(StoreError::UniqueViolation {
                fields: vec![String::from("license_plate"), String::from("vin")],
            });
        }

        let vehicle_type = self
            .vehicle_types
            .iter()
            .find(|t| t.id == input.vehicle_type_id);
        if vehicle_type.is_none() {
            return Err(StoreError::ForeignKeyViolation);
        }
        if driver_ids
            .iter()
            .any(|driver_id| !self.drivers.iter().any(|d| d.id == *driver_id))
        {
            return Err(StoreError::ForeignKeyViolation);
        }

        check_capacity(vehicle_type, driver_ids.len())?;
        Ok(())
    }

    fn replace_assignments(&mut self, vehicle_id: Uuid, driver_ids: &[Uuid]) {
        self.assignments.retain(|(v, _)| *v != vehicle_id);
        self.assignments
            .extend(driver_ids.iter().map(|driver_id| (vehicle_id, *driver_id)));
    }
}

/// `FleetStore` backed by vectors, with knobs to simulate slow or failing search.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    search_calls: AtomicUsize,
    fail_search: AtomicBool,
    fail_writes: AtomicBool,
    search_delay: Mutex<Duration>,
}

impl InMemoryStore {
    pub fn insert_vehicle_type(&self, name: &str, max_drivers: u32) -> VehicleType {
        let vehicle_type = vehicle_type(name, max_drivers);
        self.state.lock().vehicle_types.push(vehicle_type.clone());
        vehicle_type
    }

    pub fn insert_driver(&self, name: &str, license_number: &str, status: DriverStatus) -> Driver {
        let driver = driver(name, license_number, status);
        self.state.lock().drivers.push(driver.clone());
        driver
    }

    /// Changes a type's capacity behind the back of any pending check.
    pub fn set_max_drivers(&self, id: Uuid, max_drivers: u32) {
        if let Some(vehicle_type) = self
            .state
            .lock()
            .vehicle_types
            .iter_mut()
            .find(|t| t.id == id)
        {
            vehicle_type.max_drivers = max_drivers;
        }
    }

    pub fn assigned_driver_ids(&self, vehicle_id: Uuid) -> Vec<Uuid> {
        self.state
            .lock()
            .assignments
            .iter()
            .filter(|(v, _)| *v == vehicle_id)
            .map(|(_, d)| *d)
            .collect()
    }

    pub fn vehicle_ids(&self) -> Vec<Uuid> {
        self.state.lock().vehicles.iter().map(|v| v.id).collect()
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn fail_search(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_search_delay(&self, delay: Duration) {
        *self.search_delay.lock() = delay;
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(String::from("disk I/O error")));
        }
        Ok(())
    }
}

impl FleetStore for InMemoryStore {
    async fn list_drivers(&self) -> Result<Vec<Driver>, StoreError> {
        let mut drivers = self.state.lock().drivers.clone();
        drivers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(drivers)
    }

    async fn find_driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError> {
        Ok(self.state.lock().drivers.iter().find(|d| d.id == id).cloned())
    }

    async fn create_driver(&self, input: &DriverInput) -> Result<Driver, StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock();
        if state
            .drivers
            .iter()
            .any(|d| d.license_number == input.license_number)
        {
            return Err(StoreError::UniqueViolation {
                fields: vec![String::from("license_number")],
            });
        }
        let mut driver = driver(&input.name, &input.license_number, input.status);
        driver.contact_phone = input.contact_phone.clone();
        driver.email = input.email.clone();
        state.drivers.push(driver.clone());
        Ok(driver)
    }

    async fn update_driver(&self, id: Uuid, input: &DriverInput) -> Result<Driver, StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock();
        if state
            .drivers
            .iter()
            .any(|d| d.id != id && d.license_number == input.license_number)
        {
            return Err(StoreError::UniqueViolation {
                fields: vec![String::from("license_number")],
            });
        }
        let driver = state
            .drivers
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StoreError::NotFound)?;
        driver.name = input.name.clone();
        driver.license_number = input.license_number.clone();
        driver.contact_phone = input.contact_phone.clone();
        driver.email = input.email.clone();
        driver.status = input.status;
        driver.updated_at = Timestamp::now();
        Ok(driver.clone())
    }

    async fn delete_driver(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock();
        let before = state.drivers.len();
        state.drivers.retain(|d| d.id != id);
        if state.drivers.len() == before {
            return Err(StoreError::NotFound);
        }
        state.assignments.retain(|(_, driver_id)| *driver_id != id);
        Ok(())
    }

    async fn search_active_drivers(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<DriverMatch>, StoreError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.search_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(StoreError::Database(String::from("database is locked")));
        }

        let needle = query.to_ascii_lowercase();
        Ok(self
            .state
            .lock()
            .drivers
            .iter()
            .filter(|d| d.status == DriverStatus::Active)
            .filter(|d| {
                d.name.to_ascii_lowercase().contains(&needle)
                    || d.license_number.to_ascii_lowercase().contains(&needle)
            })
            .take(limit)
            .map(DriverMatch::from)
            .collect())
    }

    async fn list_vehicle_types(&self) -> Result<Vec<VehicleType>, StoreError> {
        let mut vehicle_types = self.state.lock().vehicle_types.clone();
        vehicle_types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(vehicle_types)
    }

    async fn find_vehicle_type(&self, id: Uuid) -> Result<Option<VehicleType>, StoreError> {
        Ok(self
            .state
            .lock()
            .vehicle_types
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn create_vehicle_type(
        &self,
        input: &VehicleTypeInput,
    ) -> Result<VehicleType, StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock();
        if state.vehicle_types.iter().any(|t| t.name == input.name) {
            return Err(StoreError::UniqueViolation {
                fields: vec![String::from("name")],
            });
        }
        let vehicle_type = vehicle_type(&input.name, input.max_drivers);
        state.vehicle_types.push(vehicle_type.clone());
        Ok(vehicle_type)
    }

    async fn update_vehicle_type(
        &self,
        id: Uuid,
        input: &VehicleTypeInput,
    ) -> Result<VehicleType, StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock();
        if state
            .vehicle_types
            .iter()
            .any(|t| t.id != id && t.name == input.name)
        {
            return Err(StoreError::UniqueViolation {
                fields: vec![String::from("name")],
            });
        }
        let vehicle_type = state
            .vehicle_types
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound)?;
        vehicle_type.name = input.name.clone();
        vehicle_type.max_drivers = input.max_drivers;
        vehicle_type.updated_at = Timestamp::now();
        Ok(vehicle_type.clone())
    }

    async fn delete_vehicle_type(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock();
        if state.vehicles.iter().any(|v| v.vehicle_type_id == id) {
            return Err(StoreError::ForeignKeyViolation);
        }
        let before = state.vehicle_types.len();
        state.vehicle_types.retain(|t| t.id != id);
        if state.vehicle_types.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_vehicles_of_type(&self, id: Uuid) -> Result<u64, StoreError> {
        Ok(self
            .state
            .lock()
            .vehicles
            .iter()
            .filter(|v| v.vehicle_type_id == id)
            .count() as u64)
    }

    async fn list_vehicles(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<VehicleDetails>, StoreError> {
        let state = self.state.lock();
        Ok(state
            .vehicles
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|vehicle| state.details(vehicle))
            .collect())
    }

    async fn count_vehicles(&self) -> Result<u64, StoreError> {
        Ok(self.state.lock().vehicles.len() as u64)
    }

    async fn find_vehicle(&self, id: Uuid) -> Result<Option<VehicleDetails>, StoreError> {
        let state = self.state.lock();
        Ok(state
            .vehicles
            .iter()
            .find(|v| v.id == id)
            .map(|vehicle| state.details(vehicle)))
    }

    async fn create_vehicle(
        &self,
        input: &VehicleInput,
        driver_ids: &[Uuid],
    ) -> Result<Vehicle, StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock();
        state.check_vehicle_write(None, input, driver_ids)?;

        let now = Timestamp::now();
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            make: input.make.clone(),
            model: input.model.clone(),
            year: input.year,
            license_plate: input.license_plate.clone(),
            vin: input.vin.clone(),
            purchase_date: input.purchase_date,
            status: input.status,
            vehicle_type_id: input.vehicle_type_id,
            created_at: now,
            updated_at: now,
        };
        state.vehicles.push(vehicle.clone());
        state.replace_assignments(vehicle.id, driver_ids);
        Ok(vehicle)
    }

    async fn update_vehicle(
        &self,
        id: Uuid,
        input: &VehicleInput,
        driver_ids: &[Uuid],
    ) -> Result<Vehicle, StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock();
        if !state.vehicles.iter().any(|v| v.id == id) {
            return Err(StoreError::NotFound);
        }
        state.check_vehicle_write(Some(id), input, driver_ids)?;

        let vehicle = state
            .vehicles
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(StoreError::NotFound)?;
        vehicle.make = input.make.clone();
        vehicle.model = input.model.clone();
        vehicle.year = input.year;
        vehicle.license_plate = input.license_plate.clone();
        vehicle.vin = input.vin.clone();
        vehicle.purchase_date = input.purchase_date;
        vehicle.status = input.status;
        vehicle.vehicle_type_id = input.vehicle_type_id;
        vehicle.updated_at = Timestamp::now();
        let vehicle = vehicle.clone();

        state.replace_assignments(id, driver_ids);
        Ok(vehicle)
    }

    async fn delete_vehicle(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock();
        let before = state.vehicles.len();
        state.vehicles.retain(|v| v.id != id);
        if state.vehicles.len() == before {
            return Err(StoreError::NotFound);
        }
        state.assignments.retain(|(vehicle_id, _)| *vehicle_id != id);
        Ok(())
    }
}
