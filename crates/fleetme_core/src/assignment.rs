use uuid::Uuid;

use crate::{
    form::{FieldErrors, FormPayload},
    model::{Driver, DriverMatch, VehicleDetails},
    validation::parse_id,
};

pub const DRIVER_IDS_FIELD: &str = "driverIds";

/// Anything that identifies a driver.
pub trait DriverRef {
    fn driver_id(&self) -> Uuid;
}

impl DriverRef for Uuid {
    fn driver_id(&self) -> Uuid {
        *self
    }
}

impl DriverRef for DriverMatch {
    fn driver_id(&self) -> Uuid {
        self.id
    }
}

impl DriverRef for Driver {
    fn driver_id(&self) -> Uuid {
        self.id
    }
}

/// The drivers selected for a vehicle being created or edited.
///
/// Keyed by driver identity and kept in insertion order. Nothing is persisted
/// until the set is serialized into a submitted form.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentSet<D = DriverMatch> {
    drivers: Vec<D>,
}

impl<D> Default for AssignmentSet<D> {
    fn default() -> Self {
        AssignmentSet {
            drivers: Vec::new(),
        }
    }
}

impl<D: DriverRef> AssignmentSet<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when a driver with the same identity is already present.
    pub fn add(&mut self, driver: D) -> bool {
        if self.contains(driver.driver_id()) {
            return false;
        }
        self.drivers.push(driver);
        true
    }

    pub fn remove(&mut self, driver_id: Uuid) -> Option<D> {
        let index = self
            .drivers
            .iter()
            .position(|driver| driver.driver_id() == driver_id)?;
        Some(self.drivers.remove(index))
    }

    pub fn contains(&self, driver_id: Uuid) -> bool {
        self.drivers
            .iter()
            .any(|driver| driver.driver_id() == driver_id)
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.drivers.iter()
    }

    /// Driver identities in insertion order.
    pub fn serialize(&self) -> Vec<Uuid> {
        self.drivers.iter().map(DriverRef::driver_id).collect()
    }

    /// Replaces any `driverIds` values of `payload` with this set.
    pub fn write_to(&self, payload: &mut FormPayload) {
        payload.remove_all(DRIVER_IDS_FIELD);
        for driver_id in self.serialize() {
            payload.push(DRIVER_IDS_FIELD, driver_id.to_string());
        }
    }
}

impl<D: DriverRef> FromIterator<D> for AssignmentSet<D> {
    fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
        let mut set = AssignmentSet::new();
        for driver in iter {
            set.add(driver);
        }
        set
    }
}

impl From<&VehicleDetails> for AssignmentSet<DriverMatch> {
    fn from(vehicle: &VehicleDetails) -> Self {
        vehicle.drivers.iter().map(DriverMatch::from).collect()
    }
}

impl AssignmentSet<Uuid> {
    /// Reads the submitted `driverIds` values, collapsing repeated identities.
    pub fn from_payload(payload: &FormPayload) -> Result<Self, FieldErrors> {
        let mut set = AssignmentSet::new();
        let mut errors = FieldErrors::new();

        for raw in payload.get_all(DRIVER_IDS_FIELD) {
            match parse_id(raw) {
                Some(id) => {
                    set.add(id);
                }
                None => errors.add(DRIVER_IDS_FIELD, format!("Invalid driver reference `{raw}`.")),
            }
        }

        errors.into_result(set)
    }
}
