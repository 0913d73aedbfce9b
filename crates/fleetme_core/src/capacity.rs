use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{model::VehicleType, store::FleetStore};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    #[error("The selected vehicle type is not valid.")]
    InvalidVehicleType,

    #[error(
        "The number of assigned drivers ({current}) exceeds the maximum allowed ({max}) for type \"{type_name}\"."
    )]
    Exceeded {
        current: usize,
        max: u32,
        type_name: String,
    },

    #[error("Failed to load the vehicle type: {0}")]
    Lookup(String),
}

/// The capacity rule: a vehicle of `vehicle_type` may carry at most `max_drivers` drivers.
pub fn check_capacity(
    vehicle_type: Option<&VehicleType>,
    driver_count: usize,
) -> Result<(), CapacityError> {
    let vehicle_type = vehicle_type.ok_or(CapacityError::InvalidVehicleType)?;

    if driver_count > vehicle_type.max_drivers as usize {
        return Err(CapacityError::Exceeded {
            current: driver_count,
            max: vehicle_type.max_drivers,
            type_name: vehicle_type.name.clone(),
        });
    }

    Ok(())
}

/// Resolves the vehicle type and checks the proposed assignment against it.
///
/// The check is evaluated on the final proposed set, never on a delta.
pub async fn validate_capacity<S: FleetStore>(
    store: &S,
    vehicle_type_id: Uuid,
    driver_ids: &[Uuid],
) -> Result<(), CapacityError> {
    let vehicle_type = store
        .find_vehicle_type(vehicle_type_id)
        .await
        .map_err(|error| CapacityError::Lookup(error.to_string()))?;

    debug!(
        %vehicle_type_id,
        drivers = driver_ids.len(),
        max_drivers = vehicle_type.as_ref().map(|t| t.max_drivers),
        "checking vehicle type capacity"
    );

    check_capacity(vehicle_type.as_ref(), driver_ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_capacity_boundary() {
        for max in 1..=5 {
            let van = test_utils::vehicle_type("Van", max);

            assert_eq!(check_capacity(Some(&van), max as usize), Ok(()));
            assert_eq!(
                check_capacity(Some(&van), max as usize + 1),
                Err(CapacityError::Exceeded {
                    current: max as usize + 1,
                    max,
                    type_name: String::from("Van"),
                })
            );
        }
    }

    #[test]
    fn test_missing_vehicle_type() {
        assert_eq!(
            check_capacity(None, 0),
            Err(CapacityError::InvalidVehicleType)
        );
    }

    #[test]
    fn test_exceeded_message() {
        let error = CapacityError::Exceeded {
            current: 3,
            max: 2,
            type_name: String::from("Van"),
        };

        assert_eq!(
            error.to_string(),
            "The number of assigned drivers (3) exceeds the maximum allowed (2) for type \"Van\"."
        );
    }

    #[tokio::test]
    async fn test_validate_capacity_against_store() {
        let store = test_utils::InMemoryStore::default();
        let van = store.insert_vehicle_type("Van", 2);
        let drivers = [uuid::Uuid::new_v4(), uuid::Uuid::new_v4(), uuid::Uuid::new_v4()];

        assert_eq!(validate_capacity(&store, van.id, &drivers[..2]).await, Ok(()));
        assert!(matches!(
            validate_capacity(&store, van.id, &drivers).await,
            Err(CapacityError::Exceeded { current: 3, max: 2, .. })
        ));
        assert_eq!(
            validate_capacity(&store, Uuid::new_v4(), &[]).await,
            Err(CapacityError::InvalidVehicleType)
        );
    }
}
