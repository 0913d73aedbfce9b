use jiff::{Timestamp, civil::Date};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown status `{0}`")]
pub struct UnknownStatus(pub String);

/// Declares a status enum with its wire representation, `FromStr` and `Display`.
macro_rules! define_status {
    ($name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        #[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($value => Ok($name::$variant),)+
                    other => Err(UnknownStatus(other.to_owned())),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status!(DriverStatus {
    Active => "active",
    OnLeave => "on_leave",
    Inactive => "inactive",
});

define_status!(VehicleStatus {
    Active => "active",
    Maintenance => "maintenance",
    Sold => "sold",
    Inactive => "inactive",
});

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub license_number: String,
    pub contact_phone: Option<String>,
    pub email: Option<String>,
    pub status: DriverStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The projection of a driver returned by the search path.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriverMatch {
    pub id: Uuid,
    pub name: String,
    pub license_number: String,
}

impl From<&Driver> for DriverMatch {
    fn from(driver: &Driver) -> Self {
        DriverMatch {
            id: driver.id,
            name: driver.name.clone(),
            license_number: driver.license_number.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleType {
    pub id: Uuid,
    pub name: String,
    /// Maximum number of drivers a vehicle of this type may have assigned.
    pub max_drivers: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub vin: String,
    pub purchase_date: Option<Date>,
    pub status: VehicleStatus,
    pub vehicle_type_id: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A vehicle together with its type and assigned drivers, drivers ordered by name.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetails {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub vehicle_type: Option<VehicleType>,
    pub drivers: Vec<Driver>,
}

impl VehicleDetails {
    pub fn driver_ids(&self) -> Vec<Uuid> {
        self.drivers.iter().map(|driver| driver.id).collect()
    }
}
