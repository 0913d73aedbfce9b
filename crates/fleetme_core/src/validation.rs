//! Schema validation of submitted forms.
//!
//! String shape rules are declared with `validator`; numbers, dates, statuses
//! and identifiers are coerced from their string form afterwards. Both passes
//! always run so that every invalid field is reported at once.

use jiff::{Zoned, civil::Date};
use uuid::Uuid;
use validator::Validate;

use crate::{
    form::{FieldErrors, FormPayload},
    model::{DriverStatus, VehicleStatus},
};

pub const MIN_VEHICLE_YEAR: i32 = 1900;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInput {
    pub name: String,
    pub license_number: String,
    pub contact_phone: Option<String>,
    pub email: Option<String>,
    pub status: DriverStatus,
}

#[derive(Validate)]
struct DriverFields {
    #[validate(length(min = 1, message = "Name is required."))]
    name: String,
    #[validate(length(min = 1, message = "License number is required."))]
    license_number: String,
    #[validate(email(message = "Invalid email."))]
    email: Option<String>,
}

impl DriverInput {
    pub fn from_payload(payload: &FormPayload) -> Result<Self, FieldErrors> {
        let fields = DriverFields {
            name: text(payload, "name"),
            license_number: text(payload, "licenseNumber"),
            email: optional_text(payload, "email"),
        };

        let mut errors = FieldErrors::new();
        if let Err(validation_errors) = fields.validate() {
            errors.extend_from_validator(&validation_errors);
        }

        let status = parse_status::<DriverStatus>(payload, &mut errors);

        match status {
            Some(status) if errors.is_empty() => Ok(DriverInput {
                name: fields.name,
                license_number: fields.license_number,
                contact_phone: optional_text(payload, "contactPhone"),
                email: fields.email,
                status,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleTypeInput {
    pub name: String,
    pub max_drivers: u32,
}

#[derive(Validate)]
struct VehicleTypeFields {
    #[validate(length(min = 1, message = "Name is required."))]
    name: String,
}

impl VehicleTypeInput {
    pub fn from_payload(payload: &FormPayload) -> Result<Self, FieldErrors> {
        let fields = VehicleTypeFields {
            name: text(payload, "name"),
        };

        let mut errors = FieldErrors::new();
        if let Err(validation_errors) = fields.validate() {
            errors.extend_from_validator(&validation_errors);
        }

        let max_drivers = match optional_text(payload, "maxDrivers") {
            None => Some(1),
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(value) if value >= 1 => u32::try_from(value).ok().or_else(|| {
                    errors.add("maxDrivers", "Must be a whole number.");
                    None
                }),
                Ok(_) => {
                    errors.add("maxDrivers", "Must be at least 1.");
                    None
                }
                Err(_) => {
                    errors.add("maxDrivers", "Must be a whole number.");
                    None
                }
            },
        };

        match max_drivers {
            Some(max_drivers) if errors.is_empty() => Ok(VehicleTypeInput {
                name: fields.name,
                max_drivers,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleInput {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub vin: String,
    pub purchase_date: Option<Date>,
    pub status: VehicleStatus,
    pub vehicle_type_id: Uuid,
}

#[derive(Validate)]
struct VehicleFields {
    #[validate(length(min = 1, message = "Make is required."))]
    make: String,
    #[validate(length(min = 1, message = "Model is required."))]
    model: String,
    #[validate(length(min = 1, message = "License plate is required."))]
    license_plate: String,
    #[validate(length(min = 1, message = "VIN is required."))]
    vin: String,
    #[validate(length(min = 1, message = "Vehicle type is required."))]
    vehicle_type_id: String,
}

impl VehicleInput {
    /// Validates every vehicle field except the assignment set.
    pub fn from_payload(payload: &FormPayload) -> Result<Self, FieldErrors> {
        let fields = VehicleFields {
            make: text(payload, "make"),
            model: text(payload, "model"),
            license_plate: text(payload, "licensePlate"),
            vin: text(payload, "vin"),
            vehicle_type_id: text(payload, "vehicleTypeId"),
        };

        let mut errors = FieldErrors::new();
        if let Err(validation_errors) = fields.validate() {
            errors.extend_from_validator(&validation_errors);
        }

        let year = parse_year(payload, &mut errors);
        let status = parse_status::<VehicleStatus>(payload, &mut errors);

        let purchase_date = match optional_text(payload, "purchaseDate") {
            None => None,
            Some(raw) => match raw.trim().parse::<Date>() {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("purchaseDate", "Invalid date.");
                    None
                }
            },
        };

        let vehicle_type_id = if fields.vehicle_type_id.is_empty() {
            None
        } else {
            match Uuid::parse_str(fields.vehicle_type_id.trim()) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("vehicleTypeId", "Invalid vehicle type.");
                    None
                }
            }
        };

        match (year, status, vehicle_type_id) {
            (Some(year), Some(status), Some(vehicle_type_id)) if errors.is_empty() => {
                Ok(VehicleInput {
                    make: fields.make,
                    model: fields.model,
                    year,
                    license_plate: fields.license_plate,
                    vin: fields.vin,
                    purchase_date,
                    status,
                    vehicle_type_id,
                })
            }
            _ => Err(errors),
        }
    }
}

fn latest_vehicle_year() -> i32 {
    i32::from(Zoned::now().year()) + 1
}

fn parse_year(payload: &FormPayload, errors: &mut FieldErrors) -> Option<i32> {
    let raw = text(payload, "year");
    match raw.trim().parse::<i32>() {
        Ok(year) if (MIN_VEHICLE_YEAR..=latest_vehicle_year()).contains(&year) => Some(year),
        _ => {
            errors.add("year", "Invalid year.");
            None
        }
    }
}

fn parse_status<T: std::str::FromStr>(
    payload: &FormPayload,
    errors: &mut FieldErrors,
) -> Option<T> {
    match text(payload, "status").parse::<T>() {
        Ok(status) => Some(status),
        Err(_) => {
            errors.add("status", "Invalid status.");
            None
        }
    }
}

/// Parses an identifier coming from a form or path segment.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Uuid::parse_str(raw).ok()
}

fn text(payload: &FormPayload, key: &str) -> String {
    payload.get(key).unwrap_or_default().to_owned()
}

fn optional_text(payload: &FormPayload, key: &str) -> Option<String> {
    payload
        .get(key)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle_payload_with_year(year: &str) -> FormPayload {
        FormPayload::new()
            .with("make", "Ford")
            .with("model", "Transit")
            .with("year", year)
            .with("licensePlate", "1234-ABC")
            .with("vin", "WF0XXXTTGXKA12345")
            .with("purchaseDate", "")
            .with("status", "active")
            .with("vehicleTypeId", Uuid::new_v4().to_string())
    }

    fn vehicle_payload() -> FormPayload {
        vehicle_payload_with_year("2020")
    }

    #[test]
    fn test_valid_vehicle() {
        let input = VehicleInput::from_payload(&vehicle_payload()).unwrap();

        assert_eq!(input.make, "Ford");
        assert_eq!(input.year, 2020);
        assert_eq!(input.purchase_date, None);
        assert_eq!(input.status, VehicleStatus::Active);
    }

    #[test]
    fn test_vehicle_reports_every_invalid_field() {
        let payload = FormPayload::new()
            .with("make", "")
            .with("year", "1800")
            .with("status", "retired")
            .with("purchaseDate", "yesterday");

        let errors = VehicleInput::from_payload(&payload).unwrap_err();

        assert_eq!(errors.get("make"), Some(&[String::from("Make is required.")][..]));
        assert_eq!(errors.get("model"), Some(&[String::from("Model is required.")][..]));
        assert_eq!(errors.get("year"), Some(&[String::from("Invalid year.")][..]));
        assert_eq!(errors.get("status"), Some(&[String::from("Invalid status.")][..]));
        assert_eq!(errors.get("purchaseDate"), Some(&[String::from("Invalid date.")][..]));
        assert!(errors.get("licensePlate").is_some());
        assert!(errors.get("vin").is_some());
        assert!(errors.get("vehicleTypeId").is_some());
    }

    #[test]
    fn test_vehicle_year_upper_bound() {
        let next_year = latest_vehicle_year();

        let at_bound = vehicle_payload_with_year(&next_year.to_string());
        let past_bound = vehicle_payload_with_year(&(next_year + 1).to_string());

        assert!(VehicleInput::from_payload(&at_bound).is_ok());
        assert!(VehicleInput::from_payload(&past_bound).is_err());
    }

    #[test]
    fn test_purchase_date() {
        let mut payload = vehicle_payload();
        payload.remove_all("purchaseDate");
        payload.push("purchaseDate", "2023-04-01");

        let input = VehicleInput::from_payload(&payload).unwrap();
        assert_eq!(input.purchase_date, Some(jiff::civil::date(2023, 4, 1)));
    }

    #[test]
    fn test_driver_optional_fields() {
        let payload = FormPayload::new()
            .with("name", "Ana Garcia")
            .with("licenseNumber", "B-123")
            .with("contactPhone", "")
            .with("email", "")
            .with("status", "on_leave");

        let input = DriverInput::from_payload(&payload).unwrap();

        assert_eq!(input.contact_phone, None);
        assert_eq!(input.email, None);
        assert_eq!(input.status, DriverStatus::OnLeave);
    }

    #[test]
    fn test_driver_invalid_email() {
        let payload = FormPayload::new()
            .with("name", "Ana Garcia")
            .with("licenseNumber", "B-123")
            .with("email", "not-an-email")
            .with("status", "active");

        let errors = DriverInput::from_payload(&payload).unwrap_err();

        assert_eq!(errors.get("email"), Some(&[String::from("Invalid email.")][..]));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_vehicle_type_max_drivers() {
        let parse = |value: Option<&str>| {
            let mut payload = FormPayload::new().with("name", "Van");
            if let Some(value) = value {
                payload.push("maxDrivers", value);
            }
            VehicleTypeInput::from_payload(&payload)
        };

        assert_eq!(parse(None).unwrap().max_drivers, 1);
        assert_eq!(parse(Some("")).unwrap().max_drivers, 1);
        assert_eq!(parse(Some("3")).unwrap().max_drivers, 3);
        assert_eq!(
            parse(Some("0")).unwrap_err().get("maxDrivers"),
            Some(&[String::from("Must be at least 1.")][..])
        );
        assert_eq!(
            parse(Some("1.5")).unwrap_err().get("maxDrivers"),
            Some(&[String::from("Must be a whole number.")][..])
        );
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()), Some(id));
        assert_eq!(parse_id("  "), None);
        assert_eq!(parse_id("42"), None);
    }
}
