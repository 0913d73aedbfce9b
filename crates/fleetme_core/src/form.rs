use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const VALIDATION_FAILED: &str = "Validation failed. Please correct the fields.";

/// A submitted form: flat key/value pairs where a key may repeat (`driverIds`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    entries: Vec<(String, String)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        FormPayload {
            entries: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// First value submitted under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, value)| value.as_str())
    }

    /// Every value submitted under `key`, in submission order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(entry_key, _)| entry_key == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    pub fn remove_all(&mut self, key: &str) {
        self.entries.retain(|(entry_key, _)| entry_key != key);
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn to_values(&self) -> BTreeMap<String, Vec<String>> {
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in &self.entries {
            values.entry(key.clone()).or_default().push(value.clone());
        }
        values
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Collects `validator` errors, keyed by the camelCase form field name.
    pub fn extend_from_validator(&mut self, errors: &validator::ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            let field = camel_case(&field);
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                self.add(&field, message);
            }
        }
    }

    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut result = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            result.extend(c.to_uppercase());
            upper = false;
        } else {
            result.push(c);
        }
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Toast {
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub message: String,
}

/// Result of a form action: general message, per-field errors, the submitted
/// values for redisplay and an optional toast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
    /// Where the client should navigate once the success toast has been shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl FormState {
    pub fn success(message: impl Into<String>) -> Self {
        let message = message.into();
        FormState {
            message: Some(message.clone()),
            toast: Some(Toast {
                kind: ToastKind::Success,
                message,
            }),
            ..Default::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        FormState {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn failure_with_toast(message: impl Into<String>) -> Self {
        let message = message.into();
        FormState {
            message: Some(message.clone()),
            toast: Some(Toast {
                kind: ToastKind::Error,
                message,
            }),
            ..Default::default()
        }
    }

    pub fn invalid(errors: FieldErrors) -> Self {
        FormState {
            message: Some(VALIDATION_FAILED.to_owned()),
            errors,
            ..Default::default()
        }
    }

    pub fn with_values(mut self, payload: &FormPayload) -> Self {
        self.values = payload.to_values();
        self
    }

    pub fn with_redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect = Some(path.into());
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.toast,
            Some(Toast {
                kind: ToastKind::Success,
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_repeated_keys() {
        let payload = FormPayload::new()
            .with("make", "Ford")
            .with("driverIds", "a")
            .with("driverIds", "b");

        assert_eq!(payload.get("make"), Some("Ford"));
        assert_eq!(payload.get("driverIds"), Some("a"));
        assert_eq!(payload.get_all("driverIds"), vec!["a", "b"]);
        assert_eq!(payload.get("vin"), None);
        assert!(payload.get_all("vin").is_empty());

        let values = payload.to_values();
        assert_eq!(values["driverIds"], vec!["a", "b"]);
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("license_plate"), "licensePlate");
        assert_eq!(camel_case("vehicle_type_id"), "vehicleTypeId");
        assert_eq!(camel_case("make"), "make");
    }

    #[test]
    fn test_form_state_serialization() {
        let state = FormState::success("Vehicle added successfully.").with_redirect("/vehicles");
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["toast"]["type"], "success");
        assert_eq!(json["redirect"], "/vehicles");
        assert!(json.get("errors").is_none());
        assert!(state.is_success());

        let state = FormState::invalid(FieldErrors::single("driverIds", "too many"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["errors"]["driverIds"][0], "too many");
        assert!(!state.is_success());
    }
}
