//! Form actions: each takes a submitted form and always answers with a
//! [`FormState`](crate::form::FormState), never with an error.

pub mod drivers;
pub mod vehicle_types;
pub mod vehicles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Create,
    Update,
    Delete,
}
