pub mod actions;
pub mod assignment;
pub mod capacity;
pub mod form;
pub mod model;
pub mod search;
pub mod store;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_utils;
