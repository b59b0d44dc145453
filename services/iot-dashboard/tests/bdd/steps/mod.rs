//! BDD step definitions for the IoT dashboard service

pub mod client_steps;
pub mod doubles;
pub mod polling_steps;
