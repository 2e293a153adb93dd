//! Request and response DTOs.

pub mod access;
pub mod analytics;
pub mod health;
pub mod links;
pub mod shorten;
