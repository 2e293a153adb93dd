//! Core business entities.

mod link;
mod visit;

pub use link::{Link, NewLink};
pub use visit::{NewVisit, Visit};
