//! HTTP request handlers.

mod analytics;
mod health;
mod links;
mod redirect;
mod shorten;

pub use analytics::analytics_handler;
pub use health::health_handler;
pub use links::links_handler;
pub use redirect::{access_handler, redirect_handler};
pub use shorten::shorten_handler;
