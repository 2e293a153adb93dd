//! Repository traits abstracting the persistent collaborators.

mod link_repository;
mod token_repository;
mod visit_repository;

pub use link_repository::LinkRepository;
pub use token_repository::{CurrentUser, TokenRepository};
pub use visit_repository::VisitRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use visit_repository::MockVisitRepository;
