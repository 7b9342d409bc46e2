//! Infrastructure layer - External systems integration
//!
//! Database connection, migrations and the repositories built on them.

pub mod db;
pub mod repositories;

pub use db::{Database, Migrator};
pub use repositories::{UserFilter, UserRepository, UserStore};

#[cfg(test)]
pub use repositories::MockUserRepository;
