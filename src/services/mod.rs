//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on the repository trait, never
//! on a concrete storage engine, and are wired together explicitly.

mod user_service;

pub use user_service::{UserManager, UserService};
