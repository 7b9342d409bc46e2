//! Domain layer - Core business entities
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod user;

pub use user::{CreateUser, UpdateUser, User, UserDraft, UserResponse};
