//! Path extractor whose rejection uses the application error body.

use axum::extract::{FromRequestParts, Path};

use crate::errors::AppError;

/// Drop-in replacement for `Path<T>`.
///
/// A segment that does not parse into `T` becomes a `VALIDATION_ERROR`
/// instead of axum's plain-text rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
