//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::errors::AppError;

/// Validated JSON extractor that rejects the request before the handler runs.
///
/// Validation is fail-fast: only the first failing field is reported, and
/// only the first rule it broke.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use goraeph::api::extractors::ValidatedJson;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateUserRequest {
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn create_user(ValidatedJson(payload): ValidatedJson<CreateUserRequest>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::validation(first_violation(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Describe the first failing field, taking fields in name order
fn first_violation(errors: &ValidationErrors) -> String {
    let Some((field, errs)) = errors
        .field_errors()
        .into_iter()
        .min_by_key(|(field, _)| field.to_string())
    else {
        return "Invalid request body".to_string();
    };

    errs.first()
        .and_then(|e| e.message.as_ref())
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("{} is invalid", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(length(min = 3, message = "Name too short"))]
        name: String,
    }

    #[test]
    fn test_reports_single_field() {
        let sample = Sample {
            email: "not-an-email".to_string(),
            name: "x".to_string(),
        };
        let errors = sample.validate().unwrap_err();

        // "email" sorts before "name"
        assert_eq!(first_violation(&errors), "Invalid email format");
    }

    #[test]
    fn test_falls_back_to_field_name() {
        #[derive(Validate)]
        struct Bare {
            #[validate(length(min = 1))]
            title: String,
        }

        let errors = Bare {
            title: String::new(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(first_violation(&errors), "title is invalid");
    }
}
