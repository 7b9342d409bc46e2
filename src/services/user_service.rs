//! User service - Handles user-related business logic.
//!
//! Uniqueness of username and email is checked here, before anything is
//! written. Store failures are returned to the caller as they arrive.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{CreateUser, UpdateUser, User, UserDraft};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{UserFilter, UserRepository};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// List all users
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Get user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<User>;

    /// Get user by email
    async fn find_by_email(&self, email: &str) -> AppResult<User>;

    /// Return the user already holding `email`, if any
    async fn validate_email_duplicate(&self, email: &str) -> AppResult<Option<User>>;

    /// Return the user already holding `username`, if any
    async fn validate_username_duplicate(&self, username: &str) -> AppResult<Option<User>>;

    /// Create a user after both duplicate checks pass
    async fn create(&self, input: CreateUser) -> AppResult<User>;

    /// Apply a partial update, re-checking changed username/email
    async fn update(&self, id: i32, input: UpdateUser) -> AppResult<User>;

    /// Remove a user
    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Fail if `username` belongs to a user other than `owner`
    async fn ensure_username_free(&self, username: &str, owner: Option<i32>) -> AppResult<()> {
        match self.validate_username_duplicate(username).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::DuplicateUsername),
            _ => Ok(()),
        }
    }

    /// Fail if `email` belongs to a user other than `owner`
    async fn ensure_email_free(&self, email: &str, owner: Option<i32>) -> AppResult<()> {
        match self.validate_email_duplicate(email).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::DuplicateEmail),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn find_all(&self) -> AppResult<Vec<User>> {
        self.repo.find().await
    }

    async fn find_by_id(&self, id: i32) -> AppResult<User> {
        self.repo
            .find_one_by(UserFilter::Id(id))
            .await?
            .ok_or_not_found()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        self.repo
            .find_one_by(UserFilter::Email(email.to_string()))
            .await?
            .ok_or_not_found()
    }

    async fn validate_email_duplicate(&self, email: &str) -> AppResult<Option<User>> {
        self.repo
            .find_one_by(UserFilter::Email(email.to_string()))
            .await
    }

    async fn validate_username_duplicate(&self, username: &str) -> AppResult<Option<User>> {
        self.repo
            .find_one_by(UserFilter::Username(username.to_string()))
            .await
    }

    async fn create(&self, input: CreateUser) -> AppResult<User> {
        self.ensure_username_free(&input.username, None).await?;
        self.ensure_email_free(&input.email, None).await?;

        let draft = self.repo.create(input);
        let user = self.repo.save(draft).await?;

        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    async fn update(&self, id: i32, input: UpdateUser) -> AppResult<User> {
        let current = self.find_by_id(id).await?;

        if let Some(username) = input.username.as_deref() {
            if username != current.username {
                self.ensure_username_free(username, Some(id)).await?;
            }
        }
        if let Some(email) = input.email.as_deref() {
            if email != current.email {
                self.ensure_email_free(email, Some(id)).await?;
            }
        }

        let mut draft = UserDraft::from(current);
        draft.apply(input);
        let user = self.repo.save(draft).await?;

        tracing::info!(user_id = user.id, "User updated");
        Ok(user)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let user = self.find_by_id(id).await?;
        self.repo.delete(user.id).await?;

        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
