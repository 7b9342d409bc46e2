//! User repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{CreateUser, User, UserDraft};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// Lookup key for a single user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Id(i32),
    Username(String),
    Email(String),
}

/// User repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List every user in store order
    async fn find(&self) -> AppResult<Vec<User>>;

    /// Find the user matching `filter`
    async fn find_one_by(&self, filter: UserFilter) -> AppResult<Option<User>>;

    /// Build an unsaved record from creation input
    fn create(&self, input: CreateUser) -> UserDraft;

    /// Insert or update a record; the store assigns id and timestamps
    async fn save(&self, draft: UserDraft) -> AppResult<User>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Concrete implementation of UserRepository backed by SeaORM
pub struct UserStore {
    db: Arc<DatabaseConnection>,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn find_one_by(&self, filter: UserFilter) -> AppResult<Option<User>> {
        let condition = match filter {
            UserFilter::Id(id) => user::Column::Id.eq(id),
            UserFilter::Username(username) => user::Column::Username.eq(username),
            UserFilter::Email(email) => user::Column::Email.eq(email),
        };

        let result = UserEntity::find()
            .filter(condition)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    fn create(&self, input: CreateUser) -> UserDraft {
        UserDraft::from(input)
    }

    async fn save(&self, draft: UserDraft) -> AppResult<User> {
        let now = chrono::Utc::now();
        let mut active = ActiveModel {
            username: Set(draft.username),
            email: Set(draft.email),
            password: Set(draft.password),
            is_activated: Set(draft.is_activated),
            updated_at: Set(now),
            ..Default::default()
        };

        let saved = match draft.id {
            Some(id) => {
                active.id = ActiveValue::Unchanged(id);
                active.update(self.db.as_ref()).await
            }
            None => {
                active.created_at = Set(now);
                active.insert(self.db.as_ref()).await
            }
        };

        let model = saved.map_err(translate_write_error)?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}

/// Map constraint failures raised by the database on write.
///
/// Unique violations become duplicate errors so a race between two
/// check-then-insert sequences still reports a conflict. Anything else is
/// passed through as a store error.
fn translate_write_error(err: DbErr) -> AppError {
    if matches!(err, DbErr::RecordNotUpdated) {
        return AppError::NotFound;
    }

    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            duplicate_from_violation(&detail).unwrap_or(AppError::Database(err))
        }
        _ => AppError::Database(err),
    }
}

/// Pick the duplicate error for the column named in a unique violation
fn duplicate_from_violation(detail: &str) -> Option<AppError> {
    if detail.contains("username") {
        Some(AppError::DuplicateUsername)
    } else if detail.contains("email") {
        Some(AppError::DuplicateEmail)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(id: i32, username: &str, email: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password: "p".to_string(),
            is_activated: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_returns_all_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "a", "a@x.com"), model(2, "b", "b@x.com")]])
            .into_connection();
        let store = UserStore::new(Arc::new(db));

        let users = store.find().await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "a");
        assert_eq!(users[1].email, "b@x.com");
    }

    #[tokio::test]
    async fn test_find_one_by_missing_returns_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let store = UserStore::new(Arc::new(db));

        let found = store
            .find_one_by(UserFilter::Email("nobody@x.com".to_string()))
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_one_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "a", "a@x.com")]])
            .into_connection();
        let store = UserStore::new(Arc::new(db));

        let found = store.find_one_by(UserFilter::Id(1)).await.unwrap();

        assert_eq!(found.map(|u| u.id), Some(1));
    }

    #[tokio::test]
    async fn test_query_failure_is_passed_through() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let store = UserStore::new(Arc::new(db));

        let err = store.find().await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Database(DbErr::Custom(ref msg)) if msg == "connection reset"
        ));
    }

    #[tokio::test]
    async fn test_save_inserts_draft_without_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "new", "new@x.com")]])
            .into_connection();
        let store = UserStore::new(Arc::new(db));

        let draft = store.create(CreateUser {
            username: "new".to_string(),
            email: "new@x.com".to_string(),
            password: "p".to_string(),
            is_activated: true,
        });
        let saved = store.save(draft).await.unwrap();

        assert_eq!(saved.id, 1);
        assert_eq!(saved.username, "new");
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let store = UserStore::new(Arc::new(db));

        let err = store.delete(42).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_existing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let store = UserStore::new(Arc::new(db));

        assert!(store.delete(1).await.is_ok());
    }

    #[test]
    fn test_record_not_updated_is_not_found() {
        assert!(matches!(
            translate_write_error(DbErr::RecordNotUpdated),
            AppError::NotFound
        ));
    }

    #[test]
    fn test_username_violation_is_duplicate_username() {
        let detail = r#"duplicate key value violates unique constraint "users_username_key""#;

        assert!(matches!(
            duplicate_from_violation(detail),
            Some(AppError::DuplicateUsername)
        ));
    }

    #[test]
    fn test_email_violation_is_duplicate_email() {
        let detail = r#"duplicate key value violates unique constraint "users_email_key""#;

        assert!(matches!(
            duplicate_from_violation(detail),
            Some(AppError::DuplicateEmail)
        ));
    }

    #[test]
    fn test_unknown_violation_is_not_a_duplicate() {
        let detail = r#"duplicate key value violates unique constraint "users_pkey""#;

        assert!(duplicate_from_violation(detail).is_none());
    }

    #[test]
    fn test_other_write_errors_are_passed_through() {
        let err = translate_write_error(DbErr::Custom("disk full".to_string()));

        assert!(matches!(err, AppError::Database(DbErr::Custom(ref msg)) if msg == "disk full"));
    }
}
