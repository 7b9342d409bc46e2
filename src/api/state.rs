//! Application state shared by all handlers.
//!
//! Services are constructed explicitly here and handed to the router.

use std::sync::Arc;

use crate::infra::{Database, UserStore};
use crate::services::{UserManager, UserService};

/// Application state containing all services.
#[derive(Clone)]
pub struct AppState {
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Database handle, used by the health check when present
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Build the service graph on top of a connected database.
    pub fn from_database(database: Arc<Database>) -> Self {
        let user_repo = Arc::new(UserStore::new(database.get_connection()));
        let user_service = Arc::new(UserManager::new(user_repo));

        Self {
            user_service,
            database: Some(database),
        }
    }

    /// Create state around an already constructed service.
    pub fn new(user_service: Arc<dyn UserService>) -> Self {
        Self {
            user_service,
            database: None,
        }
    }
}
