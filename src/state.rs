use std::sync::Arc;

use sqlx::SqlitePool;

use crate::services::RegistrationService;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub service: Arc<RegistrationService>,
}
