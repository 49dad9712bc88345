use std::sync::Arc;

use mockable::Clock;
use sqlx::SqlitePool;

use crate::auth::Authenticator;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub auth: Arc<dyn Authenticator>,
    pub clock: Arc<dyn Clock + Send + Sync>,
}
