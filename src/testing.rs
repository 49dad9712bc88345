//! Helpers for exercising the service against a throwaway database.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

use crate::auth::TokenAuthenticator;
use crate::db::init_pool;
use crate::error::AppError;
use crate::state::AppState;

/// A clock frozen at local noon of a given day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Local>,
}

impl FixedClock {
    pub fn on(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        let now = Local
            .from_local_datetime(&noon)
            .earliest()
            .unwrap_or_else(|| Local.from_utc_datetime(&noon));
        Self { now }
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.now
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now.with_timezone(&Utc)
    }
}

/// State backed by a fresh in-memory database whose clock reads `today`.
pub async fn in_memory_state(today: NaiveDate) -> Result<AppState, AppError> {
    let pool = init_pool("sqlite::memory:", 1).await?;
    Ok(AppState {
        db: pool.clone(),
        auth: Arc::new(TokenAuthenticator::new(pool)),
        clock: Arc::new(FixedClock::on(today)),
    })
}
