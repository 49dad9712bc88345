use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Account;
use crate::state::AppState;

const USERNAME_MAX_CHARS: usize = 150;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
}

/// Turns caller credentials into a verified account id.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, credentials: &Credentials) -> Result<i64, AppError>;
}

/// Opaque bearer tokens stored alongside the account.
pub struct TokenAuthenticator {
    db: SqlitePool,
}

impl TokenAuthenticator {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn verify(&self, credentials: &Credentials) -> Result<i64, AppError> {
        let row: Option<(i64, bool)> =
            sqlx::query_as("SELECT id, is_active FROM accounts WHERE api_token = ?")
                .bind(&credentials.token)
                .fetch_optional(&self.db)
                .await?;

        match row {
            Some((id, true)) => Ok(id),
            Some((id, false)) => {
                warn!("rejected token of inactive account {}", id);
                Err(AppError::Unauthorized)
            }
            None => Err(AppError::Unauthorized),
        }
    }
}

/// Creates an account and returns it together with its freshly issued token.
pub async fn register_account(
    db: &SqlitePool,
    username: &str,
) -> Result<(Account, String), AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::validation("username", "must not be blank"));
    }
    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err(AppError::validation(
            "username",
            format!("must be at most {} characters", USERNAME_MAX_CHARS),
        ));
    }

    let token = Uuid::new_v4().simple().to_string();
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (username, api_token, is_active, created_at)
        VALUES (?1, ?2, 1, ?3)
        RETURNING id, username, is_active, created_at
        "#,
    )
    .bind(username)
    .bind(&token)
    .bind(&now)
    .fetch_one(db)
    .await?;

    Ok((account, token))
}

pub async fn find_account(db: &SqlitePool, id: i64) -> Result<Account, AppError> {
    sqlx::query_as::<_, Account>(
        "SELECT id, username, is_active, created_at FROM accounts WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::NotFound)
}

/// The authenticated caller, taken from `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentAccount(pub i64);

impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let credentials = Credentials {
            token: token.to_string(),
        };
        let account_id = state.auth.verify(&credentials).await?;
        Ok(CurrentAccount(account_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_pool;

    #[tokio::test]
    async fn test_register_then_verify_token() {
        let pool = init_pool("sqlite::memory:", 1).await.unwrap();
        let (account, token) = register_account(&pool, "alice").await.unwrap();
        assert_eq!(account.username, "alice");
        assert!(account.is_active);

        let auth = TokenAuthenticator::new(pool.clone());
        let verified = auth.verify(&Credentials { token }).await.unwrap();
        assert_eq!(verified, account.id);
    }

    #[tokio::test]
    async fn test_unknown_or_inactive_token_is_rejected() {
        let pool = init_pool("sqlite::memory:", 1).await.unwrap();
        let (account, token) = register_account(&pool, "alice").await.unwrap();
        let auth = TokenAuthenticator::new(pool.clone());

        let unknown = auth
            .verify(&Credentials { token: "nope".to_string() })
            .await;
        assert!(matches!(unknown, Err(AppError::Unauthorized)));

        sqlx::query("UPDATE accounts SET is_active = 0 WHERE id = ?")
            .bind(account.id)
            .execute(&pool)
            .await
            .unwrap();
        let inactive = auth.verify(&Credentials { token }).await;
        assert!(matches!(inactive, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let pool = init_pool("sqlite::memory:", 1).await.unwrap();
        register_account(&pool, "alice").await.unwrap();
        let err = register_account(&pool, "alice").await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate { field: "username" }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_blank_username_is_rejected() {
        let pool = init_pool("sqlite::memory:", 1).await.unwrap();
        let err = register_account(&pool, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "username", .. }));
    }
}
