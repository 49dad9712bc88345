use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
}

impl AppConfig {
    /// Reads settings from the environment, falling back to local defaults.
    /// Call `dotenvy::dotenv()` first to honour a `.env` file.
    pub fn new_from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://todo.db".to_string());

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|e| AppError::Configuration(format!("BIND_ADDR {:?}: {}", raw, e)))?,
            Err(_) => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse::<u32>().map_err(|e| {
                AppError::Configuration(format!("DB_MAX_CONNECTIONS {:?}: {}", raw, e))
            })?,
            Err(_) => 5,
        };

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
        })
    }
}
