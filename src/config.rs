// src/config.rs

use std::env;

use tracing::debug;

use crate::shared::errors::{AppError, AppResult};
use crate::transactions::transaction_service::CheckoutPolicy;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Settings read from the environment (a `.env` file is loaded first when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub db_max_connections: u32,
    /// Run `CREATE TABLE IF NOT EXISTS` for the three tables at startup.
    pub db_init_schema: bool,
    pub checkout: CheckoutPolicy,
}

pub fn load_app_configuration() -> AppResult<AppConfig> {
    from_lookup(|key| env::var(key).ok())
}

/// Builds the configuration from any key lookup; `load_app_configuration`
/// passes the process environment.
pub fn from_lookup<F>(lookup: F) -> AppResult<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let database_url = lookup("DATABASE_URL")
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;

    let bind_address = lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

    let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
        None => DEFAULT_MAX_CONNECTIONS,
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(AppError::Config(format!(
                    "DB_MAX_CONNECTIONS must be a positive integer, got {:?}",
                    raw
                )))
            }
        },
    };

    let defaults = CheckoutPolicy::default();
    let config = AppConfig {
        database_url,
        bind_address,
        db_max_connections,
        db_init_schema: flag(&lookup, "DB_INIT_SCHEMA", false)?,
        checkout: CheckoutPolicy {
            allow_negative_stock: flag(&lookup, "ALLOW_NEGATIVE_STOCK", defaults.allow_negative_stock)?,
            require_positive_quantity: flag(
                &lookup,
                "REQUIRE_POSITIVE_QUANTITY",
                defaults.require_positive_quantity,
            )?,
        },
    };
    debug!(
        bind_address = %config.bind_address,
        db_max_connections = config.db_max_connections,
        db_init_schema = config.db_init_schema,
        checkout = ?config.checkout,
        "configuration loaded"
    );
    Ok(config)
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> AppResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!("{} must be true or false, got {:?}", key, raw))),
    }
}
