// src/main.rs

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;       // Environment-driven settings
mod db;           // Pool and schema bootstrap
mod shared;       // Response envelope and error type
mod transactions; // Checkout and sales reports
#[cfg(test)]
mod test_utils;

use crate::shared::errors::AppResult;
use crate::transactions::transaction_repository::TransactionRepository;
use crate::transactions::transaction_router;
use crate::transactions::transaction_service::TransactionService;

/// State shared by every worker. The service owns the store, which owns the pool.
pub struct AppState {
    pub service: TransactionService,
}

#[actix_web::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Non-fatal: variables may come from the real environment instead
    dotenv().ok();

    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    let db_pool = db::pool::create_pool(&app_config.database_url, app_config.db_max_connections)
        .await
        .inspect_err(|e| error!("Failed to connect to PostgreSQL: {}", e))?;

    if app_config.db_init_schema {
        db::schema::create_tables(&db_pool).await?;
    }

    let repository = TransactionRepository::new(db_pool);
    let app_state = web::Data::new(AppState {
        service: TransactionService::new(Arc::new(repository), app_config.checkout),
    });

    info!(address = %app_config.bind_address, "starting point-of-sale API");

    HttpServer::new(move || {
        App::new()
            // web::Data is an Arc; each worker gets a handle to the same state
            .app_data(app_state.clone())
            .service(web::scope("/api").configure(transaction_router::configure))
    })
    .bind(&app_config.bind_address)?
    .run()
    .await?;

    Ok(())
}
