// src/db/schema.rs

use sqlx::{Pool, Postgres};
use tracing::{debug, info, instrument};

// Executed in order; each statement is idempotent.
const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        price BIGINT NOT NULL,
        stock INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id SERIAL PRIMARY KEY,
        total_amount BIGINT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transaction_details (
        id SERIAL PRIMARY KEY,
        transaction_id INTEGER NOT NULL REFERENCES transactions (id) ON DELETE CASCADE,
        product_id INTEGER NOT NULL REFERENCES products (id),
        quantity INTEGER NOT NULL,
        subtotal BIGINT NOT NULL
    )
    "#,
];

/// Creates the `products`, `transactions` and `transaction_details` tables
/// when they do not exist yet.
#[instrument(skip(pool))]
pub async fn create_tables(pool: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    debug!("Executing CREATE TABLE statements if tables do not exist.");
    let mut transaction = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *transaction).await?;
    }
    transaction.commit().await?;
    info!("Database tables ensured.");
    Ok(())
}
