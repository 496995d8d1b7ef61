// src/transactions/transaction_repository.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use tracing::{debug, instrument};

use super::transaction_structs::{
    CheckoutItem, Product, ReportTotals, ReportWindow, Transaction, TransactionDetail,
    TransactionSummary,
};
use crate::shared::errors::{AppError, AppResult};

/// Persistence operations the service depends on.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Records a sale and decrements stock for every item, all or nothing.
    ///
    /// Items are processed in input order. The first item whose product does
    /// not exist aborts the whole call with [`AppError::ProductNotFound`].
    /// With `allow_negative_stock` off, an item asking for more than the
    /// current stock aborts with [`AppError::InsufficientStock`].
    async fn create_transaction(
        &self,
        items: &[CheckoutItem],
        allow_negative_stock: bool,
    ) -> AppResult<Transaction>;

    async fn report_totals(&self, window: &ReportWindow) -> AppResult<ReportTotals>;

    /// Most recent transactions of the window, newest first, at most `window.limit`.
    async fn recent_transactions(&self, window: &ReportWindow)
        -> AppResult<Vec<TransactionSummary>>;

    async fn ping(&self) -> AppResult<()>;
}

/// PostgreSQL-backed store. Holds the process-wide pool; every call acquires
/// its own connection or transaction from it.
pub struct TransactionRepository {
    db_pool: Pool<Postgres>,
}

impl TransactionRepository {
    pub fn new(db_pool: Pool<Postgres>) -> Self {
        TransactionRepository { db_pool }
    }
}

#[async_trait]
impl TransactionStore for TransactionRepository {
    #[instrument(skip(self, items), fields(items = items.len()))]
    async fn create_transaction(
        &self,
        items: &[CheckoutItem],
        allow_negative_stock: bool,
    ) -> AppResult<Transaction> {
        // Every early return below drops `transaction` uncommitted, which rolls it back.
        let mut transaction = self.db_pool.begin().await?;

        let mut total_amount: i64 = 0;
        let mut details = Vec::with_capacity(items.len());

        for item in items {
            // 1. Product lookup, inside the transaction
            let product = sqlx::query_as::<_, Product>(
                "SELECT id, name, price::BIGINT AS price, stock::INTEGER AS stock \
                 FROM products WHERE id = $1",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *transaction)
            .await?
            .ok_or(AppError::ProductNotFound(item.product_id))?;

            if !allow_negative_stock && product.stock < item.quantity {
                return Err(AppError::InsufficientStock {
                    product_id: product.id,
                    available: product.stock,
                    requested: item.quantity,
                });
            }

            // 2. Subtotal at the current price
            let subtotal = product
                .price
                .checked_mul(i64::from(item.quantity))
                .ok_or(AppError::AmountOverflow(item.product_id))?;
            total_amount = total_amount
                .checked_add(subtotal)
                .ok_or(AppError::AmountOverflow(item.product_id))?;

            // 3. Stock decrement
            sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2")
                .bind(item.quantity)
                .bind(item.product_id)
                .execute(&mut *transaction)
                .await?;

            details.push(TransactionDetail {
                id: 0,
                transaction_id: 0,
                product_id: item.product_id,
                product_name: product.name,
                quantity: item.quantity,
                subtotal,
            });
        }

        let (transaction_id, created_at) = sqlx::query_as::<_, (i32, DateTime<Utc>)>(
            "INSERT INTO transactions (total_amount) VALUES ($1) \
             RETURNING id, created_at::TIMESTAMPTZ AS created_at",
        )
        .bind(total_amount)
        .fetch_one(&mut *transaction)
        .await?;

        for detail in details.iter_mut() {
            detail.transaction_id = transaction_id;
            detail.id = sqlx::query_scalar::<_, i32>(
                "INSERT INTO transaction_details (transaction_id, product_id, quantity, subtotal) \
                 VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(transaction_id)
            .bind(detail.product_id)
            .bind(detail.quantity)
            .bind(detail.subtotal)
            .fetch_one(&mut *transaction)
            .await?;
        }

        transaction.commit().await?;
        debug!(transaction_id, total_amount, "transaction committed");

        Ok(Transaction {
            id: transaction_id,
            total_amount,
            created_at,
            details,
        })
    }

    #[instrument(skip(self))]
    async fn report_totals(&self, window: &ReportWindow) -> AppResult<ReportTotals> {
        // Quantities are summed per transaction first so that a transaction's
        // total_amount is counted once no matter how many details it has.
        let totals = sqlx::query_as::<_, ReportTotals>(
            r#"
            SELECT
                COALESCE(SUM(t.total_amount), 0)::BIGINT AS total_revenue,
                COUNT(t.id) AS transaction_count,
                COALESCE(SUM(d.items), 0)::BIGINT AS total_items_sold
            FROM transactions t
            LEFT JOIN (
                SELECT transaction_id, SUM(quantity) AS items
                FROM transaction_details
                GROUP BY transaction_id
            ) d ON d.transaction_id = t.id
            WHERE t.created_at >= $1 AND t.created_at < $2
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(totals)
    }

    #[instrument(skip(self))]
    async fn recent_transactions(
        &self,
        window: &ReportWindow,
    ) -> AppResult<Vec<TransactionSummary>> {
        let rows = sqlx::query_as::<_, TransactionSummary>(
            r#"
            SELECT
                t.id,
                t.total_amount::BIGINT AS total_amount,
                t.created_at::TIMESTAMPTZ AS created_at,
                COUNT(td.id) AS item_count
            FROM transactions t
            LEFT JOIN transaction_details td ON td.transaction_id = t.id
            WHERE t.created_at >= $1 AND t.created_at < $2
            GROUP BY t.id, t.total_amount, t.created_at
            ORDER BY t.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .bind(window.limit)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db_pool).await?;
        Ok(())
    }
}
