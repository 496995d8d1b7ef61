//! In-memory [`TransactionStore`] for tests.
//!
//! Mirrors the PostgreSQL repository's semantics (input-order processing,
//! all-or-nothing writes, half-open windows) without a database.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::shared::errors::{AppError, AppResult};
use crate::transactions::transaction_repository::TransactionStore;
use crate::transactions::transaction_structs::{
    CheckoutItem, Product, ReportTotals, ReportWindow, Transaction, TransactionDetail,
    TransactionSummary,
};

#[derive(Clone, Default)]
struct StoreState {
    products: BTreeMap<i32, Product>,
    transactions: Vec<Transaction>,
    next_transaction_id: i32,
    next_detail_id: i32,
}

impl StoreState {
    fn record(
        &mut self,
        created_at: DateTime<Utc>,
        total_amount: i64,
        mut details: Vec<TransactionDetail>,
    ) -> Transaction {
        self.next_transaction_id += 1;
        let id = self.next_transaction_id;
        for detail in details.iter_mut() {
            self.next_detail_id += 1;
            detail.id = self.next_detail_id;
            detail.transaction_id = id;
        }
        let transaction = Transaction {
            id,
            total_amount,
            created_at,
            details,
        };
        self.transactions.push(transaction.clone());
        transaction
    }

    fn in_window<'a>(&'a self, window: &'a ReportWindow) -> impl Iterator<Item = &'a Transaction> {
        self.transactions
            .iter()
            .filter(move |t| t.created_at >= window.start && t.created_at < window.end)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Store seeded with `(id, name, price, stock)` products.
    pub fn with_products(products: &[(i32, &str, i64, i32)]) -> Self {
        let store = InMemoryStore::default();
        {
            let mut state = store.state.lock().unwrap();
            for &(id, name, price, stock) in products {
                state.products.insert(
                    id,
                    Product {
                        id,
                        name: name.to_string(),
                        price,
                        stock,
                    },
                );
            }
        }
        store
    }

    /// Inserts a past transaction from `(product_id, quantity, subtotal)` lines.
    pub fn seed_transaction(&self, created_at: DateTime<Utc>, lines: &[(i32, i32, i64)]) -> Transaction {
        let total_amount = lines.iter().map(|&(_, _, subtotal)| subtotal).sum();
        let details = lines
            .iter()
            .map(|&(product_id, quantity, subtotal)| TransactionDetail {
                id: 0,
                transaction_id: 0,
                product_id,
                product_name: format!("product {}", product_id),
                quantity,
                subtotal,
            })
            .collect();
        self.state
            .lock()
            .unwrap()
            .record(created_at, total_amount, details)
    }

    pub fn stock_of(&self, product_id: i32) -> Option<i32> {
        self.state
            .lock()
            .unwrap()
            .products
            .get(&product_id)
            .map(|p| p.stock)
    }

    pub fn transaction_count(&self) -> usize {
        self.state.lock().unwrap().transactions.len()
    }

    pub fn detail_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .map(|t| t.details.len())
            .sum()
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn create_transaction(
        &self,
        items: &[CheckoutItem],
        allow_negative_stock: bool,
    ) -> AppResult<Transaction> {
        let mut guard = self.state.lock().unwrap();
        // Work on a copy; it only replaces the real state once every item passed.
        let mut working = guard.clone();

        let mut total_amount: i64 = 0;
        let mut details = Vec::with_capacity(items.len());
        for item in items {
            let product = working
                .products
                .get_mut(&item.product_id)
                .ok_or(AppError::ProductNotFound(item.product_id))?;
            if !allow_negative_stock && product.stock < item.quantity {
                return Err(AppError::InsufficientStock {
                    product_id: product.id,
                    available: product.stock,
                    requested: item.quantity,
                });
            }
            let subtotal = product
                .price
                .checked_mul(i64::from(item.quantity))
                .ok_or(AppError::AmountOverflow(item.product_id))?;
            total_amount = total_amount
                .checked_add(subtotal)
                .ok_or(AppError::AmountOverflow(item.product_id))?;
            product.stock -= item.quantity;
            details.push(TransactionDetail {
                id: 0,
                transaction_id: 0,
                product_id: item.product_id,
                product_name: product.name.clone(),
                quantity: item.quantity,
                subtotal,
            });
        }

        let transaction = working.record(Utc::now(), total_amount, details);
        *guard = working;
        Ok(transaction)
    }

    async fn report_totals(&self, window: &ReportWindow) -> AppResult<ReportTotals> {
        let state = self.state.lock().unwrap();
        let mut totals = ReportTotals::default();
        for transaction in state.in_window(window) {
            totals.total_revenue += transaction.total_amount;
            totals.transaction_count += 1;
            totals.total_items_sold += transaction
                .details
                .iter()
                .map(|d| i64::from(d.quantity))
                .sum::<i64>();
        }
        Ok(totals)
    }

    async fn recent_transactions(&self, window: &ReportWindow) -> AppResult<Vec<TransactionSummary>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<TransactionSummary> = state
            .in_window(window)
            .map(|t| TransactionSummary {
                id: t.id,
                total_amount: t.total_amount,
                created_at: t.created_at,
                item_count: t.details.len() as i64,
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(window.limit.max(0) as usize);
        Ok(rows)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
