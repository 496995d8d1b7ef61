// src/transactions/transaction_structs.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `products` table as seen during checkout.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: i64,
    pub stock: i32,
}

/// One line of a checkout request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutItem {
    pub product_id: i32,
    pub quantity: i32,
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

/// A recorded sale. `total_amount` is the sum of the detail subtotals at the
/// moment of checkout and is never recomputed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Transaction {
    pub id: i32,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub details: Vec<TransactionDetail>,
}

/// A line item of a transaction. `product_name` is copied from the product at
/// checkout time and is not stored in `transaction_details`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransactionDetail {
    pub id: i32,
    pub transaction_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: i64,
}

/// Aggregates over a report window.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct ReportTotals {
    pub total_revenue: i64,
    pub transaction_count: i64,
    pub total_items_sold: i64,
}

/// A transaction row of a report, with the number of detail lines it has.
#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct TransactionSummary {
    pub id: i32,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub item_count: i64,
}

/// Half-open window `[start, end)` plus the cap on listed transactions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub limit: i64,
}

/// Response of the report endpoints. `date` is only set by the today report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub total_revenue: i64,
    pub transaction_count: i64,
    pub total_items_sold: i64,
    pub transactions: Vec<TransactionSummary>,
}

/// Query string of `GET /api/report`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}
