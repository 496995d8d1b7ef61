// src/transactions/transaction_service.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::{info, instrument};

use super::transaction_repository::TransactionStore;
use super::transaction_structs::{CheckoutItem, Report, ReportQuery, ReportWindow, Transaction};
use crate::shared::errors::{AppError, AppResult};

/// Row cap of the today report.
pub const TODAY_REPORT_LIMIT: i64 = 50;
/// Row cap of the date-range report.
pub const RANGE_REPORT_LIMIT: i64 = 100;
/// Format of report dates, in and out.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Checkout rules that are deliberately configurable.
///
/// The defaults reproduce the historical behaviour: stock may go negative and
/// quantities are taken as given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutPolicy {
    pub allow_negative_stock: bool,
    pub require_positive_quantity: bool,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        CheckoutPolicy {
            allow_negative_stock: true,
            require_positive_quantity: false,
        }
    }
}

/// Business layer between the HTTP handlers and the store.
pub struct TransactionService {
    store: Arc<dyn TransactionStore>,
    policy: CheckoutPolicy,
    clock: fn() -> DateTime<Utc>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn TransactionStore>, policy: CheckoutPolicy) -> Self {
        TransactionService {
            store,
            policy,
            clock: Utc::now,
        }
    }

    /// Replaces the clock that decides what "today" is.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn checkout(&self, items: Vec<CheckoutItem>) -> AppResult<Transaction> {
        if items.is_empty() {
            return Err(AppError::Validation("items must not be empty".to_string()));
        }
        if self.policy.require_positive_quantity {
            if let Some(item) = items.iter().find(|item| item.quantity <= 0) {
                return Err(AppError::Validation(format!(
                    "quantity for product id {} must be positive",
                    item.product_id
                )));
            }
        }

        let transaction = self
            .store
            .create_transaction(&items, self.policy.allow_negative_stock)
            .await?;
        info!(
            transaction_id = transaction.id,
            total_amount = transaction.total_amount,
            "checkout completed"
        );
        Ok(transaction)
    }

    /// Report of the current UTC day, labelled with `date`.
    pub async fn today_report(&self) -> AppResult<Report> {
        let today = (self.clock)().date_naive();
        let mut report = self.report(today, today, TODAY_REPORT_LIMIT).await?;
        report.date = Some(today.format(DATE_FORMAT).to_string());
        Ok(report)
    }

    /// Report over `start_date..=end_date`.
    ///
    /// Each supplied date must parse as `YYYY-MM-DD`. When either one is
    /// missing the result is the today report.
    pub async fn range_report(&self, query: &ReportQuery) -> AppResult<Report> {
        let start = parse_date_param("start_date", query.start_date.as_deref())?;
        let end = parse_date_param("end_date", query.end_date.as_deref())?;

        match (start, end) {
            (Some(start), Some(end)) => {
                if end < start {
                    return Err(AppError::Validation(
                        "end_date must be on or after start_date".to_string(),
                    ));
                }
                self.report(start, end, RANGE_REPORT_LIMIT).await
            }
            _ => self.today_report().await,
        }
    }

    pub async fn health(&self) -> AppResult<()> {
        self.store.ping().await
    }

    #[instrument(skip(self))]
    async fn report(&self, first_day: NaiveDate, last_day: NaiveDate, limit: i64) -> AppResult<Report> {
        let window = report_window(first_day, last_day, limit)?;

        let totals = self.store.report_totals(&window).await?;
        let transactions = self.store.recent_transactions(&window).await?;

        Ok(Report {
            date: None,
            start_date: window.start.date_naive().format(DATE_FORMAT).to_string(),
            // The window end is exclusive; label the last day it covers.
            end_date: (window.end - Duration::days(1))
                .date_naive()
                .format(DATE_FORMAT)
                .to_string(),
            total_revenue: totals.total_revenue,
            transaction_count: totals.transaction_count,
            total_items_sold: totals.total_items_sold,
            transactions,
        })
    }
}

/// `[first_day 00:00, last_day + 1 day 00:00)` in UTC.
pub fn report_window(first_day: NaiveDate, last_day: NaiveDate, limit: i64) -> AppResult<ReportWindow> {
    let day_after = last_day
        .succ_opt()
        .ok_or_else(|| AppError::Validation("end_date is out of range".to_string()))?;

    Ok(ReportWindow {
        start: start_of_day(first_day),
        end: start_of_day(day_after),
        limit,
    })
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))
}

/// Blank values count as absent.
fn parse_date_param(name: &str, value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("invalid {} format (use YYYY-MM-DD)", name))),
    }
}
