// src/transactions/transaction_router.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use super::transaction_structs::{CheckoutRequest, ReportQuery};
use crate::shared::errors::AppError;
use crate::shared::shared_structs::GenericResponse;
use crate::AppState;

/// Registers checkout, report and health routes on the given scope.
///
/// Each path answers other methods with 405. Body and query parse failures are
/// turned into [`AppError::BadRequest`] so they share the error envelope.
/// Checkout bodies are decoded as JSON whatever their Content-Type says.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .content_type_required(false)
            .error_handler(|err, _req| {
                AppError::BadRequest(format!("Invalid request body: {}", err)).into()
            }),
    )
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {}", err)).into()
    }))
    .service(
        web::resource("/checkout")
            .route(web::post().to(checkout))
            .default_service(web::route().to(method_not_allowed)),
    )
    // "hari-ini" is the path older clients use for today
    .service(
        web::resource(["/report/today", "/report/hari-ini"])
            .route(web::get().to(today_report))
            .default_service(web::route().to(method_not_allowed)),
    )
    .service(
        web::resource("/report")
            .route(web::get().to(range_report))
            .default_service(web::route().to(method_not_allowed)),
    )
    .service(
        web::resource("/health")
            .route(web::get().to(health))
            .default_service(web::route().to(method_not_allowed)),
    );
}

/// Converts a cart into a recorded transaction.
///
/// Responds with the created transaction, or 500 carrying the failure text
/// (unknown product, persistence error) with nothing written.
#[instrument(skip_all, fields(items = request.items.len()))]
pub async fn checkout(
    data: web::Data<AppState>,
    request: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let transaction = data.service.checkout(request.into_inner().items).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[instrument(skip_all)]
pub async fn today_report(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let report = data.service.today_report().await?;
    Ok(HttpResponse::Ok().json(report))
}

/// `start_date` / `end_date` as `YYYY-MM-DD`, end inclusive.
#[instrument(skip(data))]
pub async fn range_report(
    data: web::Data<AppState>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let report = data.service.range_report(&query).await?;
    Ok(HttpResponse::Ok().json(report))
}

pub async fn health(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    data.service.health().await?;
    Ok(HttpResponse::Ok().json(GenericResponse::success("ok")))
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(GenericResponse::error("Method not allowed"))
}
