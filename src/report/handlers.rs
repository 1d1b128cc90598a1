use actix_web::{get, web, HttpResponse};
use validator::Validate;

use crate::config::ReportSettings;
use crate::errors::{AppError, ErrorResponse};
use crate::expense::{ExpenseListQuery, PaginatedExpenseResponse};
use crate::extractors::AuthenticatedUser;
use crate::period::DateRange;
use crate::store::models::Category;
use crate::store::ReportStore;

use super::models::{
    AnalyticsResponse, BalanceQuery, CategoryAnalyticsQuery, DateRangeQuery, HealthResponse,
    MonthlyAnalyticsQuery, MonthlyBalanceResponse, OverviewResponse, ReportContext,
};
use super::service::ReportService;

fn context(auth: &AuthenticatedUser, settings: &ReportSettings) -> ReportContext {
    ReportContext::new(auth.scope(), settings)
}

/// Register report routes. Mount under `/reports`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(err.to_string()).into()
    }))
    .service(get_balance_monthly)
    .service(get_category_analytics)
    .service(get_type_analytics)
    .service(get_monthly_analytics)
    .service(get_channel_analytics)
    .service(get_overview)
    .service(list_expenses)
    .service(list_categories);
}

/// GET /health - Verify store connectivity
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health_check(store: web::Data<dyn ReportStore>) -> HttpResponse {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "healthy".to_string(),
            database: "connected".to_string(),
        }),
        Err(_) => HttpResponse::ServiceUnavailable().json(HealthResponse {
            status: "unhealthy".to_string(),
            database: "disconnected".to_string(),
        }),
    }
}

/// GET /reports/balance/monthly - Monthly sales balance for an inclusive range
#[utoipa::path(
    get,
    path = "/reports/balance/monthly",
    tag = "Reports",
    params(BalanceQuery),
    responses(
        (status = 200, description = "One row per month plus totals", body = MonthlyBalanceResponse),
        (status = 400, description = "Invalid or overlong date range", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 503, description = "Store fetch timed out", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/balance/monthly")]
pub async fn get_balance_monthly(
    store: web::Data<dyn ReportStore>,
    settings: web::Data<ReportSettings>,
    auth: AuthenticatedUser,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, AppError> {
    let ctx = context(&auth, &settings);
    let response =
        ReportService::get_balance_monthly(store.get_ref(), &ctx, query.start_date, query.end_date)
            .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /reports/analytics/categories - Spend per category
#[utoipa::path(
    get,
    path = "/reports/analytics/categories",
    tag = "Reports",
    params(CategoryAnalyticsQuery),
    responses(
        (status = 200, description = "Category buckets, largest first", body = AnalyticsResponse),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/analytics/categories")]
pub async fn get_category_analytics(
    store: web::Data<dyn ReportStore>,
    settings: web::Data<ReportSettings>,
    auth: AuthenticatedUser,
    query: web::Query<CategoryAnalyticsQuery>,
) -> Result<HttpResponse, AppError> {
    let range = DateRange::from_bounds(query.start_date, query.end_date)?;
    let ctx = context(&auth, &settings);

    let response = ReportService::get_category_analytics(
        store.get_ref(),
        &ctx,
        range,
        query.basis.unwrap_or_default(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /reports/analytics/types - Spend per expense type
#[utoipa::path(
    get,
    path = "/reports/analytics/types",
    tag = "Reports",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Ordinary and extraordinary buckets", body = AnalyticsResponse),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/analytics/types")]
pub async fn get_type_analytics(
    store: web::Data<dyn ReportStore>,
    settings: web::Data<ReportSettings>,
    auth: AuthenticatedUser,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let range = DateRange::from_bounds(query.start_date, query.end_date)?;
    let ctx = context(&auth, &settings);

    let response = ReportService::get_type_analytics(store.get_ref(), &ctx, range).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /reports/analytics/monthly - Spend per month, optionally for one category
#[utoipa::path(
    get,
    path = "/reports/analytics/monthly",
    tag = "Reports",
    params(MonthlyAnalyticsQuery),
    responses(
        (status = 200, description = "Month buckets, oldest first", body = AnalyticsResponse),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/analytics/monthly")]
pub async fn get_monthly_analytics(
    store: web::Data<dyn ReportStore>,
    settings: web::Data<ReportSettings>,
    auth: AuthenticatedUser,
    query: web::Query<MonthlyAnalyticsQuery>,
) -> Result<HttpResponse, AppError> {
    let range = DateRange::from_bounds(query.start_date, query.end_date)?;
    let ctx = context(&auth, &settings);

    let response =
        ReportService::get_monthly_analytics(store.get_ref(), &ctx, query.category_id, range)
            .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /reports/analytics/channels - Income per sales channel
#[utoipa::path(
    get,
    path = "/reports/analytics/channels",
    tag = "Reports",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Channel buckets, largest first", body = AnalyticsResponse),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/analytics/channels")]
pub async fn get_channel_analytics(
    store: web::Data<dyn ReportStore>,
    settings: web::Data<ReportSettings>,
    auth: AuthenticatedUser,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let range = DateRange::from_bounds(query.start_date, query.end_date)?;
    let ctx = context(&auth, &settings);

    let response = ReportService::get_channel_analytics(store.get_ref(), &ctx, range).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /reports/overview - Top-level spend summary
#[utoipa::path(
    get,
    path = "/reports/overview",
    tag = "Reports",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Spend summary", body = OverviewResponse),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/overview")]
pub async fn get_overview(
    store: web::Data<dyn ReportStore>,
    settings: web::Data<ReportSettings>,
    auth: AuthenticatedUser,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let range = DateRange::from_bounds(query.start_date, query.end_date)?;
    let ctx = context(&auth, &settings);

    let response = ReportService::get_overview(store.get_ref(), &ctx, range).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /reports/expenses - Paginated, filtered, sorted expense records
#[utoipa::path(
    get,
    path = "/reports/expenses",
    tag = "Reports",
    params(ExpenseListQuery),
    responses(
        (status = 200, description = "Page of expenses", body = PaginatedExpenseResponse),
        (status = 400, description = "Invalid filters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/expenses")]
pub async fn list_expenses(
    store: web::Data<dyn ReportStore>,
    settings: web::Data<ReportSettings>,
    auth: AuthenticatedUser,
    query: web::Query<ExpenseListQuery>,
) -> Result<HttpResponse, AppError> {
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let ctx = context(&auth, &settings);
    let page = ReportService::get_paginated_expenses(
        store.get_ref(),
        &ctx,
        &query,
        settings.max_page_size,
    )
    .await?;

    Ok(HttpResponse::Ok().json(PaginatedExpenseResponse::from(page)))
}

/// GET /reports/categories - Categories visible to the caller
#[utoipa::path(
    get,
    path = "/reports/categories",
    tag = "Reports",
    responses(
        (status = 200, description = "Visible categories", body = Vec<Category>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/categories")]
pub async fn list_categories(
    store: web::Data<dyn ReportStore>,
    settings: web::Data<ReportSettings>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let ctx = context(&auth, &settings);
    let categories = ReportService::list_visible_categories(store.get_ref(), &ctx).await?;

    Ok(HttpResponse::Ok().json(categories))
}
