use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::aggregation::{AggregateBucket, PercentBasis};
use crate::balance::{BalanceFigures, MonthlyBalanceRow};
use crate::errors::ErrorResponse;
use crate::expense::{ExpenseListItem, NamedRef, PaginatedExpenseResponse};
use crate::overview::{OverviewSummary, TypeShare, TypeSplit};
use crate::report::models::{
    AnalyticsResponse, HealthResponse, MonthlyBalanceResponse, OverviewResponse,
};
use crate::store::models::Category;
use crate::transaction::{Channel, ExpenseType};

/// Security scheme modifier for Bearer token authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token carrying a permissions claim"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Balance Reports API",
        version = "1.0.0",
        description = "Permission-scoped financial aggregation and reporting",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Reports", description = "Balances, analytics and expense listings")
    ),
    paths(
        crate::report::handlers::health_check,
        crate::report::handlers::get_balance_monthly,
        crate::report::handlers::get_category_analytics,
        crate::report::handlers::get_type_analytics,
        crate::report::handlers::get_monthly_analytics,
        crate::report::handlers::get_channel_analytics,
        crate::report::handlers::get_overview,
        crate::report::handlers::list_expenses,
        crate::report::handlers::list_categories,
    ),
    components(
        schemas(
            // Error response
            ErrorResponse,
            HealthResponse,
            // Shared enums
            Channel,
            ExpenseType,
            PercentBasis,
            // Report schemas
            AggregateBucket,
            AnalyticsResponse,
            BalanceFigures,
            MonthlyBalanceRow,
            MonthlyBalanceResponse,
            TypeShare,
            TypeSplit,
            OverviewSummary,
            OverviewResponse,
            // Expense list schemas
            NamedRef,
            ExpenseListItem,
            PaginatedExpenseResponse,
            Category,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;
