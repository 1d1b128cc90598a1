use chrono::{FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::aggregation::{AggregateBucket, PercentBasis};
use crate::balance::{BalanceTotals, MonthlyBalanceRow};
use crate::config::ReportSettings;
use crate::overview::OverviewSummary;
use crate::permission::PermissionScope;

/// Per-request inputs every report needs, passed explicitly
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub scope: PermissionScope,
    pub utc_offset: FixedOffset,
    pub fetch_timeout: Duration,
}

impl ReportContext {
    pub fn new(scope: PermissionScope, settings: &ReportSettings) -> Self {
        Self {
            scope,
            utc_offset: settings.utc_offset,
            fetch_timeout: settings.fetch_timeout,
        }
    }
}

/// Optional inclusive date bounds; give both or neither
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    /// First day, inclusive (YYYY-MM-DD)
    #[param(example = "2024-01-01")]
    pub start_date: Option<NaiveDate>,
    /// Last day, inclusive (YYYY-MM-DD)
    #[param(example = "2024-12-31")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BalanceQuery {
    /// First day, inclusive (YYYY-MM-DD)
    #[param(example = "2024-01-01")]
    pub start_date: NaiveDate,
    /// Last day, inclusive (YYYY-MM-DD)
    #[param(example = "2024-12-31")]
    pub end_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalyticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Percentage denominator: expenses (default) or income
    #[param(example = "expenses")]
    pub basis: Option<PercentBasis>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAnalyticsQuery {
    /// Only spend in this category
    pub category_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Grouped analytics
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub data: Vec<AggregateBucket>,
    /// Sum of every bucket
    #[schema(example = 350.00)]
    pub total_amount: Decimal,
    /// Records left out because they could not be normalized
    #[schema(example = 0)]
    pub skipped_records: usize,
}

impl AnalyticsResponse {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total_amount: Decimal::ZERO,
            skipped_records: 0,
        }
    }
}

/// Monthly sales balance with a totals row
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBalanceResponse {
    pub data: Vec<MonthlyBalanceRow>,
    pub totals: BalanceTotals,
    #[schema(example = 0)]
    pub skipped_records: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    #[serde(flatten)]
    pub summary: OverviewSummary,
    #[schema(example = 0)]
    pub skipped_records: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "connected")]
    pub database: String,
}
