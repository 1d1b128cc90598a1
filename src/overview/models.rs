use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::aggregation::AggregateBucket;

/// Amount of one expense type and its share of total spend
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeShare {
    #[schema(example = 150.00)]
    pub amount: Decimal,
    #[schema(example = 42.86)]
    pub pct: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeSplit {
    pub ordinary: TypeShare,
    pub extraordinary: TypeShare,
}

/// Top-level spend summary for a window
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSummary {
    #[schema(example = 350.00)]
    pub total_spend: Decimal,
    #[schema(example = 3)]
    pub total_count: i64,
    /// Spend per expense record, 2 decimal places
    #[schema(example = 116.67)]
    pub average_spend: Decimal,
    pub ordinary_vs_extraordinary: TypeSplit,
    /// Largest categories by spend
    pub top_categories: Vec<AggregateBucket>,
    /// Spend per month, oldest first
    pub by_month: Vec<AggregateBucket>,
}
