use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// Sales balance for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBalanceRow {
    /// Month key
    #[schema(example = "2024-03")]
    pub month: String,
    /// Display label
    #[schema(example = "Mar 2024")]
    pub label: String,
    #[serde(flatten)]
    pub figures: BalanceFigures,
}

/// Income, expense and net figures shared by monthly rows and totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceFigures {
    #[schema(example = 500.00)]
    pub retail_income: Decimal,
    pub retail_count: i64,
    pub wholesale_income: Decimal,
    pub wholesale_count: i64,
    pub express_income: Decimal,
    pub express_count: i64,
    /// Sum of the three channel incomes
    #[schema(example = 500.00)]
    pub total_income: Decimal,
    #[schema(example = 150.00)]
    pub ordinary_expense: Decimal,
    pub ordinary_count: i64,
    #[schema(example = 200.00)]
    pub extraordinary_expense: Decimal,
    pub extraordinary_count: i64,
    /// Income minus ordinary expense
    #[schema(example = 350.00)]
    pub net_without_extraordinary: Decimal,
    /// Net without extraordinary, minus extraordinary expense
    #[schema(example = 150.00)]
    pub net_with_extraordinary: Decimal,
    /// Net without extraordinary as % of income (0 when there is no income)
    #[schema(example = 70.00)]
    pub net_without_extraordinary_pct: Decimal,
    /// Net with extraordinary as % of income (0 when there is no income)
    #[schema(example = 30.00)]
    pub net_with_extraordinary_pct: Decimal,
}

/// Totals row: every monthly figure summed, percentages re-derived
pub type BalanceTotals = BalanceFigures;
