use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::models::Category;

/// Key of the bucket that collects records with no usable grouping key
pub const UNCATEGORIZED_KEY: &str = "uncategorized";
/// Label of the bucket that collects records with no usable grouping key
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// What to group transactions by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Category,
    ExpenseType,
    Month,
    Channel,
}

/// Denominator for percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalBasis {
    /// Sum of the transactions being aggregated
    OwnTotal,
    /// A total computed from a different transaction set
    Explicit(Decimal),
}

/// One grouped result row
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBucket {
    /// Grouping key (category id, `2024-03`, `ordinary`, `retail`, or `uncategorized`)
    #[schema(example = "2024-03")]
    pub key: String,
    /// Display label
    #[schema(example = "Mar 2024")]
    pub label: String,
    /// Sum of amounts in the bucket
    #[schema(example = 150.00)]
    pub total_amount: Decimal,
    /// Number of transactions in the bucket
    #[schema(example = 2)]
    pub count: i64,
    /// Share of the basis, 2 decimal places
    #[schema(example = 42.86)]
    pub percentage_of_total: Decimal,
}

/// Running sum and count for one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub amount: Decimal,
    pub count: i64,
}

impl Tally {
    pub fn add(&mut self, amount: Decimal, count: i64) {
        self.amount += amount;
        self.count += count;
    }
}

/// Category names used to label category buckets
#[derive(Debug, Clone, Default)]
pub struct BucketLabels {
    category_names: HashMap<Uuid, String>,
}

impl BucketLabels {
    /// Inactive categories keep labelling their history.
    pub fn from_categories(categories: &[Category]) -> Self {
        Self {
            category_names: categories
                .iter()
                .map(|c| (c.id, c.name.clone()))
                .collect(),
        }
    }

    pub fn category_name(&self, id: &Uuid) -> Option<&str> {
        self.category_names.get(id).map(String::as_str)
    }
}

/// Which total category percentages are measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PercentBasis {
    /// Share of total spend in the window
    #[default]
    Expenses,
    /// Spend as a share of income in the window
    Income,
}
