use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Expense entry as stored, supplier name joined for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RawExpense {
    pub id: Uuid,
    pub amount: Decimal,
    pub expense_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    pub expense_type: Option<String>,
    pub description: Option<String>,
}

/// Sales order with its channel-tagged line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOrder {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub items: Vec<RawOrderItem>,
}

impl RawOrder {
    /// Delivery date when known, creation date otherwise.
    pub fn effective_at(&self) -> DateTime<Utc> {
        self.delivered_at.unwrap_or(self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOrderItem {
    pub id: Uuid,
    pub channel: String,
    pub amount: Decimal,
}

/// Order header row
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Order line item row
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub channel: String,
    pub amount: Decimal,
}

/// Expense category. Deactivation is soft: history keeps its label.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique category identifier
    pub id: Uuid,
    /// Category name
    #[schema(example = "Supplies")]
    pub name: String,
    /// False once the category has been deactivated
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}
