use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Sales route of an order line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Retail,
    Wholesale,
    Express,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Retail, Channel::Wholesale, Channel::Express];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Retail => "retail",
            Channel::Wholesale => "wholesale",
            Channel::Express => "express",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Channel::Retail => "Retail",
            Channel::Wholesale => "Wholesale",
            Channel::Express => "Express",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retail" => Some(Channel::Retail),
            "wholesale" => Some(Channel::Wholesale),
            "express" => Some(Channel::Express),
            _ => None,
        }
    }
}

/// Expense classification
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    /// Recurring operational outflow
    #[default]
    Ordinary,
    /// Non-recurring outflow, excluded from the core net result
    Extraordinary,
}

impl ExpenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Ordinary => "ordinary",
            ExpenseType::Extraordinary => "extraordinary",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseType::Ordinary => "Ordinary",
            ExpenseType::Extraordinary => "Extraordinary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordinary" => Some(ExpenseType::Ordinary),
            "extraordinary" => Some(ExpenseType::Extraordinary),
            _ => None,
        }
    }

    /// Stored type text: anything other than `extraordinary` counts as ordinary.
    pub fn from_stored(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or_default()
    }
}

/// Income or expense, with the fields each side requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income {
        channel: Channel,
    },
    Expense {
        expense_type: ExpenseType,
        category_id: Option<Uuid>,
        payment_method_id: Option<Uuid>,
    },
}

/// Canonical transaction every aggregator works on.
///
/// `amount` is always positive; direction lives in `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    /// Expense or order the transaction was derived from
    pub source_id: Uuid,
    pub occurred_on: NaiveDate,
    pub amount: Decimal,
    pub count: i64,
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        matches!(self.kind, TransactionKind::Income { .. })
    }

    pub fn is_expense(&self) -> bool {
        matches!(self.kind, TransactionKind::Expense { .. })
    }

    pub fn channel(&self) -> Option<Channel> {
        match self.kind {
            TransactionKind::Income { channel } => Some(channel),
            TransactionKind::Expense { .. } => None,
        }
    }

    pub fn expense_type(&self) -> Option<ExpenseType> {
        match self.kind {
            TransactionKind::Expense { expense_type, .. } => Some(expense_type),
            TransactionKind::Income { .. } => None,
        }
    }

    pub fn category_id(&self) -> Option<Uuid> {
        match self.kind {
            TransactionKind::Expense { category_id, .. } => category_id,
            TransactionKind::Income { .. } => None,
        }
    }

    pub fn payment_method_id(&self) -> Option<Uuid> {
        match self.kind {
            TransactionKind::Expense {
                payment_method_id, ..
            } => payment_method_id,
            TransactionKind::Income { .. } => None,
        }
    }
}

/// Why a raw record was left out of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    InvalidAmount { record_id: Uuid, amount: Decimal },
    UnknownChannel { record_id: Uuid, channel: String },
}

impl NormalizeError {
    pub fn record_id(&self) -> Uuid {
        match self {
            NormalizeError::InvalidAmount { record_id, .. } => *record_id,
            NormalizeError::UnknownChannel { record_id, .. } => *record_id,
        }
    }
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::InvalidAmount { record_id, amount } => {
                write!(f, "Invalid amount {amount} on record {record_id}")
            }
            NormalizeError::UnknownChannel { record_id, channel } => {
                write!(f, "Unknown channel '{channel}' on record {record_id}")
            }
        }
    }
}

/// Normalizer output: the usable transactions plus what was skipped
#[derive(Debug, Default)]
pub struct Normalized {
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<NormalizeError>,
}

impl Normalized {
    pub fn expenses(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| t.is_expense())
    }

    pub fn incomes(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| t.is_income())
    }
}
