pub mod models;
pub mod normalizer;

pub use models::{
    Channel, ExpenseType, NormalizeError, Normalized, Transaction, TransactionKind,
};
pub use normalizer::{normalize_expense, normalize_order, normalize_snapshot};
