pub mod models;
pub mod service;

pub use models::{BalanceFigures, BalanceTotals, MonthlyBalanceRow};
pub use service::{balance_totals, calculate_monthly_balance, MAX_BALANCE_MONTHS};
