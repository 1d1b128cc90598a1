use rust_decimal::Decimal;

use super::models::{BalanceFigures, BalanceTotals, MonthlyBalanceRow};
use crate::aggregation::{percentage, tally_by, Tally};
use crate::period::{DateRange, MonthKey};
use crate::transaction::{Channel, ExpenseType, Transaction, TransactionKind};

/// Longest range a single balance request may cover
pub const MAX_BALANCE_MONTHS: i64 = 240;

/// Which balance column a transaction feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Column {
    Income(Channel),
    Expense(ExpenseType),
}

fn column(t: &Transaction) -> Column {
    match t.kind {
        TransactionKind::Income { channel } => Column::Income(channel),
        TransactionKind::Expense { expense_type, .. } => Column::Expense(expense_type),
    }
}

impl BalanceFigures {
    fn from_columns(lookup: impl Fn(Column) -> Tally) -> Self {
        let retail = lookup(Column::Income(Channel::Retail));
        let wholesale = lookup(Column::Income(Channel::Wholesale));
        let express = lookup(Column::Income(Channel::Express));
        let ordinary = lookup(Column::Expense(ExpenseType::Ordinary));
        let extraordinary = lookup(Column::Expense(ExpenseType::Extraordinary));

        Self::derive(retail, wholesale, express, ordinary, extraordinary)
    }

    fn derive(
        retail: Tally,
        wholesale: Tally,
        express: Tally,
        ordinary: Tally,
        extraordinary: Tally,
    ) -> Self {
        let total_income = retail.amount + wholesale.amount + express.amount;
        let net_without_extraordinary = total_income - ordinary.amount;
        let net_with_extraordinary = net_without_extraordinary - extraordinary.amount;

        Self {
            retail_income: retail.amount,
            retail_count: retail.count,
            wholesale_income: wholesale.amount,
            wholesale_count: wholesale.count,
            express_income: express.amount,
            express_count: express.count,
            total_income,
            ordinary_expense: ordinary.amount,
            ordinary_count: ordinary.count,
            extraordinary_expense: extraordinary.amount,
            extraordinary_count: extraordinary.count,
            net_without_extraordinary,
            net_with_extraordinary,
            net_without_extraordinary_pct: signed_percentage(
                net_without_extraordinary,
                total_income,
            ),
            net_with_extraordinary_pct: signed_percentage(net_with_extraordinary, total_income),
        }
    }
}

/// Net results can be negative; the share keeps the sign.
fn signed_percentage(net: Decimal, income: Decimal) -> Decimal {
    if net < Decimal::ZERO {
        -percentage(-net, income)
    } else {
        percentage(net, income)
    }
}

/// One row per calendar month of the range, empty months included.
///
/// Transactions outside the range are ignored.
pub fn calculate_monthly_balance(
    transactions: &[Transaction],
    range: &DateRange,
) -> Vec<MonthlyBalanceRow> {
    let tallies = tally_by(
        transactions.iter().filter(|t| range.contains(t.occurred_on)),
        |t| (MonthKey::from_date(t.occurred_on), column(t)),
    );

    range
        .months()
        .into_iter()
        .map(|month| MonthlyBalanceRow {
            month: month.key(),
            label: month.label(),
            figures: BalanceFigures::from_columns(|col| {
                tallies.get(&(month, col)).copied().unwrap_or_default()
            }),
        })
        .collect()
}

/// Sum every row and re-derive nets and percentages from the sums.
pub fn balance_totals(rows: &[MonthlyBalanceRow]) -> BalanceTotals {
    let mut retail = Tally::default();
    let mut wholesale = Tally::default();
    let mut express = Tally::default();
    let mut ordinary = Tally::default();
    let mut extraordinary = Tally::default();

    for row in rows {
        let f = &row.figures;
        retail.add(f.retail_income, f.retail_count);
        wholesale.add(f.wholesale_income, f.wholesale_count);
        express.add(f.express_income, f.express_count);
        ordinary.add(f.ordinary_expense, f.ordinary_count);
        extraordinary.add(f.extraordinary_expense, f.extraordinary_count);
    }

    BalanceFigures::derive(retail, wholesale, express, ordinary, extraordinary)
}
