use rust_decimal::{Decimal, RoundingStrategy};

use super::models::{OverviewSummary, TypeShare, TypeSplit};
use crate::aggregation::{
    aggregate_by, allocate_percentages, sort_chronologically, tally_by, BucketLabels, Dimension,
    TotalBasis,
    PERCENT_SCALE,
};
use crate::transaction::{ExpenseType, Transaction};

/// How many category buckets the overview keeps
pub const TOP_CATEGORY_LIMIT: usize = 5;

/// Summarize spend over the expense transactions in `transactions`.
///
/// Income rows are ignored. An empty input gives an all-zero summary.
pub fn summarize(transactions: &[Transaction], labels: &BucketLabels) -> OverviewSummary {
    let expenses: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.is_expense())
        .cloned()
        .collect();

    let by_type = tally_by(&expenses, |t| t.expense_type().unwrap_or_default());
    let ordinary = by_type
        .get(&ExpenseType::Ordinary)
        .copied()
        .unwrap_or_default();
    let extraordinary = by_type
        .get(&ExpenseType::Extraordinary)
        .copied()
        .unwrap_or_default();

    let total_spend = ordinary.amount + extraordinary.amount;
    let total_count = ordinary.count + extraordinary.count;

    let mut top_categories =
        aggregate_by(&expenses, Dimension::Category, TotalBasis::OwnTotal, labels);
    top_categories.truncate(TOP_CATEGORY_LIMIT);

    let mut by_month = aggregate_by(&expenses, Dimension::Month, TotalBasis::OwnTotal, labels);
    sort_chronologically(&mut by_month);

    let split = allocate_percentages(&[ordinary.amount, extraordinary.amount]);

    OverviewSummary {
        total_spend,
        total_count,
        average_spend: average(total_spend, total_count),
        ordinary_vs_extraordinary: TypeSplit {
            ordinary: TypeShare {
                amount: ordinary.amount,
                pct: split[0],
            },
            extraordinary: TypeShare {
                amount: extraordinary.amount,
                pct: split[1],
            },
        },
        top_categories,
        by_month,
    }
}

fn average(total: Decimal, count: i64) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count))
        .round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Channel, TransactionKind};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn spend(month: u32, amount: i64, expense_type: ExpenseType) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            source_id: Uuid::new_v4(),
            occurred_on: NaiveDate::from_ymd_opt(2024, month, 10).unwrap(),
            amount: Decimal::from(amount),
            count: 1,
            kind: TransactionKind::Expense {
                expense_type,
                category_id: None,
                payment_method_id: None,
            },
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let summary = summarize(&[], &BucketLabels::default());

        assert_eq!(summary, OverviewSummary::default());
        assert_eq!(summary.average_spend, Decimal::ZERO);
    }

    #[test]
    fn test_split_and_average() {
        let txns = vec![
            spend(3, 100, ExpenseType::Ordinary),
            spend(3, 50, ExpenseType::Ordinary),
            spend(3, 200, ExpenseType::Extraordinary),
        ];

        let summary = summarize(&txns, &BucketLabels::default());

        assert_eq!(summary.total_spend, Decimal::from(350));
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.average_spend, Decimal::new(11667, 2));
        assert_eq!(summary.ordinary_vs_extraordinary.ordinary.pct, Decimal::new(4286, 2));
        assert_eq!(
            summary.ordinary_vs_extraordinary.extraordinary.pct,
            Decimal::new(5714, 2)
        );
    }

    #[test]
    fn test_income_is_ignored() {
        let sale = Transaction {
            id: Uuid::new_v4(),
            source_id: Uuid::new_v4(),
            occurred_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            amount: Decimal::from(500),
            count: 1,
            kind: TransactionKind::Income {
                channel: Channel::Retail,
            },
        };

        let summary = summarize(
            &[sale, spend(3, 10, ExpenseType::Ordinary)],
            &BucketLabels::default(),
        );

        assert_eq!(summary.total_spend, Decimal::from(10));
        assert_eq!(summary.total_count, 1);
    }

    #[test]
    fn test_months_come_back_oldest_first() {
        let txns = vec![
            spend(5, 10, ExpenseType::Ordinary),
            spend(1, 90, ExpenseType::Ordinary),
        ];

        let summary = summarize(&txns, &BucketLabels::default());
        let keys: Vec<&str> = summary.by_month.iter().map(|b| b.key.as_str()).collect();

        assert_eq!(keys, vec!["2024-01", "2024-05"]);
    }
}
