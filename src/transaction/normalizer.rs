use chrono::FixedOffset;
use rust_decimal::Decimal;
use tracing::warn;

use super::models::{
    Channel, ExpenseType, NormalizeError, Normalized, Transaction, TransactionKind,
};
use crate::period::local_date;
use crate::store::models::{RawExpense, RawOrder};

/// Convert one expense row into an expense transaction.
pub fn normalize_expense(
    raw: &RawExpense,
    offset: &FixedOffset,
) -> Result<Transaction, NormalizeError> {
    if raw.amount <= Decimal::ZERO {
        return Err(NormalizeError::InvalidAmount {
            record_id: raw.id,
            amount: raw.amount,
        });
    }

    Ok(Transaction {
        id: raw.id,
        source_id: raw.id,
        occurred_on: local_date(raw.expense_date, offset),
        amount: raw.amount,
        count: 1,
        kind: TransactionKind::Expense {
            expense_type: ExpenseType::from_stored(raw.expense_type.as_deref()),
            category_id: raw.category_id,
            payment_method_id: raw.payment_method_id,
        },
    })
}

/// Convert an order into one income transaction per line item.
///
/// Every item shares the order's effective date. Items fail independently.
pub fn normalize_order(
    raw: &RawOrder,
    offset: &FixedOffset,
) -> Vec<Result<Transaction, NormalizeError>> {
    let occurred_on = local_date(raw.effective_at(), offset);

    raw.items
        .iter()
        .map(|item| {
            if item.amount <= Decimal::ZERO {
                return Err(NormalizeError::InvalidAmount {
                    record_id: item.id,
                    amount: item.amount,
                });
            }
            let channel =
                Channel::parse(&item.channel).ok_or_else(|| NormalizeError::UnknownChannel {
                    record_id: item.id,
                    channel: item.channel.clone(),
                })?;

            Ok(Transaction {
                id: item.id,
                source_id: raw.id,
                occurred_on,
                amount: item.amount,
                count: 1,
                kind: TransactionKind::Income { channel },
            })
        })
        .collect()
}

/// Normalize a fetched working set, skipping and logging bad records.
pub fn normalize_snapshot(
    expenses: &[RawExpense],
    orders: &[RawOrder],
    offset: &FixedOffset,
) -> Normalized {
    let mut normalized = Normalized::default();

    let results = expenses
        .iter()
        .map(|raw| normalize_expense(raw, offset))
        .chain(orders.iter().flat_map(|raw| normalize_order(raw, offset)));

    for result in results {
        match result {
            Ok(transaction) => normalized.transactions.push(transaction),
            Err(e) => {
                warn!(record_id = %e.record_id(), "Skipping record: {e}");
                normalized.skipped.push(e);
            }
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::RawOrderItem;
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn expense(amount: Decimal, expense_type: Option<&str>) -> RawExpense {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        RawExpense {
            id: Uuid::new_v4(),
            amount,
            expense_date: at,
            created_at: at,
            category_id: Some(Uuid::new_v4()),
            payment_method_id: None,
            supplier_id: None,
            supplier_name: None,
            expense_type: expense_type.map(str::to_string),
            description: None,
        }
    }

    fn order(delivered: bool, items: Vec<(&str, Decimal)>) -> RawOrder {
        RawOrder {
            id: Uuid::new_v4(),
            created_at: Utc.with_ymd_and_hms(2024, 2, 28, 18, 0, 0).unwrap(),
            delivered_at: delivered.then(|| Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap()),
            items: items
                .into_iter()
                .map(|(channel, amount)| RawOrderItem {
                    id: Uuid::new_v4(),
                    channel: channel.to_string(),
                    amount,
                })
                .collect(),
        }
    }

    #[test]
    fn test_expense_keeps_amount_and_type() {
        let raw = expense(Decimal::new(10050, 2), Some("extraordinary"));
        let t = normalize_expense(&raw, &utc()).expect("Should normalize");

        assert_eq!(t.amount, Decimal::new(10050, 2));
        assert_eq!(t.expense_type(), Some(ExpenseType::Extraordinary));
        assert_eq!(t.category_id(), raw.category_id);
        assert_eq!(t.occurred_on, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_missing_expense_type_defaults_to_ordinary() {
        let raw = expense(Decimal::ONE, None);
        let t = normalize_expense(&raw, &utc()).unwrap();
        assert_eq!(t.expense_type(), Some(ExpenseType::Ordinary));
    }

    #[test]
    fn test_non_positive_expense_is_rejected() {
        for amount in [Decimal::ZERO, Decimal::NEGATIVE_ONE] {
            let raw = expense(amount, None);
            let err = normalize_expense(&raw, &utc()).unwrap_err();
            assert_eq!(
                err,
                NormalizeError::InvalidAmount {
                    record_id: raw.id,
                    amount
                }
            );
        }
    }

    #[test]
    fn test_order_items_become_income_on_delivery_date() {
        let raw = order(true, vec![("retail", Decimal::TEN), ("Wholesale", Decimal::ONE)]);
        let results = normalize_order(&raw, &utc());

        assert_eq!(results.len(), 2);
        for result in &results {
            let t = result.as_ref().expect("Item should normalize");
            assert!(t.is_income());
            assert_eq!(t.source_id, raw.id);
            assert_eq!(t.occurred_on, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        }
        assert_eq!(results[1].as_ref().unwrap().channel(), Some(Channel::Wholesale));
    }

    #[test]
    fn test_undelivered_order_falls_back_to_creation_date() {
        let raw = order(false, vec![("express", Decimal::TEN)]);
        let t = normalize_order(&raw, &utc()).remove(0).unwrap();
        assert_eq!(t.occurred_on, NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
    }

    #[test]
    fn test_snapshot_skips_bad_records_and_keeps_the_rest() {
        let expenses = vec![expense(Decimal::TEN, None), expense(Decimal::ZERO, None)];
        let orders = vec![order(true, vec![("retail", Decimal::TEN), ("drone", Decimal::TEN)])];

        let normalized = normalize_snapshot(&expenses, &orders, &utc());

        assert_eq!(normalized.transactions.len(), 2);
        assert_eq!(normalized.skipped.len(), 2);
        assert_eq!(normalized.expenses().count(), 1);
        assert_eq!(normalized.incomes().count(), 1);
        assert!(normalized
            .skipped
            .iter()
            .any(|e| matches!(e, NormalizeError::UnknownChannel { channel, .. } if channel == "drone")));
    }
}
