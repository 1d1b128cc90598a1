use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{BTreeMap, HashMap};

use super::models::{
    AggregateBucket, BucketLabels, Dimension, Tally, TotalBasis, UNCATEGORIZED_KEY,
    UNCATEGORIZED_LABEL,
};
use crate::period::MonthKey;
use crate::transaction::Transaction;

/// Decimal places kept on percentages
pub const PERCENT_SCALE: u32 = 2;

/// `part / basis * 100`, or zero when the basis is not positive.
pub fn percentage(part: Decimal, basis: Decimal) -> Decimal {
    if basis <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (part / basis * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum amounts and counts per key.
pub fn tally_by<'a, K, I, F>(transactions: I, key_fn: F) -> BTreeMap<K, Tally>
where
    K: Ord,
    I: IntoIterator<Item = &'a Transaction>,
    F: Fn(&Transaction) -> K,
{
    let mut tallies: BTreeMap<K, Tally> = BTreeMap::new();
    for t in transactions {
        tallies
            .entry(key_fn(t))
            .or_default()
            .add(t.amount, t.count);
    }
    tallies
}

pub fn sum_amounts<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    transactions.into_iter().map(|t| t.amount).sum()
}

/// Group key and label for a transaction. `None` routes to the sentinel bucket.
fn bucket_key(t: &Transaction, dimension: Dimension, labels: &BucketLabels) -> Option<(String, String)> {
    match dimension {
        Dimension::Category => t.category_id().and_then(|id| {
            labels
                .category_name(&id)
                .map(|name| (id.to_string(), name.to_string()))
        }),
        Dimension::ExpenseType => t
            .expense_type()
            .map(|et| (et.as_str().to_string(), et.label().to_string())),
        Dimension::Month => {
            let month = MonthKey::from_date(t.occurred_on);
            Some((month.key(), month.label()))
        }
        Dimension::Channel => t
            .channel()
            .map(|c| (c.as_str().to_string(), c.label().to_string())),
    }
}

/// Group transactions by a dimension and compute sum, count and share.
///
/// Nothing is dropped: records without a usable key land in the
/// `uncategorized` bucket. Buckets come back ranked by amount descending,
/// ties by label then key.
pub fn aggregate_by(
    transactions: &[Transaction],
    dimension: Dimension,
    basis: TotalBasis,
    labels: &BucketLabels,
) -> Vec<AggregateBucket> {
    let mut groups: HashMap<String, (String, Tally)> = HashMap::new();

    for t in transactions {
        let (key, label) = bucket_key(t, dimension, labels)
            .unwrap_or_else(|| (UNCATEGORIZED_KEY.to_string(), UNCATEGORIZED_LABEL.to_string()));
        groups
            .entry(key)
            .or_insert_with(|| (label, Tally::default()))
            .1
            .add(t.amount, t.count);
    }

    let mut buckets: Vec<AggregateBucket> = groups
        .into_iter()
        .map(|(key, (label, tally))| AggregateBucket {
            key,
            label,
            total_amount: tally.amount,
            count: tally.count,
            percentage_of_total: Decimal::ZERO,
        })
        .collect();
    rank(&mut buckets);

    match basis {
        TotalBasis::OwnTotal => {
            let amounts: Vec<Decimal> = buckets.iter().map(|b| b.total_amount).collect();
            for (bucket, share) in buckets.iter_mut().zip(allocate_percentages(&amounts)) {
                bucket.percentage_of_total = share;
            }
        }
        TotalBasis::Explicit(total) => {
            for bucket in buckets.iter_mut() {
                bucket.percentage_of_total = percentage(bucket.total_amount, total);
            }
        }
    }

    buckets
}

/// Each amount's share of their sum, summing to exactly 100 when the sum is
/// positive.
///
/// Shares are floored to [`PERCENT_SCALE`] places and the leftover units go
/// to the largest remainders. Equal remainders favour the earlier amount.
pub fn allocate_percentages(amounts: &[Decimal]) -> Vec<Decimal> {
    let total: Decimal = amounts.iter().sum();
    if total <= Decimal::ZERO {
        return vec![Decimal::ZERO; amounts.len()];
    }

    let unit = Decimal::new(1, PERCENT_SCALE);
    let mut shares = Vec::with_capacity(amounts.len());
    let mut remainders = Vec::with_capacity(amounts.len());
    for (index, amount) in amounts.iter().enumerate() {
        let exact = *amount / total * Decimal::ONE_HUNDRED;
        let floored =
            exact.round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::ToNegativeInfinity);
        shares.push(floored);
        remainders.push((index, exact - floored));
    }

    let allocated: Decimal = shares.iter().sum();
    let missing = ((Decimal::ONE_HUNDRED - allocated) / unit)
        .round()
        .to_usize()
        .unwrap_or(0)
        .min(amounts.len());

    // Stable sort keeps input order among equal remainders
    remainders.sort_by(|a, b| b.1.cmp(&a.1));
    for (index, _) in remainders.into_iter().take(missing) {
        shares[index] += unit;
    }
    shares
}

/// Amount descending, then label, then key.
pub fn rank(buckets: &mut [AggregateBucket]) {
    buckets.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.key.cmp(&b.key))
    });
}

/// Reorder by key ascending, for month buckets on a time axis.
pub fn sort_chronologically(buckets: &mut [AggregateBucket]) {
    buckets.sort_by(|a, b| a.key.cmp(&b.key));
}
