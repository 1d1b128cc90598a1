use chrono::FixedOffset;
use std::collections::HashMap;
use uuid::Uuid;

use super::models::{ExpenseListItem, ExpenseListQuery, NamedRef};
use crate::errors::AppError;
use crate::period::{local_date, DateRange};
use crate::store::models::{Category, PaymentMethod, RawExpense};
use crate::store::RecordFilter;
use crate::transaction::ExpenseType;

/// Names used to decorate list rows
#[derive(Debug, Clone, Default)]
pub struct ListLookups {
    categories: HashMap<Uuid, String>,
    payment_methods: HashMap<Uuid, String>,
}

impl ListLookups {
    pub fn new(categories: Vec<Category>, payment_methods: Vec<PaymentMethod>) -> Self {
        Self {
            categories: categories.into_iter().map(|c| (c.id, c.name)).collect(),
            payment_methods: payment_methods
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect(),
        }
    }

    fn named(map: &HashMap<Uuid, String>, id: Option<Uuid>) -> Option<NamedRef> {
        let id = id?;
        map.get(&id).map(|name| NamedRef {
            id,
            name: name.clone(),
        })
    }
}

pub struct ExpenseService;

impl ExpenseService {
    /// Translate list query parameters into a store filter.
    ///
    /// The permission allow-list is not set here; callers apply the scope.
    pub fn build_filter(
        query: &ExpenseListQuery,
        utc_offset: &FixedOffset,
    ) -> Result<RecordFilter, AppError> {
        let range = DateRange::from_bounds(query.start_date, query.end_date)?;

        Ok(RecordFilter {
            window: range.map(|r| r.utc_window(utc_offset)),
            category_id: query.category_id,
            payment_method_id: query.payment_method_id,
            expense_type: query.expense_type,
            search: query.search.clone(),
            allowed_category_ids: None,
        })
    }

    /// Raw store row to list row. Unknown lookups render as `None`.
    pub fn to_list_item(
        raw: RawExpense,
        lookups: &ListLookups,
        utc_offset: &FixedOffset,
    ) -> ExpenseListItem {
        ExpenseListItem {
            id: raw.id,
            occurred_on: local_date(raw.expense_date, utc_offset),
            amount: raw.amount,
            expense_type: ExpenseType::from_stored(raw.expense_type.as_deref()),
            category: ListLookups::named(&lookups.categories, raw.category_id),
            payment_method: ListLookups::named(&lookups.payment_methods, raw.payment_method_id),
            supplier_name: raw.supplier_name,
            description: raw.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn query() -> ExpenseListQuery {
        ExpenseListQuery {
            page_index: 0,
            page_size: 20,
            sort: None,
            order: None,
            category_id: None,
            payment_method_id: None,
            expense_type: None,
            search: None,
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn test_build_filter_without_dates_has_no_window() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let filter = ExpenseService::build_filter(&query(), &offset).unwrap();
        assert_eq!(filter, RecordFilter::default());
    }

    #[test]
    fn test_build_filter_rejects_reversed_range() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let mut q = query();
        q.start_date = NaiveDate::from_ymd_opt(2024, 3, 31);
        q.end_date = NaiveDate::from_ymd_opt(2024, 3, 1);

        let result = ExpenseService::build_filter(&q, &offset);
        assert!(matches!(result, Err(AppError::InvalidDateRange(_))));
    }

    #[test]
    fn test_build_filter_rejects_half_open_range() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let mut q = query();
        q.start_date = NaiveDate::from_ymd_opt(2024, 3, 1);

        let result = ExpenseService::build_filter(&q, &offset);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_list_item_is_decorated_with_names() {
        let now = Utc::now();
        let category_id = Uuid::new_v4();
        let method_id = Uuid::new_v4();
        let lookups = ListLookups::new(
            vec![Category {
                id: category_id,
                name: "Supplies".to_string(),
                is_active: false,
                created_at: now,
                updated_at: now,
            }],
            vec![PaymentMethod {
                id: method_id,
                name: "Cash".to_string(),
                is_active: true,
            }],
        );
        // 02:00 UTC is still the previous day at UTC-3
        let raw = RawExpense {
            id: Uuid::new_v4(),
            amount: Decimal::new(4250, 2),
            expense_date: Utc.with_ymd_and_hms(2024, 3, 2, 2, 0, 0).unwrap(),
            created_at: now,
            category_id: Some(category_id),
            payment_method_id: Some(method_id),
            supplier_id: None,
            supplier_name: Some("Acme".to_string()),
            expense_type: Some("EXTRAORDINARY".to_string()),
            description: None,
        };
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();

        let item = ExpenseService::to_list_item(raw, &lookups, &offset);

        assert_eq!(item.occurred_on, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(item.category.map(|c| c.name), Some("Supplies".to_string()));
        assert_eq!(item.payment_method.map(|p| p.name), Some("Cash".to_string()));
        assert_eq!(item.expense_type, ExpenseType::Extraordinary);
    }
}
