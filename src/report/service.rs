use chrono::NaiveDate;
use std::future::Future;
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{AnalyticsResponse, MonthlyBalanceResponse, OverviewResponse, ReportContext};
use crate::aggregation::{
    aggregate_by, sort_chronologically, sum_amounts, BucketLabels, Dimension, PercentBasis,
    TotalBasis,
};
use crate::balance::{balance_totals, calculate_monthly_balance, MAX_BALANCE_MONTHS};
use crate::errors::AppError;
use crate::expense::{
    ExpenseListItem, ExpenseListQuery, ExpenseService, ExpenseSort, ListLookups, Page, PageRequest,
};
use crate::overview::summarize;
use crate::period::DateRange;
use crate::permission::apply_scope;
use crate::store::models::Category;
use crate::store::{RecordFilter, ReportStore, SnapshotParts};
use crate::transaction::{normalize_snapshot, Normalized, Transaction};

/// Report orchestration: one bounded fetch per request, then pure computation.
pub struct ReportService;

impl ReportService {
    /// Run the fetch stage under the context's timeout.
    async fn fetch<T, F>(ctx: &ReportContext, fetch: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tokio::time::timeout(ctx.fetch_timeout, fetch)
            .await
            .map_err(|_| {
                AppError::FetchTimeout(format!(
                    "Report data fetch exceeded {}s",
                    ctx.fetch_timeout.as_secs_f64()
                ))
            })?
    }

    /// Window filter for an optional range, narrowed to the caller's scope.
    fn scoped_filter(ctx: &ReportContext, range: Option<&DateRange>) -> RecordFilter {
        let filter = RecordFilter {
            window: range.map(|r| r.utc_window(&ctx.utc_offset)),
            ..RecordFilter::default()
        };
        apply_scope(&ctx.scope, filter)
    }

    fn expense_transactions(normalized: &Normalized) -> Vec<Transaction> {
        normalized.expenses().cloned().collect()
    }

    pub async fn get_balance_monthly(
        store: &dyn ReportStore,
        ctx: &ReportContext,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthlyBalanceResponse, AppError> {
        let range = DateRange::new(start, end)?;
        if range.month_count() > MAX_BALANCE_MONTHS {
            return Err(AppError::ValidationError(format!(
                "Balance range cannot exceed {MAX_BALANCE_MONTHS} months"
            )));
        }

        let filter = Self::scoped_filter(ctx, Some(&range));
        let snapshot = Self::fetch(
            ctx,
            store.fetch_snapshot(&filter, SnapshotParts::ExpensesAndOrders),
        )
        .await?;

        let normalized = normalize_snapshot(&snapshot.expenses, &snapshot.orders, &ctx.utc_offset);
        let data = calculate_monthly_balance(&normalized.transactions, &range);
        let totals = balance_totals(&data);

        info!(
            months = data.len(),
            skipped = normalized.skipped.len(),
            "Computed monthly balance {start}..{end}"
        );

        Ok(MonthlyBalanceResponse {
            data,
            totals,
            skipped_records: normalized.skipped.len(),
        })
    }

    /// Spend per category. With `PercentBasis::Income` each share is
    /// measured against income in the same window.
    pub async fn get_category_analytics(
        store: &dyn ReportStore,
        ctx: &ReportContext,
        range: Option<DateRange>,
        basis: PercentBasis,
    ) -> Result<AnalyticsResponse, AppError> {
        let parts = match basis {
            PercentBasis::Expenses => SnapshotParts::ExpensesOnly,
            PercentBasis::Income => SnapshotParts::ExpensesAndOrders,
        };
        let filter = Self::scoped_filter(ctx, range.as_ref());
        let snapshot = Self::fetch(ctx, store.fetch_snapshot(&filter, parts)).await?;

        let normalized = normalize_snapshot(&snapshot.expenses, &snapshot.orders, &ctx.utc_offset);
        let expenses = Self::expense_transactions(&normalized);
        let total_basis = match basis {
            PercentBasis::Expenses => TotalBasis::OwnTotal,
            PercentBasis::Income => TotalBasis::Explicit(sum_amounts(normalized.incomes())),
        };
        let labels = BucketLabels::from_categories(&snapshot.categories);

        Ok(AnalyticsResponse {
            data: aggregate_by(&expenses, Dimension::Category, total_basis, &labels),
            total_amount: sum_amounts(&expenses),
            skipped_records: normalized.skipped.len(),
        })
    }

    pub async fn get_type_analytics(
        store: &dyn ReportStore,
        ctx: &ReportContext,
        range: Option<DateRange>,
    ) -> Result<AnalyticsResponse, AppError> {
        let filter = Self::scoped_filter(ctx, range.as_ref());
        let snapshot = Self::fetch(
            ctx,
            store.fetch_snapshot(&filter, SnapshotParts::ExpensesOnly),
        )
        .await?;

        let normalized = normalize_snapshot(&snapshot.expenses, &[], &ctx.utc_offset);
        let expenses = Self::expense_transactions(&normalized);

        Ok(AnalyticsResponse {
            data: aggregate_by(
                &expenses,
                Dimension::ExpenseType,
                TotalBasis::OwnTotal,
                &BucketLabels::default(),
            ),
            total_amount: sum_amounts(&expenses),
            skipped_records: normalized.skipped.len(),
        })
    }

    /// Spend per month, oldest first. Months without spend are not filled in.
    pub async fn get_monthly_analytics(
        store: &dyn ReportStore,
        ctx: &ReportContext,
        category_id: Option<Uuid>,
        range: Option<DateRange>,
    ) -> Result<AnalyticsResponse, AppError> {
        if let Some(id) = category_id {
            if !ctx.scope.allows(Some(id)) {
                debug!(category_id = %id, "Category outside caller scope");
                return Ok(AnalyticsResponse::empty());
            }
        }

        let mut filter = Self::scoped_filter(ctx, range.as_ref());
        filter.category_id = category_id;
        let snapshot = Self::fetch(
            ctx,
            store.fetch_snapshot(&filter, SnapshotParts::ExpensesOnly),
        )
        .await?;

        let normalized = normalize_snapshot(&snapshot.expenses, &[], &ctx.utc_offset);
        let expenses = Self::expense_transactions(&normalized);
        let mut data = aggregate_by(
            &expenses,
            Dimension::Month,
            TotalBasis::OwnTotal,
            &BucketLabels::default(),
        );
        sort_chronologically(&mut data);

        Ok(AnalyticsResponse {
            data,
            total_amount: sum_amounts(&expenses),
            skipped_records: normalized.skipped.len(),
        })
    }

    /// Income per sales channel. Orders carry no category, so the scope does not narrow them.
    pub async fn get_channel_analytics(
        store: &dyn ReportStore,
        ctx: &ReportContext,
        range: Option<DateRange>,
    ) -> Result<AnalyticsResponse, AppError> {
        let filter = Self::scoped_filter(ctx, range.as_ref());
        let orders = Self::fetch(ctx, store.fetch_orders(&filter)).await?;

        let normalized = normalize_snapshot(&[], &orders, &ctx.utc_offset);
        let incomes: Vec<Transaction> = normalized.incomes().cloned().collect();

        Ok(AnalyticsResponse {
            data: aggregate_by(
                &incomes,
                Dimension::Channel,
                TotalBasis::OwnTotal,
                &BucketLabels::default(),
            ),
            total_amount: sum_amounts(&incomes),
            skipped_records: normalized.skipped.len(),
        })
    }

    pub async fn get_overview(
        store: &dyn ReportStore,
        ctx: &ReportContext,
        range: Option<DateRange>,
    ) -> Result<OverviewResponse, AppError> {
        let filter = Self::scoped_filter(ctx, range.as_ref());
        let snapshot = Self::fetch(
            ctx,
            store.fetch_snapshot(&filter, SnapshotParts::ExpensesOnly),
        )
        .await?;

        let normalized = normalize_snapshot(&snapshot.expenses, &[], &ctx.utc_offset);
        let labels = BucketLabels::from_categories(&snapshot.categories);

        Ok(OverviewResponse {
            summary: summarize(&normalized.transactions, &labels),
            skipped_records: normalized.skipped.len(),
        })
    }

    /// One page of expenses. Count, slice and labels come from the same store snapshot.
    pub async fn get_paginated_expenses(
        store: &dyn ReportStore,
        ctx: &ReportContext,
        query: &ExpenseListQuery,
        max_page_size: u64,
    ) -> Result<Page<ExpenseListItem>, AppError> {
        let filter = apply_scope(
            &ctx.scope,
            ExpenseService::build_filter(query, &ctx.utc_offset)?,
        );
        let sort = ExpenseSort::parse(query.sort.as_deref(), query.order.as_deref());
        let request = PageRequest::new(query.page_index, query.page_size, max_page_size);

        let snapshot = Self::fetch(ctx, store.fetch_expense_list(&filter, sort, request)).await?;

        let lookups = ListLookups::new(snapshot.categories, snapshot.payment_methods);
        Ok(snapshot.page.map(|raw| ExpenseService::to_list_item(raw, &lookups, &ctx.utc_offset)))
    }

    /// Categories the caller may filter by, inactive ones included.
    pub async fn list_visible_categories(
        store: &dyn ReportStore,
        ctx: &ReportContext,
    ) -> Result<Vec<Category>, AppError> {
        let categories = Self::fetch(ctx, store.fetch_categories()).await?;
        Ok(ctx.scope.visible_categories(categories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportSettings;
    use crate::permission::PermissionScope;
    use crate::store::models::{PaymentMethod, RawExpense, RawOrder};
    use crate::store::{ExpenseListSnapshot, MemoryStore, ReportSnapshot};
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::time::Duration;

    /// Store that never answers within any reasonable timeout
    struct StalledStore;

    #[async_trait]
    impl ReportStore for StalledStore {
        async fn fetch_expenses(&self, _: &RecordFilter) -> Result<Vec<RawExpense>, AppError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn fetch_orders(&self, _: &RecordFilter) -> Result<Vec<RawOrder>, AppError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn fetch_categories(&self) -> Result<Vec<Category>, AppError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn fetch_payment_methods(&self) -> Result<Vec<PaymentMethod>, AppError> {
            Ok(Vec::new())
        }

        async fn fetch_expense_page(
            &self,
            _: &RecordFilter,
            _: ExpenseSort,
            _: PageRequest,
        ) -> Result<Page<RawExpense>, AppError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(AppError::InternalError("unreachable".to_string()))
        }

        async fn fetch_snapshot(
            &self,
            _: &RecordFilter,
            _: SnapshotParts,
        ) -> Result<ReportSnapshot, AppError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ReportSnapshot::default())
        }
    }

    /// Store whose standalone lookups already reflect a later rename, while
    /// its list snapshot still holds the names the rows were read with
    struct RenamingStore {
        category_id: Uuid,
        method_id: Uuid,
    }

    impl RenamingStore {
        fn category(&self, name: &str) -> Category {
            Category {
                id: self.category_id,
                name: name.to_string(),
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }
        }

        fn method(&self, name: &str) -> PaymentMethod {
            PaymentMethod {
                id: self.method_id,
                name: name.to_string(),
                is_active: true,
            }
        }
    }

    #[async_trait]
    impl ReportStore for RenamingStore {
        async fn fetch_expenses(&self, _: &RecordFilter) -> Result<Vec<RawExpense>, AppError> {
            Ok(Vec::new())
        }

        async fn fetch_orders(&self, _: &RecordFilter) -> Result<Vec<RawOrder>, AppError> {
            Ok(Vec::new())
        }

        async fn fetch_categories(&self) -> Result<Vec<Category>, AppError> {
            Ok(vec![self.category("Renamed later")])
        }

        async fn fetch_payment_methods(&self) -> Result<Vec<PaymentMethod>, AppError> {
            Ok(vec![self.method("Renamed later")])
        }

        async fn fetch_expense_page(
            &self,
            _: &RecordFilter,
            _: ExpenseSort,
            request: PageRequest,
        ) -> Result<Page<RawExpense>, AppError> {
            let raw = RawExpense {
                id: Uuid::new_v4(),
                amount: Decimal::TEN,
                expense_date: Utc::now(),
                created_at: Utc::now(),
                category_id: Some(self.category_id),
                payment_method_id: Some(self.method_id),
                supplier_id: None,
                supplier_name: None,
                expense_type: None,
                description: None,
            };
            Ok(crate::expense::paginate(vec![raw], request))
        }

        async fn fetch_expense_list(
            &self,
            filter: &RecordFilter,
            sort: ExpenseSort,
            request: PageRequest,
        ) -> Result<ExpenseListSnapshot, AppError> {
            Ok(ExpenseListSnapshot {
                page: self.fetch_expense_page(filter, sort, request).await?,
                categories: vec![self.category("Supplies")],
                payment_methods: vec![self.method("Cash")],
            })
        }
    }

    fn context(scope: PermissionScope) -> ReportContext {
        ReportContext::new(scope, &ReportSettings::default())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[actix_rt::test]
    async fn test_fetch_timeout_is_reported() {
        let mut ctx = context(PermissionScope::unrestricted());
        ctx.fetch_timeout = Duration::from_millis(20);

        let result = ReportService::get_overview(&StalledStore, &ctx, None).await;

        assert!(
            matches!(result, Err(AppError::FetchTimeout(_))),
            "Slow store should time out"
        );
    }

    #[actix_rt::test]
    async fn test_expense_list_labels_come_from_the_page_snapshot() {
        let store = RenamingStore {
            category_id: Uuid::new_v4(),
            method_id: Uuid::new_v4(),
        };
        let ctx = context(PermissionScope::unrestricted());
        let query = ExpenseListQuery {
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
        };

        let page = ReportService::get_paginated_expenses(&store, &ctx, &query, 100)
            .await
            .unwrap();

        let item = &page.items[0];
        assert_eq!(item.category.as_ref().map(|c| c.name.as_str()), Some("Supplies"));
        assert_eq!(item.payment_method.as_ref().map(|p| p.name.as_str()), Some("Cash"));
    }

    #[actix_rt::test]
    async fn test_balance_rejects_reversed_range_before_fetch() {
        let ctx = context(PermissionScope::unrestricted());

        let result = ReportService::get_balance_monthly(
            &StalledStore,
            &ctx,
            date(2024, 3, 31),
            date(2024, 3, 1),
        )
        .await;

        assert!(matches!(result, Err(AppError::InvalidDateRange(_))));
    }

    #[actix_rt::test]
    async fn test_balance_rejects_overlong_range() {
        let ctx = context(PermissionScope::unrestricted());

        let result = ReportService::get_balance_monthly(
            &MemoryStore::new(),
            &ctx,
            date(2000, 1, 1),
            date(2024, 12, 31),
        )
        .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[actix_rt::test]
    async fn test_monthly_analytics_outside_scope_is_empty() {
        let ctx = context(PermissionScope::restricted([Uuid::new_v4()]));

        let response =
            ReportService::get_monthly_analytics(&StalledStore, &ctx, Some(Uuid::new_v4()), None)
                .await
                .expect("Out-of-scope category should not fail");

        assert!(response.data.is_empty());
        assert_eq!(response.skipped_records, 0);
    }
}
