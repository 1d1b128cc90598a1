//! Read-only query interface over the system of record.
//!
//! Reports fetch their working set once through [`ReportStore::fetch_snapshot`]
//! and compute everything else from that in-memory copy.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::expense::models::{ExpenseSort, Page, PageRequest};
use crate::period::TimeWindow;
use crate::transaction::ExpenseType;

use models::{Category, PaymentMethod, RawExpense, RawOrder};

pub use memory::MemoryStore;
pub use postgres::PgReportStore;

/// Predicate over raw records. The SQL store mirrors `matches_*` exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub window: Option<TimeWindow>,
    pub category_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
    pub expense_type: Option<ExpenseType>,
    pub search: Option<String>,
    /// Set by the permission scope; `Some(vec![])` hides everything
    pub allowed_category_ids: Option<Vec<Uuid>>,
}

impl RecordFilter {
    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn matches_expense(&self, e: &RawExpense) -> bool {
        if let Some(window) = &self.window {
            if !window.contains(e.expense_date) {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if e.category_id != Some(category_id) {
                return false;
            }
        }
        if let Some(allowed) = &self.allowed_category_ids {
            if !e.category_id.is_some_and(|id| allowed.contains(&id)) {
                return false;
            }
        }
        if let Some(payment_method_id) = self.payment_method_id {
            if e.payment_method_id != Some(payment_method_id) {
                return false;
            }
        }
        if let Some(expense_type) = self.expense_type {
            if ExpenseType::from_stored(e.expense_type.as_deref()) != expense_type {
                return false;
            }
        }
        if let Some(term) = self.search_term() {
            let term = term.to_lowercase();
            let hit = |field: &Option<String>| {
                field
                    .as_deref()
                    .is_some_and(|value| value.to_lowercase().contains(&term))
            };
            if !hit(&e.description) && !hit(&e.supplier_name) {
                return false;
            }
        }
        true
    }

    /// Orders are only narrowed by the time window.
    pub fn matches_order(&self, o: &RawOrder) -> bool {
        self.window
            .as_ref()
            .map_or(true, |window| window.contains(o.effective_at()))
    }
}

/// Which record sets a report needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotParts {
    ExpensesOnly,
    ExpensesAndOrders,
}

/// Working set of one report computation
#[derive(Debug, Clone, Default)]
pub struct ReportSnapshot {
    pub categories: Vec<Category>,
    pub expenses: Vec<RawExpense>,
    pub orders: Vec<RawOrder>,
}

/// One page of the expense list and the lookups that label it
#[derive(Debug, Clone)]
pub struct ExpenseListSnapshot {
    pub page: Page<RawExpense>,
    pub categories: Vec<Category>,
    pub payment_methods: Vec<PaymentMethod>,
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn fetch_expenses(&self, filter: &RecordFilter) -> Result<Vec<RawExpense>, AppError>;

    async fn fetch_orders(&self, filter: &RecordFilter) -> Result<Vec<RawOrder>, AppError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, AppError>;

    async fn fetch_payment_methods(&self) -> Result<Vec<PaymentMethod>, AppError>;

    /// Count and slice under the same predicate and the same snapshot.
    async fn fetch_expense_page(
        &self,
        filter: &RecordFilter,
        sort: ExpenseSort,
        request: PageRequest,
    ) -> Result<Page<RawExpense>, AppError>;

    /// Page plus lookups, read together so labels match the rows they name.
    /// Stores that can read a point-in-time snapshot should override this.
    async fn fetch_expense_list(
        &self,
        filter: &RecordFilter,
        sort: ExpenseSort,
        request: PageRequest,
    ) -> Result<ExpenseListSnapshot, AppError> {
        let page = self.fetch_expense_page(filter, sort, request).await?;
        let categories = self.fetch_categories().await?;
        let payment_methods = self.fetch_payment_methods().await?;

        Ok(ExpenseListSnapshot {
            page,
            categories,
            payment_methods,
        })
    }

    /// Fetch everything a report needs at once. Stores that can read a
    /// point-in-time snapshot should override this.
    async fn fetch_snapshot(
        &self,
        filter: &RecordFilter,
        parts: SnapshotParts,
    ) -> Result<ReportSnapshot, AppError> {
        let categories = self.fetch_categories().await?;
        let expenses = self.fetch_expenses(filter).await?;
        let orders = match parts {
            SnapshotParts::ExpensesAndOrders => self.fetch_orders(filter).await?,
            SnapshotParts::ExpensesOnly => Vec::new(),
        };

        Ok(ReportSnapshot {
            categories,
            expenses,
            orders,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
