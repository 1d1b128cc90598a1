use async_trait::async_trait;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::models::{Category, PaymentMethod, RawExpense, RawOrder};
use super::{ExpenseListSnapshot, RecordFilter, ReportSnapshot, ReportStore, SnapshotParts};
use crate::errors::AppError;
use crate::expense::models::{paginate, ExpenseSort, Page, PageRequest};

#[derive(Debug, Default)]
struct Dataset {
    categories: Vec<Category>,
    payment_methods: Vec<PaymentMethod>,
    expenses: Vec<RawExpense>,
    orders: Vec<RawOrder>,
}

/// In-process store. Every read takes one read guard, so a report never
/// sees a write that landed halfway through its fetch.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Dataset>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Dataset>, AppError> {
        self.data
            .read()
            .map_err(|_| AppError::InternalError("Memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Dataset>, AppError> {
        self.data
            .write()
            .map_err(|_| AppError::InternalError("Memory store lock poisoned".to_string()))
    }

    pub fn insert_category(&self, category: Category) -> Result<(), AppError> {
        self.write()?.categories.push(category);
        Ok(())
    }

    pub fn insert_payment_method(&self, method: PaymentMethod) -> Result<(), AppError> {
        self.write()?.payment_methods.push(method);
        Ok(())
    }

    pub fn insert_expense(&self, expense: RawExpense) -> Result<(), AppError> {
        self.write()?.expenses.push(expense);
        Ok(())
    }

    pub fn insert_order(&self, order: RawOrder) -> Result<(), AppError> {
        self.write()?.orders.push(order);
        Ok(())
    }

    /// Soft-deactivate a category; its history keeps the label.
    pub fn deactivate_category(&self, id: uuid::Uuid) -> Result<bool, AppError> {
        let mut data = self.write()?;
        match data.categories.iter_mut().find(|c| c.id == id) {
            Some(category) => {
                category.is_active = false;
                category.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn filtered_expenses(data: &Dataset, filter: &RecordFilter) -> Vec<RawExpense> {
    data.expenses
        .iter()
        .filter(|e| filter.matches_expense(e))
        .cloned()
        .collect()
}

fn filtered_orders(data: &Dataset, filter: &RecordFilter) -> Vec<RawOrder> {
    data.orders
        .iter()
        .filter(|o| filter.matches_order(o))
        .cloned()
        .collect()
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn fetch_expenses(&self, filter: &RecordFilter) -> Result<Vec<RawExpense>, AppError> {
        Ok(filtered_expenses(&*self.read()?, filter))
    }

    async fn fetch_orders(&self, filter: &RecordFilter) -> Result<Vec<RawOrder>, AppError> {
        Ok(filtered_orders(&*self.read()?, filter))
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.read()?.categories.clone())
    }

    async fn fetch_payment_methods(&self) -> Result<Vec<PaymentMethod>, AppError> {
        Ok(self.read()?.payment_methods.clone())
    }

    async fn fetch_expense_page(
        &self,
        filter: &RecordFilter,
        sort: ExpenseSort,
        request: PageRequest,
    ) -> Result<Page<RawExpense>, AppError> {
        let mut records = filtered_expenses(&*self.read()?, filter);
        records.sort_by(|a, b| sort.compare(a, b));
        Ok(paginate(records, request))
    }

    async fn fetch_expense_list(
        &self,
        filter: &RecordFilter,
        sort: ExpenseSort,
        request: PageRequest,
    ) -> Result<ExpenseListSnapshot, AppError> {
        let data = self.read()?;
        let mut records = filtered_expenses(&data, filter);
        records.sort_by(|a, b| sort.compare(a, b));

        Ok(ExpenseListSnapshot {
            page: paginate(records, request),
            categories: data.categories.clone(),
            payment_methods: data.payment_methods.clone(),
        })
    }

    async fn fetch_snapshot(
        &self,
        filter: &RecordFilter,
        parts: SnapshotParts,
    ) -> Result<ReportSnapshot, AppError> {
        let data = self.read()?;
        let orders = match parts {
            SnapshotParts::ExpensesAndOrders => filtered_orders(&data, filter),
            SnapshotParts::ExpensesOnly => Vec::new(),
        };

        Ok(ReportSnapshot {
            categories: data.categories.clone(),
            expenses: filtered_expenses(&data, filter),
            orders,
        })
    }
}
