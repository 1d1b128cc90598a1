use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::store::models::RawExpense;
use crate::transaction::ExpenseType;

/// Fields the expense list may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpenseSortField {
    #[default]
    OccurredAt,
    Amount,
    CreatedAt,
}

impl ExpenseSortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "occurredAt" => Some(ExpenseSortField::OccurredAt),
            "amount" => Some(ExpenseSortField::Amount),
            "createdAt" => Some(ExpenseSortField::CreatedAt),
            _ => None,
        }
    }

    /// Column expression; only ever one of these fixed strings reaches SQL.
    pub fn column(&self) -> &'static str {
        match self {
            ExpenseSortField::OccurredAt => "e.expense_date",
            ExpenseSortField::Amount => "e.amount",
            ExpenseSortField::CreatedAt => "e.created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort order for the expense list. Ties always break by id ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpenseSort {
    pub field: ExpenseSortField,
    pub direction: SortDirection,
}

impl ExpenseSort {
    /// Unknown fields fall back to the default order instead of failing.
    pub fn parse(field: Option<&str>, direction: Option<&str>) -> Self {
        let field = match field {
            None => ExpenseSortField::default(),
            Some(raw) => ExpenseSortField::parse(raw).unwrap_or_else(|| {
                debug!("Unknown sort field '{raw}', using default order");
                ExpenseSortField::default()
            }),
        };
        let direction = direction
            .and_then(SortDirection::parse)
            .unwrap_or_default();

        Self { field, direction }
    }

    /// In-memory equivalent of the SQL ORDER BY.
    pub fn compare(&self, a: &RawExpense, b: &RawExpense) -> Ordering {
        let primary = match self.field {
            ExpenseSortField::OccurredAt => a.expense_date.cmp(&b.expense_date),
            ExpenseSortField::Amount => a.amount.cmp(&b.amount),
            ExpenseSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    pub fn order_by_sql(&self) -> String {
        format!("{} {}, e.id ASC", self.field.column(), self.direction.keyword())
    }
}

/// Requested page, page size already clamped to `[1, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page_index: u64, page_size: u64, max_page_size: u64) -> Self {
        Self {
            page_index,
            page_size: page_size.clamp(1, max_page_size.max(1)),
        }
    }
}

/// Page actually served once the total is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_index: u64,
    pub page_size: u64,
    pub page_count: u64,
    pub offset: u64,
}

impl PageWindow {
    /// Clamp the requested index to the last page instead of erroring.
    pub fn resolve(request: PageRequest, total: u64) -> Self {
        let page_size = request.page_size.max(1);
        let page_count = total.div_ceil(page_size);
        let page_index = request.page_index.min(page_count.saturating_sub(1));

        Self {
            page_index,
            page_size,
            page_count,
            offset: page_index * page_size,
        }
    }
}

/// A page of records and the total they were sliced from
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page_count: u64,
    pub page_index: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, window: PageWindow) -> Self {
        Self {
            items,
            total,
            page_count: window.page_count,
            page_index: window.page_index,
            page_size: window.page_size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page_count: self.page_count,
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }
}

/// Slice an already filtered and sorted snapshot.
pub fn paginate<T>(records: Vec<T>, request: PageRequest) -> Page<T> {
    let total = records.len() as u64;
    let window = PageWindow::resolve(request, total);
    let items = records
        .into_iter()
        .skip(window.offset as usize)
        .take(window.page_size as usize)
        .collect();
    Page::new(items, total, window)
}

fn default_page_size() -> u64 {
    20
}

/// Query parameters for the expense list
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListQuery {
    /// Zero-based page index (clamped to the last page)
    #[serde(default)]
    #[param(example = 0)]
    pub page_index: u64,
    /// Page size (clamped to 1..=max)
    #[serde(default = "default_page_size")]
    #[param(example = 20)]
    pub page_size: u64,
    /// Sort field: occurredAt, amount, createdAt
    #[param(example = "occurredAt")]
    pub sort: Option<String>,
    /// Sort direction: asc, desc
    #[param(example = "desc")]
    pub order: Option<String>,
    /// Filter by category
    pub category_id: Option<Uuid>,
    /// Filter by payment method
    pub payment_method_id: Option<Uuid>,
    /// Filter by expense type
    pub expense_type: Option<ExpenseType>,
    /// Case-insensitive match on description or supplier name
    #[validate(length(max = 100, message = "Search cannot exceed 100 characters"))]
    pub search: Option<String>,
    /// First day, inclusive (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Last day, inclusive (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

/// Reference to a named lookup entity
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NamedRef {
    pub id: Uuid,
    #[schema(example = "Supplies")]
    pub name: String,
}

/// Expense row as listed
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListItem {
    pub id: Uuid,
    /// Local calendar day of the expense
    pub occurred_on: NaiveDate,
    #[schema(example = 100.00)]
    pub amount: Decimal,
    pub expense_type: ExpenseType,
    pub category: Option<NamedRef>,
    pub payment_method: Option<NamedRef>,
    #[schema(example = "Acme Packaging")]
    pub supplier_name: Option<String>,
    pub description: Option<String>,
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedExpenseResponse {
    /// Expenses on this page
    pub data: Vec<ExpenseListItem>,
    /// Total count matching filters
    #[schema(example = 100)]
    pub total: u64,
    /// Number of pages for this total and page size
    #[schema(example = 5)]
    pub page_count: u64,
    /// Page actually served
    #[schema(example = 0)]
    pub page_index: u64,
    /// Page size used
    #[schema(example = 20)]
    pub page_size: u64,
}

impl From<Page<ExpenseListItem>> for PaginatedExpenseResponse {
    fn from(page: Page<ExpenseListItem>) -> Self {
        Self {
            data: page.items,
            total: page.total,
            page_count: page.page_count,
            page_index: page.page_index,
            page_size: page.page_size,
        }
    }
}
