pub mod models;
mod service;

pub use models::{
    paginate, ExpenseListItem, ExpenseListQuery, ExpenseSort, ExpenseSortField, NamedRef, Page,
    PageRequest, PageWindow, PaginatedExpenseResponse, SortDirection,
};
pub use service::{ExpenseService, ListLookups};
