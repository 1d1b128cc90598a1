use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::models::{
    Category, OrderItemRow, OrderRow, PaymentMethod, RawExpense, RawOrder, RawOrderItem,
};
use super::{ExpenseListSnapshot, RecordFilter, ReportSnapshot, ReportStore, SnapshotParts};
use crate::errors::AppError;
use crate::expense::models::{ExpenseSort, Page, PageRequest, PageWindow};

const EXPENSE_COLUMNS: &str = r#"
    e.id, e.amount, e.expense_date, e.created_at, e.category_id, e.payment_method_id,
    e.supplier_id, s.name AS supplier_name, e.expense_type, e.description
"#;

const EXPENSE_FROM: &str = "FROM expenses e LEFT JOIN suppliers s ON s.id = e.supplier_id";

/// Shared by every expense query so counts and slices use one predicate.
/// Anything other than `extraordinary` is ordinary, as in `ExpenseType::from_stored`.
const EXPENSE_WHERE: &str = r#"
    WHERE ($1::timestamptz IS NULL OR e.expense_date >= $1)
      AND ($2::timestamptz IS NULL OR e.expense_date < $2)
      AND ($3::uuid IS NULL OR e.category_id = $3)
      AND ($4::uuid[] IS NULL OR e.category_id = ANY($4))
      AND ($5::uuid IS NULL OR e.payment_method_id = $5)
      AND ($6::text IS NULL OR
           (CASE WHEN LOWER(TRIM(e.expense_type)) = 'extraordinary'
                 THEN 'extraordinary' ELSE 'ordinary' END) = $6)
      AND ($7::text IS NULL OR e.description ILIKE $7 OR s.name ILIKE $7)
"#;

/// Delivery date when present, creation date otherwise (see `RawOrder::effective_at`).
const ORDER_EFFECTIVE_AT: &str = "COALESCE(o.delivered_at, o.created_at)";

/// Bind values for `EXPENSE_WHERE`, in placeholder order
struct ExpenseParams {
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    category_id: Option<Uuid>,
    allowed_category_ids: Option<Vec<Uuid>>,
    payment_method_id: Option<Uuid>,
    expense_type: Option<&'static str>,
    search_pattern: Option<String>,
}

impl ExpenseParams {
    fn from_filter(filter: &RecordFilter) -> Self {
        Self {
            from: filter.window.map(|w| w.from),
            until: filter.window.map(|w| w.until),
            category_id: filter.category_id,
            allowed_category_ids: filter.allowed_category_ids.clone(),
            payment_method_id: filter.payment_method_id,
            expense_type: filter.expense_type.map(|t| t.as_str()),
            search_pattern: filter.search_term().map(like_pattern),
        }
    }
}

macro_rules! bind_expense_params {
    ($query:expr, $params:expr) => {
        $query
            .bind($params.from)
            .bind($params.until)
            .bind($params.category_id)
            .bind(&$params.allowed_category_ids)
            .bind($params.payment_method_id)
            .bind($params.expense_type)
            .bind(&$params.search_pattern)
    };
}

/// `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_snapshot(&self) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

async fn load_expenses(
    conn: &mut PgConnection,
    filter: &RecordFilter,
) -> Result<Vec<RawExpense>, AppError> {
    let params = ExpenseParams::from_filter(filter);
    let sql = format!(
        "SELECT {EXPENSE_COLUMNS} {EXPENSE_FROM} {EXPENSE_WHERE} ORDER BY e.expense_date ASC, e.id ASC"
    );

    let rows = bind_expense_params!(sqlx::query_as::<_, RawExpense>(&sql), params)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

async fn load_orders(
    conn: &mut PgConnection,
    filter: &RecordFilter,
) -> Result<Vec<RawOrder>, AppError> {
    let sql = format!(
        r#"
        SELECT o.id, o.created_at, o.delivered_at
        FROM orders o
        WHERE ($1::timestamptz IS NULL OR {ORDER_EFFECTIVE_AT} >= $1)
          AND ($2::timestamptz IS NULL OR {ORDER_EFFECTIVE_AT} < $2)
        ORDER BY {ORDER_EFFECTIVE_AT} ASC, o.id ASC
        "#
    );

    let headers = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(filter.window.map(|w| w.from))
        .bind(filter.window.map(|w| w.until))
        .fetch_all(&mut *conn)
        .await?;

    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = headers.iter().map(|o| o.id).collect();
    let item_rows = sqlx::query_as::<_, OrderItemRow>(
        r#"
        SELECT i.id, i.order_id, i.channel, i.amount
        FROM order_items i
        WHERE i.order_id = ANY($1)
        ORDER BY i.order_id, i.id
        "#,
    )
    .bind(&order_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut items_by_order: HashMap<Uuid, Vec<RawOrderItem>> = HashMap::new();
    for row in item_rows {
        items_by_order
            .entry(row.order_id)
            .or_default()
            .push(RawOrderItem {
                id: row.id,
                channel: row.channel,
                amount: row.amount,
            });
    }

    Ok(headers
        .into_iter()
        .map(|header| RawOrder {
            items: items_by_order.remove(&header.id).unwrap_or_default(),
            id: header.id,
            created_at: header.created_at,
            delivered_at: header.delivered_at,
        })
        .collect())
}

async fn load_categories(conn: &mut PgConnection) -> Result<Vec<Category>, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, is_active, created_at, updated_at
        FROM expense_categories
        ORDER BY name ASC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(categories)
}

async fn load_payment_methods(conn: &mut PgConnection) -> Result<Vec<PaymentMethod>, AppError> {
    let methods = sqlx::query_as::<_, PaymentMethod>(
        r#"
        SELECT id, name, is_active
        FROM payment_methods
        ORDER BY name ASC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(methods)
}

/// Count, then slice, under one predicate. Callers run this inside a snapshot.
async fn load_expense_page(
    conn: &mut PgConnection,
    filter: &RecordFilter,
    sort: ExpenseSort,
    request: PageRequest,
) -> Result<Page<RawExpense>, AppError> {
    let params = ExpenseParams::from_filter(filter);

    let count_sql = format!("SELECT COUNT(*) {EXPENSE_FROM} {EXPENSE_WHERE}");
    let total = bind_expense_params!(sqlx::query_scalar::<_, i64>(&count_sql), params)
        .fetch_one(&mut *conn)
        .await?;
    let total = u64::try_from(total).unwrap_or(0);
    let window = PageWindow::resolve(request, total);

    let items = if total == 0 {
        Vec::new()
    } else {
        let slice_sql = format!(
            "SELECT {EXPENSE_COLUMNS} {EXPENSE_FROM} {EXPENSE_WHERE} ORDER BY {} LIMIT $8 OFFSET $9",
            sort.order_by_sql()
        );
        bind_expense_params!(sqlx::query_as::<_, RawExpense>(&slice_sql), params)
            .bind(i64::try_from(window.page_size).unwrap_or(i64::MAX))
            .bind(i64::try_from(window.offset).unwrap_or(i64::MAX))
            .fetch_all(&mut *conn)
            .await?
    };

    Ok(Page::new(items, total, window))
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn fetch_expenses(&self, filter: &RecordFilter) -> Result<Vec<RawExpense>, AppError> {
        let mut conn = self.pool.acquire().await?;
        load_expenses(&mut conn, filter).await
    }

    async fn fetch_orders(&self, filter: &RecordFilter) -> Result<Vec<RawOrder>, AppError> {
        let mut tx = self.begin_snapshot().await?;
        let orders = load_orders(&mut tx, filter).await?;
        tx.commit().await?;
        Ok(orders)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, AppError> {
        let mut conn = self.pool.acquire().await?;
        load_categories(&mut conn).await
    }

    async fn fetch_payment_methods(&self) -> Result<Vec<PaymentMethod>, AppError> {
        let mut conn = self.pool.acquire().await?;
        load_payment_methods(&mut conn).await
    }

    async fn fetch_expense_page(
        &self,
        filter: &RecordFilter,
        sort: ExpenseSort,
        request: PageRequest,
    ) -> Result<Page<RawExpense>, AppError> {
        let mut tx = self.begin_snapshot().await?;
        let page = load_expense_page(&mut tx, filter, sort, request).await?;
        tx.commit().await?;
        Ok(page)
    }

    async fn fetch_expense_list(
        &self,
        filter: &RecordFilter,
        sort: ExpenseSort,
        request: PageRequest,
    ) -> Result<ExpenseListSnapshot, AppError> {
        let mut tx = self.begin_snapshot().await?;

        let page = load_expense_page(&mut tx, filter, sort, request).await?;
        let categories = load_categories(&mut tx).await?;
        let payment_methods = load_payment_methods(&mut tx).await?;

        tx.commit().await?;
        Ok(ExpenseListSnapshot {
            page,
            categories,
            payment_methods,
        })
    }

    async fn fetch_snapshot(
        &self,
        filter: &RecordFilter,
        parts: SnapshotParts,
    ) -> Result<ReportSnapshot, AppError> {
        let mut tx = self.begin_snapshot().await?;

        let categories = load_categories(&mut tx).await?;
        let expenses = load_expenses(&mut tx, filter).await?;
        let orders = match parts {
            SnapshotParts::ExpensesAndOrders => load_orders(&mut tx, filter).await?,
            SnapshotParts::ExpensesOnly => Vec::new(),
        };

        tx.commit().await?;
        Ok(ReportSnapshot {
            categories,
            expenses,
            orders,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("acme"), "%acme%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_where_clause_placeholders_match_bind_order() {
        for n in 1..=7 {
            assert!(EXPENSE_WHERE.contains(&format!("${n}")), "missing ${n}");
        }
        assert!(!EXPENSE_WHERE.contains("$8"));
    }
}
