#![allow(dead_code)]

use actix_web::{test, web, App};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use secrecy::Secret;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use balance_reports::auth::TokenClaims;
use balance_reports::config::ReportSettings;
use balance_reports::permission::PermissionScope;
use balance_reports::report::{self, ReportContext};
use balance_reports::store::models::{Category, PaymentMethod, RawExpense, RawOrder, RawOrderItem};
use balance_reports::store::{MemoryStore, ReportStore};

static JWT_SECRET: &str = "test_jwt_secret_for_integration_tests";

pub static ALL_CATEGORIES: Lazy<Vec<String>> =
    Lazy::new(|| vec!["view all categories".to_string()]);

pub struct TestResponse {
    status: u16,
    body: bytes::Bytes,
}

impl TestResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub async fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }
}

/// Read a decimal serialized by the API (rust_decimal serializes as a string)
pub fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("Should be a decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("Should be a decimal"),
        other => panic!("Expected decimal, got {other}"),
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub settings: ReportSettings,
}

impl TestApp {
    pub fn new() -> Self {
        TestApp {
            store: Arc::new(MemoryStore::new()),
            settings: ReportSettings::default(),
        }
    }

    pub fn context(&self, scope: PermissionScope) -> ReportContext {
        ReportContext::new(scope, &self.settings)
    }

    pub fn token(&self, permissions: &[String]) -> String {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: Uuid::new_v4(),
            permissions: permissions.to_vec(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::minutes(15)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .expect("Should encode token")
    }

    /// GET as a caller holding the all-categories grant
    pub async fn get(&self, path: &str) -> TestResponse {
        let token = self.token(&ALL_CATEGORIES);
        self.get_with_auth(path, Some(&format!("Bearer {token}")))
            .await
    }

    pub async fn get_as(&self, path: &str, permissions: &[String]) -> TestResponse {
        let token = self.token(permissions);
        self.get_with_auth(path, Some(&format!("Bearer {token}")))
            .await
    }

    pub async fn get_with_auth(&self, path: &str, authorization: Option<&str>) -> TestResponse {
        let store: Arc<dyn ReportStore> = self.store.clone();
        let jwt_secret = Secret::new(JWT_SECRET.to_string());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .app_data(web::Data::new(self.settings))
                .app_data(web::Data::new(jwt_secret))
                .service(report::health_check)
                .service(web::scope("/reports").configure(report::configure)),
        )
        .await;

        let mut req = test::TestRequest::get().uri(path);
        if let Some(value) = authorization {
            req = req.insert_header(("Authorization", value));
        }
        let resp = test::call_service(&app, req.to_request()).await;

        let status = resp.status().as_u16();
        let body = test::read_body(resp).await;

        TestResponse { status, body }
    }
}

pub fn category_permission(id: Uuid) -> String {
    format!("view category: {id}")
}

/// Noon UTC, so the local day is the same for any offset within ±11h
pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn money(units: i64) -> Decimal {
    Decimal::new(units * 100, 2)
}

pub fn category(name: &str) -> Category {
    let now = Utc::now();
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn payment_method(name: &str) -> PaymentMethod {
    PaymentMethod {
        id: Uuid::new_v4(),
        name: name.to_string(),
        is_active: true,
    }
}

pub fn expense(
    amount: Decimal,
    on: DateTime<Utc>,
    category_id: Option<Uuid>,
    expense_type: &str,
) -> RawExpense {
    RawExpense {
        id: Uuid::new_v4(),
        amount,
        expense_date: on,
        created_at: on,
        category_id,
        payment_method_id: None,
        supplier_id: None,
        supplier_name: None,
        expense_type: Some(expense_type.to_string()),
        description: None,
    }
}

pub fn order(on: DateTime<Utc>, items: &[(&str, Decimal)]) -> RawOrder {
    RawOrder {
        id: Uuid::new_v4(),
        created_at: on,
        delivered_at: None,
        items: items
            .iter()
            .map(|(channel, amount)| RawOrderItem {
                id: Uuid::new_v4(),
                channel: channel.to_string(),
                amount: *amount,
            })
            .collect(),
    }
}

pub struct MarchFixture {
    pub supplies: Category,
    pub rent: Category,
}

/// Supplies 100 + 50 ordinary, Rent 200 extraordinary, one retail sale of 500
pub fn seed_march(store: &MemoryStore) -> MarchFixture {
    let supplies = category("Supplies");
    let rent = category("Rent");
    store.insert_category(supplies.clone()).unwrap();
    store.insert_category(rent.clone()).unwrap();

    store
        .insert_expense(expense(money(100), at(2024, 3, 4), Some(supplies.id), "ordinary"))
        .unwrap();
    store
        .insert_expense(expense(money(50), at(2024, 3, 9), Some(supplies.id), "ordinary"))
        .unwrap();
    store
        .insert_expense(expense(
            money(200),
            at(2024, 3, 20),
            Some(rent.id),
            "extraordinary",
        ))
        .unwrap();
    store
        .insert_order(order(at(2024, 3, 22), &[("retail", money(500))]))
        .unwrap();

    MarchFixture { supplies, rent }
}
