#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use product_catalog::{
    config::AppConfig,
    db,
    entities::{product, ProductModel, ProductVariantModel, ProductVariantPriceModel, VariantModel},
    services::{CreateProductInput, CreateVariantInput, VariantOptionsInput, VariantPriceInput},
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up the application on an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as [`TestApp::new`], letting the test tweak the configuration first.
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory database
        cfg.database.max_connections = 1;
        cfg.database.min_connections = 1;
        tweak(&mut cfg);

        let pool = db::connect(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = product_catalog::app_router(state.clone());

        Self { router, state }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// GET `uri`, assert the status and return the JSON body.
    pub async fn get_json(&self, uri: &str, expected: StatusCode) -> Value {
        let response = self.request(Method::GET, uri, None).await;
        assert_eq!(response.status(), expected, "unexpected status for GET {uri}");
        read_json(response).await
    }

    pub async fn seed_variant(&self, title: &str) -> VariantModel {
        self.state
            .services
            .variants
            .create_variant(CreateVariantInput {
                title: title.to_string(),
                description: None,
                active: Some(true),
            })
            .await
            .expect("seed variant for tests")
    }

    pub async fn seed_inactive_variant(&self, title: &str) -> VariantModel {
        self.state
            .services
            .variants
            .create_variant(CreateVariantInput {
                title: title.to_string(),
                description: Some("retired".to_string()),
                active: Some(false),
            })
            .await
            .expect("seed inactive variant for tests")
    }

    pub async fn seed_product(&self, title: &str, sku: &str) -> ProductModel {
        self.state
            .services
            .product_catalog
            .create_product(CreateProductInput {
                title: title.to_string(),
                sku: sku.to_string(),
                description: Some(format!("{title} seeded for integration tests")),
            })
            .await
            .expect("seed product for tests")
    }

    pub async fn seed_options(
        &self,
        product_id: Uuid,
        groups: &[(&VariantModel, &[&str])],
    ) -> Vec<ProductVariantModel> {
        let input = groups
            .iter()
            .map(|(variant, tags)| VariantOptionsInput {
                variant_id: variant.id,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            })
            .collect();

        self.state
            .services
            .product_catalog
            .add_variant_options(product_id, input)
            .await
            .expect("seed options for tests")
    }

    pub async fn seed_price(
        &self,
        product_id: Uuid,
        slots: &[&ProductVariantModel],
        price: Decimal,
        stock: i32,
    ) -> ProductVariantPriceModel {
        let row = VariantPriceInput {
            product_variant_one: slots.first().map(|o| o.id),
            product_variant_two: slots.get(1).map(|o| o.id),
            product_variant_three: slots.get(2).map(|o| o.id),
            price,
            stock,
        };

        self.state
            .services
            .product_catalog
            .create_variant_prices(product_id, vec![row])
            .await
            .expect("seed price for tests")
            .remove(0)
    }

    /// Moves a product's creation time, e.g. to exercise the date filter.
    pub async fn set_created_at(&self, product: &ProductModel, created_at: DateTime<Utc>) {
        let mut active: product::ActiveModel = product.clone().into();
        active.created_at = Set(created_at);
        active
            .update(&*self.state.db)
            .await
            .expect("update product created_at");
    }
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&body).expect("response body is JSON")
}

/// Titles of the products on a list page, in page order
pub fn product_titles(context: &Value) -> Vec<String> {
    context["products"]
        .as_array()
        .expect("products array")
        .iter()
        .map(|p| p["title"].as_str().expect("title").to_string())
        .collect()
}

/// Parses a serialized decimal, rounded for comparisons across backends
pub fn money(value: &Value) -> Decimal {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    raw.parse::<Decimal>().expect("decimal value").round_dp(2)
}
