//! Shared helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use duka_auth::{Registration, Role};
use duka_commerce::catalog::Product;
use duka_server::{build_app, AppState, Backends, DukaConfig};
use duka_test_support::{
    fixed_now, fixtures, FixedClock, InMemoryCarts, InMemoryCatalog, InMemoryContent,
    InMemoryOrders, InMemoryUsers, InMemoryWishlists, MemoryObjectStore, RecordingMailer,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@duka.test";
pub const ADMIN_PASSWORD: &str = "adminpass123";

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// `x-session-id` response header, when the server issued one.
    pub session: Option<String>,
    pub set_cookie: Option<String>,
    pub json: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.json["data"]
    }

    pub fn error_code(&self) -> &str {
        self.json["error"]["code"].as_str().unwrap_or_default()
    }
}

/// The full app over in-memory backends, with handles to inspect them.
pub struct TestApp {
    pub state: AppState,
    pub catalog: Arc<InMemoryCatalog>,
    pub orders: Arc<InMemoryOrders>,
    pub mailer: Arc<RecordingMailer>,
    pub objects: Arc<MemoryObjectStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_objects(MemoryObjectStore::new())
    }

    pub fn with_objects(objects: MemoryObjectStore) -> Self {
        let catalog = Arc::new(InMemoryCatalog::new());
        let orders = Arc::new(InMemoryOrders::new());
        let mailer = Arc::new(RecordingMailer::new());
        let objects = Arc::new(objects);
        let backends = Backends {
            catalog: catalog.clone(),
            carts: Arc::new(InMemoryCarts::new()),
            orders: orders.clone(),
            wishlists: Arc::new(InMemoryWishlists::new()),
            content: Arc::new(InMemoryContent::new()),
            users: Arc::new(InMemoryUsers::new()),
            objects: objects.clone(),
            mailer: mailer.clone(),
            clock: Arc::new(FixedClock(fixed_now())),
        };
        let state = AppState::new(backends, &DukaConfig::default());
        Self {
            state,
            catalog,
            orders,
            mailer,
            objects,
        }
    }

    pub fn router(&self) -> Router {
        build_app(self.state.clone())
    }

    pub fn seed_product(&self, name: &str, price: i64, stock: i64) -> Product {
        let product = fixtures::product(name, price, stock);
        self.catalog.insert_product(product.clone());
        product
    }

    /// Create the admin account and return a signed-in session id.
    pub async fn admin_session(&self) -> String {
        self.state
            .auth
            .create_user(
                Registration {
                    email: ADMIN_EMAIL.to_string(),
                    password: ADMIN_PASSWORD.to_string(),
                    name: "Duka Admin".to_string(),
                    phone: None,
                },
                Role::Admin,
            )
            .await
            .unwrap();
        let response = self
            .post(
                "/api/auth/login",
                None,
                &serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.session.unwrap()
    }

    /// A fresh guest session id.
    pub async fn guest_session(&self) -> String {
        self.get("/api/cart", None).await.session.unwrap()
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        session: Option<&str>,
        body: Option<&Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header("x-session-id", session);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let session = header("x-session-id");
        let set_cookie = header("set-cookie");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse {
            status,
            session,
            set_cookie,
            json,
        }
    }

    pub async fn get(&self, uri: &str, session: Option<&str>) -> TestResponse {
        self.send("GET", uri, session, None).await
    }

    pub async fn post(&self, uri: &str, session: Option<&str>, body: &Value) -> TestResponse {
        self.send("POST", uri, session, Some(body)).await
    }

    pub async fn put(&self, uri: &str, session: Option<&str>, body: &Value) -> TestResponse {
        self.send("PUT", uri, session, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, session: Option<&str>, body: &Value) -> TestResponse {
        self.send("PATCH", uri, session, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, session: Option<&str>) -> TestResponse {
        self.send("DELETE", uri, session, None).await
    }
}
