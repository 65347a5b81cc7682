use duka_commerce::prelude::*;
use duka_commerce::repository::OrderRepository;
use duka_invoice::{
    invoice_key, is_verification_code, HttpObjectStore, InvoiceService, ObjectStore,
    PDF_CONTENT_TYPE,
};
use duka_test_support::{
    fixtures, InMemoryCarts, InMemoryCatalog, InMemoryContent, InMemoryOrders, ManualClock,
    MemoryObjectStore,
};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    orders: Arc<InMemoryOrders>,
    store: Arc<MemoryObjectStore>,
    invoices: InvoiceService,
}

fn harness_with(store: MemoryObjectStore) -> Harness {
    let catalog = Arc::new(InMemoryCatalog::new());
    let carts = Arc::new(InMemoryCarts::new());
    let orders = Arc::new(InMemoryOrders::new());
    let content = Arc::new(InMemoryContent::new());
    let clock = Arc::new(ManualClock::default());
    let store = Arc::new(store);

    let cart_service = CartService::new(carts, catalog, clock.clone());
    let order_service =
        OrderService::new(orders.clone(), content.clone(), cart_service, clock.clone());
    let content_service = ContentService::new(content, clock.clone());
    let invoices = InvoiceService::new(order_service, content_service, store.clone(), clock);
    Harness {
        orders,
        store,
        invoices,
    }
}

fn harness() -> Harness {
    harness_with(MemoryObjectStore::new())
}

#[tokio::test]
async fn test_generate_uploads_and_records_invoice() {
    let h = harness();
    let order = fixtures::order(&[
        (fixtures::product("Kitenge Shirt", 45_000, 10), 2),
        (fixtures::product("Kikoi Wrap", 30_000, 5), 1),
    ]);
    h.orders.create(&order).await.unwrap();

    let invoice = h.invoices.generate(order.id).await.unwrap();

    let key = invoice_key(&order.order_number);
    assert_eq!(key, format!("invoices/{}.pdf", order.order_number));
    assert!(invoice.url.ends_with(&key));
    assert!(is_verification_code(&invoice.verification_code));
    assert_eq!(invoice.pages, 1);

    let stored = h.store.get(&key).unwrap();
    assert_eq!(stored.content_type, PDF_CONTENT_TYPE);
    assert!(stored.bytes.starts_with(b"%PDF-1.4"));
    assert_eq!(stored.bytes.len(), invoice.size);

    let saved = h.orders.all().pop().unwrap();
    assert_eq!(saved.invoice_url.as_deref(), Some(invoice.url.as_str()));
    assert_eq!(
        saved.verification_code.as_deref(),
        Some(invoice.verification_code.as_str())
    );
}

#[tokio::test]
async fn test_zero_item_order_still_renders() {
    let h = harness();
    let order = fixtures::order(&[]);
    h.orders.create(&order).await.unwrap();

    let invoice = h.invoices.generate_by_number(&order.order_number).await.unwrap();
    assert_eq!(invoice.pages, 1);
    assert!(invoice.order.invoice_url.is_some());
}

#[tokio::test]
async fn test_large_order_spans_pages() {
    let h = harness();
    let lines: Vec<(Product, i64)> = (0..70)
        .map(|i| (fixtures::product(&format!("Bead bracelet {i}"), 5_000, 10), 1))
        .collect();
    let order = fixtures::order(&lines);
    h.orders.create(&order).await.unwrap();

    let invoice = h.invoices.generate(order.id).await.unwrap();
    assert!(invoice.pages >= 2);
}

#[tokio::test]
async fn test_missing_order_fails_without_upload() {
    let h = harness();
    let err = h.invoices.generate(OrderId::generate()).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(h.store.keys().is_empty());
}

#[tokio::test]
async fn test_upload_failure_leaves_order_untouched() {
    let h = harness_with(MemoryObjectStore::failing());
    let order = fixtures::order(&[(fixtures::product("Kanga", 12_000, 3), 1)]);
    h.orders.create(&order).await.unwrap();

    assert!(h.invoices.generate(order.id).await.is_err());
    let saved = h.orders.all().pop().unwrap();
    assert!(saved.invoice_url.is_none());
    assert!(saved.verification_code.is_none());
}

#[tokio::test]
async fn test_http_store_presigns_then_puts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/presign"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(serde_json::json!({
            "key": "invoices/ORD-1.pdf",
            "content_type": "application/pdf",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "upload_url": format!("{}/upload/abc?sig=1", server.uri()),
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload/abc"))
        .and(header("content-type", "application/pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpObjectStore::new(
        &format!("{}/storage/", server.uri()),
        "https://cdn.duka.co.tz/",
        Some("secret".to_string()),
        5,
    )
    .unwrap();
    let url = store
        .put("invoices/ORD-1.pdf", b"%PDF-1.4".to_vec(), PDF_CONTENT_TYPE)
        .await
        .unwrap();
    assert_eq!(url, "https://cdn.duka.co.tz/invoices/ORD-1.pdf");
}

#[tokio::test]
async fn test_http_store_reports_rejected_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/presign"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "upload_url": format!("{}/upload/xyz", server.uri()),
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let store = HttpObjectStore::new(&server.uri(), "https://cdn.test", None, 5).unwrap();
    let err = store
        .put("invoices/x.pdf", vec![1, 2, 3], PDF_CONTENT_TYPE)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("upload returned 403"));
}
