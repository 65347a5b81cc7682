use duka_commerce::checkout::{Order, OrderStatus};
use duka_mail::templates;
use duka_mail::{dispatch, EmailMessage, HttpMailer, LogMailer, MailError, Mailer};
use duka_test_support::{fixed_now, fixtures, RecordingMailer};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_message() -> EmailMessage {
    templates::welcome("Duka", "Neema", "neema@example.com")
}

fn sample_order() -> Order {
    fixtures::order(&[(fixtures::product("Kitenge Shirt", 45_000, 10), 2)])
}

#[tokio::test]
async fn test_http_mailer_posts_json_with_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/send"))
        .and(header("authorization", "Bearer key-123"))
        .and(body_partial_json(serde_json::json!({
            "from": "orders@duka.co.tz",
            "to": "neema@example.com",
            "subject": "Welcome to Duka",
            "tags": ["welcome"],
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let mailer = HttpMailer::new(
        &format!("{}/v1", server.uri()),
        "key-123",
        "orders@duka.co.tz",
        5,
    )
    .unwrap();
    mailer.send(&sample_message()).await.unwrap();
}

#[tokio::test]
async fn test_http_mailer_surfaces_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad recipient"))
        .mount(&server)
        .await;

    let mailer = HttpMailer::new(&server.uri(), "key", "orders@duka.co.tz", 5).unwrap();
    let err = mailer.send(&sample_message()).await.unwrap_err();
    match err {
        MailError::Rejected { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "bad recipient");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_http_mailer_rejects_bad_endpoint() {
    let err = HttpMailer::new("not a url", "key", "from@duka.co.tz", 5).unwrap_err();
    assert!(matches!(err, MailError::Config(_)));
}

#[tokio::test]
async fn test_dispatch_swallows_failures() {
    let mailer = RecordingMailer::failing();
    assert!(!dispatch(&mailer, Some(sample_message())).await);

    let mailer = RecordingMailer::new();
    assert!(dispatch(&mailer, Some(sample_message())).await);
    assert!(!dispatch(&mailer, None).await);
    assert_eq!(mailer.sent().len(), 1);

    assert!(dispatch(&LogMailer, Some(sample_message())).await);
}

#[test]
fn test_order_templates_need_customer_email() {
    let mut order = sample_order();
    let msg = templates::order_confirmation("Duka", &order).unwrap();
    assert_eq!(msg.to, "asha@example.com");
    assert!(msg.subject.contains(&order.order_number));
    assert!(msg.text.contains("2 x Kitenge Shirt"));
    assert!(msg.text.contains("Tax: TSh 16,200"));
    assert!(msg.text.contains("Total: TSh 106,200"));

    order.transition(OrderStatus::Confirmed, fixed_now()).unwrap();
    let update = templates::order_update("Duka", &order).unwrap();
    assert!(update.text.contains("is now confirmed"));

    assert!(templates::invoice_ready("Duka", &order).is_none());
    order.set_invoice("https://cdn.duka.co.tz/invoices/x.pdf", "ABCD-EFGH", fixed_now());
    let invoice = templates::invoice_ready("Duka", &order).unwrap();
    assert!(invoice.text.contains("ABCD-EFGH"));

    order.contact.email = None;
    assert!(templates::order_confirmation("Duka", &order).is_none());
}
