//! Generate, store and record an order's invoice.

use crate::code::generate_verification_code;
use crate::pdf::write_pdf;
use crate::receipt::{render_receipt, Branding};
use crate::{InvoiceError, ObjectStore};
use duka_commerce::checkout::Order;
use duka_commerce::clock::Clock;
use duka_commerce::ids::OrderId;
use duka_commerce::service::{ContentService, OrderService};
use std::sync::Arc;
use tracing::{error, info, instrument};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Storage key for an order's invoice.
pub fn invoice_key(order_number: &str) -> String {
    format!("invoices/{order_number}.pdf")
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct GeneratedInvoice {
    /// The order with its invoice fields set.
    pub order: Order,
    pub url: String,
    pub verification_code: String,
    pub pages: usize,
    pub size: usize,
}

#[derive(Clone)]
pub struct InvoiceService {
    orders: OrderService,
    content: ContentService,
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
}

impl InvoiceService {
    pub fn new(
        orders: OrderService,
        content: ContentService,
        store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            content,
            store,
            clock,
        }
    }

    #[instrument(skip_all, fields(order_id = %id))]
    pub async fn generate(&self, id: OrderId) -> Result<GeneratedInvoice, InvoiceError> {
        let order = self.orders.get(id).await?;
        self.run(order).await
    }

    #[instrument(skip_all, fields(order_number = %order_number))]
    pub async fn generate_by_number(&self, order_number: &str) -> Result<GeneratedInvoice, InvoiceError> {
        let order = self.orders.get_by_number(order_number).await?;
        self.run(order).await
    }

    /// Steps run strictly in order; the first failure aborts the run. A file
    /// uploaded before a failed order update is left in place.
    async fn run(&self, order: Order) -> Result<GeneratedInvoice, InvoiceError> {
        let result = self.try_run(&order).await;
        if let Err(e) = &result {
            error!(order_number = %order.order_number, error = %e, "invoice generation failed");
        }
        result
    }

    async fn try_run(&self, order: &Order) -> Result<GeneratedInvoice, InvoiceError> {
        let branding = self.branding().await?;
        let code = generate_verification_code();
        let pages = render_receipt(order, &branding, &code, self.clock.now());
        let bytes = write_pdf(&pages, &format!("Invoice {}", order.order_number));
        let size = bytes.len();

        let key = invoice_key(&order.order_number);
        let url = self.store.put(&key, bytes, PDF_CONTENT_TYPE).await?;
        let order = self.orders.set_invoice(order.id, &url, &code).await?;

        info!(
            order_number = %order.order_number,
            pages = pages.len(),
            size,
            "invoice generated"
        );
        Ok(GeneratedInvoice {
            order,
            url,
            verification_code: code,
            pages: pages.len(),
            size,
        })
    }

    async fn branding(&self) -> Result<Branding, InvoiceError> {
        let settings = self.content.settings().await?;
        let contact_lines = match self.content.contact_info().await {
            Ok(info) => vec![info.phone, info.email],
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Branding {
            store_name: settings.store_name,
            contact_lines,
        })
    }
}
