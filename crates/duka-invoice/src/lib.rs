//! Order invoices for Duka.
//!
//! [`InvoiceService::generate`] loads an order, lays out a paginated receipt
//! with a [`LayoutCursor`], serializes it as PDF, uploads it to an
//! [`ObjectStore`] and records the public URL and verification code on the
//! order.
//!
//! ```ignore
//! let invoice = invoices.generate(order_id).await?;
//! println!("{} ({})", invoice.url, invoice.verification_code);
//! ```

mod code;
mod error;
pub mod layout;
pub mod pdf;
pub mod receipt;
mod service;
mod storage;

pub use code::{generate_verification_code, is_verification_code};
pub use error::InvoiceError;
pub use layout::{LayoutCursor, Page};
pub use receipt::{render_receipt, Branding};
pub use service::{invoice_key, GeneratedInvoice, InvoiceService, PDF_CONTENT_TYPE};
pub use storage::{HttpObjectStore, ObjectStore};
