//! Message templates.
//!
//! Order templates return `None` when the customer left no email address;
//! [`crate::dispatch`] treats that as nothing to send.

use crate::EmailMessage;
use duka_commerce::checkout::Order;
use duka_commerce::content::SupportTicket;
use std::fmt::Write;

pub const WELCOME: &str = "welcome";
pub const ORDER_CONFIRMATION: &str = "order_confirmation";
pub const ORDER_UPDATE: &str = "order_update";
pub const INVOICE_READY: &str = "invoice_ready";
pub const SUPPORT_ACK: &str = "support_ack";

fn message(to: &str, subject: String, text: String, template: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject,
        text,
        template: template.to_string(),
    }
}

pub fn welcome(store_name: &str, name: &str, email: &str) -> EmailMessage {
    let text = format!(
        "Hi {name},\n\n\
         Welcome to {store_name}. Your account is ready: sign in with {email} to \
         track orders and keep a wishlist.\n\n\
         Karibu!\n{store_name}"
    );
    message(email, format!("Welcome to {store_name}"), text, WELCOME)
}

fn order_lines(order: &Order) -> String {
    let mut lines = String::new();
    for item in &order.items {
        let label = item.attribute_label();
        let _ = write!(lines, "  {} x {}", item.quantity, item.product_name);
        if !label.is_empty() {
            let _ = write!(lines, " ({label})");
        }
        let _ = writeln!(lines, "  {}", item.line_total.display());
    }
    lines
}

pub fn order_confirmation(store_name: &str, order: &Order) -> Option<EmailMessage> {
    let to = order.contact.email()?;
    let pricing = &order.pricing;
    let mut text = format!(
        "Hi {},\n\nThank you for your order {}.\n\n",
        order.contact.full_name, order.order_number
    );
    text.push_str(&order_lines(order));
    let _ = write!(
        text,
        "\nSubtotal: {}\nDiscount: {}\nShipping: {}\nTax: {}\nTotal: {}\n\n\
         Delivery: {}\nPayment: {}\n\n{store_name}",
        pricing.subtotal.display(),
        pricing.discount.display(),
        pricing.shipping.display(),
        pricing.tax.display(),
        pricing.total.display(),
        order.delivery_method.display_name(),
        order.payment.display_name(),
    );
    Some(message(
        to,
        format!("Order {} received", order.order_number),
        text,
        ORDER_CONFIRMATION,
    ))
}

pub fn order_update(store_name: &str, order: &Order) -> Option<EmailMessage> {
    let to = order.contact.email()?;
    let text = format!(
        "Hi {},\n\nYour order {} is now {}.\n\n{store_name}",
        order.contact.full_name,
        order.order_number,
        order.status.display_name().to_lowercase(),
    );
    Some(message(
        to,
        format!("Order {}: {}", order.order_number, order.status.display_name()),
        text,
        ORDER_UPDATE,
    ))
}

/// Needs the invoice fields set on the order.
pub fn invoice_ready(store_name: &str, order: &Order) -> Option<EmailMessage> {
    let to = order.contact.email()?;
    let url = order.invoice_url.as_deref()?;
    let code = order.verification_code.as_deref()?;
    let text = format!(
        "Hi {},\n\nThe invoice for order {} is ready:\n{url}\n\n\
         Verification code: {code}\n\n{store_name}",
        order.contact.full_name, order.order_number,
    );
    Some(message(
        to,
        format!("Invoice for order {}", order.order_number),
        text,
        INVOICE_READY,
    ))
}

pub fn support_ack(store_name: &str, ticket: &SupportTicket, reference: &str) -> EmailMessage {
    let text = format!(
        "Hi {},\n\nWe received your message \"{}\" and will reply soon. \
         Your reference is {reference}.\n\n{store_name}",
        ticket.name, ticket.subject,
    );
    message(
        ticket.email.trim(),
        format!("[{reference}] {}", ticket.subject),
        text,
        SUPPORT_ACK,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket() -> SupportTicket {
        SupportTicket {
            name: "Juma".to_string(),
            email: " juma@example.com ".to_string(),
            subject: "Late delivery".to_string(),
            message: "My parcel has not arrived yet".to_string(),
        }
    }

    #[test]
    fn test_welcome_addresses_user() {
        let msg = welcome("Duka", "Neema", "neema@example.com");
        assert_eq!(msg.to, "neema@example.com");
        assert_eq!(msg.subject, "Welcome to Duka");
        assert!(msg.text.contains("Hi Neema"));
        assert_eq!(msg.template, WELCOME);
    }

    #[test]
    fn test_support_ack_quotes_reference() {
        let msg = support_ack("Duka", &ticket(), "TKT-ABC234");
        assert_eq!(msg.to, "juma@example.com");
        assert_eq!(msg.subject, "[TKT-ABC234] Late delivery");
        assert!(msg.text.contains("TKT-ABC234"));
    }
}
