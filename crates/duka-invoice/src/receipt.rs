//! Receipt layout for an order.
//!
//! Sections are drawn top to bottom: header band, order and customer info,
//! line items, totals, verification box, footer. Each section asks the
//! cursor for the space it needs first; the item table re-draws its header
//! whenever a row lands on a fresh page.

use crate::layout::{wrap_text, Font, LayoutCursor, Page, CONTENT_WIDTH, MARGIN, PAGE_HEIGHT, PAGE_WIDTH};
use chrono::{DateTime, Utc};
use duka_commerce::checkout::{Order, OrderItem};

/// Characters per line of delivery instructions.
pub const INSTRUCTIONS_WRAP: usize = 60;

const HEADER_HEIGHT: f32 = 72.0;
const LINE_HEIGHT: f32 = 14.0;
const SECTION_GAP: f32 = 16.0;
const TABLE_HEADER_HEIGHT: f32 = 22.0;
const ROW_HEIGHT: f32 = 20.0;
const TOTAL_LINE_HEIGHT: f32 = 16.0;
const VERIFICATION_HEIGHT: f32 = 56.0;
const FOOTER_HEIGHT: f32 = 44.0;
const MAX_ITEM_LABEL: usize = 52;

const RIGHT_EDGE: f32 = PAGE_WIDTH - MARGIN - 6.0;
const QTY_RIGHT: f32 = 350.0;
const UNIT_RIGHT: f32 = 450.0;
const INFO_RIGHT_X: f32 = MARGIN + CONTENT_WIDTH / 2.0;

/// Shop details printed on the receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branding {
    pub store_name: String,
    /// Phone, email and the like, joined into the footer.
    pub contact_lines: Vec<String>,
}

/// Lay out the receipt for `order`.
pub fn render_receipt(
    order: &Order,
    branding: &Branding,
    verification_code: &str,
    generated_at: DateTime<Utc>,
) -> Vec<Page> {
    let mut cursor = LayoutCursor::new();
    draw_header(&mut cursor, order, branding);
    draw_info(&mut cursor, order);
    draw_items(&mut cursor, &order.items);
    draw_totals(&mut cursor, order);
    draw_verification(&mut cursor, verification_code);
    draw_footer(&mut cursor, branding, generated_at);

    let mut pages = cursor.into_pages();
    number_pages(&mut pages);
    pages
}

fn draw_header(cursor: &mut LayoutCursor, order: &Order, branding: &Branding) {
    cursor.fill_rect(MARGIN, CONTENT_WIDTH, HEADER_HEIGHT, 0.2);
    cursor.text_gray(MARGIN + 16.0, 32.0, 20.0, Font::Bold, 1.0, &branding.store_name);
    cursor.text_gray(MARGIN + 16.0, 54.0, 10.0, Font::Regular, 1.0, "Official receipt");
    let title = "INVOICE";
    let x = RIGHT_EDGE - 10.0 - crate::layout::text_width(title, 18.0);
    cursor.text_gray(x, 32.0, 18.0, Font::Bold, 1.0, title);
    let x = RIGHT_EDGE - 10.0 - crate::layout::text_width(&order.order_number, 10.0);
    cursor.text_gray(x, 54.0, 10.0, Font::Regular, 1.0, &order.order_number);
    cursor.advance(HEADER_HEIGHT + SECTION_GAP);
}

fn info_columns(order: &Order) -> (Vec<String>, Vec<String>) {
    let left = vec![
        format!("Order number: {}", order.order_number),
        format!("Date: {}", order.created_at.format("%d %b %Y %H:%M UTC")),
        format!("Status: {}", order.status.display_name()),
        format!("Payment: {}", order.payment.display_name()),
        format!("Payment status: {}", order.payment_status.as_str()),
    ];

    let contact = &order.contact;
    let mut right = vec![contact.full_name.clone(), contact.phone.clone()];
    if let Some(email) = contact.email() {
        right.push(email.to_string());
    }
    right.push(format!("Region: {}", contact.region));
    right.push(format!("Delivery: {}", order.delivery_method.display_name()));
    if let Some(address) = &order.address {
        right.push(format!("{}, {}", address.address, address.city));
        if let Some(instructions) = address.instructions.as_deref() {
            let wrapped = wrap_text(instructions, INSTRUCTIONS_WRAP);
            if !wrapped.is_empty() {
                right.push("Instructions:".to_string());
                right.extend(wrapped);
            }
        }
    }
    (left, right)
}

fn draw_info(cursor: &mut LayoutCursor, order: &Order) {
    let (left, right) = info_columns(order);
    let rows = left.len().max(right.len()) + 1;
    let height = rows as f32 * LINE_HEIGHT;
    cursor.ensure_space(height + SECTION_GAP);

    cursor.text(MARGIN, 10.0, 11.0, Font::Bold, "Order");
    cursor.text(INFO_RIGHT_X, 10.0, 11.0, Font::Bold, "Customer");
    for (i, line) in left.into_iter().enumerate() {
        cursor.text(MARGIN, 10.0 + (i + 1) as f32 * LINE_HEIGHT, 9.0, Font::Regular, line);
    }
    for (i, line) in right.into_iter().enumerate() {
        cursor.text(INFO_RIGHT_X, 10.0 + (i + 1) as f32 * LINE_HEIGHT, 9.0, Font::Regular, line);
    }
    cursor.advance(height + SECTION_GAP);
}

fn draw_table_header(cursor: &mut LayoutCursor) {
    cursor.fill_rect(MARGIN, CONTENT_WIDTH, TABLE_HEADER_HEIGHT, 0.85);
    cursor.text(MARGIN + 6.0, 15.0, 9.0, Font::Bold, "Item");
    cursor.text_right(QTY_RIGHT, 15.0, 9.0, Font::Bold, "Qty");
    cursor.text_right(UNIT_RIGHT, 15.0, 9.0, Font::Bold, "Unit price");
    cursor.text_right(RIGHT_EDGE, 15.0, 9.0, Font::Bold, "Total");
    cursor.advance(TABLE_HEADER_HEIGHT);
}

fn item_label(item: &OrderItem) -> String {
    let attributes = item.attribute_label();
    let label = if attributes.is_empty() {
        item.product_name.clone()
    } else {
        format!("{} ({attributes})", item.product_name)
    };
    if label.chars().count() > MAX_ITEM_LABEL {
        let mut short: String = label.chars().take(MAX_ITEM_LABEL - 3).collect();
        short.push_str("...");
        short
    } else {
        label
    }
}

fn draw_items(cursor: &mut LayoutCursor, items: &[OrderItem]) {
    cursor.ensure_space(TABLE_HEADER_HEIGHT + ROW_HEIGHT);
    draw_table_header(cursor);

    if items.is_empty() {
        cursor.text_gray(MARGIN + 6.0, 14.0, 9.0, Font::Regular, 0.4, "No items");
        cursor.advance(ROW_HEIGHT);
    }
    for (index, item) in items.iter().enumerate() {
        if cursor.ensure_space(ROW_HEIGHT) {
            draw_table_header(cursor);
        }
        if index % 2 == 1 {
            cursor.fill_rect(MARGIN, CONTENT_WIDTH, ROW_HEIGHT, 0.95);
        }
        cursor.text(MARGIN + 6.0, 14.0, 9.0, Font::Regular, item_label(item));
        cursor.text_right(QTY_RIGHT, 14.0, 9.0, Font::Regular, &item.quantity.to_string());
        cursor.text_right(UNIT_RIGHT, 14.0, 9.0, Font::Regular, &item.unit_price.display());
        cursor.text_right(RIGHT_EDGE, 14.0, 9.0, Font::Regular, &item.line_total.display());
        cursor.advance(ROW_HEIGHT);
    }
    cursor.rule(0.0);
    cursor.advance(SECTION_GAP);
}

fn draw_totals(cursor: &mut LayoutCursor, order: &Order) {
    let pricing = &order.pricing;
    let lines = [
        ("Subtotal", pricing.subtotal, Font::Regular),
        ("Discount", pricing.discount, Font::Regular),
        ("Shipping", pricing.shipping, Font::Regular),
        ("Tax", pricing.tax, Font::Regular),
        ("Total", pricing.total, Font::Bold),
    ];
    cursor.ensure_space(lines.len() as f32 * TOTAL_LINE_HEIGHT + SECTION_GAP);
    for (label, amount, font) in lines {
        cursor.text_right(UNIT_RIGHT, 12.0, 10.0, font, label);
        cursor.text_right(RIGHT_EDGE, 12.0, 10.0, font, &amount.display());
        cursor.advance(TOTAL_LINE_HEIGHT);
    }
    cursor.advance(SECTION_GAP);
}

fn draw_verification(cursor: &mut LayoutCursor, code: &str) {
    cursor.ensure_space(VERIFICATION_HEIGHT + SECTION_GAP);
    cursor.stroke_rect(MARGIN, CONTENT_WIDTH, VERIFICATION_HEIGHT);
    cursor.text(MARGIN + 12.0, 20.0, 10.0, Font::Bold, "Verification code");
    cursor.text(MARGIN + 140.0, 20.0, 14.0, Font::Bold, code);
    cursor.text_gray(
        MARGIN + 12.0,
        40.0,
        8.0,
        Font::Regular,
        0.3,
        "Quote this code when contacting us to confirm the receipt is genuine.",
    );
    cursor.advance(VERIFICATION_HEIGHT + SECTION_GAP);
}

fn draw_footer(cursor: &mut LayoutCursor, branding: &Branding, generated_at: DateTime<Utc>) {
    cursor.ensure_space(FOOTER_HEIGHT);
    cursor.rule(0.0);
    cursor.text_gray(
        MARGIN,
        14.0,
        9.0,
        Font::Regular,
        0.3,
        format!("Thank you for shopping with {}.", branding.store_name),
    );
    if !branding.contact_lines.is_empty() {
        cursor.text_gray(MARGIN, 26.0, 8.0, Font::Regular, 0.3, branding.contact_lines.join("  |  "));
    }
    cursor.text_gray(
        MARGIN,
        38.0,
        8.0,
        Font::Regular,
        0.3,
        format!("Generated {}", generated_at.format("%d %b %Y %H:%M UTC")),
    );
    cursor.advance(FOOTER_HEIGHT);
}

/// Stamp "Page i of n" into the bottom margin of every page.
fn number_pages(pages: &mut [Page]) {
    let total = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        let label = format!("Page {} of {total}", i + 1);
        let x = PAGE_WIDTH - MARGIN - crate::layout::text_width(&label, 8.0);
        page.ops.push(crate::layout::DrawOp::Text {
            x,
            y: PAGE_HEIGHT - MARGIN / 2.0,
            size: 8.0,
            font: Font::Regular,
            gray: 0.4,
            text: label,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use duka_commerce::cart::CartOwner;
    use duka_commerce::checkout::{
        ContactDetails, DeliveryAddress, DeliveryMethod, OrderStatus, PaymentSelection,
        PaymentStatus, PriceBreakdown,
    };
    use duka_commerce::ids::{OrderId, OrderItemId, ProductId, SessionId};
    use duka_commerce::money::Money;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap()
    }

    fn order(lines: usize) -> Order {
        let items = (0..lines)
            .map(|i| OrderItem {
                id: OrderItemId::generate(),
                product_id: ProductId::generate(),
                product_name: format!("Item {i}"),
                attributes: Default::default(),
                quantity: 1,
                unit_price: Money::tzs(1_000),
                line_total: Money::tzs(1_000),
            })
            .collect();
        let total = Money::tzs(1_000 * lines as i64);
        Order {
            id: OrderId::generate(),
            order_number: "ORD-20260115-ABC234".to_string(),
            owner: CartOwner::Guest(SessionId::new("sess_t")),
            contact: ContactDetails {
                full_name: "Asha Mwinyi".to_string(),
                phone: "+255712345678".to_string(),
                email: None,
                region: "Dar es Salaam".to_string(),
            },
            delivery_method: DeliveryMethod::DirectDelivery,
            address: Some(DeliveryAddress {
                address: "Plot 12, Msasani Road".to_string(),
                city: "Dar es Salaam".to_string(),
                instructions: Some("Blue gate next to the pharmacy; call on arrival please, \
                                    the askari will let you in"
                    .to_string()),
            }),
            payment: PaymentSelection::CashOnDelivery,
            pricing: PriceBreakdown {
                subtotal: total,
                discount: Money::tzs(0),
                shipping: Money::tzs(0),
                tax: Money::tzs(0),
                total,
            },
            items,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            invoice_url: None,
            verification_code: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn branding() -> Branding {
        Branding {
            store_name: "Duka".to_string(),
            contact_lines: vec!["+255 700 000 000".to_string()],
        }
    }

    fn count(pages: &[Page], needle: &str) -> usize {
        pages.iter().flat_map(|p| p.texts()).filter(|t| *t == needle).count()
    }

    #[test]
    fn test_zero_items_renders_all_sections() {
        let pages = render_receipt(&order(0), &branding(), "ABCD-EFGH", now());
        assert_eq!(pages.len(), 1);
        let texts: Vec<&str> = pages[0].texts().collect();
        assert!(texts.contains(&"INVOICE"));
        assert!(texts.contains(&"Item"));
        assert!(texts.contains(&"No items"));
        assert!(texts.contains(&"ABCD-EFGH"));
        assert!(texts.contains(&"Thank you for shopping with Duka."));
        assert!(texts.contains(&"Page 1 of 1"));
    }

    #[test]
    fn test_many_items_repeat_table_header() {
        let pages = render_receipt(&order(80), &branding(), "ABCD-EFGH", now());
        assert!(pages.len() >= 3);
        assert_eq!(count(&pages, "Item"), pages.len());
        assert_eq!(count(&pages, "Item 79"), 1);
        assert_eq!(count(&pages, "INVOICE"), 1);
        assert_eq!(count(&pages, &format!("Page {} of {}", pages.len(), pages.len())), 1);
    }

    #[test]
    fn test_instructions_are_wrapped() {
        let (_, right) = info_columns(&order(1));
        let at = right.iter().position(|l| l == "Instructions:").unwrap();
        assert!(right[at + 1..].len() >= 2);
        assert!(right[at + 1..].iter().all(|l| l.chars().count() <= INSTRUCTIONS_WRAP));
    }

    #[test]
    fn test_long_item_labels_truncate() {
        let mut item = order(1).items.remove(0);
        item.product_name = "A".repeat(80);
        let label = item_label(&item);
        assert_eq!(label.chars().count(), MAX_ITEM_LABEL);
        assert!(label.ends_with("..."));
    }
}
