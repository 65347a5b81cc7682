//! Sample catalog and checkout data.

use crate::clock::fixed_now;
use chrono::Duration;
use duka_commerce::cart::{Cart, CartOwner};
use duka_commerce::catalog::{Category, Product};
use duka_commerce::checkout::{
    CheckoutDetails, ContactDetails, DeliveryAddress, DeliveryMethod, MobileMoneyProvider,
    Order, PaymentSelection, PricingPolicy,
};
use duka_commerce::ids::{OrderId, SessionId};
use duka_commerce::money::{Currency, Money};

/// An active product with stock, timestamps pinned to [`fixed_now`].
pub fn product(name: &str, price: i64, stock: i64) -> Product {
    let slug = duka_commerce::validation::slugify(name);
    let mut product = Product::new(name, slug, Money::tzs(price));
    product.stock = stock;
    product.created_at = fixed_now();
    product.updated_at = fixed_now();
    product
}

/// Like [`product`], but on sale.
pub fn sale_product(name: &str, price: i64, sale_price: i64, stock: i64) -> Product {
    let mut product = product(name, price, stock);
    product.sale_price = Some(Money::tzs(sale_price));
    product
}

/// A product offered in sizes S, M and L.
pub fn sized_product(name: &str, price: i64, stock: i64) -> Product {
    let mut product = product(name, price, stock);
    product.attributes.insert(
        "size".to_string(),
        vec!["S".to_string(), "M".to_string(), "L".to_string()],
    );
    product
}

pub fn category(name: &str) -> Category {
    Category::new(name)
}

pub fn contact(region: &str) -> ContactDetails {
    ContactDetails {
        full_name: "Asha Mwinyi".to_string(),
        phone: "+255712345678".to_string(),
        email: Some("asha@example.com".to_string()),
        region: region.to_string(),
    }
}

/// Direct delivery in Dar es Salaam, paid by M-Pesa.
pub fn checkout_details() -> CheckoutDetails {
    CheckoutDetails {
        contact: contact("Dar es Salaam"),
        delivery_method: DeliveryMethod::DirectDelivery,
        address: Some(DeliveryAddress::new("Plot 12, Msasani Road", "Dar es Salaam")),
        payment: PaymentSelection::MobileMoney {
            provider: MobileMoneyProvider::Mpesa,
            payer_phone: "+255712345678".to_string(),
        },
    }
}

/// Agent pickup outside the home region, cash on delivery.
pub fn pickup_details(region: &str) -> CheckoutDetails {
    CheckoutDetails {
        contact: contact(region),
        delivery_method: DeliveryMethod::AgentPickup,
        address: None,
        payment: PaymentSelection::CashOnDelivery,
    }
}

/// A placed guest order for `lines`, priced with the default policy for
/// delivery in Dar es Salaam.
///
/// An empty `lines` yields an order with no items, which checkout never
/// produces but the invoice generator must still render.
pub fn order(lines: &[(Product, i64)]) -> Order {
    let now = fixed_now();
    let owner = CartOwner::Guest(SessionId::new("sess_fixture"));
    let mut cart = Cart::new(owner.clone(), Currency::TZS, now, Duration::days(30));
    for (product, quantity) in lines {
        cart.add(product, *quantity, Default::default(), now)
            .expect("fixture line is addable");
    }
    let summary = cart.summary().expect("fixture cart sums");
    let pricing = PricingPolicy::default()
        .quote(&summary, "Dar es Salaam")
        .expect("fixture cart prices");
    if !cart.is_empty() {
        return Order::from_cart(&cart, checkout_details(), pricing, now)
            .expect("fixture order builds");
    }

    let details = checkout_details();
    Order {
        id: OrderId::generate(),
        order_number: Order::generate_order_number(now),
        owner,
        contact: details.contact,
        delivery_method: details.delivery_method,
        address: details.address,
        payment: details.payment,
        pricing,
        items: Vec::new(),
        status: Default::default(),
        payment_status: Default::default(),
        invoice_url: None,
        verification_code: None,
        created_at: now,
        updated_at: now,
    }
}
