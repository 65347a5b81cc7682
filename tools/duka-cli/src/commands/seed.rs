//! Demo data for a fresh store.

use std::collections::BTreeMap;

use anyhow::Result;
use duka_commerce::catalog::{Category, ProductInput, ProductStatus};
use duka_commerce::content::{ContactInfo, FaqInput};
use duka_commerce::{CommerceError, Currency, Money};
use serde::Serialize;

use super::SeedArgs;
use crate::context::Context;

/// A demo product before its category exists.
struct DemoProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
    sale_price: Option<i64>,
    stock: i64,
    featured: bool,
    sizes: &'static [&'static str],
}

const APPAREL: &[DemoProduct] = &[
    DemoProduct {
        name: "Kitenge Shirt",
        description: "Short-sleeved cotton shirt in a bold wax print.",
        price: 45_000,
        sale_price: None,
        stock: 40,
        featured: true,
        sizes: &["S", "M", "L", "XL"],
    },
    DemoProduct {
        name: "Kanga Wrap",
        description: "Printed cotton kanga with a Swahili proverb border.",
        price: 18_000,
        sale_price: Some(15_000),
        stock: 120,
        featured: false,
        sizes: &[],
    },
    DemoProduct {
        name: "Maasai Shuka",
        description: "Checked wool blanket, red and blue.",
        price: 35_000,
        sale_price: None,
        stock: 25,
        featured: false,
        sizes: &[],
    },
];

const HOME: &[DemoProduct] = &[
    DemoProduct {
        name: "Makuti Basket",
        description: "Hand-woven palm leaf basket with leather handles.",
        price: 28_000,
        sale_price: None,
        stock: 15,
        featured: true,
        sizes: &["Small", "Large"],
    },
    DemoProduct {
        name: "Tinga Tinga Print",
        description: "A3 print of an original Tinga Tinga painting.",
        price: 60_000,
        sale_price: Some(52_000),
        stock: 8,
        featured: false,
        sizes: &[],
    },
];

const PANTRY: &[DemoProduct] = &[
    DemoProduct {
        name: "Zanzibar Spice Box",
        description: "Cloves, cardamom, cinnamon and black pepper from Pemba.",
        price: 22_000,
        sale_price: None,
        stock: 60,
        featured: true,
        sizes: &[],
    },
    DemoProduct {
        name: "Kilimanjaro Coffee 500g",
        description: "Medium roast arabica from the southern slopes.",
        price: 32_000,
        sale_price: None,
        stock: 0,
        featured: false,
        sizes: &[],
    },
];

/// Category name and description with its products.
fn demo_catalog() -> [(&'static str, &'static str, &'static [DemoProduct]); 3] {
    [
        ("Apparel", "Kitenge, kanga and everyday wear", APPAREL),
        ("Home", "Baskets, prints and decor", HOME),
        ("Pantry", "Spices, coffee and tea", PANTRY),
    ]
}

impl DemoProduct {
    fn input(&self, category: &Category, currency: Currency) -> ProductInput {
        let mut attributes = BTreeMap::new();
        if !self.sizes.is_empty() {
            attributes.insert(
                "size".to_string(),
                self.sizes.iter().map(|s| s.to_string()).collect(),
            );
        }
        ProductInput {
            name: self.name.to_string(),
            slug: None,
            category_id: Some(category.id),
            description: Some(self.description.to_string()),
            price: Money::new(self.price, currency),
            sale_price: self.sale_price.map(|p| Money::new(p, currency)),
            stock: self.stock,
            status: ProductStatus::Active,
            featured: self.featured,
            attributes,
        }
    }
}

fn demo_contact() -> ContactInfo {
    ContactInfo {
        phone: "+255 712 000 111".to_string(),
        email: "hello@duka.co.tz".to_string(),
        whatsapp: Some("+255 712 000 111".to_string()),
        address: "Kariakoo Market, Stall 14, Dar es Salaam".to_string(),
        working_hours: "Mon-Sat 08:00-18:00".to_string(),
    }
}

fn demo_faqs() -> Vec<FaqInput> {
    let faq = |position: i32, question: &str, answer: &str| FaqInput {
        question: question.to_string(),
        answer: answer.to_string(),
        position,
        published: true,
    };
    vec![
        faq(
            1,
            "Do you deliver outside Dar es Salaam?",
            "Yes. Delivery in Dar es Salaam is free; every other region pays a flat fee.",
        ),
        faq(
            2,
            "How can I pay?",
            "M-Pesa, Tigo Pesa, Airtel Money, card, or cash on delivery.",
        ),
        faq(
            3,
            "Can I collect my order from an agent?",
            "Choose agent pickup at checkout and we will call you when it is ready.",
        ),
    ]
}

#[derive(Debug, Default, Serialize)]
struct SeedReport {
    categories: usize,
    products: usize,
    skipped: usize,
    faqs: usize,
    content: bool,
}

/// Seeding twice is harmless: existing categories are reused and products
/// whose slug is taken are skipped.
pub async fn run(args: SeedArgs, ctx: &Context) -> Result<()> {
    let state = ctx.state().await?;
    let currency = ctx.config.commerce.currency;
    let mut report = SeedReport::default();

    let existing = state.catalog.categories().await?;
    for (name, description, products) in demo_catalog() {
        let category = match existing.iter().find(|c| c.name == name) {
            Some(category) => category.clone(),
            None => {
                report.categories += 1;
                state
                    .catalog
                    .create_category(Category::new(name).with_description(description))
                    .await?
            }
        };
        ctx.output.debug(&format!("Category {}", category.slug));

        for product in products {
            match state
                .catalog
                .create_product(product.input(&category, currency))
                .await
            {
                Ok(created) => {
                    report.products += 1;
                    ctx.output.list_item(&format!("{} ({})", created.name, created.price));
                }
                Err(CommerceError::Conflict(_)) => {
                    report.skipped += 1;
                    ctx.output.debug(&format!("{} already exists", product.name));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    if !args.catalog_only {
        state.content.put_contact_info(demo_contact()).await?;
        if state.content.all_faqs().await?.is_empty() {
            for faq in demo_faqs() {
                state.content.create_faq(faq).await?;
                report.faqs += 1;
            }
        }
        state
            .content
            .put_settings(ctx.config.commerce.site_settings())
            .await?;
        report.content = true;
    }

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }
    ctx.output.success(&format!(
        "Seeded {} categories and {} products ({} already present)",
        report.categories, report.products, report.skipped
    ));
    if report.content {
        ctx.output
            .success(&format!("Wrote contact details, settings and {} FAQ entries", report.faqs));
    }
    Ok(())
}
