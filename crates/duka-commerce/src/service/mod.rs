//! Use cases composed from the repositories.
//!
//! Services are cheap to clone and hold `Arc`s to their collaborators.

mod cart;
mod catalog;
mod content;
mod order;
mod wishlist;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use content::ContentService;
pub use order::OrderService;
pub use wishlist::WishlistService;
