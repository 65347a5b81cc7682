//! PostgreSQL storage for Duka.
//!
//! Implements the repository traits from `duka-commerce` and `duka-auth` on
//! a shared `sqlx` pool. Migrations are embedded and run with
//! [`Db::migrate`].
//!
//! # Example
//!
//! ```rust,no_run
//! use duka_db::{Db, PoolConfig};
//!
//! # async fn run() -> Result<(), duka_db::DbError> {
//! let db = Db::connect("postgres://localhost/duka", PoolConfig::default()).await?;
//! db.migrate().await?;
//! let catalog = db.catalog();
//! # let _ = catalog;
//! # Ok(())
//! # }
//! ```

mod carts;
mod catalog;
mod content;
mod error;
mod orders;
mod pool;
mod users;
mod wishlists;

pub use carts::PgCarts;
pub use catalog::PgCatalog;
pub use content::PgContent;
pub use error::DbError;
pub use orders::PgOrders;
pub use pool::{Db, PoolConfig};
pub use users::PgUsers;
pub use wishlists::PgWishlists;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Db, DbError, PgCarts, PgCatalog, PgContent, PgOrders, PgUsers, PgWishlists, PoolConfig,
    };
}
