//! Shared application state and its composition root.

use crate::config::DukaConfig;
use duka_auth::{AuthService, SessionManager, UserRepository};
use duka_cache::Cache;
use duka_commerce::clock::{Clock, SystemClock};
use duka_commerce::repository::{
    CartRepository, CatalogRepository, ContentRepository, OrderRepository, WishlistRepository,
};
use duka_commerce::service::{
    CartService, CatalogService, ContentService, OrderService, WishlistService,
};
use duka_db::Db;
use duka_invoice::{HttpObjectStore, InvoiceService, ObjectStore};
use duka_mail::{HttpMailer, LogMailer, Mailer};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything the services are built from. Production wires Postgres and
/// HTTP clients; tests wire the in-memory fakes.
pub struct Backends {
    pub catalog: Arc<dyn CatalogRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub wishlists: Arc<dyn WishlistRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub objects: Arc<dyn ObjectStore>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

/// Transport settings the handlers and middleware need.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub cookie_name: String,
    pub session_max_age_secs: i64,
    pub cors_origins: Vec<String>,
}

impl HttpSettings {
    pub fn from_config(config: &DukaConfig) -> Self {
        Self {
            cookie_name: config.session.cookie_name.clone(),
            session_max_age_secs: config.session.ttl_hours.max(1) * 3600,
            cors_origins: config.server.cors_origins.clone(),
        }
    }
}

/// Shared state handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub carts: CartService,
    pub wishlists: WishlistService,
    pub orders: OrderService,
    pub content: ContentService,
    pub auth: AuthService,
    pub invoices: InvoiceService,
    pub mailer: Arc<dyn Mailer>,
    pub http: Arc<HttpSettings>,
    pub db: Option<Db>,
}

impl AppState {
    /// Wire the services over `backends`.
    pub fn new(backends: Backends, config: &DukaConfig) -> Self {
        let Backends {
            catalog,
            carts,
            orders,
            wishlists,
            content,
            users,
            objects,
            mailer,
            clock,
        } = backends;

        let commerce = &config.commerce;
        let cart_service = CartService::new(carts, catalog.clone(), clock.clone())
            .with_currency(commerce.currency)
            .with_ttl_days(commerce.cart_ttl_days);
        let content_service = ContentService::new(content.clone(), clock.clone())
            .with_default_settings(commerce.site_settings());
        let order_service = OrderService::new(orders, content, cart_service.clone(), clock.clone())
            .with_fallback_policy(commerce.pricing_policy());
        let sessions = SessionManager::new(Cache::new(), clock.clone())
            .with_ttl_hours(config.session.ttl_hours);

        Self {
            catalog: CatalogService::new(catalog.clone(), clock.clone()),
            wishlists: WishlistService::new(wishlists, catalog, cart_service.clone(), clock.clone()),
            invoices: InvoiceService::new(
                order_service.clone(),
                content_service.clone(),
                objects,
                clock.clone(),
            ),
            auth: AuthService::new(users, sessions, clock),
            carts: cart_service,
            orders: order_service,
            content: content_service,
            mailer,
            http: Arc::new(HttpSettings::from_config(config)),
            db: None,
        }
    }

    /// Production wiring over an open database.
    pub fn from_db(db: Db, config: &DukaConfig) -> anyhow::Result<Self> {
        let storage = &config.storage;
        let objects = HttpObjectStore::new(
            &storage.endpoint,
            &storage.public_base_url,
            storage.api_key.clone(),
            storage.timeout_secs,
        )?;

        let mail = &config.mail;
        let mailer: Arc<dyn Mailer> = match &mail.endpoint {
            Some(endpoint) => {
                if mail.api_key.is_none() {
                    warn!("mail endpoint configured without an API key");
                }
                Arc::new(HttpMailer::new(
                    endpoint,
                    mail.api_key.clone().unwrap_or_default(),
                    mail.from.clone(),
                    mail.timeout_secs,
                )?)
            }
            None => {
                info!("no mail endpoint configured, emails are only logged");
                Arc::new(LogMailer)
            }
        };

        let backends = Backends {
            catalog: Arc::new(db.catalog()),
            carts: Arc::new(db.carts()),
            orders: Arc::new(db.orders()),
            wishlists: Arc::new(db.wishlists()),
            content: Arc::new(db.content()),
            users: Arc::new(db.users()),
            objects: Arc::new(objects),
            mailer,
            clock: Arc::new(SystemClock),
        };
        Ok(Self::new(backends, config).with_db(db))
    }

    pub fn with_db(mut self, db: Db) -> Self {
        self.db = Some(db);
        self
    }

    /// Store name for outgoing mail.
    pub async fn store_name(&self) -> String {
        match self.content.settings().await {
            Ok(settings) => settings.store_name,
            Err(e) => {
                warn!(error = %e, "could not load site settings");
                "Duka".to_string()
            }
        }
    }
}
