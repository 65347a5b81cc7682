use async_trait::async_trait;
use duka_client::{CartStore, ClientError, RemoteCart, RollbackPolicy};
use duka_commerce::cart::{AddToCart, AttributeSelection, CartItem};
use duka_commerce::ids::CartItemId;
use duka_commerce::money::Money;
use duka_test_support::fixtures::{product, sale_product, sized_product};
use duka_test_support::{fixed_now, FixedClock, ScriptedRemoteCart};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, OnceLock};

fn store(remote: &Arc<ScriptedRemoteCart>) -> CartStore {
    CartStore::new(remote.clone()).with_clock(Arc::new(FixedClock(fixed_now())))
}

fn size(value: &str) -> AttributeSelection {
    let mut attributes = AttributeSelection::new();
    attributes.insert("size".to_string(), value.to_string());
    attributes
}

#[tokio::test]
async fn test_worked_example_totals() {
    let remote = Arc::new(ScriptedRemoteCart::new());
    let shirt = product("Kitenge Shirt", 100_000, 10);
    let hat = product("Kofia", 50_000, 10);
    remote.stock(shirt.clone());
    remote.stock(hat.clone());

    let cart = store(&remote);
    assert!(cart.initialize().await);
    assert!(cart.summary().is_empty);

    assert!(cart.add_item(&shirt, 2, AttributeSelection::new()).await);
    assert!(cart.add_item(&hat, 1, AttributeSelection::new()).await);

    let summary = cart.summary();
    assert_eq!(summary.cart_total, Money::tzs(250_000));
    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.total_unique_items, 2);
    assert!(!cart.is_busy());
    assert_eq!(cart.items(), remote.server_items());
}

#[tokio::test]
async fn test_same_attributes_merge_different_split() {
    let remote = Arc::new(ScriptedRemoteCart::new());
    let tee = sized_product("Safari Tee", 20_000, 20);
    remote.stock(tee.clone());
    let cart = store(&remote);

    cart.add_item(&tee, 1, size("M")).await;
    cart.add_item(&tee, 2, size("M")).await;
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].quantity, 3);

    cart.add_item(&tee, 1, size("L")).await;
    assert_eq!(cart.items().len(), 2);
    assert_eq!(cart.summary().total_items, 4);
}

#[tokio::test]
async fn test_line_priced_at_sale_price() {
    let remote = Arc::new(ScriptedRemoteCart::new());
    let dress = sale_product("Maxi Dress", 80_000, 60_000, 5);
    remote.stock(dress.clone());
    let cart = store(&remote);

    cart.add_item(&dress, 2, AttributeSelection::new()).await;
    let summary = cart.summary();
    assert_eq!(summary.cart_total, Money::tzs(120_000));
    assert_eq!(summary.original_total, Money::tzs(160_000));
    assert_eq!(summary.total_discount, Money::tzs(40_000));
}

#[tokio::test]
async fn test_update_to_zero_and_remove_drop_lines() {
    let remote = Arc::new(ScriptedRemoteCart::new());
    let a = product("Kanga", 12_000, 10);
    let b = product("Kikoi", 18_000, 10);
    remote.stock(a.clone());
    remote.stock(b.clone());
    let cart = store(&remote);
    cart.add_item(&a, 1, AttributeSelection::new()).await;
    cart.add_item(&b, 1, AttributeSelection::new()).await;

    let first = cart.items()[0].id;
    assert!(cart.update_quantity(first, 4).await);
    assert_eq!(cart.summary().total_items, 5);

    assert!(cart.update_quantity(first, 0).await);
    assert_eq!(cart.items().len(), 1);

    let second = cart.items()[0].id;
    assert!(cart.remove_item(second).await);
    assert!(cart.summary().is_empty);
    assert!(remote.server_items().is_empty());
}

#[tokio::test]
async fn test_failure_keeps_optimistic_state_by_default() {
    let remote = Arc::new(ScriptedRemoteCart::new());
    let shirt = product("Kitenge Shirt", 100_000, 10);
    remote.stock(shirt.clone());
    let cart = store(&remote);
    assert_eq!(cart.policy(), RollbackPolicy::Keep);

    remote.set_failing(true);
    assert!(!cart.add_item(&shirt, 2, AttributeSelection::new()).await);

    assert!(!cart.is_busy());
    assert_eq!(cart.error().as_deref(), Some("Service unavailable"));
    assert_eq!(cart.summary().total_items, 2);
    assert!(remote.server_items().is_empty());

    cart.clear_error();
    assert!(cart.error().is_none());
}

#[tokio::test]
async fn test_failure_restores_snapshot_when_configured() {
    let remote = Arc::new(ScriptedRemoteCart::new());
    let shirt = product("Kitenge Shirt", 100_000, 10);
    remote.stock(shirt.clone());
    let cart = store(&remote).with_policy(RollbackPolicy::RestoreSnapshot);
    cart.add_item(&shirt, 1, AttributeSelection::new()).await;

    remote.set_failing(true);
    let line = cart.items()[0].id;
    assert!(!cart.update_quantity(line, 5).await);
    assert_eq!(cart.items()[0].quantity, 1);
    assert_eq!(cart.summary().cart_total, Money::tzs(100_000));
    assert!(cart.error().is_some());

    assert!(!cart.clear().await);
    assert_eq!(cart.items().len(), 1);
    assert!(!cart.is_busy());
}

#[tokio::test]
async fn test_initialize_failure_keeps_local_lines() {
    let remote = Arc::new(ScriptedRemoteCart::new());
    let shirt = product("Kitenge Shirt", 100_000, 10);
    remote.stock(shirt.clone());
    let cart = store(&remote);
    cart.add_item(&shirt, 1, AttributeSelection::new()).await;

    remote.set_failing(true);
    assert!(!cart.initialize().await);
    assert_eq!(cart.items().len(), 1);
    assert!(!cart.snapshot().busy);
    assert!(cart.snapshot().error.is_some());
}

#[tokio::test]
async fn test_server_rejection_surfaces_message() {
    let remote = Arc::new(ScriptedRemoteCart::new());
    let scarce = product("Last Basket", 30_000, 1);
    remote.stock(scarce.clone());
    let cart = store(&remote);

    assert!(!cart.add_item(&scarce, 3, AttributeSelection::new()).await);
    assert!(cart.error().unwrap().contains("Last Basket"));
}

#[tokio::test]
async fn test_non_positive_add_is_rejected_locally() {
    let remote = Arc::new(ScriptedRemoteCart::new());
    let shirt = product("Kitenge Shirt", 100_000, 10);
    let cart = store(&remote);

    assert!(!cart.add_item(&shirt, 0, AttributeSelection::new()).await);
    assert_eq!(remote.calls(), 0);
    assert!(cart.items().is_empty());
}

#[tokio::test]
async fn test_sync_replaces_lines() {
    let remote = Arc::new(ScriptedRemoteCart::new());
    let shirt = product("Kitenge Shirt", 100_000, 10);
    remote.stock(shirt.clone());
    let other = store(&remote);
    other.add_item(&shirt, 3, AttributeSelection::new()).await;

    let cart = store(&Arc::new(ScriptedRemoteCart::new()));
    cart.sync(other.items());
    assert_eq!(cart.summary().total_items, 3);
    assert_eq!(cart.summary().cart_total, Money::tzs(300_000));
}

/// Remote that records what a view holding a store clone sees mid-call.
#[derive(Default)]
struct WatchedRemote {
    inner: ScriptedRemoteCart,
    view: OnceLock<CartStore>,
    seen_busy: Mutex<Vec<bool>>,
}

impl WatchedRemote {
    fn observe(&self) {
        if let Some(view) = self.view.get() {
            self.seen_busy.lock().unwrap().push(view.is_busy());
        }
    }

    fn seen_busy(&self) -> Vec<bool> {
        self.seen_busy.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteCart for WatchedRemote {
    async fn fetch(&self) -> Result<Vec<CartItem>, ClientError> {
        self.observe();
        self.inner.fetch().await
    }

    async fn add(&self, request: &AddToCart) -> Result<Vec<CartItem>, ClientError> {
        self.observe();
        self.inner.add(request).await
    }

    async fn update(&self, item_id: CartItemId, quantity: i64) -> Result<Vec<CartItem>, ClientError> {
        self.observe();
        self.inner.update(item_id, quantity).await
    }

    async fn remove(&self, item_id: CartItemId) -> Result<Vec<CartItem>, ClientError> {
        self.observe();
        self.inner.remove(item_id).await
    }

    async fn clear(&self) -> Result<Vec<CartItem>, ClientError> {
        self.observe();
        self.inner.clear().await
    }
}

#[tokio::test]
async fn test_busy_is_visible_while_a_call_is_in_flight() {
    let remote = Arc::new(WatchedRemote::default());
    let shirt = product("Kitenge Shirt", 100_000, 10);
    remote.inner.stock(shirt.clone());
    let cart = CartStore::new(remote.clone()).with_clock(Arc::new(FixedClock(fixed_now())));
    assert!(remote.view.set(cart.clone()).is_ok());

    assert!(cart.initialize().await);
    assert!(cart.add_item(&shirt, 2, AttributeSelection::new()).await);
    let line = cart.items()[0].id;
    assert!(cart.update_quantity(line, 3).await);
    assert!(cart.clear().await);

    assert_eq!(remote.seen_busy(), vec![true; 4]);
    assert!(!cart.is_busy());

    // The flag also drops after a failed call.
    remote.inner.set_failing(true);
    assert!(!cart.add_item(&shirt, 1, AttributeSelection::new()).await);
    assert_eq!(remote.seen_busy().last(), Some(&true));
    assert!(!cart.is_busy());
}

#[tokio::test]
async fn test_totals_follow_mixed_sequences() {
    let products = [
        product("Kanga", 12_000, 40),
        sale_product("Maxi Dress", 80_000, 60_000, 40),
        sized_product("Safari Tee", 20_000, 40),
    ];
    let sizes = ["S", "M", "L"];

    for seed in 0..10u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let remote = Arc::new(ScriptedRemoteCart::new());
        for p in &products {
            remote.stock(p.clone());
        }
        let cart = store(&remote);

        for _ in 0..120 {
            let items = cart.items();
            match rng.gen_range(0..3) {
                1 if !items.is_empty() => {
                    let line = items[rng.gen_range(0..items.len())].id;
                    cart.update_quantity(line, rng.gen_range(0..6)).await;
                }
                2 if !items.is_empty() => {
                    let line = items[rng.gen_range(0..items.len())].id;
                    cart.remove_item(line).await;
                }
                _ => {
                    let p = &products[rng.gen_range(0..products.len())];
                    let attributes = if p.attributes.is_empty() {
                        AttributeSelection::new()
                    } else {
                        size(sizes[rng.gen_range(0..sizes.len())])
                    };
                    cart.add_item(p, rng.gen_range(1..4), attributes).await;
                }
            }

            let state = cart.snapshot();
            let total: i64 = state
                .items
                .iter()
                .map(|i| i.unit_price.amount * i.quantity)
                .sum();
            let quantity: i64 = state.items.iter().map(|i| i.quantity).sum();
            assert_eq!(state.summary.cart_total, Money::tzs(total), "seed {seed}");
            assert_eq!(state.summary.total_items, quantity, "seed {seed}");
            assert_eq!(state.summary.is_empty, state.items.is_empty(), "seed {seed}");
            assert!(!state.busy);
            if state.error.is_none() {
                assert_eq!(state.items, remote.server_items(), "seed {seed}");
            }
        }
    }
}
