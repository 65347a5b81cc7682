//! Shared test doubles for the Duka workspace.
//!
//! In-memory repositories, deterministic clocks, scripted API fakes, a memory
//! object store, a recording mailer and sample data. Nothing here is meant
//! for production.

pub mod clock;
pub mod fixtures;
pub mod mail;
pub mod remote;
pub mod repository;
pub mod storage;
pub mod users;

pub use clock::{fixed_now, FixedClock, ManualClock};
pub use mail::RecordingMailer;
pub use remote::{ScriptedOrderApi, ScriptedRemoteCart};
pub use repository::{
    FailingCarts, InMemoryCarts, InMemoryCatalog, InMemoryContent, InMemoryOrders,
    InMemoryWishlists,
};
pub use storage::{MemoryObjectStore, StoredObject};
pub use users::InMemoryUsers;
