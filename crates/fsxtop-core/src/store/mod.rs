// ── In-memory stores ──
//
// Thread-safe caches the controllers write into and the display reads
// snapshots from. Each store guards all of its state with one mutex held
// for the full duration of every operation, so a reader never observes a
// half-applied update. Nothing orders separate calls against each other;
// splitting each entity into identity and metrics halves is what keeps
// concurrent producers from erasing each other's work.

mod detail_store;
mod filter;
mod resource_store;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use detail_store::{DetailSnapshot, DetailStore};
pub use filter::ResourceFilter;
pub use resource_store::{ResourceSnapshot, ResourceStore, StoreStats};

/// Lock, recovering the data if a previous holder panicked. Store
/// operations never leave an entity half-written, so the data behind a
/// poisoned lock is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
