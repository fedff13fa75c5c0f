//! Integration tests for the Pipo cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pipo-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Shopper journeys through `CartService` over `MemoryStore`
//! - `file_store_flow` - The same journeys split across service instances
//!   sharing one `FileStore` file, as separate CLI invocations do
//!
//! This library holds the fixtures both suites share.

use std::path::PathBuf;

use pipo_cart::{CartService, CartStore, EventLog, MemoryStore, Product, SequentialIdGenerator};
use pipo_core::Price;
use tempfile::TempDir;

/// A product fixture with a derived image path.
#[must_use]
pub fn product(title: &str, cents: i64) -> Product {
    Product::new(
        title,
        Price::from_cents(cents),
        format!("assets/{}.jpg", title.to_lowercase().replace(' ', "-")),
    )
}

/// In-memory service with deterministic ids and an attached event log.
#[must_use]
pub fn memory_service() -> (CartService<MemoryStore>, EventLog) {
    let log = EventLog::new();
    let mut service = CartService::new(CartStore::new(MemoryStore::new()))
        .with_id_generator(SequentialIdGenerator::starting_at(1_700_000_000_000));
    service.subscribe(log.clone());
    (service, log)
}

/// A store file path inside a fresh temp directory.
///
/// The file itself does not exist yet. Keep the returned `TempDir` alive for
/// the whole test; the directory is deleted when it drops.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn scratch_store() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("pipo-store.json");
    (dir, path)
}
