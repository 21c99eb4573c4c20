//! # Chain Map
//!
//! A key-value store built from first principles: an array of slots, separate chaining
//! for collisions, and a slot array that grows and shrinks with population density.
//!
//! Each slot is empty, holds a single pair, or holds a chain of two or more pairs whose
//! keys landed on the same index. Inserting a new key that takes the density above 0.7
//! doubles the slot array; deleting a key that takes it below 0.2 halves it, but never
//! below ten slots.
//!
//! ## Basic Usage
//!
//! ```rust
//! use chainmap::{KeyValueStore, StoreError};
//!
//! // Create an empty store
//! let mut store = KeyValueStore::new();
//!
//! // Insert values
//! store.set("apple".to_string(), 1);
//! store.set("banana".to_string(), 2);
//!
//! // Retrieve values
//! assert_eq!(store.get("apple"), Ok(&1));
//! assert!(store.contains("banana"));
//!
//! // Overwrite values
//! assert_eq!(store.set("apple".to_string(), 10), Some(1));
//! assert_eq!(store.len(), 2);
//!
//! // Remove values
//! assert_eq!(store.pop("apple"), Ok(10));
//! assert_eq!(store.get("apple"), Err(StoreError::NotFound));
//! assert_eq!(store.delete("apple"), Err(StoreError::NotFound));
//! ```
//!
//! ## Construction
//!
//! ```rust
//! use chainmap::{KeyValueStore, StoreError};
//!
//! // From a single pair
//! let store = KeyValueStore::from(("key", "value"));
//! assert_eq!(store.len(), 1);
//!
//! // From a sequence of pairs; the last duplicate wins
//! let store = KeyValueStore::from(vec![("a", 1), ("b", 2), ("a", 3)]);
//! assert_eq!(store.get("a"), Ok(&3));
//! assert_eq!(store.len(), 2);
//!
//! // Dynamically shaped input is checked at runtime
//! let rejected = KeyValueStore::<String, String>::from_any(Box::new("string"));
//! assert!(matches!(rejected, Err(StoreError::InvalidArgument(_))));
//! ```
//!
//! ## Resizing
//!
//! ```rust
//! use chainmap::KeyValueStore;
//!
//! let mut store = KeyValueStore::new();
//! for i in 0..7 {
//!     store.set(i, i);
//! }
//! assert_eq!(store.capacity(), 10);
//!
//! store.set(7, 7);
//! assert_eq!(store.capacity(), 20);
//! ```

/// Module implementing the separate-chaining key-value store
mod key_value_store;
/// Error type for fallible store operations
mod error;

pub use error::StoreError;
pub use key_value_store::{Iter, KeyValueStore, Keys, MIN_SLOTS, Values};
