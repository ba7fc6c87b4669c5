pub mod base;
pub mod firestore_store;
pub mod no_store;

// Re-export the primary ReviewStore items so code outside can do
// "use crate::reviews::{ReviewStore, create_review_store};"
pub use base::{create_review_store, validate_restaurant_id, ReviewStore};
