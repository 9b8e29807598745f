//! Service layer providing business-oriented operations on top of the record store.
//! - Separates business logic from data access.
//! - `store` is the only seam to persistence; handlers never touch the tree directly.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod runtime;
pub mod store;
pub mod articles;
pub mod catalog;

pub use errors::StoreError;
