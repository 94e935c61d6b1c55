//! Core business logic - framework-agnostic account, catalog, cart and order operations.
//!
//! Every function takes a database connection, validates its input before touching
//! storage, and returns [`crate::errors::Result`].

/// Customer account creation and lookup
pub mod user;

/// Medicine catalog reads and administrative writes
pub mod catalog;

/// Per-user cart mutations
pub mod cart;

/// Order settlement and history
pub mod order;
