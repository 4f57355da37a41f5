//! Domain model for the customer back office.
//!
//! # Responsibility
//! - Define canonical customer/rental records owned by the store.
//! - Define creation and partial-update payloads used by callers.
//! - Define the authenticated principal held by a session.
//!
//! # Invariants
//! - Every customer is identified by a store-assigned `CustomerId`.
//! - Rentals have no lifecycle outside their owning customer.

pub mod customer;
pub mod principal;
