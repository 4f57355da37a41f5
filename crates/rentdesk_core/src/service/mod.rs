//! Core use-case services.
//!
//! # Responsibility
//! - Wrap repository calls in the asynchronous store contract.
//! - Hold the authenticated session on top of the store.

pub mod auth_service;
pub mod customer_service;
