//! Repository layer abstractions and in-memory implementations.
//!
//! # Responsibility
//! - Define the customer data-access contract.
//! - Keep identity assignment and uniqueness enforcement behind one boundary.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateField`)
//!   and never partially apply a rejected write.

pub mod customer_repo;
pub mod demo;
