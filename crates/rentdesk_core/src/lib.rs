//! Core domain logic for the RentDesk customer back office.
//! This crate is the single source of truth for customer invariants.

pub mod config;
pub mod db;
pub mod display;
pub mod form;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod session;
pub mod validation;

pub use config::{CallPolicy, ConfigError, CoreConfig, LatencyProfile};
pub use form::{CustomerForm, FormError, TextField};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::customer::{
    Customer, CustomerId, CustomerPatch, NewCustomer, Rental, RentalId, RentalInput, MAX_RENTALS,
};
pub use model::principal::{Action, Agent, AgentKind, Principal};
pub use query::{filter_customers, CustomerStats};
pub use repo::customer_repo::{
    CustomerRepository, InMemoryCustomerRepository, StoreError, StoreResult, UniqueField,
};
pub use service::auth_service::{AuthError, AuthService};
pub use service::customer_service::CustomerService;
pub use session::{SessionError, SessionSlot, SqliteSessionSlot};
pub use validation::{format_national_id, validate_customer, CustomerField, FieldError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
