//! Authenticated identities and their permissions.
//!
//! # Responsibility
//! - Model the role of a logged-in user as a tagged variant with a
//!   role-specific payload.
//! - Answer coarse permission checks for back-office actions.
//!
//! # Invariants
//! - A principal's role is implied by its variant; there is no free-form
//!   role string.
//! - Serialized form carries a `role` tag (`customer` | `agent`).

use crate::model::customer::Customer;
use serde::{Deserialize, Serialize};

/// Kind of organization an agent represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Company,
    Bank,
}

/// Back-office agent account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: u64,
    pub login: String,
    pub password: String,
    pub name: String,
    pub kind: AgentKind,
    pub contact: String,
}

/// Identity held by an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Principal {
    Customer(Customer),
    Agent(Agent),
}

/// Back-office actions subject to permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewCustomers,
    CreateCustomer,
    UpdateCustomer,
    DeleteCustomer,
}

impl Principal {
    pub fn login(&self) -> &str {
        match self {
            Self::Customer(customer) => customer.login.as_str(),
            Self::Agent(agent) => agent.login.as_str(),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Customer(customer) => customer.name.as_str(),
            Self::Agent(agent) => agent.name.as_str(),
        }
    }

    /// Stable role label, matching the serialized tag.
    pub fn role(&self) -> &'static str {
        match self {
            Self::Customer(_) => "customer",
            Self::Agent(_) => "agent",
        }
    }

    /// Returns whether this principal may perform `action`.
    ///
    /// Everyone may view customers; only agents may mutate them.
    pub fn can(&self, action: Action) -> bool {
        match action {
            Action::ViewCustomers => true,
            Action::CreateCustomer | Action::UpdateCustomer | Action::DeleteCustomer => {
                matches!(self, Self::Agent(_))
            }
        }
    }
}
