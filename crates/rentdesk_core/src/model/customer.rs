//! Customer and rental domain model.
//!
//! # Responsibility
//! - Define the canonical customer record and its rental history.
//! - Provide the payload shapes used by create (`NewCustomer`) and
//!   update/validation (`CustomerPatch`).
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - `login` and `national_id` are unique across all stored customers.
//! - Rental ids are unique within their owning customer's list.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Maximum number of rentals a customer may carry through the form layer.
pub const MAX_RENTALS: usize = 5;

/// Store-assigned customer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u64);

impl Display for CustomerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned rental identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RentalId(pub u64);

impl Display for RentalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One historical vehicle rental owned by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub id: RentalId,
    pub brand: String,
    pub model: String,
    pub plate: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Rental price. Expected to be non-negative.
    pub amount: Decimal,
}

/// Rental line as supplied by callers; `id` is assigned by the store when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalInput {
    #[serde(default)]
    pub id: Option<RentalId>,
    pub brand: String,
    pub model: String,
    pub plate: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub amount: Decimal,
}

impl RentalInput {
    /// Creates an empty rental line dated `today`, as the form layer does
    /// when a new row is added.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            id: None,
            brand: String::new(),
            model: String::new(),
            plate: String::new(),
            start_date: today,
            end_date: today,
            amount: Decimal::ZERO,
        }
    }

    /// Returns whether brand, model and plate are all filled in.
    pub fn is_complete(&self) -> bool {
        !self.brand.is_empty() && !self.model.is_empty() && !self.plate.is_empty()
    }
}

impl From<Rental> for RentalInput {
    fn from(value: Rental) -> Self {
        Self {
            id: Some(value.id),
            brand: value.brand,
            model: value.model,
            plate: value.plate,
            start_date: value.start_date,
            end_date: value.end_date,
            amount: value.amount,
        }
    }
}

/// Canonical customer record held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    /// Email-shaped login, unique across customers.
    pub login: String,
    pub password: String,
    pub name: String,
    /// Formatted as `NNN.NNN.NNN-NN`, unique across customers.
    pub national_id: String,
    pub secondary_id: String,
    pub address: String,
    pub occupation: String,
    pub rentals: Vec<Rental>,
}

impl Customer {
    /// Sum of all rental amounts for this customer.
    pub fn total_spent(&self) -> Decimal {
        self.rentals.iter().map(|rental| rental.amount).sum()
    }
}

/// Creation payload: every customer field except the store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub login: String,
    pub password: String,
    pub name: String,
    pub national_id: String,
    pub secondary_id: String,
    pub address: String,
    pub occupation: String,
    #[serde(default)]
    pub rentals: Vec<RentalInput>,
}

/// Partial customer payload.
///
/// `None` means "not provided". Used for shallow-merge updates and as the
/// validator input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPatch {
    pub login: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub national_id: Option<String>,
    pub secondary_id: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub rentals: Option<Vec<RentalInput>>,
}

impl From<NewCustomer> for CustomerPatch {
    fn from(value: NewCustomer) -> Self {
        Self {
            login: Some(value.login),
            password: Some(value.password),
            name: Some(value.name),
            national_id: Some(value.national_id),
            secondary_id: Some(value.secondary_id),
            address: Some(value.address),
            occupation: Some(value.occupation),
            rentals: Some(value.rentals),
        }
    }
}

impl From<Customer> for CustomerPatch {
    fn from(value: Customer) -> Self {
        Self {
            login: Some(value.login),
            password: Some(value.password),
            name: Some(value.name),
            national_id: Some(value.national_id),
            secondary_id: Some(value.secondary_id),
            address: Some(value.address),
            occupation: Some(value.occupation),
            rentals: Some(value.rentals.into_iter().map(RentalInput::from).collect()),
        }
    }
}

impl CustomerPatch {
    /// Converts a fully populated patch into a creation payload.
    ///
    /// Returns `None` when any required text field is missing. A missing
    /// rentals list becomes an empty one.
    pub fn into_new_customer(self) -> Option<NewCustomer> {
        Some(NewCustomer {
            login: self.login?,
            password: self.password.unwrap_or_default(),
            name: self.name?,
            national_id: self.national_id?,
            secondary_id: self.secondary_id?,
            address: self.address?,
            occupation: self.occupation?,
            rentals: self.rentals.unwrap_or_default(),
        })
    }
}
