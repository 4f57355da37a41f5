//! Customer repository contract and in-memory implementation.
//!
//! # Responsibility
//! - Own customer identity, rental identity and uniqueness enforcement.
//! - Provide list/get/create/update/delete over the backing collection.
//!
//! # Invariants
//! - `list_customers` returns clones; callers never observe later mutations.
//! - Customer ids come from a monotonically increasing counter and are never
//!   reused, even after deletion.
//! - `login` and `national_id` stay unique across stored customers.
//! - Rental ids are unique within each customer's list. A supplied rental id
//!   of `0` counts as missing and gets a fresh one.
//! - Counters only move once a write has passed every check; a rejected write
//!   consumes no ids.
//! - The store does not cap the number of rentals; that rule belongs to the
//!   form layer.

use crate::model::customer::{
    Customer, CustomerId, CustomerPatch, NewCustomer, Rental, RentalId, RentalInput,
};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type StoreResult<T> = Result<T, StoreError>;

/// Customer fields that must be unique across the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    NationalId,
    Login,
}

impl Display for UniqueField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NationalId => f.write_str("nationalId"),
            Self::Login => f.write_str("login"),
        }
    }
}

/// Store-level failure for customer operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another customer already holds this unique value. Nothing was persisted.
    DuplicateField(UniqueField),
    /// No customer with this id exists (stale reference).
    NotFound(CustomerId),
    /// The simulated call did not complete within the configured timeout.
    Timeout { operation: &'static str },
    /// A supplied rental id leaves no room for the id counter to advance.
    InvalidRentalId(RentalId),
    /// A customer or rental id counter has no values left.
    IdSpaceExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateField(UniqueField::NationalId) => {
                f.write_str("national ID already registered")
            }
            Self::DuplicateField(UniqueField::Login) => f.write_str("email already registered"),
            Self::NotFound(id) => write!(f, "customer not found: {id}"),
            Self::Timeout { operation } => write!(f, "customer {operation} timed out"),
            Self::InvalidRentalId(id) => write!(f, "rental id {id} is out of range"),
            Self::IdSpaceExhausted => f.write_str("no customer or rental ids left"),
        }
    }
}

impl Error for StoreError {}

/// Repository interface for customer CRUD operations.
pub trait CustomerRepository {
    fn list_customers(&self) -> StoreResult<Vec<Customer>>;
    fn get_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>>;
    fn create_customer(&self, input: NewCustomer) -> StoreResult<Customer>;
    fn update_customer(&self, id: CustomerId, patch: CustomerPatch) -> StoreResult<Customer>;
    fn delete_customer(&self, id: CustomerId) -> StoreResult<()>;
}

impl<R: CustomerRepository + ?Sized> CustomerRepository for &R {
    fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        (**self).list_customers()
    }

    fn get_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        (**self).get_customer(id)
    }

    fn create_customer(&self, input: NewCustomer) -> StoreResult<Customer> {
        (**self).create_customer(input)
    }

    fn update_customer(&self, id: CustomerId, patch: CustomerPatch) -> StoreResult<Customer> {
        (**self).update_customer(id, patch)
    }

    fn delete_customer(&self, id: CustomerId) -> StoreResult<()> {
        (**self).delete_customer(id)
    }
}

#[derive(Debug)]
struct StoreState {
    customers: Vec<Customer>,
    /// `None` once the id space is used up.
    next_customer_id: Option<u64>,
    next_rental_id: Option<u64>,
}

/// Rentals with their ids resolved, plus the counter value to commit once
/// the write goes through.
struct RentalPlan {
    rentals: Vec<Rental>,
    next_rental_id: Option<u64>,
}

impl StoreState {
    fn position(&self, id: CustomerId) -> Option<usize> {
        self.customers.iter().position(|customer| customer.id == id)
    }

    /// Finds a unique-field collision with any customer other than `except`.
    fn collision(
        &self,
        except: Option<CustomerId>,
        national_id: Option<&str>,
        login: Option<&str>,
    ) -> Option<UniqueField> {
        let others = || {
            self.customers
                .iter()
                .filter(move |customer| Some(customer.id) != except)
        };
        if let Some(national_id) = national_id {
            if others().any(|customer| customer.national_id == national_id) {
                return Some(UniqueField::NationalId);
            }
        }
        if let Some(login) = login {
            if others().any(|customer| customer.login == login) {
                return Some(UniqueField::Login);
            }
        }
        None
    }

    fn peek_customer_id(&self) -> StoreResult<CustomerId> {
        self.next_customer_id
            .map(CustomerId)
            .ok_or(StoreError::IdSpaceExhausted)
    }

    /// Resolves rental ids without touching the counter.
    ///
    /// Supplied ids are kept and push the counter past them; missing, zero
    /// and repeated ids get fresh ones.
    fn plan_rentals(&self, inputs: Vec<RentalInput>) -> StoreResult<RentalPlan> {
        let mut next = self.next_rental_id;
        for id in supplied_rental_ids(&inputs) {
            let after = id.0.checked_add(1).ok_or(StoreError::InvalidRentalId(id))?;
            next = next.map(|next| next.max(after));
        }

        let mut seen = HashSet::with_capacity(inputs.len());
        let mut rentals = Vec::with_capacity(inputs.len());
        for input in inputs {
            let id = match input.id {
                Some(id) if id.0 != 0 && seen.insert(id) => id,
                _ => {
                    let fresh = next.ok_or(StoreError::IdSpaceExhausted)?;
                    next = fresh.checked_add(1);
                    seen.insert(RentalId(fresh));
                    RentalId(fresh)
                }
            };
            rentals.push(Rental {
                id,
                brand: input.brand,
                model: input.model,
                plate: input.plate,
                start_date: input.start_date,
                end_date: input.end_date,
                amount: input.amount,
            });
        }

        Ok(RentalPlan {
            rentals,
            next_rental_id: next,
        })
    }
}

fn supplied_rental_ids(inputs: &[RentalInput]) -> impl Iterator<Item = RentalId> + '_ {
    inputs
        .iter()
        .filter_map(|input| input.id)
        .filter(|id| id.0 != 0)
}

/// Next free id after `max`; `Some(1)` for an empty collection.
fn successor(max: Option<u64>) -> Option<u64> {
    match max {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Mutex-guarded in-memory customer repository.
///
/// Each call runs under the lock, so a single check-then-write is atomic.
/// Nothing serializes separate calls against each other.
#[derive(Debug)]
pub struct InMemoryCustomerRepository {
    state: Mutex<StoreState>,
}

impl Default for InMemoryCustomerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCustomerRepository {
    /// Creates an empty repository; the first customer gets id 1.
    pub fn new() -> Self {
        Self::from_records(Vec::new())
    }

    /// Creates a repository holding `customers`.
    ///
    /// Counters start past the highest customer and rental ids present.
    pub fn from_records(customers: Vec<Customer>) -> Self {
        let next_customer_id = successor(customers.iter().map(|customer| customer.id.0).max());
        let next_rental_id = successor(
            customers
                .iter()
                .flat_map(|customer| customer.rentals.iter())
                .map(|rental| rental.id.0)
                .max(),
        );

        Self {
            state: Mutex::new(StoreState {
                customers,
                next_customer_id,
                next_rental_id,
            }),
        }
    }

    /// Creates a repository seeded with the demo back-office customers.
    pub fn with_demo_data() -> Self {
        Self::from_records(crate::repo::demo::demo_customers())
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        // State is only mutated after every check passed, so a poisoned lock
        // still guards a consistent collection.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CustomerRepository for InMemoryCustomerRepository {
    fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.state().customers.clone())
    }

    fn get_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        let state = self.state();
        Ok(state
            .customers
            .iter()
            .find(|customer| customer.id == id)
            .cloned())
    }

    fn create_customer(&self, input: NewCustomer) -> StoreResult<Customer> {
        let mut state = self.state();

        if let Some(field) = state.collision(
            None,
            Some(input.national_id.as_str()),
            Some(input.login.as_str()),
        ) {
            return Err(StoreError::DuplicateField(field));
        }

        let id = state.peek_customer_id()?;
        let plan = state.plan_rentals(input.rentals)?;
        let customer = Customer {
            id,
            login: input.login,
            password: input.password,
            name: input.name,
            national_id: input.national_id,
            secondary_id: input.secondary_id,
            address: input.address,
            occupation: input.occupation,
            rentals: plan.rentals,
        };

        state.next_customer_id = id.0.checked_add(1);
        state.next_rental_id = plan.next_rental_id;
        state.customers.push(customer.clone());
        Ok(customer)
    }

    fn update_customer(&self, id: CustomerId, patch: CustomerPatch) -> StoreResult<Customer> {
        let mut state = self.state();
        let index = state.position(id).ok_or(StoreError::NotFound(id))?;

        let current = &state.customers[index];
        let national_id = patch
            .national_id
            .as_deref()
            .filter(|value| *value != current.national_id);
        let login = patch
            .login
            .as_deref()
            .filter(|value| *value != current.login);
        if let Some(field) = state.collision(Some(id), national_id, login) {
            return Err(StoreError::DuplicateField(field));
        }

        let rentals = match patch.rentals {
            Some(inputs) => {
                let plan = state.plan_rentals(inputs)?;
                state.next_rental_id = plan.next_rental_id;
                Some(plan.rentals)
            }
            None => None,
        };

        let customer = &mut state.customers[index];
        if let Some(login) = patch.login {
            customer.login = login;
        }
        if let Some(password) = patch.password {
            customer.password = password;
        }
        if let Some(name) = patch.name {
            customer.name = name;
        }
        if let Some(national_id) = patch.national_id {
            customer.national_id = national_id;
        }
        if let Some(secondary_id) = patch.secondary_id {
            customer.secondary_id = secondary_id;
        }
        if let Some(address) = patch.address {
            customer.address = address;
        }
        if let Some(occupation) = patch.occupation {
            customer.occupation = occupation;
        }
        if let Some(rentals) = rentals {
            customer.rentals = rentals;
        }

        Ok(customer.clone())
    }

    fn delete_customer(&self, id: CustomerId) -> StoreResult<()> {
        let mut state = self.state();
        let index = state.position(id).ok_or(StoreError::NotFound(id))?;
        state.customers.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn new_customer(national_id: &str, login: &str) -> NewCustomer {
        NewCustomer {
            login: login.to_string(),
            password: "secret".to_string(),
            name: "Ana Souza".to_string(),
            national_id: national_id.to_string(),
            secondary_id: "12.345.678-9".to_string(),
            address: "Rua Um, 100 - Centro".to_string(),
            occupation: "Nurse".to_string(),
            rentals: Vec::new(),
        }
    }

    fn rental_input(id: Option<u64>) -> RentalInput {
        RentalInput {
            id: id.map(RentalId),
            brand: "Fiat".to_string(),
            model: "Uno".to_string(),
            plate: "AAA-0001".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            amount: dec!(99.90),
        }
    }

    #[test]
    fn from_records_starts_counters_past_existing_ids() {
        let repo = InMemoryCustomerRepository::with_demo_data();
        let created = repo
            .create_customer(NewCustomer {
                rentals: vec![rental_input(None)],
                ..new_customer("111.111.111-11", "new@example.com")
            })
            .unwrap();

        assert_eq!(created.id, CustomerId(3));
        assert_eq!(created.rentals[0].id, RentalId(4));
    }

    #[test]
    fn provided_rental_ids_advance_the_counter() {
        let repo = InMemoryCustomerRepository::new();
        let created = repo
            .create_customer(NewCustomer {
                rentals: vec![rental_input(Some(40)), rental_input(None)],
                ..new_customer("111.111.111-11", "a@example.com")
            })
            .unwrap();

        let ids: Vec<_> = created.rentals.iter().map(|rental| rental.id).collect();
        assert_eq!(ids, vec![RentalId(40), RentalId(41)]);
    }

    #[test]
    fn repeated_rental_ids_in_one_list_are_replaced() {
        let repo = InMemoryCustomerRepository::new();
        let created = repo
            .create_customer(NewCustomer {
                rentals: vec![rental_input(Some(7)), rental_input(Some(7))],
                ..new_customer("111.111.111-11", "a@example.com")
            })
            .unwrap();

        assert_eq!(created.rentals[0].id, RentalId(7));
        assert_eq!(created.rentals[1].id, RentalId(8));
    }

    #[test]
    fn rental_id_without_successor_is_rejected_before_ids_are_consumed() {
        let repo = InMemoryCustomerRepository::new();

        let err = repo
            .create_customer(NewCustomer {
                rentals: vec![rental_input(Some(u64::MAX))],
                ..new_customer("111.111.111-11", "a@example.com")
            })
            .unwrap_err();
        assert_eq!(err, StoreError::InvalidRentalId(RentalId(u64::MAX)));
        assert!(repo.list_customers().unwrap().is_empty());

        let created = repo
            .create_customer(NewCustomer {
                rentals: vec![rental_input(None)],
                ..new_customer("111.111.111-11", "a@example.com")
            })
            .unwrap();
        assert_eq!(created.id, CustomerId(1));
        assert_eq!(created.rentals[0].id, RentalId(1));

        let err = repo
            .update_customer(
                created.id,
                CustomerPatch {
                    name: Some("Changed".to_string()),
                    rentals: Some(vec![rental_input(Some(u64::MAX))]),
                    ..CustomerPatch::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, StoreError::InvalidRentalId(RentalId(u64::MAX)));
        assert_eq!(repo.get_customer(created.id).unwrap(), Some(created));
    }

    #[test]
    fn exhausted_rental_counter_fails_without_partial_writes() {
        let repo = InMemoryCustomerRepository::new();
        let created = repo
            .create_customer(NewCustomer {
                rentals: vec![rental_input(Some(u64::MAX - 1)), rental_input(None)],
                ..new_customer("111.111.111-11", "a@example.com")
            })
            .unwrap();
        let ids: Vec<_> = created.rentals.iter().map(|rental| rental.id).collect();
        assert_eq!(ids, vec![RentalId(u64::MAX - 1), RentalId(u64::MAX)]);

        let err = repo
            .create_customer(NewCustomer {
                rentals: vec![rental_input(None)],
                ..new_customer("222.222.222-22", "b@example.com")
            })
            .unwrap_err();
        assert_eq!(err, StoreError::IdSpaceExhausted);
        assert_eq!(repo.list_customers().unwrap().len(), 1);

        let without_rentals = repo
            .create_customer(new_customer("222.222.222-22", "b@example.com"))
            .unwrap();
        assert_eq!(without_rentals.id, CustomerId(2));
    }

    #[test]
    fn exhausted_customer_counter_is_an_error() {
        let mut seed = InMemoryCustomerRepository::new()
            .create_customer(new_customer("111.111.111-11", "a@example.com"))
            .unwrap();
        seed.id = CustomerId(u64::MAX);
        let repo = InMemoryCustomerRepository::from_records(vec![seed]);

        let err = repo
            .create_customer(new_customer("222.222.222-22", "b@example.com"))
            .unwrap_err();
        assert_eq!(err, StoreError::IdSpaceExhausted);
        assert_eq!(repo.list_customers().unwrap().len(), 1);
    }

    #[test]
    fn zero_rental_id_counts_as_missing() {
        let repo = InMemoryCustomerRepository::new();
        let created = repo
            .create_customer(NewCustomer {
                rentals: vec![rental_input(Some(0)), rental_input(Some(0))],
                ..new_customer("111.111.111-11", "a@example.com")
            })
            .unwrap();

        let ids: Vec<_> = created.rentals.iter().map(|rental| rental.id).collect();
        assert_eq!(ids, vec![RentalId(1), RentalId(2)]);
    }

    #[test]
    fn national_id_collision_is_reported_before_login() {
        let repo = InMemoryCustomerRepository::new();
        repo.create_customer(new_customer("111.111.111-11", "a@example.com"))
            .unwrap();

        let err = repo
            .create_customer(new_customer("111.111.111-11", "a@example.com"))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateField(UniqueField::NationalId));

        let err = repo
            .create_customer(new_customer("222.222.222-22", "a@example.com"))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateField(UniqueField::Login));
    }

    #[test]
    fn update_keeping_own_unique_values_is_allowed() {
        let repo = InMemoryCustomerRepository::new();
        let created = repo
            .create_customer(new_customer("111.111.111-11", "a@example.com"))
            .unwrap();

        let updated = repo
            .update_customer(
                created.id,
                CustomerPatch {
                    national_id: Some("111.111.111-11".to_string()),
                    login: Some("a@example.com".to_string()),
                    occupation: Some("Pilot".to_string()),
                    ..CustomerPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.occupation, "Pilot");
        assert_eq!(updated.name, created.name);
    }

    #[test]
    fn update_rejects_value_held_by_another_customer() {
        let repo = InMemoryCustomerRepository::new();
        let first = repo
            .create_customer(new_customer("111.111.111-11", "a@example.com"))
            .unwrap();
        repo.create_customer(new_customer("222.222.222-22", "b@example.com"))
            .unwrap();

        let err = repo
            .update_customer(
                first.id,
                CustomerPatch {
                    login: Some("b@example.com".to_string()),
                    name: Some("Changed".to_string()),
                    ..CustomerPatch::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateField(UniqueField::Login));

        let stored = repo.get_customer(first.id).unwrap().unwrap();
        assert_eq!(stored, first);
    }

    #[test]
    fn update_replaces_rentals_only_when_provided() {
        let repo = InMemoryCustomerRepository::new();
        let created = repo
            .create_customer(NewCustomer {
                rentals: vec![rental_input(None), rental_input(None)],
                ..new_customer("111.111.111-11", "a@example.com")
            })
            .unwrap();

        let renamed = repo
            .update_customer(
                created.id,
                CustomerPatch {
                    name: Some("Renamed".to_string()),
                    ..CustomerPatch::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.rentals, created.rentals);

        let replaced = repo
            .update_customer(
                created.id,
                CustomerPatch {
                    rentals: Some(vec![rental_input(None)]),
                    ..CustomerPatch::default()
                },
            )
            .unwrap();
        assert_eq!(replaced.rentals.len(), 1);
        assert_eq!(replaced.rentals[0].id, RentalId(3));
    }

    #[test]
    fn store_does_not_cap_rentals() {
        let repo = InMemoryCustomerRepository::new();
        let created = repo
            .create_customer(NewCustomer {
                rentals: (0..7).map(|_| rental_input(None)).collect(),
                ..new_customer("111.111.111-11", "a@example.com")
            })
            .unwrap();
        assert_eq!(created.rentals.len(), 7);
    }

    #[test]
    fn customer_ids_are_not_reused_after_delete() {
        let repo = InMemoryCustomerRepository::new();
        let first = repo
            .create_customer(new_customer("111.111.111-11", "a@example.com"))
            .unwrap();
        repo.delete_customer(first.id).unwrap();

        let second = repo
            .create_customer(new_customer("111.111.111-11", "a@example.com"))
            .unwrap();
        assert!(second.id > first.id);
    }
}
