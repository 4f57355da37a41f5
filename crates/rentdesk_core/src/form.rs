//! Non-visual customer form state.
//!
//! # Responsibility
//! - Hold in-progress customer edits, including the rental rows.
//! - Apply input formatting and per-field error clearing while editing.
//! - Run the validate-then-store submit flow.
//!
//! # Invariants
//! - `add_rental` never grows a form past `MAX_RENTALS` rows. An edit form
//!   mirrors the stored record and may start above the cap; such a form only
//!   submits once rows are removed.
//! - Submit calls the store only when validation produced no failures.
//! - Rental rows missing brand, model or plate are dropped on submit.

use crate::model::customer::{Customer, CustomerId, CustomerPatch, RentalInput, MAX_RENTALS};
use crate::repo::customer_repo::{CustomerRepository, StoreError};
use crate::service::customer_service::CustomerService;
use crate::validation::{format_national_id, validate_customer, CustomerField, FieldError};
use chrono::Local;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Validation failed; the failures are also kept on the form.
    Invalid(Vec<FieldError>),
    RentalLimitReached,
    RentalIndexOutOfRange(usize),
    Store(StoreError),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "form has {} invalid field(s)", errors.len()),
            Self::RentalLimitReached => write!(f, "at most {MAX_RENTALS} rentals are allowed"),
            Self::RentalIndexOutOfRange(index) => write!(f, "no rental row at index {index}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FormError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for FormError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Free-text inputs of the customer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    NationalId,
    SecondaryId,
    Login,
    Password,
    Address,
    Occupation,
}

impl TextField {
    pub fn customer_field(self) -> CustomerField {
        match self {
            Self::Name => CustomerField::Name,
            Self::NationalId => CustomerField::NationalId,
            Self::SecondaryId => CustomerField::SecondaryId,
            Self::Login => CustomerField::Login,
            Self::Password => CustomerField::Password,
            Self::Address => CustomerField::Address,
            Self::Occupation => CustomerField::Occupation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormMode {
    Create,
    Edit(CustomerId),
}

#[derive(Debug, Clone, Default)]
struct FormValues {
    name: String,
    national_id: String,
    secondary_id: String,
    login: String,
    password: String,
    address: String,
    occupation: String,
}

/// Editing state for one customer create/edit session.
#[derive(Debug, Clone)]
pub struct CustomerForm {
    mode: FormMode,
    values: FormValues,
    rentals: Vec<RentalInput>,
    errors: Vec<FieldError>,
}

impl Default for CustomerForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerForm {
    /// Blank form that creates a new customer on submit.
    pub fn new() -> Self {
        Self {
            mode: FormMode::Create,
            values: FormValues::default(),
            rentals: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Form pre-filled from `customer` that updates it on submit.
    ///
    /// Every stored rental is loaded, even past `MAX_RENTALS`.
    pub fn edit(customer: &Customer) -> Self {
        Self {
            mode: FormMode::Edit(customer.id),
            values: FormValues {
                name: customer.name.clone(),
                national_id: customer.national_id.clone(),
                secondary_id: customer.secondary_id.clone(),
                login: customer.login.clone(),
                password: customer.password.clone(),
                address: customer.address.clone(),
                occupation: customer.occupation.clone(),
            },
            rentals: customer
                .rentals
                .iter()
                .cloned()
                .map(RentalInput::from)
                .collect(),
            errors: Vec::new(),
        }
    }

    /// Id of the customer being edited, `None` for a create form.
    pub fn editing(&self) -> Option<CustomerId> {
        match self.mode {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(id),
        }
    }

    pub fn value(&self, field: TextField) -> &str {
        match field {
            TextField::Name => &self.values.name,
            TextField::NationalId => &self.values.national_id,
            TextField::SecondaryId => &self.values.secondary_id,
            TextField::Login => &self.values.login,
            TextField::Password => &self.values.password,
            TextField::Address => &self.values.address,
            TextField::Occupation => &self.values.occupation,
        }
    }

    /// Sets a text input and clears that field's pending errors.
    ///
    /// National-ID input is reformatted as typed.
    pub fn set_field(&mut self, field: TextField, value: &str) {
        let slot = match field {
            TextField::Name => &mut self.values.name,
            TextField::NationalId => &mut self.values.national_id,
            TextField::SecondaryId => &mut self.values.secondary_id,
            TextField::Login => &mut self.values.login,
            TextField::Password => &mut self.values.password,
            TextField::Address => &mut self.values.address,
            TextField::Occupation => &mut self.values.occupation,
        };
        *slot = match field {
            TextField::NationalId => format_national_id(value),
            _ => value.to_string(),
        };

        let cleared = field.customer_field();
        self.errors.retain(|error| error.field != cleared);
    }

    pub fn rentals(&self) -> &[RentalInput] {
        &self.rentals
    }

    pub fn rental_mut(&mut self, index: usize) -> Option<&mut RentalInput> {
        self.rentals.get_mut(index)
    }

    /// Appends a blank rental row dated today.
    pub fn add_rental(&mut self) -> Result<&mut RentalInput, FormError> {
        if self.rentals.len() >= MAX_RENTALS {
            return Err(FormError::RentalLimitReached);
        }
        self.rentals
            .push(RentalInput::blank(Local::now().date_naive()));
        let last = self.rentals.len() - 1;
        Ok(&mut self.rentals[last])
    }

    pub fn remove_rental(&mut self, index: usize) -> Result<RentalInput, FormError> {
        if index >= self.rentals.len() {
            return Err(FormError::RentalIndexOutOfRange(index));
        }
        Ok(self.rentals.remove(index))
    }

    /// Validation failures from the last submit still pending on the form.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// First pending message for `field`, if any.
    pub fn field_error(&self, field: CustomerField) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// Validates the form and, when valid, creates or updates the customer.
    ///
    /// # Errors
    /// - `Invalid` when validation fails; nothing reaches the store.
    /// - `Store` when the store rejects the write; nothing is persisted.
    pub async fn submit<R: CustomerRepository>(
        &mut self,
        customers: &CustomerService<R>,
    ) -> Result<Customer, FormError> {
        self.errors.clear();

        let mut patch = self.to_patch();
        let failures = validate_customer(&patch);
        if !failures.is_empty() {
            self.errors = failures.clone();
            return Err(FormError::Invalid(failures));
        }

        patch.rentals = Some(
            self.rentals
                .iter()
                .filter(|rental| rental.is_complete())
                .cloned()
                .collect(),
        );

        let saved = match self.mode {
            FormMode::Edit(id) => customers.update(id, patch).await?,
            FormMode::Create => {
                let input = patch
                    .into_new_customer()
                    .ok_or_else(|| FormError::Invalid(Vec::new()))?;
                customers.create(input).await?
            }
        };
        Ok(saved)
    }

    fn to_patch(&self) -> CustomerPatch {
        CustomerPatch {
            login: Some(self.values.login.clone()),
            password: Some(self.values.password.clone()),
            name: Some(self.values.name.clone()),
            national_id: Some(self.values.national_id.clone()),
            secondary_id: Some(self.values.secondary_id.clone()),
            address: Some(self.values.address.clone()),
            occupation: Some(self.values.occupation.clone()),
            rentals: Some(self.rentals.clone()),
        }
    }
}
