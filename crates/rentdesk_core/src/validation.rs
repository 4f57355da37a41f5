//! Field-level validation for customer payloads.
//!
//! # Responsibility
//! - Turn a partial customer record into an ordered list of field failures.
//! - Provide the national-ID input formatter used while typing.
//!
//! # Invariants
//! - Every field is checked independently; no rule short-circuits another.
//! - Failure order is stable: name, nationalId, secondaryId, login, address,
//!   occupation, then rental checks.
//! - Validation is pure: no I/O, no logging, no store access.

use crate::model::customer::{CustomerPatch, RentalInput, MAX_RENTALS};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static NATIONAL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$").expect("valid national id regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

const NATIONAL_ID_DIGITS: usize = 11;

/// Customer fields that can carry a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomerField {
    Name,
    NationalId,
    SecondaryId,
    Login,
    Password,
    Address,
    Occupation,
    Rentals,
}

impl CustomerField {
    /// Wire name of the field, matching the serialized customer keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::NationalId => "nationalId",
            Self::SecondaryId => "secondaryId",
            Self::Login => "login",
            Self::Password => "password",
            Self::Address => "address",
            Self::Occupation => "occupation",
            Self::Rentals => "rentals",
        }
    }
}

impl Display for CustomerField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: CustomerField,
    pub message: String,
}

impl FieldError {
    fn new(field: CustomerField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Error for FieldError {}

/// Validates a partial customer record.
///
/// Returns an empty list when the payload is acceptable. An empty patch
/// yields exactly one failure per required field.
pub fn validate_customer(input: &CustomerPatch) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if !has_min_chars(input.name.as_deref(), 2) {
        errors.push(FieldError::new(
            CustomerField::Name,
            "Name must have at least 2 characters",
        ));
    }

    if !matches_pattern(input.national_id.as_deref(), &NATIONAL_ID_RE) {
        errors.push(FieldError::new(
            CustomerField::NationalId,
            "National ID must match the format 000.000.000-00",
        ));
    }

    if !has_min_chars(input.secondary_id.as_deref(), 5) {
        errors.push(FieldError::new(
            CustomerField::SecondaryId,
            "Secondary ID is required",
        ));
    }

    if !matches_pattern(input.login.as_deref(), &EMAIL_RE) {
        errors.push(FieldError::new(
            CustomerField::Login,
            "Email must have a valid format",
        ));
    }

    if !has_min_chars(input.address.as_deref(), 10) {
        errors.push(FieldError::new(
            CustomerField::Address,
            "Address must have at least 10 characters",
        ));
    }

    if !has_min_chars(input.occupation.as_deref(), 2) {
        errors.push(FieldError::new(
            CustomerField::Occupation,
            "Occupation is required",
        ));
    }

    if let Some(rentals) = input.rentals.as_deref() {
        validate_rentals(rentals, &mut errors);
    }

    errors
}

fn validate_rentals(rentals: &[RentalInput], errors: &mut Vec<FieldError>) {
    if rentals.len() > MAX_RENTALS {
        errors.push(FieldError::new(
            CustomerField::Rentals,
            format!("At most {MAX_RENTALS} rentals are allowed"),
        ));
    }

    for (index, rental) in rentals.iter().enumerate() {
        let position = index + 1;
        if rental.amount < Decimal::ZERO {
            errors.push(FieldError::new(
                CustomerField::Rentals,
                format!("Rental {position}: amount cannot be negative"),
            ));
        }
        if rental.end_date < rental.start_date {
            errors.push(FieldError::new(
                CustomerField::Rentals,
                format!("Rental {position}: end date cannot be before start date"),
            ));
        }
    }
}

fn has_min_chars(value: Option<&str>, min: usize) -> bool {
    value.is_some_and(|value| value.trim().chars().count() >= min)
}

fn matches_pattern(value: Option<&str>, pattern: &Regex) -> bool {
    value.is_some_and(|value| pattern.is_match(value))
}

/// Formats raw national-ID input as `NNN.NNN.NNN-NN` while the user types.
///
/// Non-digits are dropped, digits past the eleventh are truncated and
/// separators only appear once a digit follows them.
pub fn format_national_id(input: &str) -> String {
    let mut formatted = String::with_capacity(NATIONAL_ID_DIGITS + 3);
    for (index, digit) in input
        .chars()
        .filter(char::is_ascii_digit)
        .take(NATIONAL_ID_DIGITS)
        .enumerate()
    {
        match index {
            3 | 6 => formatted.push('.'),
            9 => formatted.push('-'),
            _ => {}
        }
        formatted.push(digit);
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn valid_patch() -> CustomerPatch {
        CustomerPatch {
            login: Some("ana@example.com".to_string()),
            password: Some("secret".to_string()),
            name: Some("Ana Souza".to_string()),
            national_id: Some("123.456.789-00".to_string()),
            secondary_id: Some("12.345.678-9".to_string()),
            address: Some("Rua Um, 100 - Centro".to_string()),
            occupation: Some("Nurse".to_string()),
            rentals: None,
        }
    }

    fn rental(amount: rust_decimal::Decimal, start: u32, end: u32) -> RentalInput {
        RentalInput {
            id: None,
            brand: "Fiat".to_string(),
            model: "Uno".to_string(),
            plate: "AAA-0001".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, start).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, end).unwrap(),
            amount,
        }
    }

    #[test]
    fn empty_patch_fails_every_required_field_in_order() {
        let errors = validate_customer(&CustomerPatch::default());
        let fields: Vec<_> = errors.iter().map(|error| error.field).collect();
        assert_eq!(
            fields,
            vec![
                CustomerField::Name,
                CustomerField::NationalId,
                CustomerField::SecondaryId,
                CustomerField::Login,
                CustomerField::Address,
                CustomerField::Occupation,
            ]
        );
    }

    #[test]
    fn valid_patch_has_no_errors() {
        assert!(validate_customer(&valid_patch()).is_empty());
    }

    #[test]
    fn lengths_are_measured_after_trimming() {
        let mut patch = valid_patch();
        patch.name = Some("  A  ".to_string());
        patch.address = Some("   short    ".to_string());

        let errors = validate_customer(&patch);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, CustomerField::Name);
        assert_eq!(errors[1].field, CustomerField::Address);
    }

    #[test]
    fn national_id_must_be_formatted() {
        let mut patch = valid_patch();
        patch.national_id = Some("12345678900".to_string());

        let errors = validate_customer(&patch);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, CustomerField::NationalId);
    }

    #[test]
    fn login_must_look_like_an_email() {
        for login in ["ana", "ana@example", "ana @example.com", "@example.com"] {
            let mut patch = valid_patch();
            patch.login = Some(login.to_string());
            let errors = validate_customer(&patch);
            assert_eq!(errors.len(), 1, "login `{login}` should be rejected");
            assert_eq!(errors[0].field, CustomerField::Login);
        }
    }

    #[test]
    fn rental_checks_only_apply_when_rentals_are_present() {
        let mut patch = valid_patch();
        patch.rentals = Some(vec![
            rental(dec!(10), 1, 2),
            rental(dec!(-1), 1, 2),
            rental(dec!(10), 5, 4),
        ]);

        let errors = validate_customer(&patch);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.starts_with("Rental 2"));
        assert!(errors[1].message.starts_with("Rental 3"));
    }

    #[test]
    fn more_than_five_rentals_is_reported() {
        let mut patch = valid_patch();
        patch.rentals = Some((0..6).map(|_| rental(dec!(1), 1, 2)).collect());

        let errors = validate_customer(&patch);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, CustomerField::Rentals);
    }

    #[test]
    fn format_national_id_groups_progressively() {
        assert_eq!(format_national_id(""), "");
        assert_eq!(format_national_id("123"), "123");
        assert_eq!(format_national_id("1234"), "123.4");
        assert_eq!(format_national_id("123456"), "123.456");
        assert_eq!(format_national_id("1234567890"), "123.456.789-0");
        assert_eq!(format_national_id("12345678901"), "123.456.789-01");
    }

    #[test]
    fn format_national_id_strips_noise_and_truncates() {
        assert_eq!(format_national_id("123.456.789-01"), "123.456.789-01");
        assert_eq!(format_national_id("abc123 456x789/0123"), "123.456.789-01");
        assert_eq!(format_national_id("12345678901234"), "123.456.789-01");
    }
}
