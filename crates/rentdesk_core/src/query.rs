//! Read-side helpers over a customer list snapshot.

use crate::model::customer::Customer;
use rust_decimal::Decimal;

/// Returns customers matching a free-text search term.
///
/// An empty term matches everything. Name, login and occupation match
/// case-insensitively; the national ID matches as typed.
pub fn filter_customers<'a>(customers: &'a [Customer], term: &str) -> Vec<&'a Customer> {
    if term.is_empty() {
        return customers.iter().collect();
    }

    let needle = term.to_lowercase();
    customers
        .iter()
        .filter(|customer| {
            customer.name.to_lowercase().contains(&needle)
                || customer.national_id.contains(term)
                || customer.login.to_lowercase().contains(&needle)
                || customer.occupation.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Aggregate spend figures for the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerStats {
    pub total_customers: usize,
    pub total_spent: Decimal,
    /// Zero when there are no customers.
    pub average_spent: Decimal,
}

impl CustomerStats {
    pub fn from_customers<'a, I>(customers: I) -> Self
    where
        I: IntoIterator<Item = &'a Customer>,
    {
        let (total_customers, total_spent) = customers
            .into_iter()
            .fold((0usize, Decimal::ZERO), |(count, sum), customer| {
                (count + 1, sum + customer.total_spent())
            });

        let average_spent = if total_customers == 0 {
            Decimal::ZERO
        } else {
            total_spent / Decimal::from(total_customers)
        };

        Self {
            total_customers,
            total_spent,
            average_spent,
        }
    }
}
