//! Demo records seeded into the back-office store.

use crate::model::customer::{Customer, CustomerId, Rental, RentalId};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Login of the demo customer used by the quick-login flow.
pub const DEMO_LOGIN: &str = "joao.silva@email.com";
/// Password shared by the demo customers.
pub const DEMO_PASSWORD: &str = "123456";

/// Returns the two demo customers with their rental history.
pub fn demo_customers() -> Vec<Customer> {
    vec![
        Customer {
            id: CustomerId(1),
            login: DEMO_LOGIN.to_string(),
            password: DEMO_PASSWORD.to_string(),
            name: "João Silva Santos".to_string(),
            national_id: "123.456.789-00".to_string(),
            secondary_id: "12.345.678-9".to_string(),
            address: "Rua das Flores, 123 - Centro - Belo Horizonte/MG".to_string(),
            occupation: "Software Engineer".to_string(),
            rentals: vec![
                rental(1, "Toyota", "Corolla", "ABC-1234", (2024, 1, 15), (2024, 1, 20), 350),
                rental(2, "Honda", "Civic", "XYZ-5678", (2024, 2, 10), (2024, 2, 15), 400),
            ],
        },
        Customer {
            id: CustomerId(2),
            login: "maria.santos@email.com".to_string(),
            password: DEMO_PASSWORD.to_string(),
            name: "Maria Santos Oliveira".to_string(),
            national_id: "987.654.321-00".to_string(),
            secondary_id: "98.765.432-1".to_string(),
            address: "Av. Amazonas, 456 - Funcionários - Belo Horizonte/MG".to_string(),
            occupation: "Physician".to_string(),
            rentals: vec![rental(
                3,
                "Volkswagen",
                "Jetta",
                "DEF-9012",
                (2024, 3, 5),
                (2024, 3, 12),
                450,
            )],
        },
    ]
}

fn rental(
    id: u64,
    brand: &str,
    model: &str,
    plate: &str,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
    amount: i64,
) -> Rental {
    Rental {
        id: RentalId(id),
        brand: brand.to_string(),
        model: model.to_string(),
        plate: plate.to_string(),
        start_date: date(start),
        end_date: date(end),
        amount: Decimal::from(amount),
    }
}

fn date((year, month, day): (i32, u32, u32)) -> NaiveDate {
    // Seed dates are literals; an invalid one falls back to the epoch day.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
