//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire store, session slot and login together against the demo data.
//! - Print a deterministic customer listing for quick local sanity checks.

use rentdesk_core::db::open_db_in_memory;
use rentdesk_core::display::{format_currency, format_date};
use rentdesk_core::repo::demo::{DEMO_LOGIN, DEMO_PASSWORD};
use rentdesk_core::{
    core_version, default_log_level, filter_customers, init_logging, AuthService, ConfigError,
    CoreConfig, CustomerService, CustomerStats, InMemoryCustomerRepository, SqliteSessionSlot,
};
use std::error::Error;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let search_term = std::env::args().nth(1).unwrap_or_default();

    let log_dir = std::env::temp_dir().join("rentdesk-logs");
    init_logging(default_log_level(), &log_dir.to_string_lossy())?;

    let config = demo_config()?;
    let store = CustomerService::new(InMemoryCustomerRepository::with_demo_data(), config);
    let conn = open_db_in_memory()?;
    let auth = AuthService::new(&store, SqliteSessionSlot::new(&conn), config.latency);

    println!("rentdesk_core version={}", core_version());

    let principal = auth.login(DEMO_LOGIN, DEMO_PASSWORD).await?;
    println!(
        "signed in as {} ({})",
        principal.display_name(),
        principal.role()
    );

    let customers = store.list().await?;
    let matched = filter_customers(&customers, &search_term);
    for customer in &matched {
        println!(
            "#{} {} <{}> {} - {}",
            customer.id, customer.name, customer.login, customer.national_id, customer.occupation
        );
        for rental in &customer.rentals {
            println!(
                "    {} {} {} {} to {} {}",
                rental.brand,
                rental.model,
                rental.plate,
                format_date(rental.start_date),
                format_date(rental.end_date),
                format_currency(rental.amount)
            );
        }
    }

    let stats = CustomerStats::from_customers(matched.iter().copied());
    log::info!(
        "event=cli_listing module=cli status=ok matched={} total={}",
        matched.len(),
        customers.len()
    );
    println!(
        "customers={} total_spent={} average_spent={}",
        stats.total_customers,
        format_currency(stats.total_spent),
        format_currency(stats.average_spent)
    );

    auth.logout().await?;
    Ok(())
}

/// Zero-latency demo configuration; env overrides still apply on top.
fn demo_config() -> Result<CoreConfig, ConfigError> {
    CoreConfig::from_env_with(CoreConfig::instant())
}
