//! Customer use-case service.
//!
//! # Responsibility
//! - Expose the asynchronous record-store contract callers use.
//! - Simulate request latency and bound every call by the configured policy.
//! - Emit metadata-only store events.
//!
//! # Invariants
//! - Latency elapses before the repository is touched, so a call that times
//!   out never applies its write.
//! - Only reads are retried; writes run at most once.
//! - No cross-call mutual exclusion: concurrent calls interleave at the
//!   latency boundary.

use crate::config::{CallPolicy, CoreConfig, LatencyProfile};
use crate::model::customer::{Customer, CustomerId, CustomerPatch, NewCustomer};
use crate::repo::customer_repo::{CustomerRepository, StoreError, StoreResult};
use log::{info, warn};
use std::time::{Duration, Instant};

/// Asynchronous customer store facade over a repository implementation.
pub struct CustomerService<R: CustomerRepository> {
    repo: R,
    latency: LatencyProfile,
    policy: CallPolicy,
}

impl<R: CustomerRepository> CustomerService<R> {
    /// Creates a service with the provided repository and configuration.
    pub fn new(repo: R, config: CoreConfig) -> Self {
        Self {
            repo,
            latency: config.latency,
            policy: config.call_policy,
        }
    }

    /// Returns a snapshot of every stored customer.
    pub async fn list(&self) -> StoreResult<Vec<Customer>> {
        let started_at = Instant::now();
        let result = self
            .read("list", self.latency.list, || self.repo.list_customers())
            .await;
        match &result {
            Ok(customers) => info!(
                "event=customer_list module=store status=ok count={} duration_ms={}",
                customers.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("customer_list", None, err, started_at),
        }
        result
    }

    /// Returns one customer, or `StoreError::NotFound` when absent.
    pub async fn get_by_id(&self, id: CustomerId) -> StoreResult<Customer> {
        let started_at = Instant::now();
        let result = self
            .read("get", self.latency.get, || {
                self.repo
                    .get_customer(id)?
                    .ok_or(StoreError::NotFound(id))
            })
            .await;
        match &result {
            Ok(_) => info!(
                "event=customer_get module=store status=ok customer_id={} duration_ms={}",
                id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("customer_get", Some(id), err, started_at),
        }
        result
    }

    /// Creates a customer; the store assigns customer and rental ids.
    ///
    /// Callers are expected to run `validate_customer` first.
    pub async fn create(&self, input: NewCustomer) -> StoreResult<Customer> {
        let started_at = Instant::now();
        let result = self
            .write("create", self.latency.create, || {
                self.repo.create_customer(input)
            })
            .await;
        match &result {
            Ok(customer) => info!(
                "event=customer_create module=store status=ok customer_id={} rentals={} duration_ms={}",
                customer.id,
                customer.rentals.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("customer_create", None, err, started_at),
        }
        result
    }

    /// Shallow-merges `patch` into the stored customer.
    pub async fn update(&self, id: CustomerId, patch: CustomerPatch) -> StoreResult<Customer> {
        let started_at = Instant::now();
        let result = self
            .write("update", self.latency.update, || {
                self.repo.update_customer(id, patch)
            })
            .await;
        match &result {
            Ok(customer) => info!(
                "event=customer_update module=store status=ok customer_id={} rentals={} duration_ms={}",
                customer.id,
                customer.rentals.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("customer_update", Some(id), err, started_at),
        }
        result
    }

    /// Removes the customer with `id`.
    pub async fn delete(&self, id: CustomerId) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self
            .write("delete", self.latency.delete, || self.repo.delete_customer(id))
            .await;
        match &result {
            Ok(()) => info!(
                "event=customer_delete module=store status=ok customer_id={} duration_ms={}",
                id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("customer_delete", Some(id), err, started_at),
        }
        result
    }

    async fn read<T, F>(
        &self,
        operation: &'static str,
        latency: Duration,
        call: F,
    ) -> StoreResult<T>
    where
        F: Fn() -> StoreResult<T>,
    {
        let attempts = self.policy.read_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt(operation, latency, &call).await {
                Err(StoreError::Timeout { .. }) if attempt < attempts => {
                    warn!(
                        "event=store_retry module=store operation={} attempt={} max_attempts={}",
                        operation, attempt, attempts
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn write<T, F>(
        &self,
        operation: &'static str,
        latency: Duration,
        call: F,
    ) -> StoreResult<T>
    where
        F: FnOnce() -> StoreResult<T>,
    {
        self.attempt(operation, latency, call).await
    }

    async fn attempt<T, F>(
        &self,
        operation: &'static str,
        latency: Duration,
        call: F,
    ) -> StoreResult<T>
    where
        F: FnOnce() -> StoreResult<T>,
    {
        let simulated = async move {
            tokio::time::sleep(latency).await;
            call()
        };
        tokio::time::timeout(self.policy.timeout, simulated)
            .await
            .unwrap_or(Err(StoreError::Timeout { operation }))
    }
}

fn log_failure(event: &str, id: Option<CustomerId>, err: &StoreError, started_at: Instant) {
    let error_code = match err {
        StoreError::DuplicateField(_) => "duplicate_field",
        StoreError::NotFound(_) => "not_found",
        StoreError::Timeout { .. } => "timeout",
        StoreError::InvalidRentalId(_) => "invalid_rental_id",
        StoreError::IdSpaceExhausted => "id_space_exhausted",
    };
    match id {
        Some(id) => warn!(
            "event={} module=store status=error customer_id={} duration_ms={} error_code={} error={}",
            event,
            id,
            started_at.elapsed().as_millis(),
            error_code,
            err
        ),
        None => warn!(
            "event={} module=store status=error duration_ms={} error_code={} error={}",
            event,
            started_at.elapsed().as_millis(),
            error_code,
            err
        ),
    }
}
