//! Mock login over the customer store.
//!
//! # Responsibility
//! - Authenticate by scanning the store's `list` snapshot for a matching
//!   login/password pair.
//! - Keep the current principal cached and mirrored to the session slot.
//!
//! # Invariants
//! - The only store operation used is `list`.
//! - Wrong password and unknown login produce the same error.
//! - Credentials never reach the logs; only the role does.

use crate::config::LatencyProfile;
use crate::model::principal::{Action, Principal};
use crate::repo::customer_repo::{CustomerRepository, StoreError};
use crate::service::customer_service::CustomerService;
use crate::session::{SessionError, SessionSlot};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
pub enum AuthError {
    /// Login/password pair did not match any record.
    InvalidCredentials,
    Store(StoreError),
    Session(SessionError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => f.write_str("invalid email or password"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Session(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCredentials => None,
            Self::Store(err) => Some(err),
            Self::Session(err) => Some(err),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<SessionError> for AuthError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

/// Session holder backed by a customer store and a durable slot.
pub struct AuthService<'a, R: CustomerRepository, S: SessionSlot> {
    customers: &'a CustomerService<R>,
    slot: S,
    login_latency: Duration,
    logout_latency: Duration,
    current: Mutex<Option<Principal>>,
}

impl<'a, R: CustomerRepository, S: SessionSlot> AuthService<'a, R, S> {
    /// Creates a session holder; latencies come from the login/logout
    /// entries of `latency`.
    pub fn new(
        customers: &'a CustomerService<R>,
        slot: S,
        latency: LatencyProfile,
    ) -> Self {
        Self {
            customers,
            slot,
            login_latency: latency.login,
            logout_latency: latency.logout,
            current: Mutex::new(None),
        }
    }

    /// Authenticates a customer and persists the session.
    ///
    /// # Errors
    /// - `InvalidCredentials` when no record matches both values.
    /// - `Store` when listing customers fails.
    /// - `Session` when the slot cannot be written.
    pub async fn login(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        tokio::time::sleep(self.login_latency).await;

        let customers = self.customers.list().await?;
        let Some(customer) = customers
            .into_iter()
            .find(|customer| customer.login == email && customer.password == password)
        else {
            warn!("event=auth_login module=auth status=error error_code=invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        };

        let principal = Principal::Customer(customer);
        self.slot.save(&principal)?;
        *self.current() = Some(principal.clone());

        info!(
            "event=auth_login module=auth status=ok role={}",
            principal.role()
        );
        Ok(principal)
    }

    /// Ends the session and clears the durable slot.
    pub async fn logout(&self) -> Result<(), AuthError> {
        tokio::time::sleep(self.logout_latency).await;
        *self.current() = None;
        self.slot.clear()?;
        info!("event=auth_logout module=auth status=ok");
        Ok(())
    }

    /// Returns the current principal, restoring it from the slot when the
    /// in-memory cache is empty.
    pub fn current_user(&self) -> Result<Option<Principal>, AuthError> {
        let mut current = self.current();
        if current.is_none() {
            if let Some(restored) = self.slot.load()? {
                info!(
                    "event=auth_restore module=auth status=ok role={}",
                    restored.role()
                );
                *current = Some(restored);
            }
        }
        Ok(current.clone())
    }

    pub fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.current_user()?.is_some())
    }

    /// Returns whether the current principal may perform `action`.
    ///
    /// No session means no permission.
    pub fn has_permission(&self, action: Action) -> Result<bool, AuthError> {
        Ok(self
            .current_user()?
            .is_some_and(|principal| principal.can(action)))
    }

    fn current(&self) -> MutexGuard<'_, Option<Principal>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
