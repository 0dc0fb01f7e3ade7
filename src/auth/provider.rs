//! Capability contract for the external identity provider.
//!
//! The provider owns credential verification and session persistence. The
//! rest of the crate only relies on:
//! - a subscription that yields the current identity once the initial state
//!   check has completed, and again on every change;
//! - sign-in, sign-up and sign-out operations whose successful completion is
//!   reported through that subscription.

use crate::auth::{error::AuthError, session::Identity};
use secrecy::SecretString;
use std::future::Future;
use tokio::sync::mpsc;

/// Sign-up payload. The password stays wrapped so it never ends up in logs.
#[derive(Debug)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

/// Stream of identity changes handed out by [`IdentityProvider::subscribe`].
///
/// Dropping it releases the subscription; the provider stops delivering to it
/// on its next notification.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Option<Identity>>,
}

impl Subscription {
    #[must_use]
    pub fn new(rx: mpsc::UnboundedReceiver<Option<Identity>>) -> Self {
        Self { rx }
    }

    /// Waits for the next identity event. `None` means the provider is gone.
    pub async fn next(&mut self) -> Option<Option<Identity>> {
        self.rx.recv().await
    }

    /// Returns an already delivered event without waiting.
    pub fn try_next(&mut self) -> Option<Option<Identity>> {
        self.rx.try_recv().ok()
    }
}

pub trait IdentityProvider: Send + Sync + 'static {
    /// Registers a listener for identity changes.
    fn subscribe(&self) -> Subscription;

    /// # Errors
    /// `InvalidCredentials` for unknown users or wrong passwords, `Network` when unreachable.
    fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    /// # Errors
    /// `AccountExists`, `InvalidEmail`, `WeakPassword` or `Network`.
    fn sign_up(
        &self,
        request: &SignUpRequest,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    /// # Errors
    /// `Network` when the provider cannot be reached.
    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;
}
