//! In-process identity provider.
//!
//! Accounts live in memory for the lifetime of the process. The provider
//! starts unchecked: subscribers hear nothing until
//! [`MemoryProvider::complete_initial_check`] runs, which is how a hosted
//! provider behaves while it restores a persisted session.

use crate::auth::{
    error::AuthError,
    provider::{IdentityProvider, SignUpRequest, Subscription},
    session::Identity,
    validation::{valid_email, MIN_PASSWORD_LEN},
};
use secrecy::{ExposeSecret, SecretString};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tokio::sync::mpsc;
use tracing::{debug, instrument};
use uuid::Uuid;

struct Account {
    uid: Uuid,
    name: Option<String>,
    password: SecretString,
    email_verified: bool,
}

#[derive(Default)]
struct State {
    checked: bool,
    offline: bool,
    current: Option<Identity>,
    accounts: HashMap<String, Account>,
    subscribers: Vec<mpsc::UnboundedSender<Option<Identity>>>,
}

impl State {
    fn identity(&self, email: &str) -> Option<Identity> {
        self.accounts.get(email).map(|account| Identity {
            uid: account.uid,
            email: email.to_string(),
            display_name: account.name.clone(),
            email_verified: account.email_verified,
        })
    }

    fn set_current(&mut self, identity: Option<Identity>) {
        self.checked = true;
        self.current = identity;

        let current = self.current.clone();
        self.subscribers.retain(|tx| tx.send(current.clone()).is_ok());

        debug!("notified {} subscriber(s)", self.subscribers.len());
    }

    fn ensure_online(&self) -> Result<(), AuthError> {
        if self.offline {
            Err(AuthError::Network("identity provider unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct MemoryProvider {
    state: Mutex<State>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl MemoryProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds a verified account without signing it in.
    ///
    /// # Errors
    /// Same validation failures as sign-up.
    pub fn add_account(&self, name: &str, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        let mut state = self.state();
        insert_account(&mut state, Some(name), &email, password, true)
    }

    /// Finishes the startup state check, optionally restoring a persisted
    /// session for `restore`. Unknown emails restore nothing.
    #[instrument(skip(self))]
    pub fn complete_initial_check(&self, restore: Option<&str>) -> Option<Identity> {
        let mut state = self.state();
        let restored = restore.and_then(|email| state.identity(&normalize_email(email)));
        state.set_current(restored.clone());
        restored
    }

    /// Simulates losing connectivity to the hosted backend.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.state().current.clone()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }
}

fn insert_account(
    state: &mut State,
    name: Option<&str>,
    email: &str,
    password: &str,
    email_verified: bool,
) -> Result<Identity, AuthError> {
    if !valid_email(email) {
        return Err(AuthError::InvalidEmail);
    }
    if state.accounts.contains_key(email) {
        return Err(AuthError::AccountExists);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }

    state.accounts.insert(
        email.to_string(),
        Account {
            uid: Uuid::new_v4(),
            name: name.map(ToString::to_string),
            password: SecretString::from(password.to_string()),
            email_verified,
        },
    );

    state.identity(email).ok_or(AuthError::InvalidEmail)
}

impl IdentityProvider for MemoryProvider {
    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state();

        if state.checked {
            let _ = tx.send(state.current.clone());
        }
        state.subscribers.push(tx);

        Subscription::new(rx)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        let mut state = self.state();
        state.ensure_online()?;

        let matches = state.accounts.get(&email).is_some_and(|account| {
            account.password.expose_secret() == password.expose_secret()
        });
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let identity = state.identity(&email).ok_or(AuthError::InvalidCredentials)?;
        state.set_current(Some(identity.clone()));

        Ok(identity)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn sign_up(&self, request: &SignUpRequest) -> Result<Identity, AuthError> {
        let email = normalize_email(&request.email);
        let mut state = self.state();
        state.ensure_online()?;

        let name = request.name.trim();
        let name = (!name.is_empty()).then_some(name);
        let identity = insert_account(
            &mut state,
            name,
            &email,
            request.password.expose_secret(),
            false,
        )?;
        state.set_current(Some(identity.clone()));

        Ok(identity)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), AuthError> {
        let mut state = self.state();
        state.ensure_online()?;
        state.set_current(None);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[tokio::test]
    async fn subscribers_wait_for_initial_check() {
        let provider = MemoryProvider::new();
        let mut subscription = provider.subscribe();

        assert_eq!(subscription.try_next(), None);

        provider.complete_initial_check(None);
        assert_eq!(subscription.next().await, Some(None));
    }

    #[tokio::test]
    async fn late_subscriber_gets_current_identity_immediately() {
        let provider = MemoryProvider::new();
        provider
            .add_account("Ana", "ana@nitsri.ac.in", "secret1")
            .unwrap();
        let restored = provider.complete_initial_check(Some("ANA@nitsri.ac.in"));
        assert!(restored.is_some());

        let mut subscription = provider.subscribe();
        let first = subscription.next().await.flatten();
        assert_eq!(first.map(|i| i.email), Some("ana@nitsri.ac.in".to_string()));
    }

    #[tokio::test]
    async fn sign_in_rejects_bad_credentials() {
        let provider = MemoryProvider::new();
        provider
            .add_account("Ana", "ana@nitsri.ac.in", "secret1")
            .unwrap();

        let wrong = provider.sign_in("ana@nitsri.ac.in", &secret("nope")).await;
        assert_eq!(wrong, Err(AuthError::InvalidCredentials));

        let unknown = provider.sign_in("bob@nitsri.ac.in", &secret("secret1")).await;
        assert_eq!(unknown, Err(AuthError::InvalidCredentials));

        assert!(provider.current().is_none());
    }

    #[tokio::test]
    async fn sign_in_and_out_notify_subscribers() {
        let provider = MemoryProvider::new();
        provider
            .add_account("Ana", "ana@nitsri.ac.in", "secret1")
            .unwrap();
        provider.complete_initial_check(None);

        let mut subscription = provider.subscribe();
        assert_eq!(subscription.next().await, Some(None));

        let identity = provider
            .sign_in(" ana@nitsri.ac.in", &secret("secret1"))
            .await
            .unwrap();
        assert_eq!(subscription.next().await, Some(Some(identity)));

        provider.sign_out().await.unwrap();
        assert_eq!(subscription.next().await, Some(None));
    }

    #[tokio::test]
    async fn sign_up_reports_distinct_errors() {
        let provider = MemoryProvider::new();
        provider
            .add_account("Ana", "ana@nitsri.ac.in", "secret1")
            .unwrap();

        let request = |email: &str, password: &str| SignUpRequest {
            name: "Bob".to_string(),
            email: email.to_string(),
            password: secret(password),
        };

        assert_eq!(
            provider.sign_up(&request("ana@nitsri.ac.in", "secret1")).await,
            Err(AuthError::AccountExists)
        );
        assert_eq!(
            provider.sign_up(&request("bob-at-nitsri", "secret1")).await,
            Err(AuthError::InvalidEmail)
        );
        assert_eq!(
            provider.sign_up(&request("bob@nitsri.ac.in", "12345")).await,
            Err(AuthError::WeakPassword)
        );

        let bob = provider
            .sign_up(&request("bob@nitsri.ac.in", "123456"))
            .await
            .unwrap();
        assert!(!bob.email_verified);
        assert_eq!(bob.display_name.as_deref(), Some("Bob"));
        assert_eq!(provider.current(), Some(bob));
    }

    #[tokio::test]
    async fn offline_provider_fails_transiently() {
        let provider = MemoryProvider::new();
        provider.set_offline(true);

        let err = provider.sign_out().await.unwrap_err();
        assert!(err.is_transient());

        provider.set_offline(false);
        assert!(provider.sign_out().await.is_ok());
    }

    #[tokio::test]
    async fn dropped_subscriptions_are_pruned() {
        let provider = MemoryProvider::new();
        let kept = provider.subscribe();
        let dropped = provider.subscribe();
        assert_eq!(provider.subscriber_count(), 2);

        drop(dropped);
        provider.complete_initial_check(None);
        assert_eq!(provider.subscriber_count(), 1);
        drop(kept);
        assert_eq!(provider.subscriber_count(), 0);
    }
}
