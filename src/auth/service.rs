//! Auth session owner. It acquires the provider subscription once, keeps the
//! session broadcast up to date from it and exposes the provider operations
//! to screens. Sign-in and sign-out never write the session directly; the
//! change always arrives through the subscription.

use crate::auth::{
    error::AuthError,
    provider::{IdentityProvider, SignUpRequest, Subscription},
    session::{Identity, Session, SessionWatch},
};
use secrecy::SecretString;
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, instrument};

pub struct AuthService<P: IdentityProvider> {
    provider: Arc<P>,
    session_rx: SessionWatch,
    task: Option<JoinHandle<()>>,
}

impl<P: IdentityProvider> AuthService<P> {
    /// Subscribes to `provider` and starts forwarding its events.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(provider: Arc<P>) -> Self {
        let (session_tx, session_rx) = watch::channel(Session::unresolved());
        let subscription = provider.subscribe();
        let task = tokio::spawn(forward(subscription, session_tx));

        Self {
            provider,
            session_rx,
            task: Some(task),
        }
    }

    /// New reader of the session broadcast.
    #[must_use]
    pub fn subscribe(&self) -> SessionWatch {
        self.session_rx.clone()
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.session_rx.borrow().clone()
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// # Errors
    /// Returns the provider failure unchanged.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        self.provider
            .sign_in(email, password)
            .await
            .inspect_err(|e| error!("Sign in error: {}", e))
    }

    /// # Errors
    /// Returns the provider failure unchanged.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Identity, AuthError> {
        self.provider
            .sign_up(request)
            .await
            .inspect_err(|e| error!("Sign up error: {}", e))
    }

    /// # Errors
    /// Returns the provider failure unchanged.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider
            .sign_out()
            .await
            .inspect_err(|e| error!("Sign out error: {}", e))
    }

    /// Releases the subscription. Once this returns no further session
    /// update is published and readers observe the channel as closed.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        debug!("auth service stopped");
    }
}

impl<P: IdentityProvider> Drop for AuthService<P> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn forward(mut subscription: Subscription, session_tx: watch::Sender<Session>) {
    while let Some(identity) = subscription.next().await {
        let next = Session::resolved(identity);

        let changed = session_tx.send_if_modified(|session| {
            if *session == next {
                false
            } else {
                *session = next.clone();
                true
            }
        });

        if changed {
            info!(
                authenticated = next.is_authenticated(),
                "session updated"
            );
        }
    }

    debug!("identity provider closed the subscription");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::MemoryProvider;

    fn provider() -> Arc<MemoryProvider> {
        let provider = MemoryProvider::new();
        provider
            .add_account("Ana", "ana@nitsri.ac.in", "secret1")
            .unwrap();
        Arc::new(provider)
    }

    #[tokio::test]
    async fn session_stays_unresolved_until_first_event() {
        let provider = provider();
        let service = AuthService::start(provider.clone());
        let mut rx = service.subscribe();

        tokio::task::yield_now().await;
        assert_eq!(service.session(), Session::unresolved());

        provider.complete_initial_check(None);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Session::resolved(None));
    }

    #[tokio::test]
    async fn sign_in_arrives_through_subscription() {
        let provider = provider();
        provider.complete_initial_check(None);
        let service = AuthService::start(provider);
        let mut rx = service.subscribe();
        rx.changed().await.unwrap();
        rx.borrow_and_update();

        let secret = SecretString::from("secret1".to_string());
        let identity = service.sign_in("ana@nitsri.ac.in", &secret).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().identity, Some(identity));

        service.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Session::resolved(None));
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_session_alone() {
        let provider = provider();
        provider.complete_initial_check(None);
        let service = AuthService::start(provider);
        let mut rx = service.subscribe();
        rx.changed().await.unwrap();
        rx.borrow_and_update();

        let secret = SecretString::from("wrong".to_string());
        let err = service.sign_in("ana@nitsri.ac.in", &secret).await;
        assert_eq!(err, Err(AuthError::InvalidCredentials));

        tokio::task::yield_now().await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn no_updates_after_shutdown() {
        let provider = provider();
        let service = AuthService::start(provider.clone());
        let mut rx = service.subscribe();

        service.shutdown().await;
        assert_eq!(provider.subscriber_count(), 0);

        provider.complete_initial_check(Some("ana@nitsri.ac.in"));
        assert!(rx.changed().await.is_err());
        assert_eq!(*rx.borrow(), Session::unresolved());
    }
}
