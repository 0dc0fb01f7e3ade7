//! # Aikta (session-gated app shell)
//!
//! Framework-independent core of the Aikta app: the auth session store, the
//! navigation model, the routing guard that keeps the visible screen
//! consistent with the session, and the chat screen state.
//!
//! ## Session flow
//!
//! The identity provider is the only producer of session changes. The
//! [`auth::AuthService`] owns the provider subscription and republishes each
//! event on a `watch` channel; the [`router::SessionGuard`] and any other
//! reader subscribe to it and never write back.
//!
//! ## Routing guard
//!
//! Until the provider has answered its first state check the guard makes no
//! decision. Afterwards, signed-in users are kept inside the authenticated
//! region and signed-out users are sent to login, always with a navigation
//! replace.

pub mod auth;
pub mod chat;
pub mod cli;
pub mod router;
pub mod shell;
pub mod splash;
