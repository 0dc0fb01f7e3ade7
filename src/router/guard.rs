//! Session-gated routing guard.
//!
//! The guard re-evaluates on every session or location change and keeps the
//! visible region consistent with the session:
//! - nothing happens until the provider has answered its first state check,
//!   so a returning user never sees the login screen flash by;
//! - a signed-in user outside the authenticated region lands on its home screen;
//! - a signed-out user inside the authenticated region is sent to login.
//!
//! Redirects are applied with `replace`, so the rejected screen is not left
//! on the back stack.

use crate::{
    auth::session::{Session, SessionWatch},
    router::{Location, Navigator},
};
use std::{sync::Arc, time::Duration};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    NoOp,
    Redirect(Location),
}

/// Maps the current session and region to the navigation action to take.
#[must_use]
pub fn reconcile(session: &Session, location: Location) -> Decision {
    if !session.resolved {
        return Decision::NoOp;
    }

    match (session.is_authenticated(), location) {
        (true, Location::Authenticated) | (false, Location::Login | Location::Other) => {
            Decision::NoOp
        }
        (true, _) => Decision::Redirect(Location::Authenticated),
        (false, Location::Authenticated) => Decision::Redirect(Location::Login),
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SessionGuard {
    resolve_timeout: Option<Duration>,
}

impl SessionGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat the session as signed out if the provider has not answered
    /// within `timeout`. Without it the guard waits indefinitely.
    #[must_use]
    pub fn with_resolve_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.resolve_timeout = timeout.filter(|timeout| !timeout.is_zero());
        self
    }

    /// Runs until the session broadcast closes. Returns the number of
    /// redirects issued.
    pub async fn run<N: Navigator>(self, mut session_rx: SessionWatch, navigator: Arc<N>) -> usize {
        let mut location_rx = navigator.watch_location();
        let deadline = self.resolve_timeout.map(|timeout| Instant::now() + timeout);
        let mut assume_signed_out = false;
        let mut redirects = 0;

        loop {
            let mut session = session_rx.borrow_and_update().clone();
            if assume_signed_out && !session.resolved {
                session = Session::resolved(None);
            }
            let location = *location_rx.borrow_and_update();

            match reconcile(&session, location) {
                Decision::NoOp if !session.resolved => {
                    debug!("session unresolved, deferring at {}", location);
                }
                Decision::NoOp => {}
                Decision::Redirect(target) => {
                    let route = target.landing();
                    info!(from = %location, to = %route, "redirecting");
                    navigator.replace(route);
                    redirects += 1;
                }
            }

            let waiting = deadline.is_some() && !session.resolved;
            tokio::select! {
                changed = session_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = location_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if waiting => {
                    warn!("identity provider did not answer in time, assuming signed out");
                    assume_signed_out = true;
                }
            }
        }

        debug!("session guard stopped after {} redirect(s)", redirects);
        redirects
    }
}
