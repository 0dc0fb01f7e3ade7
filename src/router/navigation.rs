use crate::router::{Location, Route};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

/// What the session guard needs from the navigation framework.
pub trait Navigator: Send + Sync {
    /// Region currently on screen.
    fn location(&self) -> Location;

    /// Stream of region changes.
    fn watch_location(&self) -> watch::Receiver<Location>;

    /// Swaps the visible screen for `route` without leaving the old one on the
    /// back stack.
    fn replace(&self, route: Route);
}

/// Stack-based navigation state. The bottom entry is never popped.
pub struct Navigation {
    history: Mutex<Vec<Route>>,
    location_tx: watch::Sender<Location>,
}

impl Navigation {
    #[must_use]
    pub fn new(initial: Route) -> Self {
        let (location_tx, _) = watch::channel(initial.location());
        Self {
            history: Mutex::new(vec![initial]),
            location_tx,
        }
    }

    fn history_mut(&self) -> MutexGuard<'_, Vec<Route>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn current(&self) -> Route {
        self.history_mut().last().copied().unwrap_or(Route::NotFound)
    }

    /// Snapshot of the back stack, bottom first.
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history_mut().clone()
    }

    pub fn push(&self, route: Route) {
        let mut history = self.history_mut();
        history.push(route);
        debug!("push {}", route);
        self.publish(route);
    }

    /// Pops the top screen. Returns `false` when already at the bottom.
    pub fn back(&self) -> bool {
        let mut history = self.history_mut();
        if history.len() <= 1 {
            return false;
        }
        history.pop();

        let top = history.last().copied().unwrap_or(Route::NotFound);
        debug!("back to {}", top);
        self.publish(top);
        true
    }

    // Only region changes are broadcast; moving between screens of one
    // region does not wake the guard.
    fn publish(&self, route: Route) {
        let location = route.location();
        self.location_tx.send_if_modified(|current| {
            if *current == location {
                false
            } else {
                *current = location;
                true
            }
        });
    }
}

impl Navigator for Navigation {
    fn location(&self) -> Location {
        *self.location_tx.borrow()
    }

    fn watch_location(&self) -> watch::Receiver<Location> {
        self.location_tx.subscribe()
    }

    fn replace(&self, route: Route) {
        let mut history = self.history_mut();
        match history.last_mut() {
            Some(top) => *top = route,
            None => history.push(route),
        }
        debug!("replace with {}", route);
        self.publish(route);
    }
}
