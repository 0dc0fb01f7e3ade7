//! Navigation model for the shell: screens (`Route`), the top-level regions
//! they belong to (`Location`), the history stack, and the guard that keeps
//! the visible region consistent with the session.
//!
//! Regions:
//! - `Authenticated`: the drawer stack (chat, about, leader board).
//! - `Login`: login and sign-up screens.
//! - `Other`: anything else, e.g. the not-found screen.

pub mod guard;
pub mod navigation;

pub use self::guard::{reconcile, Decision, SessionGuard};
pub use self::navigation::{Navigation, Navigator};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Location {
    Authenticated,
    Login,
    Other,
}

impl Location {
    /// Screen shown when navigation lands on the region.
    #[must_use]
    pub fn landing(self) -> Route {
        match self {
            Self::Authenticated => Route::Home,
            Self::Login => Route::Login,
            Self::Other => Route::NotFound,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authenticated => "authenticated-area",
            Self::Login => "login-area",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
    Index,
    About,
    LeaderBoard,
    Login,
    SignUp,
    NotFound,
}

/// Drawer entries, top to bottom.
pub const DRAWER: [Route; 4] = [Route::Home, Route::Index, Route::About, Route::LeaderBoard];

impl Route {
    #[must_use]
    pub fn location(self) -> Location {
        match self {
            Self::Home | Self::Index | Self::About | Self::LeaderBoard => Location::Authenticated,
            Self::Login | Self::SignUp => Location::Login,
            Self::NotFound => Location::Other,
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/(tabs)/home",
            Self::Index => "/(tabs)",
            Self::About => "/(tabs)/about",
            Self::LeaderBoard => "/(tabs)/leader-board",
            Self::Login => "/login",
            Self::SignUp => "/auth/sign-up",
            Self::NotFound => "/+not-found",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Index => "Chat",
            Self::About => "About",
            Self::LeaderBoard => "Leader Board",
            Self::Login => "Login",
            Self::SignUp => "Create Account",
            Self::NotFound => "Not Found",
        }
    }

    /// Resolves a path, ignoring case and trailing slashes. Unknown paths
    /// resolve to `NotFound`.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim().trim_end_matches('/');
        let normalized = if trimmed.starts_with('/') {
            trimmed.to_lowercase()
        } else {
            format!("/{}", trimmed.to_lowercase())
        };

        [
            Self::Home,
            Self::Index,
            Self::About,
            Self::LeaderBoard,
            Self::Login,
            Self::SignUp,
        ]
        .into_iter()
        .find(|route| route.path() == normalized)
        .unwrap_or(Self::NotFound)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
