//! Session values shared between the auth service (single writer) and its
//! readers. Nothing here holds credentials; `Identity` is an opaque handle
//! plus display metadata.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

/// Signed-in user handle as delivered by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub email_verified: bool,
}

/// Authentication status of the process.
///
/// `resolved` flips to `true` once, when the provider answers its first
/// state check; before that the identity is meaningless and always `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub identity: Option<Identity>,
    pub resolved: bool,
}

impl Session {
    /// Session as it exists before the provider has answered.
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Session after the provider delivered `identity`.
    #[must_use]
    pub fn resolved(identity: Option<Identity>) -> Self {
        Self {
            identity,
            resolved: true,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Read side of the session broadcast.
pub type SessionWatch = watch::Receiver<Session>;
