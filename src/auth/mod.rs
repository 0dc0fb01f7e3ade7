pub mod error;
pub mod memory;
pub mod provider;
pub mod service;
pub mod session;
pub mod validation;

pub use self::error::AuthError;
pub use self::memory::MemoryProvider;
pub use self::provider::{IdentityProvider, SignUpRequest, Subscription};
pub use self::service::AuthService;
pub use self::session::{Identity, Session, SessionWatch};
