/// Login handling for the portal.
///
/// - Fixed user registry with salted, iterated SHA-256 password hashes (credentials.rs)
/// - Session gate, tri-state outcome and session tokens (session.rs)

pub mod credentials;
pub mod session;

pub use credentials::{Credential, CredentialRegistry};
pub use session::{AuthOutcome, LoginAttempt, Session, SessionGate, SessionToken};
