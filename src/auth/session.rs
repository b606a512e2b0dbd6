/// Session gate: turns a login submission into a tri-state outcome and, on
/// success, a [`SessionToken`] that the portal requires for store actions.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use tracing::{info, warn};

use super::credentials::{Credential, CredentialRegistry};
use crate::config::AppConfig;

/// Token byte length before hex encoding (32 bytes = 64 hex chars).
const TOKEN_BYTES: usize = 32;

/// Result of checking the current actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Nothing submitted yet in this session
    Pending,
    /// A submission was made and matched no registered user
    Rejected,
    /// Submission matched; carries the display name
    Authenticated(String),
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated(_))
    }
}

/// A username/password pair as typed into the login form.
#[derive(Clone, Copy)]
pub struct LoginAttempt<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> LoginAttempt<'a> {
    pub fn new(username: &'a str, password: &'a str) -> Self {
        Self { username, password }
    }
}

impl std::fmt::Debug for LoginAttempt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginAttempt")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Proof of a successful login. Only the gate can mint one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    id: String,
    issuer: String,
    username: String,
    display_name: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Validates submissions against the fixed user registry.
#[derive(Debug, Clone)]
pub struct SessionGate {
    /// Stamped into every token this gate issues
    id: String,
    registry: CredentialRegistry,
    session_ttl: Duration,
}

impl SessionGate {
    pub fn new(registry: CredentialRegistry, session_ttl: Duration) -> Self {
        Self {
            id: generate_token(),
            registry,
            session_ttl,
        }
    }

    /// Build the gate from the startup config (hashes every configured password).
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            CredentialRegistry::new(&config.users),
            Duration::days(i64::from(config.session_ttl_days)),
        )
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Check a submission. `None` means the user has not submitted anything yet.
    pub fn authenticate(&self, submission: Option<LoginAttempt<'_>>) -> AuthOutcome {
        match submission {
            None => AuthOutcome::Pending,
            Some(attempt) => match self.verify(attempt) {
                Some(credential) => AuthOutcome::Authenticated(credential.display_name.clone()),
                None => AuthOutcome::Rejected,
            },
        }
    }

    /// True when `token` was issued by this gate, has not expired and its
    /// user is still registered.
    pub fn accepts(&self, token: &SessionToken, now: DateTime<Utc>) -> bool {
        token.issuer == self.id && token.is_valid_at(now) && self.registry.contains(&token.username)
    }

    fn verify(&self, attempt: LoginAttempt<'_>) -> Option<&Credential> {
        let credential = self.registry.verify(attempt.username, attempt.password);
        match credential {
            Some(c) => info!(username = %c.username, "login accepted"),
            None => warn!(username = attempt.username, "login rejected"),
        }
        credential
    }

    fn issue_token(&self, credential: &Credential, now: DateTime<Utc>) -> SessionToken {
        SessionToken {
            id: generate_token(),
            issuer: self.id.clone(),
            username: credential.username.clone(),
            display_name: credential.display_name.clone(),
            issued_at: now,
            expires_at: now + self.session_ttl,
        }
    }
}

/// One browser session: the outcome of the latest submission plus the token
/// issued for it, if any.
#[derive(Debug, Clone)]
pub struct Session {
    outcome: AuthOutcome,
    token: Option<SessionToken>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            outcome: AuthOutcome::Pending,
            token: None,
        }
    }

    /// Submit the login form now.
    pub fn submit(&mut self, gate: &SessionGate, username: &str, password: &str) -> AuthOutcome {
        self.submit_at(gate, LoginAttempt::new(username, password), Utc::now())
    }

    /// Submit the login form at `now`.
    ///
    /// A live login is kept as is; call [`Session::logout`] before switching
    /// users.
    pub fn submit_at(
        &mut self,
        gate: &SessionGate,
        attempt: LoginAttempt<'_>,
        now: DateTime<Utc>,
    ) -> AuthOutcome {
        if self.token_at(now).is_some() {
            return self.outcome.clone();
        }

        match gate.verify(attempt) {
            Some(credential) => {
                let token = gate.issue_token(credential, now);
                self.outcome = AuthOutcome::Authenticated(token.display_name.clone());
                self.token = Some(token);
            }
            None => {
                self.outcome = AuthOutcome::Rejected;
                self.token = None;
            }
        }
        self.outcome.clone()
    }

    /// Current outcome; an expired login falls back to `Pending`.
    pub fn status(&mut self, now: DateTime<Utc>) -> AuthOutcome {
        if self.outcome.is_authenticated() && self.token_at(now).is_none() {
            info!("session expired");
            self.logout();
        }
        self.outcome.clone()
    }

    /// The token of a live login, if any.
    pub fn token(&self) -> Option<&SessionToken> {
        self.token_at(Utc::now())
    }

    /// The token if it is still valid at `now`.
    pub fn token_at(&self, now: DateTime<Utc>) -> Option<&SessionToken> {
        self.token.as_ref().filter(|t| t.is_valid_at(now))
    }

    pub fn logout(&mut self) {
        self.outcome = AuthOutcome::Pending;
        self.token = None;
    }
}

/// Generate a random session token id (hex-encoded).
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
