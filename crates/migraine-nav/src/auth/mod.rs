//! Mock authentication against a fixed set of demo accounts.

pub mod router;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::diary::UserId;

pub use router::auth_router;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("missing or invalid session token")]
    InvalidSession,
    #[error("session store unavailable")]
    Unavailable,
}

struct DemoAccount {
    user: User,
    password: &'static str,
}

/// Accounts accepted by the mock login.
const DEMO_ACCOUNTS: [(&str, &str, &str, &str); 2] = [
    ("user-demo", "demo@migrainenav.app", "Demo Patient", "demo1234"),
    ("user-care", "caregiver@migrainenav.app", "Demo Caregiver", "care1234"),
];

/// Open sessions kept before the oldest is evicted.
pub const MAX_SESSIONS: usize = 1024;

type SessionMap = HashMap<String, (u64, User)>;

/// Issues and checks in-memory session tokens. At most `MAX_SESSIONS` stay open; logging in
/// beyond that closes the oldest session.
pub struct AuthService {
    accounts: Vec<DemoAccount>,
    sessions: Mutex<SessionMap>,
    sequence: AtomicU64,
}

impl Default for AuthService {
    fn default() -> Self {
        Self::with_demo_accounts()
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("accounts", &self.accounts.len())
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn with_demo_accounts() -> Self {
        let accounts = DEMO_ACCOUNTS
            .iter()
            .map(|(id, email, name, password)| DemoAccount {
                user: User {
                    id: UserId((*id).to_string()),
                    email: (*email).to_string(),
                    name: (*name).to_string(),
                },
                password: *password,
            })
            .collect();
        Self {
            accounts,
            sessions: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(1),
        }
    }

    fn sessions(&self) -> Result<MutexGuard<'_, SessionMap>, AuthError> {
        self.sessions.lock().map_err(|_| AuthError::Unavailable)
    }

    /// Emails compare case-insensitively; passwords exactly.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        let account = self
            .accounts
            .iter()
            .find(|account| account.user.email.eq_ignore_ascii_case(email))
            .filter(|account| account.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let token = format!("sess-{sequence:06}");
        {
            let mut sessions = self.sessions()?;
            if sessions.len() >= MAX_SESSIONS {
                let oldest = sessions
                    .iter()
                    .min_by_key(|(_, (opened, _))| *opened)
                    .map(|(token, _)| token.clone());
                if let Some(oldest) = oldest {
                    sessions.remove(&oldest);
                }
            }
            sessions.insert(token.clone(), (sequence, account.user.clone()));
        }
        info!(user_id = %account.user.id.0, "session opened");
        Ok(Session {
            token,
            user: account.user.clone(),
        })
    }

    pub fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions()?
            .remove(token)
            .map(|_| ())
            .ok_or(AuthError::InvalidSession)
    }

    pub fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        self.sessions()?
            .get(token)
            .map(|(_, user)| user.clone())
            .ok_or(AuthError::InvalidSession)
    }

    /// Resolves the `Authorization: Bearer` header to a user.
    pub fn authenticate_headers(&self, headers: &HeaderMap) -> Result<User, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::InvalidSession)?;
        self.authenticate(token)
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
