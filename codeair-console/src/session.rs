//! The signed-in session.

use codeair_core::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Holder of the single session for this process. Passed explicitly to
/// whoever needs it.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    session: Option<Session>,
}

impl SessionStore {
    pub fn new(session: Option<Session>) -> Self {
        Self { session }
    }

    pub fn get(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.session.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn establish(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Drop the session, returning it so the caller can revoke the token.
    pub fn clear(&mut self) -> Option<Session> {
        self.session.take()
    }
}
