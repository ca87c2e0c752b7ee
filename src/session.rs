//! The session context: who is using the tracker right now.

use crate::model::UserId;

const DEFAULT_DISPLAY_NAME: &str = "User";

/// The current user identity. It is passed explicitly to the view controller and the mutation
/// gate. A session without a user is valid: listings and summaries are then skipped rather than
/// failing.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Session {
    user_id: Option<UserId>,
    display_name: Option<String>,
}

impl Session {
    /// A session for `user_id`.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            display_name: None,
        }
    }

    /// A session with nobody logged in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// The name to greet the user with, "User" when none is known.
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}
