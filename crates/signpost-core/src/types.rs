use serde::{Deserialize, Serialize};

/// Transport-level identifier of a user.
pub type UserId = i64;

/// Facts about the user behind an inbound event.
///
/// The privilege flag is decided by the boundary (see
/// [`AdminConfig::is_admin`](crate::config::AdminConfig::is_admin)); the
/// conversation engine only consumes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: UserId,
    pub username: Option<String>,
    pub privileged: bool,
}

impl UserContext {
    /// A non-privileged user without a username.
    pub fn anonymous(user_id: UserId) -> Self {
        Self {
            user_id,
            username: None,
            privileged: false,
        }
    }

    /// Display name used in logs and forwarded feedback.
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(name) => format!("@{}", name),
            None => format!("user {}", self.user_id),
        }
    }
}
