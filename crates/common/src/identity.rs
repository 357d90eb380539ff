//! Reporter identity shared across crates.

use serde::{Deserialize, Serialize};

/// Identifier attached to requests that carry no explicit reporter.
pub const ANONYMOUS_ID: &str = "anonymous-user";

/// Role of a reporter within the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular community member.
    #[default]
    Citizen,
    /// Moderator reviewing incoming reports.
    Moderator,
    /// Platform administrator.
    Admin,
}

impl Role {
    /// Whether this role may see moderation-only report data.
    #[must_use]
    pub const fn is_moderator(self) -> bool {
        matches!(self, Self::Moderator | Self::Admin)
    }
}

/// Identity of the person behind a request.
///
/// Every submission and vote is attributed to one of these. Requests
/// without explicit identity headers act as the shared anonymous
/// reporter rather than being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable identifier for the reporter.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Role within the platform.
    #[serde(default)]
    pub role: Role,
}

impl Identity {
    /// The shared anonymous reporter.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            id: ANONYMOUS_ID.to_string(),
            name: "Anonymous".to_string(),
            avatar_url: None,
            role: Role::Citizen,
        }
    }

    /// Whether this identity is the shared anonymous reporter.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_identity() {
        let identity = Identity::anonymous();
        assert_eq!(identity.id, "anonymous-user");
        assert_eq!(identity.role, Role::Citizen);
        assert!(identity.is_anonymous());
    }

    #[test]
    fn test_moderator_roles() {
        assert!(!Role::Citizen.is_moderator());
        assert!(Role::Moderator.is_moderator());
        assert!(Role::Admin.is_moderator());
    }
}
