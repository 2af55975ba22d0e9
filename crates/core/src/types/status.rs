//! Status enums.

use serde::{Deserialize, Serialize};

use super::auth::Identity;

/// Where the client is in the identity reconciliation cycle.
///
/// `Authenticating` and `LoggingOut` are in-flight states; both settle back
/// to whatever the current identity says once the request resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    LoggingOut,
}

impl AuthPhase {
    /// The settled phase for an identity.
    #[must_use]
    pub const fn settled(identity: &Identity) -> Self {
        if identity.is_authenticated() {
            Self::Authenticated
        } else {
            Self::Anonymous
        }
    }

    /// Returns true while a login, signup or logout request is outstanding.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Authenticating | Self::LoggingOut)
    }
}

impl std::fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::LoggingOut => write!(f, "logging_out"),
        }
    }
}
