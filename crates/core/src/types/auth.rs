//! Identity and authentication types.

use core::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::entity::Attributes;
use super::id::UserId;

/// The signed-in user as returned by the `/auth/*` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    /// Any other fields the backend sends, kept verbatim.
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl AuthUser {
    /// Create an identity record with no extra attributes.
    #[must_use]
    pub fn new(id: UserId, email: Option<Email>) -> Self {
        Self {
            id,
            email,
            attributes: Attributes::new(),
        }
    }
}

/// The process-wide identity: anonymous, or a signed-in user.
///
/// Replaced wholesale on every transition, never merged. The anonymous
/// sentinel serializes as `{}`; deserializing `null`, `{}` or any object
/// without an `id` yields the sentinel.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User(AuthUser),
}

impl Identity {
    /// Returns the signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::User(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    /// Returns true when a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Parse an identity from a raw response body. An empty body is anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON, or if it carries an
    /// `id` but is not a valid [`AuthUser`].
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        if body.trim().is_empty() {
            return Ok(Self::Anonymous);
        }
        serde_json::from_str(body)
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Anonymous => serializer.serialize_map(Some(0))?.end(),
            Self::User(user) => user.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        match value {
            Some(value) if value.get("id").is_some_and(|id| !id.is_null()) => {
                serde_json::from_value(value)
                    .map(Self::User)
                    .map_err(de::Error::custom)
            }
            _ => Ok(Self::Anonymous),
        }
    }
}

/// Which credential endpoint an authentication attempt targets.
///
/// Both methods share one orchestration; only the endpoint differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMethod {
    Login,
    Signup,
}

impl AuthMethod {
    /// Path segment under `/auth/`.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }

    /// Human-readable label for forms and buttons.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Signup => "Sign Up",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Error returned when parsing an unknown [`AuthMethod`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid auth method: {0}")]
pub struct ParseAuthMethodError(String);

impl FromStr for AuthMethod {
    type Err = ParseAuthMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(Self::Login),
            "signup" => Ok(Self::Signup),
            _ => Err(ParseAuthMethodError(s.to_owned())),
        }
    }
}

/// Email and password submitted to `/auth/{method}`.
///
/// The password is only exposed while serializing the request body.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub const fn new(email: Email, password: SecretString) -> Self {
        Self { email, password }
    }
}

impl Serialize for Credentials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = serializer.serialize_struct("Credentials", 2)?;
        body.serialize_field("email", &self.email)?;
        body.serialize_field("password", self.password.expose_secret())?;
        body.end()
    }
}
