//! Request handlers grouped by resource.

/// Cart mutation endpoints
pub mod cart;
/// Catalog endpoints
pub mod medicines;
/// Order settlement and history endpoints
pub mod orders;
/// Account registration
pub mod users;

use serde::Deserialize;

/// An identifier that clients may send either as a JSON string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// `"42"` or `"m1"`
    Text(String),
    /// `42`
    Number(i64),
}

impl RawId {
    /// The identifier as an opaque string.
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Number(number) => number.to_string(),
        }
    }

    /// The identifier as a numeric record id, if it is one.
    #[must_use]
    pub fn as_record_id(&self) -> Option<i64> {
        match self {
            Self::Text(text) => text.trim().parse().ok(),
            Self::Number(number) => Some(*number),
        }
    }
}
