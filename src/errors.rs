//! Unified error type for the medicart service.
//!
//! Domain failures (bad input, missing records, refused state transitions) and
//! infrastructure failures (database, I/O, configuration) share one enum so that
//! every layer can propagate with `?`. [`Error::kind`] folds the variants into the
//! small taxonomy the HTTP layer reports to clients.

use thiserror::Error;

/// Client-visible error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed required input
    InvalidArgument,
    /// User, cart entry, medicine, or order absent
    NotFound,
    /// Operation refused because of the current state of a record
    InvalidState,
    /// Missing or unknown credentials
    Unauthorized,
    /// Storage or other infrastructure failure
    Internal,
}

/// All errors produced by the service.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database failure reported by sea-orm
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed request field
    #[error("{message}")]
    InvalidArgument {
        /// Client-facing explanation
        message: String,
    },

    /// Price or amount that is negative or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// Caller-declared order amount disagrees with the recomputed total
    #[error("Order amount {declared:.2} does not match item total {computed:.2}")]
    AmountMismatch {
        /// Amount sent by the caller
        declared: f64,
        /// Sum of unit price times quantity over the line items
        computed: f64,
    },

    /// No account with this identifier
    #[error("User not found")]
    UserNotFound {
        /// Identifier that was looked up
        id: String,
    },

    /// The user's cart has no entry for this item
    #[error("Item not in cart")]
    CartItemNotFound {
        /// Item identifier that was looked up
        item_id: String,
    },

    /// No catalog record with this identifier
    #[error("Medicine not found")]
    MedicineNotFound {
        /// Identifier that was looked up
        id: String,
    },

    /// Decrementing would drop the quantity below 1
    #[error("Quantity cannot be less than 1")]
    QuantityBelowMinimum {
        /// Item whose decrement was refused
        item_id: String,
    },

    /// Missing or unrecognised credentials
    #[error("{message}")]
    Unauthorized {
        /// Client-facing explanation
        message: String,
    },

    /// Image could not be stored or removed
    #[error("Image storage error: {message}")]
    ImageStore {
        /// What went wrong
        message: String,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Classifies the error for reporting.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } | Self::InvalidAmount { .. } | Self::AmountMismatch { .. } => {
                ErrorKind::InvalidArgument
            }
            Self::UserNotFound { .. } | Self::CartItemNotFound { .. } | Self::MedicineNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::QuantityBelowMinimum { .. } => ErrorKind::InvalidState,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::ImageStore { .. } => ErrorKind::Internal,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::invalid_argument("missing").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            Error::AmountMismatch {
                declared: 1.0,
                computed: 2.0
            }
            .kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            Error::UserNotFound { id: "7".into() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::QuantityBelowMinimum {
                item_id: "m1".into()
            }
            .kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            Error::Database(sea_orm::DbErr::Custom("boom".into())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_domain_messages_are_client_facing() {
        let err = Error::QuantityBelowMinimum {
            item_id: "m1".into(),
        };
        assert_eq!(err.to_string(), "Quantity cannot be less than 1");

        let err = Error::AmountMismatch {
            declared: 5.0,
            computed: 4.5,
        };
        assert_eq!(
            err.to_string(),
            "Order amount 5.00 does not match item total 4.50"
        );
    }
}
