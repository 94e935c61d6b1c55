//! Error responses and request body extraction.
//!
//! Every failure leaves the API as `{ "success": false, "message": ... }` with a
//! status code chosen from [`ErrorKind`]. Internal failures are logged and hidden
//! behind a generic message.

use axum::{
    Json,
    extract::{
        FromRequest,
        multipart::MultipartError,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

use crate::errors::{Error, ErrorKind};

/// JSON body extractor whose rejections become [`Error::InvalidArgument`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_argument(rejection.body_text())
    }
}

impl From<MultipartError> for Error {
    fn from(rejection: MultipartError) -> Self {
        Self::invalid_argument(format!("Malformed form data: {}", rejection.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl ErrorKind {
    /// HTTP status reported for this kind of failure.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::InvalidArgument | Self::InvalidState => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let message = if kind == ErrorKind::Internal {
            error!("Internal error: {self}");
            "Internal server error".to_string()
        } else {
            debug!("Request failed ({kind:?}): {self}");
            self.to_string()
        };

        let body = ErrorBody {
            success: false,
            message,
        };
        (kind.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::invalid_argument("x").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::MedicineNotFound { id: "1".into() }
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::QuantityBelowMinimum {
                item_id: "m1".into()
            }
            .into_response()
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Unauthorized {
                message: "no".into()
            }
            .into_response()
            .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::Config {
                message: "broken".into()
            }
            .into_response()
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
