//! Any errors that gazette-web might generate, and supporting implementations.
//!
//! Every error a handler can produce renders as the fixed envelope
//! `{"status": "error", "message": ...}`, so callers never see a bare
//! transport-level failure.

use std::collections::HashMap;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::Value;
use thiserror::Error;

/// An error that happened in a web handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The caller did not present the relay's API key.
    #[error("Unauthorized")]
    Unauthorized,

    /// The news provider rejected the forwarded search. The provider's status
    /// code and message are relayed as-is.
    #[error("{message}")]
    Upstream {
        /// The provider's HTTP status code.
        status: u16,
        /// The provider's reported message.
        message: String,
    },

    /// Any other failure, described for the caller.
    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    /// Convert the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            // The status came off a real upstream response, so conversion
            // only fails if the provider sent something outside the valid
            // range.
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        HandlerError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HashMap::new();
        response.insert("status".to_owned(), Value::String("error".to_owned()));
        response.insert("message".to_owned(), Value::String(format!("{}", self)));
        HttpResponse::build(self.status_code()).json(response)
    }
}

#[cfg(test)]
mod tests {
    use super::HandlerError;
    use actix_web::{body::to_bytes, http::StatusCode, ResponseError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// The parsed JSON body of the given error's response.
    async fn body_of(error: &HandlerError) -> serde_json::Value {
        let response = error.error_response();
        let bytes = to_bytes(response.into_body()).await.expect("body bytes");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[actix_rt::test]
    async fn unauthorized_renders_the_fixed_envelope() {
        let error = HandlerError::Unauthorized;
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_of(&error).await,
            json!({"status": "error", "message": "Unauthorized"})
        );
    }

    #[actix_rt::test]
    async fn upstream_errors_relay_status_and_message() {
        let error = HandlerError::Upstream {
            status: 429,
            message: "Rate limit exceeded".to_string(),
        };
        assert_eq!(error.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body_of(&error).await,
            json!({"status": "error", "message": "Rate limit exceeded"})
        );
    }

    #[actix_rt::test]
    async fn internal_errors_describe_the_failure() {
        let error = HandlerError::Internal("something broke".to_string());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(&error).await,
            json!({"status": "error", "message": "something broke"})
        );
    }

    #[actix_rt::test]
    async fn out_of_range_upstream_statuses_become_bad_gateway() {
        let error = HandlerError::Upstream {
            status: 99,
            message: "?".to_string(),
        };
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }
}
