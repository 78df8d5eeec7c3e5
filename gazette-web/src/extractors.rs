//! Types to extract relay data from requests.

use crate::errors::HandlerError;
use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use gazette_settings::Settings;
use std::future::{ready, Ready};

/// The header callers present their relay API key in.
const API_KEY_HEADER: &str = "X-API-KEY";

/// Witness that the request carried the configured relay API key.
///
/// Using this as a handler argument rejects unauthenticated requests before
/// the handler body runs, so no work is done, and no upstream call is made,
/// on behalf of an unknown caller.
pub struct ApiKey;

impl FromRequest for ApiKey {
    type Error = HandlerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        /// Compare the presented key against the configured one.
        fn check(req: &HttpRequest) -> Result<ApiKey, HandlerError> {
            let settings = req
                .app_data::<Data<Settings>>()
                .ok_or_else(|| HandlerError::Internal("Settings not configured".to_string()))?;

            // A missing header and a mismatched key are deliberately
            // indistinguishable to the caller. The comparison is plain byte
            // equality.
            let provided = req.headers().get(API_KEY_HEADER);
            match provided {
                Some(value) if value.as_bytes() == settings.auth.api_key.as_bytes() => Ok(ApiKey),
                _ => Err(HandlerError::Unauthorized),
            }
        }

        ready(check(req))
    }
}
