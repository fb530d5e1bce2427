//! HTTP response mapping
//!
//! Responses are plain text: the fixed acknowledgment on success, the error
//! message otherwise.

use crate::error::Error;
use crate::types::Outcome;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match self {
            Outcome::Started => crate::types::DOWNLOAD_STARTED_MESSAGE.to_string(),
            Outcome::NotFound(message) | Outcome::Error(message) => message,
        };

        (status, body).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        Outcome::from(self).into_response()
    }
}
