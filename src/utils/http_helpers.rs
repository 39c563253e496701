use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// A plain-text HTTP error that can be returned from any handler.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
        }
    }

    /// The rejection sent for any report that cannot be decoded.
    pub fn bad_request() -> Self {
        HTTPError::new(StatusCode::BAD_REQUEST, "Bad request")
    }
}

/// Converts our `HTTPError` into an HTTP response.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message,
        )
            .into_response()
    }
}
