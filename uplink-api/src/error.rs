use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 401/403 with the raw detail payload from the server, usually a
    /// session/token problem rather than a business-rule failure.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("ResponseError: {0}")]
    ResponseError(String),
    #[error("ParsingError: {0}")]
    ParsingError(String),
    /// Any other non-success response, carrying the server-provided message.
    #[error("{0}")]
    Server(String),
    #[error("no endpoint accepted the request (tried {tried} candidates)")]
    EndpointUnavailable { tried: usize },
}

impl ApiError {
    /// True for the responses that signal backend route/method drift and may
    /// be skipped over when probing alternate endpoint candidates.
    pub fn is_route_drift(&self) -> bool {
        matches!(self, ApiError::NotFound | ApiError::MethodNotAllowed)
    }
}
