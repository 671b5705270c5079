use thiserror::Error;

/// Everything that can go wrong while serving a request. All variants are
/// recovered at the router boundary and turned into an HTTP status plus a
/// JSON error body; none of them crash the process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not parse HTTP request line")]
    MalformedRequest,

    #[error("unknown endpoint: {0}")]
    RouteNotFound(String),

    #[error("parameter '{0}' is missing")]
    MissingParameter(&'static str),

    #[error("city not found: {0}")]
    CityNotFound(String),

    #[error("upstream rejected the API key")]
    InvalidCredentials,

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::MalformedRequest | ApiError::MissingParameter(_) => 400,
            ApiError::RouteNotFound(_) | ApiError::CityNotFound(_) => 404,
            ApiError::InvalidCredentials | ApiError::Upstream(_) => 502,
            ApiError::Internal(_) => 500,
        }
    }
}
