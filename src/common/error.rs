use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Ambiguous path: {path} matched {candidates} items")]
    Ambiguous { path: String, candidates: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable, machine-readable reason code for an outer API layer.
    pub fn reason(&self) -> &'static str {
        match self {
            Error::InvalidPath(_) => "malformedUrl",
            Error::NotFound(_) => "notFound",
            Error::AlreadyExists(_) => "conflict",
            Error::Unauthorized(_) => "unauthorized",
            Error::Upstream(_) => "invalidResponse",
            Error::Ambiguous { .. } => "ambiguousPath",
            Error::InvalidArgument(_) => "invalidArgument",
            Error::Config(_) => "invalidConfig",
            Error::Serialization(_) | Error::Internal(_) => "internalServerError",
        }
    }

    /// Advisory HTTP status code.
    pub fn status(&self) -> u16 {
        match self {
            Error::InvalidPath(_) | Error::InvalidArgument(_) => 400,
            Error::Unauthorized(_) => 401,
            Error::NotFound(_) => 404,
            Error::AlreadyExists(_) | Error::Ambiguous { .. } => 409,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_and_status() {
        let e = Error::InvalidPath("/a/../b".to_string());
        assert_eq!(e.reason(), "malformedUrl");
        assert_eq!(e.status(), 400);
        assert!(e.is_client_error());

        let e = Error::Upstream("no id".to_string());
        assert_eq!(e.reason(), "invalidResponse");
        assert!(!e.is_client_error());

        let e = Error::AlreadyExists("x".to_string());
        assert_eq!(e.status(), 409);
    }

    #[test]
    fn test_ambiguous_display() {
        let e = Error::Ambiguous {
            path: "/docs".to_string(),
            candidates: 2,
        };
        assert_eq!(e.to_string(), "Ambiguous path: /docs matched 2 items");
    }
}
