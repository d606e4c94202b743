use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatheringClientError {
    // HTTP ошибки
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    // Бизнес-логика ошибки
    #[error("Resource not found")]
    NotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The operation needs a logged-in user and the client has none.
    #[error("Not logged in")]
    NotLoggedIn,

    // Транспортные ошибки
    #[error("Transport error: {0}")]
    TransportError(String),
}

impl GatheringClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatheringClientError::NotFound)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            GatheringClientError::Unauthorized(_) | GatheringClientError::NotLoggedIn
        )
    }
}
