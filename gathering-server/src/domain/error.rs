use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User not found")]
    UserNotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn to_status_code(&self) -> u16 {
        match self {
            Self::UserNotFound | Self::PostNotFound | Self::CommentNotFound => 404,
            // Занятый email — это 400, не 409
            Self::EmailAlreadyExists | Self::ValidationError(_) => 400,
            Self::InvalidCredentials => 401,
            Self::StorageError(_) | Self::InternalError(_) => 500,
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}
