pub mod auth_service;
pub mod feed_service;

pub use auth_service::AuthService;
pub use feed_service::FeedService;
