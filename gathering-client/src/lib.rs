//! Typed HTTP client for the Gathering social API.
//!
//! The API issues no tokens. After [`GatheringClient::signup`] or
//! [`GatheringClient::login`] the client remembers the returned user and
//! submits its id, name and avatar as the author of posts, likes and
//! comments — the same contract the web frontend follows with its stored
//! current user.

pub mod error;
pub mod http_client;
pub mod models;

pub use error::GatheringClientError;
pub use http_client::GatheringClient;
