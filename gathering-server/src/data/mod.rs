pub mod store;

pub use store::{Dataset, JsonFileStore, Store};
