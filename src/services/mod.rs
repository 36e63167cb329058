// Service exports
pub mod cache;
pub mod inference;
pub mod postgres;

pub use cache::CachedCollection;
pub use inference::{InferenceClient, InferenceError};
pub use postgres::{PostgresCollection, PostgresError};
