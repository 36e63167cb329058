//! GeoCLIP Nearby - image geolocation service with nearby reference search
//!
//! The core answers one question: which geotagged reference images lie within
//! a radius of a point, nearest first. Distances are great-circle (Haversine)
//! kilometers on a spherical Earth. Reference images come from any backend
//! implementing [`ReferenceCollection`]: a static in-memory list, a PostgreSQL
//! table, or the in-memory list behind a grid index.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    haversine, search_nearby, rank_nearby, CollectionError, InMemoryCollection, ReferenceCollection,
    SearchError,
};
pub use models::{GeoPoint, MatchResult, Prediction, ReferenceRecord};
