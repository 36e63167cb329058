// Core search exports
pub mod collection;
pub mod distance;
pub mod index;
pub mod search;

pub use collection::{CollectionError, InMemoryCollection, ReferenceCollection, Snapshot};
pub use distance::{calculate_bounding_box, haversine, haversine_distance, EARTH_RADIUS_KM};
pub use index::GridIndex;
pub use search::{rank_nearby, round_km, search_nearby, validate_query, SearchError};
