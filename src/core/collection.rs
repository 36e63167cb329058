use crate::core::index::GridIndex;
use crate::models::{GeoPoint, ReferenceRecord};
use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Shared, read-only view of a collection's records
pub type Snapshot = Arc<Vec<ReferenceRecord>>;

/// Errors raised while enumerating or loading reference records
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed reference data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Duplicate record id: {0}")]
    DuplicateId(String),
}

/// Read capability every reference backend provides
///
/// Search only needs to enumerate records. Backends that can narrow the scan
/// cheaply override [`candidates`](ReferenceCollection::candidates); the result
/// must still contain every record within the radius, in the backend's
/// enumeration order.
pub trait ReferenceCollection: Send + Sync {
    /// Enumerate every record
    fn records(&self) -> impl Future<Output = Result<Snapshot, CollectionError>> + Send;

    /// A superset of the records within `radius_km` of `center`
    fn candidates(
        &self,
        _center: GeoPoint,
        _radius_km: f64,
    ) -> impl Future<Output = Result<Snapshot, CollectionError>> + Send {
        self.records()
    }
}

/// Static, in-process list of reference records
///
/// Loaded once and never mutated. An optional grid index narrows the scan for
/// larger lists without changing which records a search returns.
#[derive(Debug, Clone)]
pub struct InMemoryCollection {
    records: Snapshot,
    grid: Option<Arc<GridIndex>>,
}

impl InMemoryCollection {
    /// Build a collection, rejecting invalid coordinates and duplicate ids
    pub fn new(records: Vec<ReferenceRecord>) -> Result<Self, CollectionError> {
        let mut seen = HashSet::with_capacity(records.len());

        for record in &records {
            record
                .point
                .check()
                .map_err(|reason| CollectionError::InvalidRecord {
                    id: record.id.clone(),
                    reason,
                })?;

            if !seen.insert(record.id.as_str()) {
                return Err(CollectionError::DuplicateId(record.id.clone()));
            }
        }

        Ok(Self {
            records: Arc::new(records),
            grid: None,
        })
    }

    /// Load a JSON array of `{id, name, lat, lon, url}` objects
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CollectionError> {
        let bytes = std::fs::read(path.as_ref())?;
        let records: Vec<ReferenceRecord> = serde_json::from_slice(&bytes)?;

        tracing::info!(
            "Loaded {} reference records from {}",
            records.len(),
            path.as_ref().display()
        );

        Self::new(records)
    }

    /// Index the records on a grid of `cell_degrees` sized cells
    pub fn with_grid(mut self, cell_degrees: f64) -> Self {
        self.grid = Some(Arc::new(GridIndex::build(&self.records, cell_degrees)));
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_indexed(&self) -> bool {
        self.grid.is_some()
    }
}

impl ReferenceCollection for InMemoryCollection {
    async fn records(&self) -> Result<Snapshot, CollectionError> {
        Ok(Arc::clone(&self.records))
    }

    async fn candidates(&self, center: GeoPoint, radius_km: f64) -> Result<Snapshot, CollectionError> {
        let Some(grid) = &self.grid else {
            return Ok(Arc::clone(&self.records));
        };

        let subset = grid
            .candidates(center, radius_km)
            .into_iter()
            .map(|i| self.records[i].clone())
            .collect();

        Ok(Arc::new(subset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::search::search_nearby;

    fn landmarks() -> Vec<ReferenceRecord> {
        vec![
            ReferenceRecord::new("A", "Eiffel Tower", 48.8584, 2.2945, "a.jpg"),
            ReferenceRecord::new("B", "Statue of Liberty", 40.6892, -74.0445, "b.jpg"),
            ReferenceRecord::new("C", "Big Ben", 51.5007, -0.1246, "c.jpg"),
        ]
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut records = landmarks();
        records.push(ReferenceRecord::new("A", "Again", 0.0, 0.0, "x.jpg"));

        assert!(matches!(
            InMemoryCollection::new(records),
            Err(CollectionError::DuplicateId(id)) if id == "A"
        ));
    }

    #[test]
    fn test_rejects_out_of_range_record() {
        let records = vec![ReferenceRecord::new("bad", "Nowhere", 95.0, 0.0, "x.jpg")];

        assert!(matches!(
            InMemoryCollection::new(records),
            Err(CollectionError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = InMemoryCollection::from_json_file("does/not/exist.json");
        assert!(matches!(result, Err(CollectionError::Io(_))));
    }

    #[tokio::test]
    async fn test_records_enumerates_everything() {
        let collection = InMemoryCollection::new(landmarks()).unwrap();
        let records = collection.records().await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "A");
    }

    #[tokio::test]
    async fn test_grid_and_linear_agree() {
        let linear = InMemoryCollection::new(landmarks()).unwrap();
        let indexed = InMemoryCollection::new(landmarks()).unwrap().with_grid(1.0);
        let center = GeoPoint { lat: 48.8584, lon: 2.2945 };

        for radius in [0.0, 1.0, 400.0, 6000.0] {
            let a = search_nearby(center, radius, &linear).await.unwrap();
            let b = search_nearby(center, radius, &indexed).await.unwrap();
            assert_eq!(a, b, "radius {}", radius);
        }
    }
}
