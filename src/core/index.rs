use crate::core::distance::calculate_bounding_box;
use crate::models::{GeoPoint, ReferenceRecord};
use std::collections::HashMap;

/// Uniform lat/lon grid over record positions
///
/// Cells hold record positions in insertion order. Longitude 180 shares the
/// last column rather than wrapping onto -180. A lookup collects every cell
/// overlapping the search circle's bounding box and returns the positions
/// sorted, so callers see candidates in the same order as the record list.
#[derive(Debug, Clone)]
pub struct GridIndex {
    rows: i64,
    cols: i64,
    cell_height: f64,
    cell_width: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
    len: usize,
}

impl GridIndex {
    /// Build an index with cells of roughly `cell_degrees` on each side
    ///
    /// The size is adjusted so whole cells tile the globe; values outside
    /// (0, 180] fall back to one-degree cells.
    pub fn build(records: &[ReferenceRecord], cell_degrees: f64) -> Self {
        let cell_degrees = if cell_degrees.is_finite() && cell_degrees > 0.0 && cell_degrees <= 180.0 {
            cell_degrees
        } else {
            1.0
        };

        let rows = (180.0 / cell_degrees).ceil() as i64;
        let cols = (360.0 / cell_degrees).ceil() as i64;

        let mut index = Self {
            rows,
            cols,
            cell_height: 180.0 / rows as f64,
            cell_width: 360.0 / cols as f64,
            cells: HashMap::new(),
            len: records.len(),
        };

        for (position, record) in records.iter().enumerate() {
            let key = (index.row(record.point.lat), index.col(record.point.lon));
            index.cells.entry(key).or_default().push(position);
        }

        tracing::debug!(
            "Built grid index: {} records in {} of {}x{} cells",
            index.len,
            index.cells.len(),
            rows,
            cols
        );

        index
    }

    /// Positions of every record that may lie within `radius_km` of `center`, ascending
    pub fn candidates(&self, center: GeoPoint, radius_km: f64) -> Vec<usize> {
        let bbox = calculate_bounding_box(center, radius_km);

        let row_lo = self.row(bbox.min_lat);
        let row_hi = self.row(bbox.max_lat);

        // Boxes crossing the antimeridian are split into two longitude spans
        let spans = if bbox.max_lon - bbox.min_lon >= 360.0 {
            vec![(-180.0, 180.0)]
        } else if bbox.min_lon <= -180.0 {
            vec![(bbox.min_lon + 360.0, 180.0), (-180.0, bbox.max_lon)]
        } else if bbox.max_lon >= 180.0 {
            vec![(bbox.min_lon, 180.0), (-180.0, bbox.max_lon - 360.0)]
        } else {
            vec![(bbox.min_lon, bbox.max_lon)]
        };

        let mut positions: Vec<usize> = Vec::new();
        for (min_lon, max_lon) in spans {
            for row in row_lo..=row_hi {
                for col in self.col(min_lon)..=self.col(max_lon) {
                    if let Some(cell) = self.cells.get(&(row, col)) {
                        positions.extend_from_slice(cell);
                    }
                }
            }
        }

        positions.sort_unstable();
        positions.dedup();
        positions
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn row(&self, lat: f64) -> i64 {
        (((lat + 90.0) / self.cell_height).floor() as i64).clamp(0, self.rows - 1)
    }

    fn col(&self, lon: f64) -> i64 {
        (((lon + 180.0) / self.cell_width).floor() as i64).clamp(0, self.cols - 1)
    }
}
