//! The AOI store: authoritative, insertion-ordered feature collection.

use std::fmt;

use tracing::debug;

use super::feature::{Feature, FeatureCollection};
use crate::coord::Bounds;

/// Store-issued identity of a feature.
///
/// Two features with identical geometry still get distinct ids; the store
/// never deduplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(u64);

impl FeatureId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aoi-{}", self.0)
    }
}

/// Result of appending an imported batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportBatch {
    /// Ids of the appended features, in import order.
    pub ids: Vec<FeatureId>,
    /// Union of the bounding boxes of the appended features.
    ///
    /// `None` when the batch was empty, in which case the view stays put.
    pub bounds: Option<Bounds>,
}

/// Insertion-ordered collection of user geometries.
#[derive(Debug, Default)]
pub struct AoiStore {
    entries: Vec<(FeatureId, Feature)>,
    next_id: u64,
}

impl AoiStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a feature completed by the draw tool.
    pub fn add_from_draw(&mut self, feature: Feature) -> FeatureId {
        let id = self.push(feature);
        debug!(feature = %id, total = self.entries.len(), "AOI drawn");
        id
    }

    /// Appends imported features in their given order.
    pub fn add_from_import(&mut self, features: Vec<Feature>) -> ImportBatch {
        let bounds = features
            .iter()
            .filter_map(Feature::bounds)
            .reduce(|acc, b| acc.union(&b));

        let ids: Vec<FeatureId> = features.into_iter().map(|f| self.push(f)).collect();

        debug!(
            imported = ids.len(),
            total = self.entries.len(),
            "AOIs imported"
        );

        ImportBatch { ids, bounds }
    }

    /// Ordered snapshot of every feature.
    ///
    /// The returned document is a copy; later store mutations do not
    /// affect it.
    pub fn to_document(&self) -> FeatureCollection {
        FeatureCollection {
            features: self.entries.iter().map(|(_, f)| f.clone()).collect(),
        }
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &Feature)> {
        self.entries.iter().map(|(id, f)| (*id, f))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, feature: Feature) -> FeatureId {
        let id = FeatureId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, feature));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aoi::{DrawnShape, Geometry};
    use crate::coord::LatLon;

    fn square(offset: f64) -> Feature {
        DrawnShape::Rectangle {
            south_west: LatLon::new(51.0 + offset, 7.0 + offset),
            north_east: LatLon::new(51.5 + offset, 7.5 + offset),
        }
        .into_feature()
    }

    #[test]
    fn test_empty_store_yields_empty_document() {
        let store = AoiStore::new();
        let doc = store.to_document();

        assert!(doc.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_draw_then_document_ends_with_drawn_feature() {
        let mut store = AoiStore::new();
        store.add_from_draw(square(0.0));
        let drawn = square(1.0).with_popup("second");
        store.add_from_draw(drawn.clone());

        let doc = store.to_document();
        assert_eq!(doc.features.last(), Some(&drawn));
    }

    #[test]
    fn test_document_is_idempotent_and_detached() {
        let mut store = AoiStore::new();
        store.add_from_draw(square(0.0));

        let first = store.to_document();
        let second = store.to_document();
        assert_eq!(first, second);

        store.add_from_draw(square(1.0));
        assert_eq!(first.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicates_are_kept_with_distinct_ids() {
        let mut store = AoiStore::new();
        let a = store.add_from_draw(square(0.0));
        let b = store.add_from_draw(square(0.0));

        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(a), store.get(b));
    }

    #[test]
    fn test_import_preserves_order_after_drawn_features() {
        let mut store = AoiStore::new();
        store.add_from_draw(square(0.0));

        let imported = vec![
            Feature::new(Geometry::Point([9.0, 50.0])),
            Feature::new(Geometry::Point([10.0, 49.0])),
        ];
        let batch = store.add_from_import(imported.clone());

        assert_eq!(batch.ids.len(), 2);
        let doc = store.to_document();
        assert_eq!(&doc.features[1..], &imported[..]);

        let ids: Vec<FeatureId> = store.iter().map(|(id, _)| id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_import_bounds_cover_only_new_features() {
        let mut store = AoiStore::new();
        store.add_from_draw(square(10.0));

        let batch = store.add_from_import(vec![
            Feature::new(Geometry::Point([7.0, 51.0])),
            Feature::new(Geometry::Point([8.0, 52.0])),
        ]);

        let bounds = batch.bounds.unwrap();
        assert_eq!(bounds.south, 51.0);
        assert_eq!(bounds.west, 7.0);
        assert_eq!(bounds.north, 52.0);
        assert_eq!(bounds.east, 8.0);
    }

    #[test]
    fn test_empty_import_has_no_bounds() {
        let mut store = AoiStore::new();
        let batch = store.add_from_import(Vec::new());

        assert!(batch.ids.is_empty());
        assert!(batch.bounds.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_feature_id_display() {
        let mut store = AoiStore::new();
        let id = store.add_from_draw(square(0.0));
        assert_eq!(id.to_string(), "aoi-0");
        assert_eq!(id.get(), 0);
    }
}
