//! Geometry codec.
//!
//! Decodes uploaded shapefile archives into features and encodes the AOI
//! document as pretty-printed GeoJSON.

mod archive;
mod error;

pub use archive::{ShapefileConverter, ShapefileLayer, ZipShapefileConverter};
pub use error::ImportError;

use tracing::debug;

use crate::aoi::{Feature, FeatureCollection};

/// Media type of encoded documents.
pub const GEOJSON_MEDIA_TYPE: &str = "application/json";

/// Decoder/encoder pair around a [`ShapefileConverter`].
pub struct GeometryCodec<C> {
    converter: C,
}

impl<C: ShapefileConverter> GeometryCodec<C> {
    pub fn new(converter: C) -> Self {
        Self { converter }
    }

    /// Decode an uploaded archive into a flat feature list.
    ///
    /// Layers are concatenated in archive order. An archive whose layers
    /// hold no shapes decodes to an empty list.
    pub async fn decode_archive(&self, bytes: Vec<u8>) -> Result<Vec<Feature>, ImportError> {
        let size = bytes.len();
        let layers = self.converter.convert(bytes).await?;
        if layers.is_empty() {
            return Err(ImportError::NoGeometryLayer);
        }

        let features: Vec<Feature> = layers.into_iter().flat_map(|l| l.features).collect();
        debug!(bytes = size, features = features.len(), "Archive decoded");
        Ok(features)
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }
}

/// Serialize a document as UTF-8 JSON with 2-space indentation.
pub fn encode_document(document: &FeatureCollection) -> Vec<u8> {
    // Every field is a string, number, array or map; serialization cannot fail
    serde_json::to_vec_pretty(document).expect("FeatureCollection serializes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aoi::Geometry;
    use super::archive::tests::{point_record, shp_file, zip_archive};

    struct EmptyConverter;

    impl ShapefileConverter for EmptyConverter {
        async fn convert(&self, _bytes: Vec<u8>) -> Result<Vec<ShapefileLayer>, ImportError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_decode_flattens_layers() {
        let a = shp_file(1, &[point_record(1.0, 2.0)]);
        let b = shp_file(1, &[point_record(3.0, 4.0), point_record(5.0, 6.0)]);
        let archive = zip_archive(&[("a.shp", &a), ("b.shp", &b)]);

        let codec = GeometryCodec::new(ZipShapefileConverter::new());
        let features = codec.decode_archive(archive).await.unwrap();

        let points: Vec<_> = features.iter().map(|f| f.geometry.clone()).collect();
        assert_eq!(
            points,
            vec![
                Geometry::Point([1.0, 2.0]),
                Geometry::Point([3.0, 4.0]),
                Geometry::Point([5.0, 6.0]),
            ]
        );
    }

    #[tokio::test]
    async fn test_decode_without_layers_fails() {
        let codec = GeometryCodec::new(EmptyConverter);
        assert!(matches!(
            codec.decode_archive(vec![1, 2, 3]).await,
            Err(ImportError::NoGeometryLayer)
        ));
    }

    #[test]
    fn test_encode_empty_document() {
        let bytes = encode_document(&FeatureCollection::default());
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "{\n  \"type\": \"FeatureCollection\",\n  \"features\": []\n}"
        );
    }

    #[test]
    fn test_encode_is_pretty_and_parseable() {
        let document = FeatureCollection {
            features: vec![Feature::new(Geometry::Point([7.47, 51.51])).with_popup("Dortmund")],
        };

        let bytes = encode_document(&document);
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains("\n  \"features\": [\n    {"));

        let parsed: FeatureCollection = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, document);
    }
}
