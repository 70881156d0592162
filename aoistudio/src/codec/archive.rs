//! Zipped shapefile conversion.
//!
//! An upload is a zip archive holding one or more shapefile layers. Members
//! are grouped by file stem; each `.shp` becomes a layer and its `.dbf`
//! sibling, when present, supplies the feature properties. Projection files
//! are not interpreted: coordinates are taken as they are stored.

use std::collections::HashMap;
use std::future::Future;
use std::io::{Cursor, Read};

use shapefile::dbase::{self, FieldValue};
use shapefile::{PolygonRing, Shape};
use tracing::{debug, info, trace};

use super::error::ImportError;
use crate::aoi::{Feature, Geometry, Position, Properties};

/// Upper bound on the buffer reserved from a member's declared size.
/// Header sizes are untrusted; larger members grow the buffer as they read.
const MAX_MEMBER_PREALLOCATION: u64 = 1 << 20;

/// Features converted from one `.shp` member.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapefileLayer {
    /// Member path without the extension.
    pub name: String,
    pub features: Vec<Feature>,
}

/// Trait for turning an uploaded archive into geometry layers.
pub trait ShapefileConverter: Send + Sync {
    fn convert(
        &self,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<ShapefileLayer>, ImportError>> + Send;
}

/// Converter reading zip archives with the `zip` and `shapefile` crates.
///
/// Parsing is CPU-bound and runs on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipShapefileConverter;

impl ZipShapefileConverter {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous conversion.
    pub fn convert_blocking(bytes: &[u8]) -> Result<Vec<ShapefileLayer>, ImportError> {
        let members = read_members(bytes)?;

        let mut layers = Vec::new();
        for (name, shp) in &members.shapes {
            let dbf = members.tables.get(name);
            let features = convert_layer(name, shp, dbf.map(Vec::as_slice))?;
            debug!(
                layer = %name,
                features = features.len(),
                has_attributes = dbf.is_some(),
                "Shapefile layer converted"
            );
            layers.push(ShapefileLayer {
                name: name.clone(),
                features,
            });
        }

        if layers.is_empty() {
            return Err(ImportError::NoGeometryLayer);
        }

        info!(
            layers = layers.len(),
            features = layers.iter().map(|l| l.features.len()).sum::<usize>(),
            "Archive converted"
        );
        Ok(layers)
    }
}

impl ShapefileConverter for ZipShapefileConverter {
    async fn convert(&self, bytes: Vec<u8>) -> Result<Vec<ShapefileLayer>, ImportError> {
        tokio::task::spawn_blocking(move || Self::convert_blocking(&bytes))
            .await
            .map_err(|e| ImportError::Conversion {
                layer: String::new(),
                reason: format!("conversion task failed: {}", e),
            })?
    }
}

/// Archive members relevant to conversion.
struct Members {
    /// `.shp` payloads in archive order.
    shapes: Vec<(String, Vec<u8>)>,
    /// `.dbf` payloads by stem.
    tables: HashMap<String, Vec<u8>>,
}

fn read_members(bytes: &[u8]) -> Result<Members, ImportError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ImportError::InvalidArchive(e.to_string()))?;

    let mut members = Members {
        shapes: Vec::new(),
        tables: HashMap::new(),
    };

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| ImportError::InvalidArchive(e.to_string()))?;

        let path = entry.name().to_string();
        if entry.is_dir() || path.starts_with("__MACOSX/") {
            continue;
        }

        let Some((stem, extension)) = path.rsplit_once('.') else {
            continue;
        };
        let extension = extension.to_ascii_lowercase();
        if extension != "shp" && extension != "dbf" {
            trace!(member = %path, "Skipping archive member");
            continue;
        }

        let mut payload = Vec::with_capacity(entry.size().min(MAX_MEMBER_PREALLOCATION) as usize);
        entry.read_to_end(&mut payload)?;

        if extension == "shp" {
            members.shapes.push((stem.to_string(), payload));
        } else {
            members.tables.insert(stem.to_string(), payload);
        }
    }

    Ok(members)
}

fn convert_layer(
    name: &str,
    shp: &[u8],
    dbf: Option<&[u8]>,
) -> Result<Vec<Feature>, ImportError> {
    let conversion = |reason: String| ImportError::Conversion {
        layer: name.to_string(),
        reason,
    };

    let shape_reader =
        shapefile::ShapeReader::new(Cursor::new(shp)).map_err(|e| conversion(e.to_string()))?;

    let Some(dbf) = dbf else {
        let shapes = shape_reader.read().map_err(|e| conversion(e.to_string()))?;
        return Ok(shapes
            .into_iter()
            .filter_map(to_geometry)
            .map(Feature::new)
            .collect());
    };

    let table = dbase::Reader::new(Cursor::new(dbf)).map_err(|e| conversion(e.to_string()))?;
    let mut reader = shapefile::Reader::new(shape_reader, table);

    let mut features = Vec::new();
    for entry in reader.iter_shapes_and_records() {
        let (shape, record) = entry.map_err(|e| conversion(e.to_string()))?;
        if let Some(geometry) = to_geometry(shape) {
            features.push(Feature {
                properties: to_properties(record),
                geometry,
            });
        }
    }
    Ok(features)
}

/// Map a shape to a geometry, dropping Z and M. Null and multipatch shapes
/// have no counterpart and yield `None`.
fn to_geometry(shape: Shape) -> Option<Geometry> {
    match shape {
        Shape::NullShape | Shape::Multipatch(_) => None,
        Shape::Point(p) => Some(Geometry::Point([p.x, p.y])),
        Shape::PointM(p) => Some(Geometry::Point([p.x, p.y])),
        Shape::PointZ(p) => Some(Geometry::Point([p.x, p.y])),
        Shape::Multipoint(m) => points_geometry(m.points().iter().map(|p| [p.x, p.y]).collect()),
        Shape::MultipointM(m) => points_geometry(m.points().iter().map(|p| [p.x, p.y]).collect()),
        Shape::MultipointZ(m) => points_geometry(m.points().iter().map(|p| [p.x, p.y]).collect()),
        Shape::Polyline(l) => lines_geometry(
            l.parts()
                .iter()
                .map(|part| part.iter().map(|p| [p.x, p.y]).collect())
                .collect(),
        ),
        Shape::PolylineM(l) => lines_geometry(
            l.parts()
                .iter()
                .map(|part| part.iter().map(|p| [p.x, p.y]).collect())
                .collect(),
        ),
        Shape::PolylineZ(l) => lines_geometry(
            l.parts()
                .iter()
                .map(|part| part.iter().map(|p| [p.x, p.y]).collect())
                .collect(),
        ),
        Shape::Polygon(p) => polygon_geometry(
            p.rings()
                .iter()
                .map(|ring| ring_positions(ring, |pt| [pt.x, pt.y]))
                .collect(),
        ),
        Shape::PolygonM(p) => polygon_geometry(
            p.rings()
                .iter()
                .map(|ring| ring_positions(ring, |pt| [pt.x, pt.y]))
                .collect(),
        ),
        Shape::PolygonZ(p) => polygon_geometry(
            p.rings()
                .iter()
                .map(|ring| ring_positions(ring, |pt| [pt.x, pt.y]))
                .collect(),
        ),
    }
}

/// Ring positions tagged with whether the ring is an outer boundary.
fn ring_positions<P>(ring: &PolygonRing<P>, xy: impl Fn(&P) -> Position) -> (bool, Vec<Position>) {
    match ring {
        PolygonRing::Outer(points) => (true, points.iter().map(&xy).collect()),
        PolygonRing::Inner(points) => (false, points.iter().map(&xy).collect()),
    }
}

fn points_geometry(mut points: Vec<Position>) -> Option<Geometry> {
    match points.len() {
        0 => None,
        1 => points.pop().map(Geometry::Point),
        _ => Some(Geometry::MultiPoint(points)),
    }
}

fn lines_geometry(mut parts: Vec<Vec<Position>>) -> Option<Geometry> {
    parts.retain(|part| !part.is_empty());
    match parts.len() {
        0 => None,
        1 => parts.pop().map(Geometry::LineString),
        _ => Some(Geometry::MultiLineString(parts)),
    }
}

/// Group rings into polygons. Each inner ring belongs to the outer ring
/// that precedes it; a leading inner ring is promoted to an outer ring.
fn polygon_geometry(rings: Vec<(bool, Vec<Position>)>) -> Option<Geometry> {
    let mut polygons: Vec<Vec<Vec<Position>>> = Vec::new();
    for (outer, ring) in rings {
        if ring.is_empty() {
            continue;
        }
        match polygons.last_mut() {
            Some(polygon) if !outer => polygon.push(ring),
            _ => polygons.push(vec![ring]),
        }
    }

    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(polygons)),
    }
}

fn to_properties(record: dbase::Record) -> Properties {
    let fields: HashMap<String, FieldValue> = record.into();
    fields
        .into_iter()
        .map(|(name, value)| (name, field_to_json(value)))
        .collect()
}

fn field_to_json(value: FieldValue) -> serde_json::Value {
    use serde_json::Value;

    match value {
        FieldValue::Character(Some(s)) => Value::String(s.trim_end().to_string()),
        FieldValue::Memo(s) => Value::String(s),
        FieldValue::Numeric(Some(n)) => number(n),
        FieldValue::Float(Some(n)) => number(f64::from(n)),
        FieldValue::Double(n) | FieldValue::Currency(n) => number(n),
        FieldValue::Integer(n) => Value::from(n),
        FieldValue::Logical(Some(b)) => Value::Bool(b),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => Value::Null,
        other => Value::String(format!("{:?}", other)),
    }
}

fn number(n: f64) -> serde_json::Value {
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
