//! Canonical feature model.
//!
//! Serializes to GeoJSON (RFC 7946) with `[lon, lat]` positions. Only the
//! geometry kinds that drawing and shapefile import can produce are
//! modelled; `GeometryCollection` is not.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::coord::{Bounds, LatLon};

/// A GeoJSON position, `[longitude, latitude]`.
pub type Position = [f64; 2];

/// Free-form feature properties.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Property carrying the popup label of a drawn shape.
pub const POPUP_PROPERTY: &str = "popup";

/// Vertex count used to approximate a drawn circle.
pub const CIRCLE_SEGMENTS: usize = 64;

/// Mean earth radius in meters used for circle approximation.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Feature geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    /// All positions of the geometry in document order.
    pub fn positions(&self) -> Vec<LatLon> {
        let flat: Vec<Position> = match self {
            Geometry::Point(p) => vec![*p],
            Geometry::MultiPoint(points) | Geometry::LineString(points) => points.clone(),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().copied().collect()
            }
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().copied().collect()
            }
        };
        flat.into_iter().map(LatLon::from_position).collect()
    }

    /// Axis-aligned bounding box, `None` when the geometry has no positions.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.positions())
    }

    /// GeoJSON type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

/// A single geometry with properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default)]
    pub properties: Properties,
    pub geometry: Geometry,
}

impl Feature {
    /// Feature with empty properties.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            properties: Properties::new(),
            geometry,
        }
    }

    /// Sets a property, replacing any previous value under `key`.
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Attaches a popup label.
    pub fn with_popup(self, label: impl Into<String>) -> Self {
        let label: String = label.into();
        self.with_property(POPUP_PROPERTY, label)
    }

    /// Popup label, if one is attached.
    pub fn popup(&self) -> Option<&str> {
        self.properties.get(POPUP_PROPERTY).and_then(|v| v.as_str())
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.geometry.bounds()
    }
}

/// Ordered collection of features, the exported document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A shape completed by the draw tool.
///
/// The draw tool guarantees closed, non-degenerate shapes; no validation
/// happens here.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawnShape {
    Marker(LatLon),
    Polyline(Vec<LatLon>),
    /// Polygon outline; the ring is closed if the tool left it open.
    Polygon(Vec<LatLon>),
    Rectangle {
        south_west: LatLon,
        north_east: LatLon,
    },
    Circle {
        center: LatLon,
        radius_m: f64,
    },
}

impl DrawnShape {
    /// Normalizes the shape into a canonical geometry.
    ///
    /// Rectangles and circles become polygons.
    pub fn to_geometry(&self) -> Geometry {
        match self {
            DrawnShape::Marker(point) => Geometry::Point(point.to_position()),
            DrawnShape::Polyline(points) => {
                Geometry::LineString(points.iter().map(|p| p.to_position()).collect())
            }
            DrawnShape::Polygon(points) => {
                Geometry::Polygon(vec![closed_ring(points.iter().map(|p| p.to_position()))])
            }
            DrawnShape::Rectangle {
                south_west,
                north_east,
            } => {
                let corners = [
                    *south_west,
                    LatLon::new(north_east.lat, south_west.lon),
                    *north_east,
                    LatLon::new(south_west.lat, north_east.lon),
                ];
                Geometry::Polygon(vec![closed_ring(corners.iter().map(|p| p.to_position()))])
            }
            DrawnShape::Circle { center, radius_m } => {
                let ring = (0..CIRCLE_SEGMENTS).map(|i| {
                    let bearing = 2.0 * PI * i as f64 / CIRCLE_SEGMENTS as f64;
                    destination(*center, bearing, *radius_m).to_position()
                });
                Geometry::Polygon(vec![closed_ring(ring)])
            }
        }
    }

    pub fn into_feature(self) -> Feature {
        Feature::new(self.to_geometry())
    }
}

/// Collects a ring, repeating the first position at the end if needed.
fn closed_ring(positions: impl Iterator<Item = Position>) -> Vec<Position> {
    let mut ring: Vec<Position> = positions.collect();
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

/// Point reached travelling `distance_m` from `origin` along `bearing`
/// (radians clockwise from north) on a spherical earth.
fn destination(origin: LatLon, bearing: f64, distance_m: f64) -> LatLon {
    let angular = distance_m / EARTH_RADIUS_M;
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    LatLon::new(lat2.to_degrees(), lon2.to_degrees())
}
