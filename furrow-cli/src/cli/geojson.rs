//! GeoJSON feature collections in and out.
//!
//! Input is the feature collection a WFS-style service would return. Each
//! geometry is decoded on its own, so an unsupported geometry type only
//! skips that feature.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use furrow::{Line, Point, Shape};

use super::common::CliError;

type Position = Vec<f64>;

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<Value>,
    geometry: Option<Value>,
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

/// A feature with a geometry furrow understands.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Feature id as text; the index when the feature has none.
    pub id: String,
    pub index: usize,
    pub shape: Shape,
}

fn point(position: &Position) -> Result<Point, CliError> {
    match position.as_slice() {
        [x, y, ..] => Ok(Point::new(*x, *y)),
        _ => Err(CliError::Feature(format!("position {position:?} needs two coordinates"))),
    }
}

fn points(positions: &[Position]) -> Result<Vec<Point>, CliError> {
    positions.iter().map(point).collect()
}

fn rings(rings: &[Vec<Position>]) -> Result<Vec<Vec<Point>>, CliError> {
    rings.iter().map(|ring| points(ring)).collect()
}

impl Geometry {
    fn into_shape(self) -> Result<Shape, CliError> {
        Ok(match self {
            Geometry::Point(p) => Shape::Point(point(&p)?),
            Geometry::LineString(line) => Shape::Line(points(&line)?),
            Geometry::Polygon(polygon) => Shape::Polygon(rings(&polygon)?),
            Geometry::MultiPolygon(polygons) => Shape::MultiPolygon(
                polygons.iter().map(|polygon| rings(polygon)).collect::<Result<_, _>>()?,
            ),
        })
    }
}

fn id_text(id: Option<&Value>, index: usize) -> String {
    match id {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => index.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Parse a feature collection, keeping the features with usable geometry.
pub fn parse_features(text: &str) -> Result<Vec<Feature>, CliError> {
    let collection: FeatureCollection = serde_json::from_str(text)?;
    let mut features = Vec::with_capacity(collection.features.len());

    for (index, raw) in collection.features.into_iter().enumerate() {
        let id = id_text(raw.id.as_ref(), index);
        let Some(geometry) = raw.geometry else {
            log::warn!("feature {id} has no geometry, skipped");
            continue;
        };

        match serde_json::from_value::<Geometry>(geometry) {
            Ok(geometry) => features.push(Feature { id, index, shape: geometry.into_shape()? }),
            Err(e) => log::warn!("feature {id} skipped: {e}"),
        }
    }

    Ok(features)
}

/// Pick a feature by id or index. Without a selector, the first feature
/// whose geometry passes `wanted`.
pub fn select_feature<'a>(
    features: &'a [Feature],
    selector: Option<&str>,
    wanted: impl Fn(&Shape) -> bool,
) -> Result<&'a Feature, CliError> {
    let found = match selector {
        Some(sel) => features
            .iter()
            .find(|f| f.id == sel)
            .or_else(|| sel.parse::<usize>().ok().and_then(|i| features.iter().find(|f| f.index == i))),
        None => features.iter().find(|f| wanted(&f.shape)),
    };

    found.ok_or_else(|| match selector {
        Some(sel) => CliError::Feature(format!("no feature '{sel}' in input")),
        None => CliError::Feature("no suitable feature in input".to_string()),
    })
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Output features, serialized as a GeoJSON feature collection.
#[derive(Serialize)]
pub struct OutputCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Value>,
}

impl OutputCollection {
    pub fn new() -> Self {
        Self { kind: "FeatureCollection", features: Vec::new() }
    }

    fn push(&mut self, geometry: Value, properties: Map<String, Value>) {
        self.features.push(json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": properties,
        }));
    }

    pub fn push_point(&mut self, p: Point, properties: Map<String, Value>) {
        self.push(json!({ "type": "Point", "coordinates": [p.x, p.y] }), properties);
    }

    pub fn push_line(&mut self, line: &Line, properties: Map<String, Value>) {
        let coordinates: Vec<[f64; 2]> = line.points.iter().map(|p| [p.x, p.y]).collect();
        self.push(json!({ "type": "LineString", "coordinates": coordinates }), properties);
    }

    pub fn push_ring(&mut self, ring: &[Point], properties: Map<String, Value>) {
        let coordinates: Vec<[f64; 2]> = ring.iter().map(|p| [p.x, p.y]).collect();
        self.push(json!({ "type": "Polygon", "coordinates": [coordinates] }), properties);
    }

    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build a properties object from key/value pairs.
pub fn props<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "a", "geometry": {"type": "Point", "coordinates": [1, 2, 3]}},
            {"type": "Feature", "id": 7, "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}},
            {"type": "Feature", "geometry": {"type": "GeometryCollection", "geometries": []}},
            {"type": "Feature", "geometry": null},
            {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1]]]}}
        ]
    }"#;

    #[test]
    fn parses_supported_geometries() {
        let features = parse_features(SAMPLE).unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].shape, Shape::Point(Point::new(1.0, 2.0)));
        assert_eq!(features[1].id, "7");
        assert_eq!(features[2].id, "4");
        assert_eq!(features[2].shape.kind(), "Polygon");
    }

    #[test]
    fn selects_by_id_index_or_kind() {
        let features = parse_features(SAMPLE).unwrap();
        let any = |_: &Shape| true;
        assert_eq!(select_feature(&features, Some("a"), any).unwrap().index, 0);
        assert_eq!(select_feature(&features, Some("4"), any).unwrap().index, 4);
        assert!(select_feature(&features, Some("nope"), any).is_err());

        let line = select_feature(&features, None, |s| matches!(s, Shape::Line(_))).unwrap();
        assert_eq!(line.id, "7");
    }

    #[test]
    fn short_positions_are_rejected() {
        let text = r#"{"features": [{"geometry": {"type": "Point", "coordinates": [1]}}]}"#;
        assert!(matches!(parse_features(text), Err(CliError::Feature(_))));
    }

    #[test]
    fn output_is_a_feature_collection() {
        let mut out = OutputCollection::new();
        out.push_point(Point::new(1.0, 2.0), props([("index", json!(0))]));
        let value: Value = serde_json::from_str(&out.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["geometry"]["coordinates"], json!([1.0, 2.0]));
        assert_eq!(value["features"][0]["properties"]["index"], 0);
    }
}
