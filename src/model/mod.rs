use crate::error::MapError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod source;

pub use source::{BoundaryLoader, BoundarySource};

pub type MapResult<T> = Result<T, MapError>;

// Unique identifiers
pub type FeatureId = String;
pub type RegionId = String;
pub type DealId = String;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    pub fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        GeoBounds {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }

    /// Fallback used when nothing finite was seen, keeps projection well-defined.
    pub fn unit() -> Self {
        GeoBounds::new(0.0, 0.0, 1.0, 1.0)
    }

    pub fn width(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        lng >= self.min_lng && lng <= self.max_lng && lat >= self.min_lat && lat <= self.max_lat
    }
}

// Geographic point (longitude, latitude)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        GeoPoint { lng, lat }
    }

    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }
}

// Viewport pixel coordinates, y grows downward
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        ScreenPoint { x, y }
    }

    pub fn distance_to(&self, other: ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        ViewportSize { width, height }
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        ViewportSize::new(800.0, 600.0)
    }
}

/// Declared GeoJSON geometry tag.
///
/// Informational only: the walkers decide what they are looking at from the
/// shape of `coordinates`, since upstream data is not always normalized.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    Unknown(String),
}

impl GeometryKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Point" => GeometryKind::Point,
            "MultiPoint" => GeometryKind::MultiPoint,
            "LineString" => GeometryKind::LineString,
            "MultiLineString" => GeometryKind::MultiLineString,
            "Polygon" => GeometryKind::Polygon,
            "MultiPolygon" => GeometryKind::MultiPolygon,
            other => GeometryKind::Unknown(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub kind: GeometryKind,
    pub coordinates: Value,
}

impl Geometry {
    pub fn new(kind: GeometryKind, coordinates: Value) -> Self {
        Geometry { kind, coordinates }
    }

    /// Reads `{type, coordinates}`. Returns `None` when there are no coordinates.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let coordinates = object.get("coordinates").filter(|c| !c.is_null())?;
        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .map(GeometryKind::from_tag)
            .unwrap_or_else(|| GeometryKind::Unknown(String::new()));
        Some(Geometry::new(kind, coordinates.clone()))
    }

    pub fn from_geojson(geometry: &geojson::Geometry) -> Option<Self> {
        serde_json::to_value(geometry)
            .ok()
            .as_ref()
            .and_then(Geometry::from_value)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Feature {
    pub id: Option<FeatureId>,
    pub properties: Map<String, Value>,
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn new(id: Option<FeatureId>, properties: Map<String, Value>, geometry: Option<Geometry>) -> Self {
        Feature {
            id,
            properties,
            geometry,
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = object.get("id").and_then(id_from_value);
        let properties = object
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let geometry = object.get("geometry").and_then(Geometry::from_value);
        Some(Feature::new(id, properties, geometry))
    }

    pub fn from_geojson(feature: &geojson::Feature) -> Self {
        let id = feature.id.as_ref().map(|id| match id {
            geojson::feature::Id::String(s) => s.clone(),
            geojson::feature::Id::Number(n) => n.to_string(),
        });
        let properties = feature.properties.clone().unwrap_or_default();
        let geometry = feature.geometry.as_ref().and_then(Geometry::from_geojson);
        Feature::new(id, properties, geometry)
    }

    fn property_id(&self) -> Option<String> {
        self.properties.get("id").and_then(id_from_value)
    }

    /// Join key for selection and styling: `properties.id`, else `feature.id`.
    pub fn key(&self) -> Option<String> {
        self.property_id().or_else(|| self.id.clone())
    }

    pub fn name(&self) -> Option<String> {
        self.properties
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.key())
    }

    /// Upstream sources disagree on where the id lives, so both are checked.
    pub fn matches_id(&self, id: &str) -> bool {
        self.property_id().as_deref() == Some(id) || self.id.as_deref() == Some(id)
    }
}

fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        FeatureCollection { features }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn find(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|feature| feature.matches_id(id))
    }

    pub fn from_json_str(content: &str) -> MapResult<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| MapError::Serialization(format!("Invalid GeoJSON: {}", e)))?;
        Self::from_value(&value)
    }

    /// Lenient load: malformed members are dropped, only a root of the wrong
    /// kind is an error.
    pub fn from_value(value: &Value) -> MapResult<Self> {
        match value {
            Value::Array(items) => Ok(Self::from_items(items)),
            Value::Object(object) => {
                if let Some(features) = object.get("features") {
                    let items = features.as_array().ok_or_else(|| {
                        MapError::Serialization("`features` is not an array".to_string())
                    })?;
                    return Ok(Self::from_items(items));
                }
                match object.get("type").and_then(Value::as_str) {
                    Some("Feature") => Ok(Self::from_items(std::slice::from_ref(value))),
                    _ if object.contains_key("coordinates") => {
                        let feature = Feature::new(None, Map::new(), Geometry::from_value(value));
                        Ok(FeatureCollection::new(vec![feature]))
                    }
                    _ => Err(MapError::Serialization(
                        "expected a FeatureCollection, Feature or Geometry".to_string(),
                    )),
                }
            }
            _ => Err(MapError::Serialization(
                "GeoJSON root must be an object or an array".to_string(),
            )),
        }
    }

    fn from_items(items: &[Value]) -> Self {
        let features: Vec<Feature> = items.iter().filter_map(Feature::from_value).collect();
        let skipped = items.len() - features.len();
        if skipped > 0 {
            tracing::warn!("Skipped {} malformed GeoJSON features", skipped);
        }
        tracing::info!("Loaded {} features from GeoJSON", features.len());
        FeatureCollection::new(features)
    }

    pub fn from_geojson(collection: &geojson::FeatureCollection) -> Self {
        FeatureCollection::new(collection.features.iter().map(Feature::from_geojson).collect())
    }
}

/// Render-ready region shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PathFeature {
    pub id: FeatureId,
    pub name: String,
    pub path_d: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Deal {
    pub id: DealId,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
    #[serde(default)]
    pub region_ids: Vec<RegionId>,
}

impl Deal {
    pub fn new(id: impl Into<DealId>) -> Self {
        Deal {
            id: id.into(),
            coordinates: None,
            region_ids: Vec::new(),
        }
    }

    pub fn with_coordinates(mut self, lng: f64, lat: f64) -> Self {
        self.coordinates = Some(GeoPoint::new(lng, lat));
        self
    }

    pub fn with_region(mut self, region_id: impl Into<RegionId>) -> Self {
        self.region_ids.push(region_id.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
}

/// Marker position in whichever space the active renderer uses.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DealPosition {
    Geo(GeoPoint),
    Screen(ScreenPoint),
}
