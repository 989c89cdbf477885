use std::collections::BTreeMap;

use crate::engine::geometry::get_feature_centroid;
use crate::engine::transforms::Projector;
use crate::model::{Deal, DealId, DealPosition, FeatureCollection, GeoPoint, ScreenPoint};

/// Coordinate space the resolved marker positions are expressed in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PositionMode {
    /// Self-rendered scene: everything is projected, fallback is the viewport centre.
    Projected(Projector),
    /// Host map library does the projection: positions stay in lng/lat.
    Geographic { default: GeoPoint },
}

impl PositionMode {
    fn project(&self, lng: f64, lat: f64) -> ScreenPoint {
        match self {
            PositionMode::Projected(projector) => projector.project(lng, lat),
            PositionMode::Geographic { .. } => ScreenPoint::new(lng, lat),
        }
    }

    fn wrap(&self, point: ScreenPoint) -> DealPosition {
        match self {
            PositionMode::Projected(_) => DealPosition::Screen(point),
            PositionMode::Geographic { .. } => DealPosition::Geo(GeoPoint::new(point.x, point.y)),
        }
    }

    pub fn default_position(&self) -> DealPosition {
        match self {
            PositionMode::Projected(projector) => {
                DealPosition::Screen(projector.viewport().center())
            }
            PositionMode::Geographic { default } => DealPosition::Geo(*default),
        }
    }
}

/// Marker position for one deal.
///
/// Explicit coordinates win, then the centroid of the deal's first region,
/// then the mode's fixed default. Never fails.
pub fn resolve_position(deal: &Deal, collection: &FeatureCollection, mode: &PositionMode) -> DealPosition {
    if let Some(coordinates) = deal.coordinates {
        return mode.wrap(mode.project(coordinates.lng, coordinates.lat));
    }

    let project = |lng: f64, lat: f64| mode.project(lng, lat);
    let centroid = deal
        .region_ids
        .first()
        .and_then(|region_id| collection.find(region_id))
        .and_then(|feature| get_feature_centroid(feature, &project));

    match centroid {
        Some(point) => mode.wrap(point),
        None => {
            tracing::debug!("Deal {} has no resolvable region, using default position", deal.id);
            mode.default_position()
        }
    }
}

pub fn resolve_positions(
    deals: &[Deal],
    collection: &FeatureCollection,
    mode: &PositionMode,
) -> BTreeMap<DealId, DealPosition> {
    deals
        .iter()
        .map(|deal| (deal.id.clone(), resolve_position(deal, collection, mode)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::transforms::create_projector;
    use crate::model::{Feature, GeoBounds, Geometry, GeometryKind};
    use serde_json::{Map, json};

    fn square_collection() -> FeatureCollection {
        let mut properties = Map::new();
        properties.insert("id".to_string(), json!("lga-1"));
        FeatureCollection::new(vec![Feature::new(
            Some("raw-1".to_string()),
            properties,
            Some(Geometry::new(
                GeometryKind::Polygon,
                json!([[[0, 0], [2, 0], [2, 2], [0, 2]]]),
            )),
        )])
    }

    fn projected() -> PositionMode {
        PositionMode::Projected(create_projector(GeoBounds::new(0.0, 0.0, 2.0, 2.0), 100.0, 100.0))
    }

    #[test]
    fn test_explicit_coordinates_are_projected() {
        let deal = Deal::new("d").with_coordinates(0.5, 0.5).with_region("lga-1");
        let position = resolve_position(&deal, &square_collection(), &projected());
        assert_eq!(position, DealPosition::Screen(ScreenPoint::new(25.0, 75.0)));
    }

    #[test]
    fn test_region_lookup_matches_either_id() {
        for region in ["lga-1", "raw-1"] {
            let deal = Deal::new("d").with_region(region);
            let position = resolve_position(&deal, &square_collection(), &projected());
            assert_eq!(position, DealPosition::Screen(ScreenPoint::new(50.0, 50.0)));
        }
    }

    #[test]
    fn test_only_first_region_is_consulted() {
        let deal = Deal::new("d").with_region("missing").with_region("lga-1");
        let position = resolve_position(&deal, &square_collection(), &projected());
        assert_eq!(position, DealPosition::Screen(ScreenPoint::new(50.0, 50.0)));
    }

    #[test]
    fn test_geographic_mode_keeps_lng_lat() {
        let mode = PositionMode::Geographic {
            default: GeoPoint::new(151.0, -33.0),
        };
        let collection = square_collection();

        let explicit = Deal::new("a").with_coordinates(150.1, -33.9);
        assert_eq!(
            resolve_position(&explicit, &collection, &mode),
            DealPosition::Geo(GeoPoint::new(150.1, -33.9))
        );

        let by_region = Deal::new("b").with_region("lga-1");
        assert_eq!(
            resolve_position(&by_region, &collection, &mode),
            DealPosition::Geo(GeoPoint::new(1.0, 1.0))
        );

        let orphan = Deal::new("c");
        assert_eq!(
            resolve_position(&orphan, &collection, &mode),
            DealPosition::Geo(GeoPoint::new(151.0, -33.0))
        );
    }

    #[test]
    fn test_every_deal_gets_a_position() {
        let deals = vec![
            Deal::new("a").with_region("nowhere"),
            Deal::new("b"),
            Deal::new("c").with_region("lga-1"),
        ];
        let positions = resolve_positions(&deals, &square_collection(), &projected());
        assert_eq!(positions.len(), 3);
        assert_eq!(positions["a"], DealPosition::Screen(ScreenPoint::new(50.0, 50.0)));
        assert_eq!(positions["b"], projected().default_position());
    }
}
