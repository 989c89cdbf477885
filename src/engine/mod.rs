use crate::model::{Feature, FeatureCollection, FeatureId, GeoBounds, PathFeature, ViewportSize};

pub mod geometry;
pub mod picking;
pub mod positions;
pub mod renderer;
pub mod transforms;

pub use geometry::{for_each_position, geometry_to_path_d, get_feature_centroid};
pub use picking::{RegionPicker, ScenePicker};
pub use positions::{PositionMode, resolve_positions};
pub use transforms::{Projector, create_projector, get_bounds};

/// Static, render-ready scene for one (collection, viewport) pair.
///
/// Rebuilt from scratch whenever either input changes; there is no
/// incremental state.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub bounds: GeoBounds,
    pub projector: Projector,
    pub paths: Vec<PathFeature>,
}

impl Scene {
    pub fn viewport(&self) -> ViewportSize {
        self.projector.viewport()
    }

    pub fn path(&self, id: &str) -> Option<&PathFeature> {
        self.paths.iter().find(|path| path.id == id)
    }
}

// Stable id used for paths and picking; positional when the data has none
pub fn feature_id(feature: &Feature, index: usize) -> FeatureId {
    feature.key().unwrap_or_else(|| format!("feature-{}", index))
}

// Main scene pipeline: bounds -> projector -> paths
pub fn build_scene(collection: &FeatureCollection, viewport: ViewportSize) -> Scene {
    let bounds = get_bounds(collection);
    let projector = Projector::new(bounds, viewport);
    let project = |lng: f64, lat: f64| projector.project(lng, lat);

    let paths: Vec<PathFeature> = collection
        .features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let geometry = feature.geometry.as_ref()?;
            let path_d = geometry_to_path_d(&geometry.coordinates, &project);
            if path_d.is_empty() {
                return None;
            }
            let id = feature_id(feature, index);
            let name = feature.name().unwrap_or_else(|| id.clone());
            Some(PathFeature { id, name, path_d })
        })
        .collect();

    tracing::info!(
        "Built scene with {} paths from {} features, bounds {:?}",
        paths.len(),
        collection.len(),
        bounds
    );

    Scene {
        bounds,
        projector,
        paths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Geometry, GeometryKind};
    use serde_json::{Map, json};

    #[test]
    fn test_build_scene_keeps_order_and_skips_unusable_features() {
        let mut named = Map::new();
        named.insert("id".to_string(), json!("lga-2"));
        named.insert("name".to_string(), json!("Hills"));

        let collection = FeatureCollection::new(vec![
            Feature::new(
                Some("lga-1".to_string()),
                Map::new(),
                Some(Geometry::new(GeometryKind::Polygon, json!([[[0, 0], [1, 0], [1, 1]]]))),
            ),
            Feature::new(None, Map::new(), None),
            Feature::new(
                None,
                named,
                Some(Geometry::new(GeometryKind::Polygon, json!([[[1, 1], [2, 1], [2, 2]]]))),
            ),
            Feature::new(
                None,
                Map::new(),
                Some(Geometry::new(GeometryKind::Point, json!([0.5, 0.5]))),
            ),
            Feature::new(
                None,
                Map::new(),
                Some(Geometry::new(GeometryKind::LineString, json!([[0, 2], [2, 0]]))),
            ),
        ]);

        let scene = build_scene(&collection, ViewportSize::new(200.0, 200.0));
        assert_eq!(scene.bounds, GeoBounds::new(0.0, 0.0, 2.0, 2.0));

        let ids: Vec<&str> = scene.paths.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["lga-1", "lga-2", "feature-4"]);
        assert_eq!(scene.path("lga-1").unwrap().name, "lga-1");
        assert_eq!(scene.path("lga-2").unwrap().name, "Hills");
        assert_eq!(scene.path("lga-1").unwrap().path_d, "M0,200 L100,200 L100,100 Z");
        assert_eq!(scene.viewport(), ViewportSize::new(200.0, 200.0));
    }

    #[test]
    fn test_empty_collection_builds_empty_scene() {
        let scene = build_scene(&FeatureCollection::default(), ViewportSize::default());
        assert!(scene.paths.is_empty());
        assert_eq!(scene.bounds, GeoBounds::unit());
    }
}
