use crate::engine::feature_id;
use crate::engine::geometry::{for_each_ring, ring_positions};
use crate::engine::transforms::Projector;
use crate::model::{FeatureCollection, FeatureId, ScreenPoint};

/// Resolves a region id from a point in scene (unzoomed, unpanned) space.
///
/// The canvas controller only consumes the answer; how it is found is up to
/// the backend. Closures implement it, which is how a host map library's
/// feature query plugs in.
pub trait RegionPicker {
    fn region_at(&self, point: ScreenPoint) -> Option<FeatureId>;
}

impl<F> RegionPicker for F
where
    F: Fn(ScreenPoint) -> Option<FeatureId>,
{
    fn region_at(&self, point: ScreenPoint) -> Option<FeatureId> {
        self(point)
    }
}

// Even-odd crossing test
fn ring_crossings(point: ScreenPoint, ring: &[ScreenPoint]) -> bool {
    let mut inside = false;
    if ring.len() < 3 {
        return inside;
    }
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (pi, pj) = (ring[i], ring[j]);
        let intersect = ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y + f64::EPSILON) + pi.x);
        if intersect {
            inside = !inside;
        }
        j = i;
    }
    inside
}

struct PickShape {
    id: FeatureId,
    rings: Vec<Vec<ScreenPoint>>,
}

impl PickShape {
    // Toggling across every ring makes holes and disjoint parts work
    fn contains(&self, point: ScreenPoint) -> bool {
        self.rings
            .iter()
            .fold(false, |inside, ring| inside ^ ring_crossings(point, ring))
    }
}

/// Self-built hit-test backend over the projected scene.
///
/// Shapes are tested in collection order; the first hit wins.
pub struct ScenePicker {
    shapes: Vec<PickShape>,
}

impl ScenePicker {
    pub fn new(collection: &FeatureCollection, projector: &Projector) -> Self {
        let shapes = collection
            .features
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                let geometry = feature.geometry.as_ref()?;
                let mut rings = Vec::new();
                for_each_ring(&geometry.coordinates, &mut |ring| {
                    let projected: Vec<ScreenPoint> = ring_positions(ring)
                        .map(|(lng, lat)| projector.project(lng, lat))
                        .collect();
                    if projected.len() >= 3 {
                        rings.push(projected);
                    }
                });
                (!rings.is_empty()).then(|| PickShape {
                    id: feature_id(feature, index),
                    rings,
                })
            })
            .collect();
        ScenePicker { shapes }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl RegionPicker for ScenePicker {
    fn region_at(&self, point: ScreenPoint) -> Option<FeatureId> {
        self.shapes
            .iter()
            .find(|shape| shape.contains(point))
            .map(|shape| shape.id.clone())
    }
}
