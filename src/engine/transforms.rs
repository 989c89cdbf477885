use crate::engine::geometry::for_each_position;
use crate::model::{FeatureCollection, GeoBounds, GeoPoint, ScreenPoint, ViewportSize};

// Pure transformation functions: bounds and the bounds-to-viewport projection

/// Geographic bounding box of every position in the collection.
///
/// Features without geometry are skipped. When no finite value is seen the
/// unit square is returned instead of infinite bounds.
pub const get_bounds: fn(&FeatureCollection) -> GeoBounds = |collection| {
    let mut min_lng = f64::INFINITY;
    let mut min_lat = f64::INFINITY;
    let mut max_lng = f64::NEG_INFINITY;
    let mut max_lat = f64::NEG_INFINITY;

    for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
        for_each_position(&geometry.coordinates, &mut |lng, lat| {
            if lng.is_finite() {
                min_lng = min_lng.min(lng);
                max_lng = max_lng.max(lng);
            }
            if lat.is_finite() {
                min_lat = min_lat.min(lat);
                max_lat = max_lat.max(lat);
            }
        });
    }

    let all_finite = [min_lng, min_lat, max_lng, max_lat]
        .iter()
        .all(|v| v.is_finite());
    if !all_finite {
        return GeoBounds::unit();
    }
    GeoBounds::new(min_lng, min_lat, max_lng, max_lat)
};

// A zero range would divide by zero, so it is treated as 1
const safe_range: fn(f64) -> f64 = |range| if range == 0.0 { 1.0 } else { range };

/// Linear fit of `bounds` onto a `width` x `height` viewport, north up.
///
/// Plain value type: equal inputs give equal projectors, so callers can
/// memoize on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projector {
    bounds: GeoBounds,
    viewport: ViewportSize,
}

impl Projector {
    pub fn new(bounds: GeoBounds, viewport: ViewportSize) -> Self {
        Projector { bounds, viewport }
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn project(&self, lng: f64, lat: f64) -> ScreenPoint {
        let range_lng = safe_range(self.bounds.width());
        let range_lat = safe_range(self.bounds.height());

        let x = ((lng - self.bounds.min_lng) / range_lng) * self.viewport.width;
        // Flip Y axis
        let y = (1.0 - (lat - self.bounds.min_lat) / range_lat) * self.viewport.height;
        ScreenPoint::new(x, y)
    }

    pub fn unproject(&self, point: ScreenPoint) -> GeoPoint {
        let range_lng = safe_range(self.bounds.width());
        let range_lat = safe_range(self.bounds.height());

        let x_ratio = point.x / self.viewport.width;
        let y_ratio = 1.0 - (point.y / self.viewport.height);

        GeoPoint::new(
            self.bounds.min_lng + x_ratio * range_lng,
            self.bounds.min_lat + y_ratio * range_lat,
        )
    }
}

pub const create_projector: fn(GeoBounds, f64, f64) -> Projector =
    |bounds, width, height| Projector::new(bounds, ViewportSize::new(width, height));
