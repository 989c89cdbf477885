use serde_json::Value;

use crate::model::{Feature, ScreenPoint};

// Pure geometry functions over raw GeoJSON `coordinates`.
//
// Nesting depth is never trusted from the declared type: a node whose first
// element is a number is a position, one whose first element is an array is
// a container. Anything else is skipped.

// Terminal (lng, lat) of a position array
pub const position_of: fn(&[Value]) -> Option<(f64, f64)> = |items| {
    let lng = items.first()?.as_f64()?;
    let lat = items.get(1)?.as_f64()?;
    Some((lng, lat))
};

pub const is_position: fn(&Value) -> bool =
    |value| matches!(value.as_array().and_then(|items| items.first()), Some(Value::Number(_)));

/// Visits every terminal position in document order.
///
/// Explicit stack, so pathological nesting cannot overflow the call stack.
pub const for_each_position: fn(&Value, &mut dyn FnMut(f64, f64)) = |coordinates, visit| {
    let mut stack = vec![coordinates];
    while let Some(node) = stack.pop() {
        let Some(items) = node.as_array() else {
            continue;
        };
        match items.first() {
            Some(Value::Number(_)) => {
                if let Some((lng, lat)) = position_of(items) {
                    visit(lng, lat);
                }
            }
            Some(Value::Array(_)) => stack.extend(items.iter().rev()),
            _ => {}
        }
    }
};

/// Visits every ring (array of positions) in document order.
///
/// A bare position is reported as a one-element ring so callers see it and
/// can drop it by length.
pub const for_each_ring: fn(&Value, &mut dyn FnMut(&[Value])) = |coordinates, visit| {
    let mut stack = vec![coordinates];
    while let Some(node) = stack.pop() {
        let Some(items) = node.as_array() else {
            continue;
        };
        match items.first() {
            Some(Value::Number(_)) => visit(std::slice::from_ref(node)),
            Some(first) if is_position(first) => visit(items.as_slice()),
            Some(Value::Array(_)) => stack.extend(items.iter().rev()),
            _ => {}
        }
    }
};

pub fn ring_positions(ring: &[Value]) -> impl Iterator<Item = (f64, f64)> + '_ {
    ring.iter()
        .filter_map(|point| point.as_array().and_then(|items| position_of(items)))
}

// One "M ... L ... Z" subpath, or nothing for rings that cannot form a shape
pub const ring_to_subpath: fn(&[Value], &dyn Fn(f64, f64) -> ScreenPoint) -> Option<String> =
    |ring, project| {
        let points: Vec<ScreenPoint> = ring_positions(ring)
            .map(|(lng, lat)| project(lng, lat))
            .collect();
        if points.len() < 2 {
            return None;
        }

        let segments: Vec<String> = points
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}{},{}", if i == 0 { "M" } else { "L" }, p.x, p.y))
            .collect();
        Some(format!("{} Z", segments.join(" ")))
    };

/// Builds a vector path descriptor from coordinates of any depth.
///
/// Kept separate from the bounds fold on purpose: the two share the shape
/// rules but not their degenerate-input guards.
pub const geometry_to_path_d: fn(&Value, &dyn Fn(f64, f64) -> ScreenPoint) -> String =
    |coordinates, project| {
        let mut subpaths = Vec::new();
        for_each_ring(coordinates, &mut |ring| {
            if let Some(subpath) = ring_to_subpath(ring, project) {
                subpaths.push(subpath);
            }
        });
        subpaths.join(" ")
    };

/// Outer ring of a polygon, or of the first polygon of a multipolygon.
pub fn first_ring(coordinates: &Value) -> Option<&[Value]> {
    let mut node = coordinates;
    loop {
        let items = node.as_array()?;
        let first = items.first()?;
        if is_position(first) {
            return Some(items);
        }
        if !first.is_array() {
            return None;
        }
        node = first;
    }
}

/// Unweighted mean of the first ring's projected vertices.
///
/// Every stored vertex counts, including a duplicated closing vertex. This
/// is a vertex centroid rather than an area centroid, so it drifts on
/// concave or multi-part regions.
pub fn get_feature_centroid(
    feature: &Feature,
    project: &dyn Fn(f64, f64) -> ScreenPoint,
) -> Option<ScreenPoint> {
    let geometry = feature.geometry.as_ref()?;
    let ring = first_ring(&geometry.coordinates)?;

    let (sum_x, sum_y, count) = ring_positions(ring)
        .map(|(lng, lat)| project(lng, lat))
        .fold((0.0, 0.0, 0usize), |(sx, sy, n), p| (sx + p.x, sy + p.y, n + 1));
    if count == 0 {
        return None;
    }
    Some(ScreenPoint::new(sum_x / count as f64, sum_y / count as f64))
}
