use std::collections::BTreeMap;
use std::fmt::Write;

use crate::engine::Scene;
use crate::model::{DealId, DealPosition, MapResult, ScreenPoint};
use crate::view::canvas::CanvasState;
use crate::view::view::MapStyle;

// SVG rendering of a scene. Regions carry `data-region-id`, markers carry
// `data-map-marker` so DOM hit-testing can tell them apart.

pub const escape_xml: fn(&str) -> String = |text| {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
};

fn marker_point(scene: &Scene, position: &DealPosition) -> ScreenPoint {
    match position {
        DealPosition::Screen(point) => *point,
        DealPosition::Geo(geo) => scene.projector.project(geo.lng, geo.lat),
    }
}

pub fn render_regions(out: &mut String, scene: &Scene, state: &CanvasState, style: &MapStyle) -> MapResult<()> {
    for path in &scene.paths {
        let selected = state.selected_region_id.as_deref() == Some(path.id.as_str());
        let (fill, stroke) = if selected {
            (&style.selected_fill, &style.selected_stroke)
        } else {
            (&style.region_fill, &style.region_stroke)
        };
        writeln!(
            out,
            r#"<path data-region-id="{}" d="{}" fill="{}" stroke="{}" stroke-width="{}" fill-rule="evenodd"><title>{}</title></path>"#,
            escape_xml(&path.id),
            path.path_d,
            fill,
            stroke,
            style.stroke_width / state.zoom,
            escape_xml(&path.name)
        )?;
    }
    Ok(())
}

pub fn render_markers(
    out: &mut String,
    scene: &Scene,
    positions: &BTreeMap<DealId, DealPosition>,
    state: &CanvasState,
    style: &MapStyle,
) -> MapResult<()> {
    for (deal_id, position) in positions {
        let selected = state.selected_marker_id.as_deref() == Some(deal_id.as_str());
        let point = marker_point(scene, position);
        let color = if selected {
            &style.selected_marker_color
        } else {
            &style.marker_color
        };
        // Markers keep their on-screen size regardless of zoom
        writeln!(
            out,
            r#"<g data-map-marker="{id}" role="button" tabindex="0" aria-pressed="{selected}" aria-label="{id}" transform="translate({x} {y})"><circle r="{r}" fill="{color}"/></g>"#,
            id = escape_xml(deal_id),
            selected = selected,
            x = point.x,
            y = point.y,
            r = style.marker_radius / state.zoom,
            color = color,
        )?;
    }
    Ok(())
}

/// Renders the whole scene under the canvas pan/zoom transform.
pub fn render_svg(
    scene: &Scene,
    positions: &BTreeMap<DealId, DealPosition>,
    state: &CanvasState,
    style: &MapStyle,
) -> MapResult<String> {
    let viewport = scene.viewport();
    let mut out = String::new();

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
        w = viewport.width,
        h = viewport.height
    )?;
    writeln!(
        out,
        r#"<rect width="{}" height="{}" fill="{}"/>"#,
        viewport.width, viewport.height, style.background
    )?;
    writeln!(
        out,
        r#"<g transform="translate({} {}) scale({})">"#,
        state.pan.x, state.pan.y, state.zoom
    )?;
    render_regions(&mut out, scene, state, style)?;
    render_markers(&mut out, scene, positions, state, style)?;
    out.push_str("</g>\n</svg>\n");

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::build_scene;
    use crate::model::{Feature, FeatureCollection, GeoPoint, Geometry, GeometryKind, ViewportSize};
    use serde_json::{Map, json};

    fn scene() -> Scene {
        let mut properties = Map::new();
        properties.insert("id".to_string(), json!("lga-1"));
        properties.insert("name".to_string(), json!("Hills & Valleys"));
        let collection = FeatureCollection::new(vec![Feature::new(
            None,
            properties,
            Some(Geometry::new(GeometryKind::Polygon, json!([[[0, 0], [1, 0], [1, 1]]]))),
        )]);
        build_scene(&collection, ViewportSize::new(100.0, 100.0))
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_render_marks_selection_and_transform() {
        let style = MapStyle::default();
        let mut state = CanvasState::default();
        state.zoom = 2.0;
        state.pan = ScreenPoint::new(10.0, -5.0);
        state.selected_region_id = Some("lga-1".to_string());
        state.selected_marker_id = Some("d2".to_string());

        let mut positions = BTreeMap::new();
        positions.insert("d1".to_string(), DealPosition::Screen(ScreenPoint::new(5.0, 6.0)));
        positions.insert("d2".to_string(), DealPosition::Geo(GeoPoint::new(1.0, 1.0)));

        let svg = render_svg(&scene(), &positions, &state, &style).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"<g transform="translate(10 -5) scale(2)">"#));
        assert!(svg.contains(&format!(r#"data-region-id="lga-1" d="M0,100 L100,100 L100,0 Z" fill="{}""#, style.selected_fill)));
        assert!(svg.contains("<title>Hills &amp; Valleys</title>"));
        assert!(svg.contains(r#"data-map-marker="d1" role="button" tabindex="0" aria-pressed="false""#));
        assert!(svg.contains(r#"data-map-marker="d2" role="button" tabindex="0" aria-pressed="true""#));
        assert!(svg.contains(r#"transform="translate(100 0)""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
