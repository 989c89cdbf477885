//! End-to-end: collection in, marker positions and SVG out.

use region_map::engine::{
    PositionMode, build_scene, get_bounds, get_feature_centroid, resolve_positions,
};
use region_map::{Deal, DealPosition, FeatureCollection, GeoPoint, ScreenPoint, ViewportSize};

const LGA: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "id": 10180,
        "properties": {"id": "lga-10180", "name": "Bayside"},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [151.10, -33.98], [151.20, -33.98], [151.20, -33.90],
                [151.10, -33.90], [151.10, -33.98]
            ]]
        }
    }]
}"#;

fn viewport() -> ViewportSize {
    ViewportSize::new(800.0, 600.0)
}

fn lga() -> FeatureCollection {
    FeatureCollection::from_json_str(LGA).unwrap()
}

#[test]
fn explicit_coordinates_win_over_region_centroid() {
    let collection = lga();
    let scene = build_scene(&collection, viewport());
    let mode = PositionMode::Projected(scene.projector);

    let deals = vec![
        Deal::new("explicit")
            .with_coordinates(151.18, -33.92)
            .with_region("lga-10180"),
        Deal::new("fallback").with_region("lga-10180"),
    ];
    let positions = resolve_positions(&deals, &collection, &mode);

    assert_eq!(
        positions["explicit"],
        DealPosition::Screen(scene.projector.project(151.18, -33.92))
    );
    assert_ne!(positions["explicit"], positions["fallback"]);
}

#[test]
fn region_only_deal_sits_on_centroid() {
    let collection = lga();
    let scene = build_scene(&collection, viewport());
    let projector = scene.projector;

    let positions = resolve_positions(
        &[Deal::new("d1").with_region("lga-10180")],
        &collection,
        &PositionMode::Projected(projector),
    );

    let feature = collection.find("lga-10180").unwrap();
    let centroid = get_feature_centroid(feature, &|lng, lat| projector.project(lng, lat)).unwrap();
    assert_eq!(positions["d1"], DealPosition::Screen(centroid));
    assert_ne!(positions["d1"], DealPosition::Screen(viewport().center()));

    // Raw feature id also resolves
    let positions = resolve_positions(
        &[Deal::new("d2").with_region("10180")],
        &collection,
        &PositionMode::Projected(projector),
    );
    assert_eq!(positions["d2"], DealPosition::Screen(centroid));
}

#[test]
fn empty_collection_falls_back_to_default() {
    let collection = FeatureCollection::default();
    let deals = vec![Deal::new("lonely").with_region("missing")];

    let scene = build_scene(&collection, viewport());
    let projected = resolve_positions(&deals, &collection, &PositionMode::Projected(scene.projector));
    assert_eq!(
        projected["lonely"],
        DealPosition::Screen(ScreenPoint::new(400.0, 300.0))
    );

    let default = GeoPoint::new(151.2093, -33.8688);
    let geographic = resolve_positions(&deals, &collection, &PositionMode::Geographic { default });
    assert_eq!(geographic["lonely"], DealPosition::Geo(default));
}

#[test]
fn bounds_and_projection_corners() {
    let collection = lga();
    let bounds = get_bounds(&collection);
    assert!(bounds.min_lng <= bounds.max_lng);
    assert!(bounds.min_lat <= bounds.max_lat);

    let scene = build_scene(&collection, viewport());
    let bottom_left = scene.projector.project(bounds.min_lng, bounds.min_lat);
    let top_left = scene.projector.project(bounds.min_lng, bounds.max_lat);
    assert_eq!(bottom_left, ScreenPoint::new(0.0, 600.0));
    assert_eq!(top_left, ScreenPoint::new(0.0, 0.0));
}

#[test]
fn typed_geojson_input_matches_lenient_loader() {
    let geojson: geojson::GeoJson = LGA.parse().unwrap();
    let typed = geojson::FeatureCollection::try_from(geojson).unwrap();
    let collection = FeatureCollection::from_geojson(&typed);

    let from_typed = build_scene(&collection, viewport());
    let from_text = build_scene(&lga(), viewport());
    assert_eq!(from_typed.paths, from_text.paths);
    assert_eq!(from_typed.paths[0].name, "Bayside");
}
