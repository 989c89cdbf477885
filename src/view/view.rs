use std::collections::BTreeMap;

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::engine::renderer;
use crate::engine::{PositionMode, Scene, ScenePicker, build_scene, resolve_positions};
use crate::error::MapError;
use crate::model::{
    BoundaryLoader, BoundarySource, Deal, DealId, DealPosition, FeatureCollection, MapResult,
    Region, ScreenPoint, ViewportSize,
};
use crate::view::canvas::{CanvasController, GestureOutcome};
use crate::view::panel::SnapPanel;
use crate::view::{Key, PointerId, PointerTarget};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyle {
    pub background: String,
    pub region_fill: String,
    pub region_stroke: String,
    pub selected_fill: String,
    pub selected_stroke: String,
    pub stroke_width: f64,
    pub marker_radius: f64,
    pub marker_color: String,
    pub selected_marker_color: String,
}

impl Default for MapStyle {
    fn default() -> Self {
        MapStyle {
            background: "#F8FAFC".to_string(),
            region_fill: "rgba(59, 130, 246, 0.15)".to_string(),
            region_stroke: "#3B82F6".to_string(),
            selected_fill: "rgba(234, 88, 12, 0.35)".to_string(),
            selected_stroke: "#EA580C".to_string(),
            stroke_width: 1.5,
            marker_radius: 6.0,
            marker_color: "#1E293B".to_string(),
            selected_marker_color: "#EA580C".to_string(),
        }
    }
}

/// The composed map: scene, marker positions, canvas and detail panel.
///
/// Scene, picker and positions are derived data. Any input change rebuilds
/// all three from scratch.
pub struct MapView {
    config: EngineConfig,
    collection: FeatureCollection,
    viewport: ViewportSize,
    deals: Vec<Deal>,
    regions: Vec<Region>,
    scene: Scene,
    picker: ScenePicker,
    positions: BTreeMap<DealId, DealPosition>,
    canvas: CanvasController,
    panel: SnapPanel,
    loader: BoundaryLoader,
    warning: Option<String>,
}

impl MapView {
    pub fn new(config: EngineConfig) -> MapResult<Self> {
        config.validate()?;
        let viewport = config.viewport;
        let collection = FeatureCollection::default();
        let scene = build_scene(&collection, viewport);
        let picker = ScenePicker::new(&collection, &scene.projector);

        Ok(MapView {
            canvas: CanvasController::new(config.canvas),
            panel: SnapPanel::new(config.panel.clone(), viewport.height),
            loader: BoundaryLoader::new(config.boundaries.timeout_secs)?,
            config,
            collection,
            viewport,
            deals: Vec::new(),
            regions: Vec::new(),
            scene,
            picker,
            positions: BTreeMap::new(),
            warning: None,
        })
    }

    fn rebuild(&mut self) {
        self.scene = build_scene(&self.collection, self.viewport);
        self.picker = ScenePicker::new(&self.collection, &self.scene.projector);
        self.positions = resolve_positions(
            &self.deals,
            &self.collection,
            &PositionMode::Projected(self.scene.projector),
        );
    }

    pub fn set_collection(&mut self, collection: FeatureCollection) {
        self.collection = collection;
        self.rebuild();
    }

    pub fn set_viewport(&mut self, viewport: ViewportSize) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.rebuild();
    }

    pub fn set_deals(&mut self, deals: Vec<Deal>) {
        self.deals = deals;
        self.rebuild();
    }

    /// Display names only; nothing derived depends on them.
    pub fn set_regions(&mut self, regions: Vec<Region>) {
        self.regions = regions;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn positions(&self) -> &BTreeMap<DealId, DealPosition> {
        &self.positions
    }

    /// Positions for a host map library that projects lng/lat itself.
    pub fn geographic_positions(&self) -> BTreeMap<DealId, DealPosition> {
        let mode = PositionMode::Geographic {
            default: self.config.default_center,
        };
        resolve_positions(&self.deals, &self.collection, &mode)
    }

    pub fn canvas(&self) -> &CanvasController {
        &self.canvas
    }

    pub fn panel(&self) -> &SnapPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut SnapPanel {
        &mut self.panel
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn dismiss_warning(&mut self) {
        self.warning = None;
    }

    // The panel shows the selected region, so a new selection is a new subject
    fn sync_subject(&mut self) {
        let selected = self.canvas.selected_region_id();
        self.panel.set_subject(selected.as_deref());
    }

    pub fn pointer_down(&mut self, pointer_id: PointerId, position: ScreenPoint, target: &PointerTarget) -> bool {
        self.canvas.pointer_down(pointer_id, position, target)
    }

    pub fn pointer_move(&mut self, pointer_id: PointerId, position: ScreenPoint) -> bool {
        self.canvas.pointer_move(pointer_id, position)
    }

    pub fn pointer_up(&mut self, pointer_id: PointerId, position: ScreenPoint) -> GestureOutcome {
        let outcome = self.canvas.pointer_up(pointer_id, position, &self.picker);
        self.sync_subject();
        outcome
    }

    pub fn pointer_cancel(&mut self, pointer_id: PointerId) {
        self.canvas.pointer_cancel(pointer_id);
    }

    pub fn wheel(&mut self, delta_y: f64) {
        self.canvas.wheel(delta_y);
    }

    pub fn zoom_in(&mut self) {
        self.canvas.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.canvas.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.canvas.reset_zoom();
    }

    pub fn click_region(&mut self, region_id: Option<&str>) -> bool {
        let changed = self.canvas.click_region(region_id);
        self.sync_subject();
        changed
    }

    pub fn click_marker(&mut self, marker_id: &str) -> bool {
        self.canvas.click_marker(marker_id)
    }

    pub fn marker_key(&mut self, marker_id: &str, key: Key) -> bool {
        self.canvas.marker_key(marker_id, key)
    }

    pub fn region_key(&mut self, region_id: &str, key: Key) -> bool {
        let changed = self.canvas.region_key(region_id, key);
        self.sync_subject();
        changed
    }

    /// Escape goes to the canvas, arrows step the panel.
    pub fn key_down(&mut self, key: Key) -> bool {
        let changed = match key {
            Key::Escape => self.canvas.key_down(key),
            Key::ArrowUp | Key::ArrowDown => self.panel.key(key),
            _ => false,
        };
        self.sync_subject();
        changed
    }

    pub fn resize_panel_container(&mut self, height: f64) {
        self.panel.resize_container(height);
    }

    /// Selected region joined with the domain region list.
    pub fn selected_region(&self) -> Option<Region> {
        let id = self.canvas.selected_region_id()?;
        if let Some(region) = self.regions.iter().find(|region| region.id == id) {
            return Some(region.clone());
        }
        let name = self
            .collection
            .find(&id)
            .and_then(|feature| feature.name())
            .unwrap_or_else(|| id.clone());
        Some(Region { id, name })
    }

    /// Deals attached to the selected region, in input order.
    pub fn selected_deals(&self) -> Vec<&Deal> {
        let Some(id) = self.canvas.selected_region_id() else {
            return Vec::new();
        };
        self.deals
            .iter()
            .filter(|deal| deal.region_ids.iter().any(|region_id| *region_id == id))
            .collect()
    }

    /// Installs fetched boundaries. A failure keeps the current geometry and
    /// leaves one warning; aborted fetches were superseded and are dropped.
    pub fn apply_boundary_result(&mut self, result: MapResult<FeatureCollection>) -> bool {
        match result {
            Ok(collection) => {
                self.warning = None;
                self.set_collection(collection);
                true
            }
            Err(MapError::Aborted) => {
                tracing::debug!("Ignoring aborted boundary fetch");
                false
            }
            Err(e) => {
                tracing::warn!("Boundary fetch failed, keeping {} features: {}", self.collection.len(), e);
                if self.warning.is_none() {
                    self.warning = Some(format!("Region boundaries could not be loaded: {}", e));
                }
                false
            }
        }
    }

    /// Starts a fetch that the caller drives, e.g. on a JS microtask.
    pub fn start_boundary_fetch(&mut self, url: &str) -> LocalBoxFuture<'static, MapResult<FeatureCollection>> {
        self.loader.start(url)
    }

    pub async fn load_boundaries(&mut self, source: BoundarySource) -> bool {
        tracing::info!("Loading boundaries from {}", source.as_string());
        let result = self.loader.load(source).await;
        self.apply_boundary_result(result)
    }

    pub fn cancel_boundary_fetch(&mut self) {
        self.loader.cancel();
    }

    pub fn render_svg(&self) -> MapResult<String> {
        renderer::render_svg(
            &self.scene,
            &self.positions,
            &self.canvas.view_state(),
            &self.config.style,
        )
    }
}
