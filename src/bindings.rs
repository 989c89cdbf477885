use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::config::EngineConfig;
use crate::error::MapError;
use crate::model::{Deal, FeatureCollection, MapResult, Region, ScreenPoint, ViewportSize};
use crate::view::{GestureOutcome, Key, MapView, PointerTarget};

impl From<MapError> for JsValue {
    fn from(err: MapError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    crate::init_tracing();
}

/// Maps a DOM event target onto what the controllers care about.
pub fn pointer_target(target: Option<web_sys::EventTarget>) -> MapResult<PointerTarget> {
    let Some(element) = target.and_then(|t| t.dyn_into::<web_sys::Element>().ok()) else {
        return Ok(PointerTarget::Canvas);
    };
    let closest = |selector: &str| {
        element
            .closest(selector)
            .map_err(|_| MapError::Wasm(format!("Invalid selector {}", selector)))
    };

    if let Some(marker) = closest("[data-map-marker]")? {
        return Ok(PointerTarget::Marker(
            marker.get_attribute("data-map-marker").unwrap_or_default(),
        ));
    }
    if closest("button, [data-map-control]")?.is_some() {
        return Ok(PointerTarget::Control);
    }
    if let Some(region) = closest("[data-region-id]")? {
        return Ok(PointerTarget::Region(
            region.get_attribute("data-region-id").unwrap_or_default(),
        ));
    }
    Ok(PointerTarget::Canvas)
}

#[wasm_bindgen(js_name = MapView)]
pub struct WasmMapView {
    inner: Rc<RefCell<MapView>>,
}

#[wasm_bindgen(js_class = MapView)]
impl WasmMapView {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmMapView, JsValue> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json_str(&json)?,
            None => EngineConfig::default(),
        };
        let view = MapView::new(config)?;
        Ok(WasmMapView {
            inner: Rc::new(RefCell::new(view)),
        })
    }

    pub fn set_collection_json(&self, json: &str) -> Result<(), JsValue> {
        let collection = FeatureCollection::from_json_str(json)?;
        self.inner.borrow_mut().set_collection(collection);
        Ok(())
    }

    pub fn set_deals_json(&self, json: &str) -> Result<(), JsValue> {
        let deals: Vec<Deal> = serde_json::from_str(json).map_err(MapError::from)?;
        self.inner.borrow_mut().set_deals(deals);
        Ok(())
    }

    pub fn set_regions_json(&self, json: &str) -> Result<(), JsValue> {
        let regions: Vec<Region> = serde_json::from_str(json).map_err(MapError::from)?;
        self.inner.borrow_mut().set_regions(regions);
        Ok(())
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.inner.borrow_mut().set_viewport(ViewportSize::new(width, height));
    }

    pub fn resize_panel(&self, height: f64) {
        self.inner.borrow_mut().resize_panel_container(height);
    }

    /// Fetch runs on the JS microtask queue; a newer call aborts this one.
    pub fn fetch_boundaries(&self, url: &str) {
        let fetch = self.inner.borrow_mut().start_boundary_fetch(url);
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let result = fetch.await;
            inner.borrow_mut().apply_boundary_result(result);
        });
    }

    pub fn warning(&self) -> Option<String> {
        self.inner.borrow().warning().map(str::to_string)
    }

    /// Returns whether the pointer should be captured.
    pub fn pointer_down(&self, pointer_id: i32, x: f64, y: f64, target: Option<web_sys::EventTarget>) -> Result<bool, JsValue> {
        let target = pointer_target(target)?;
        Ok(self.inner.borrow_mut().pointer_down(pointer_id, ScreenPoint::new(x, y), &target))
    }

    pub fn pointer_move(&self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.inner.borrow_mut().pointer_move(pointer_id, ScreenPoint::new(x, y))
    }

    /// Picked region id for a click, `undefined` otherwise.
    pub fn pointer_up(&self, pointer_id: i32, x: f64, y: f64) -> Option<String> {
        match self.inner.borrow_mut().pointer_up(pointer_id, ScreenPoint::new(x, y)) {
            GestureOutcome::Clicked(region) => region,
            GestureOutcome::Panned | GestureOutcome::Ignored => None,
        }
    }

    pub fn pointer_cancel(&self, pointer_id: i32) {
        self.inner.borrow_mut().pointer_cancel(pointer_id);
    }

    pub fn panel_drag_start(&self, pointer_id: i32, y: f64) {
        self.inner.borrow_mut().panel_mut().drag_start(pointer_id, y);
    }

    pub fn panel_drag_move(&self, pointer_id: i32, y: f64) -> Option<f64> {
        self.inner.borrow_mut().panel_mut().drag_move(pointer_id, y)
    }

    pub fn panel_drag_end(&self, pointer_id: i32) -> Option<String> {
        let mut view = self.inner.borrow_mut();
        view.panel_mut().drag_end(pointer_id).map(|point| point.name.clone())
    }

    pub fn panel_drag_cancel(&self, pointer_id: i32) -> Option<String> {
        let mut view = self.inner.borrow_mut();
        view.panel_mut().drag_cancel(pointer_id).map(|point| point.name.clone())
    }

    pub fn panel_select(&self, name: &str) -> bool {
        self.inner.borrow_mut().panel_mut().select(name)
    }

    pub fn panel_height(&self) -> f64 {
        self.inner.borrow().panel().height()
    }

    pub fn panel_snap(&self) -> String {
        self.inner.borrow().panel().active_name().to_string()
    }

    pub fn wheel(&self, delta_y: f64) {
        self.inner.borrow_mut().wheel(delta_y);
    }

    pub fn zoom_in(&self) {
        self.inner.borrow_mut().zoom_in();
    }

    pub fn zoom_out(&self) {
        self.inner.borrow_mut().zoom_out();
    }

    pub fn reset_zoom(&self) {
        self.inner.borrow_mut().reset_zoom();
    }

    pub fn click_marker(&self, marker_id: &str) -> bool {
        self.inner.borrow_mut().click_marker(marker_id)
    }

    pub fn marker_key(&self, marker_id: &str, key: &str) -> bool {
        self.inner.borrow_mut().marker_key(marker_id, Key::from_dom(key))
    }

    pub fn region_key(&self, region_id: &str, key: &str) -> bool {
        self.inner.borrow_mut().region_key(region_id, Key::from_dom(key))
    }

    pub fn key_down(&self, key: &str) -> bool {
        self.inner.borrow_mut().key_down(Key::from_dom(key))
    }

    pub fn selected_region_id(&self) -> Option<String> {
        self.inner.borrow().canvas().selected_region_id()
    }

    pub fn selected_marker_id(&self) -> Option<String> {
        self.inner.borrow().canvas().selected_marker_id()
    }

    pub fn positions_json(&self) -> Result<String, JsValue> {
        Ok(serde_json::to_string(self.inner.borrow().positions()).map_err(MapError::from)?)
    }

    pub fn geographic_positions_json(&self) -> Result<String, JsValue> {
        let positions = self.inner.borrow().geographic_positions();
        Ok(serde_json::to_string(&positions).map_err(MapError::from)?)
    }

    pub fn render_svg(&self) -> Result<String, JsValue> {
        Ok(self.inner.borrow().render_svg()?)
    }
}

impl Drop for WasmMapView {
    fn drop(&mut self) {
        if let Ok(mut view) = self.inner.try_borrow_mut() {
            view.cancel_boundary_fetch();
        }
    }
}
