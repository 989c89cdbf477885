//! Pan, zoom and selection state for the interactive map canvas.
//!
//! Committed state is published through a `watch` channel. Pointer deltas
//! during a pan live in a plain gesture record and are only committed when
//! the gesture ends, so subscribers are not woken on every pointer move.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::engine::RegionPicker;
use crate::model::{DealId, RegionId, ScreenPoint};
use crate::view::{Key, PointerId, PointerTarget};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// Pointer travel (px) below which a press-release counts as a click.
    pub click_slop_px: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            min_zoom: 0.5,
            max_zoom: 3.0,
            zoom_step: 0.25,
            click_slop_px: 4.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CanvasState {
    pub zoom: f64,
    pub pan: ScreenPoint,
    pub selected_region_id: Option<RegionId>,
    pub selected_marker_id: Option<DealId>,
}

impl Default for CanvasState {
    fn default() -> Self {
        CanvasState {
            zoom: 1.0,
            pan: ScreenPoint::default(),
            selected_region_id: None,
            selected_marker_id: None,
        }
    }
}

/// How a pointer-up was interpreted.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
    /// Not our pointer, or no gesture armed.
    Ignored,
    Panned,
    /// Press and release without travel; carries the picked region, if any.
    Clicked(Option<RegionId>),
}

#[derive(Clone, Copy, Debug)]
struct PanGesture {
    pointer_id: PointerId,
    start_pointer: ScreenPoint,
    start_pan: ScreenPoint,
    pan: ScreenPoint,
    moved: bool,
}

pub struct CanvasController {
    config: CanvasConfig,
    state: watch::Sender<CanvasState>,
    gesture: Option<PanGesture>,
}

// Toggle on same id, replace on a different one
fn toggle(current: &mut Option<String>, id: Option<&str>) -> bool {
    let next = match id {
        Some(id) if current.as_deref() == Some(id) => None,
        Some(id) => Some(id.to_string()),
        None => None,
    };
    if *current == next {
        return false;
    }
    *current = next;
    true
}

impl CanvasController {
    /// A reversed or non-finite zoom range is repaired rather than rejected.
    pub fn new(mut config: CanvasConfig) -> Self {
        let defaults = CanvasConfig::default();
        if !config.min_zoom.is_finite() {
            config.min_zoom = defaults.min_zoom;
        }
        if !config.max_zoom.is_finite() {
            config.max_zoom = defaults.max_zoom;
        }
        config.max_zoom = config.max_zoom.max(config.min_zoom);
        let (state, _) = watch::channel(CanvasState::default());
        CanvasController {
            config,
            state,
            gesture: None,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn subscribe(&self) -> watch::Receiver<CanvasState> {
        self.state.subscribe()
    }

    /// Last committed state.
    pub fn state(&self) -> CanvasState {
        self.state.borrow().clone()
    }

    /// Committed state with the in-flight pan applied, for drawing.
    pub fn view_state(&self) -> CanvasState {
        let mut state = self.state();
        state.pan = self.pan();
        state
    }

    pub fn zoom(&self) -> f64 {
        self.state.borrow().zoom
    }

    pub fn pan(&self) -> ScreenPoint {
        match &self.gesture {
            Some(gesture) => gesture.pan,
            None => self.state.borrow().pan,
        }
    }

    pub fn is_panning(&self) -> bool {
        self.gesture.is_some_and(|gesture| gesture.moved)
    }

    pub fn selected_region_id(&self) -> Option<RegionId> {
        self.state.borrow().selected_region_id.clone()
    }

    pub fn selected_marker_id(&self) -> Option<DealId> {
        self.state.borrow().selected_marker_id.clone()
    }

    fn commit(&self, update: impl FnOnce(&mut CanvasState) -> bool) -> bool {
        self.state.send_if_modified(update)
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        let zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        self.commit(|state| {
            if state.zoom == zoom {
                return false;
            }
            state.zoom = zoom;
            true
        });
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom() + self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom() - self.config.zoom_step);
    }

    /// Back to 1.0; pan is left alone.
    pub fn reset_zoom(&mut self) {
        self.set_zoom(1.0);
    }

    /// Only the sign of the wheel delta matters; negative zooms in.
    pub fn wheel(&mut self, delta_y: f64) {
        if delta_y < 0.0 {
            self.zoom_in();
        } else if delta_y > 0.0 {
            self.zoom_out();
        }
    }

    /// Arms a pan unless the press landed on an interactive child.
    ///
    /// Returns whether the pointer should be captured.
    pub fn pointer_down(&mut self, pointer_id: PointerId, position: ScreenPoint, target: &PointerTarget) -> bool {
        if target.is_interactive() {
            return false;
        }
        // A stale gesture whose release never arrived is committed first
        if let Some(previous) = self.gesture {
            self.pointer_cancel(previous.pointer_id);
        }
        let pan = self.pan();
        self.gesture = Some(PanGesture {
            pointer_id,
            start_pointer: position,
            start_pan: pan,
            pan,
            moved: false,
        });
        true
    }

    /// Returns whether the live pan changed.
    pub fn pointer_move(&mut self, pointer_id: PointerId, position: ScreenPoint) -> bool {
        let slop = self.config.click_slop_px;
        let Some(gesture) = self.gesture.as_mut().filter(|g| g.pointer_id == pointer_id) else {
            return false;
        };
        if !gesture.moved && gesture.start_pointer.distance_to(position) <= slop {
            return false;
        }
        gesture.moved = true;
        gesture.pan = ScreenPoint::new(
            gesture.start_pan.x + (position.x - gesture.start_pointer.x),
            gesture.start_pan.y + (position.y - gesture.start_pointer.y),
        );
        true
    }

    /// Ends the gesture: a pan is committed, a click is resolved to a region
    /// through `picker` and applied as a region click.
    pub fn pointer_up(
        &mut self,
        pointer_id: PointerId,
        position: ScreenPoint,
        picker: &dyn RegionPicker,
    ) -> GestureOutcome {
        if !self.gesture.is_some_and(|g| g.pointer_id == pointer_id) {
            return GestureOutcome::Ignored;
        }
        self.pointer_move(pointer_id, position);
        let Some(gesture) = self.gesture.take() else {
            return GestureOutcome::Ignored;
        };

        if gesture.moved {
            self.commit_pan(gesture.pan);
            return GestureOutcome::Panned;
        }
        let region = picker.region_at(self.to_scene(position));
        self.click_region(region.as_deref());
        GestureOutcome::Clicked(region)
    }

    /// Lost capture or OS cancellation: keep whatever pan was reached, no click.
    pub fn pointer_cancel(&mut self, pointer_id: PointerId) {
        if let Some(gesture) = self.gesture.take_if(|g| g.pointer_id == pointer_id) {
            if gesture.moved {
                self.commit_pan(gesture.pan);
            }
        }
    }

    fn commit_pan(&mut self, pan: ScreenPoint) {
        tracing::debug!("Committing pan to ({}, {})", pan.x, pan.y);
        self.commit(|state| {
            if state.pan == pan {
                return false;
            }
            state.pan = pan;
            true
        });
    }

    /// Inverse of the canvas transform (`translate(pan) scale(zoom)`).
    pub fn to_scene(&self, point: ScreenPoint) -> ScreenPoint {
        let zoom = self.zoom();
        let pan = self.pan();
        ScreenPoint::new((point.x - pan.x) / zoom, (point.y - pan.y) / zoom)
    }

    /// `None` means empty space and clears the selection.
    pub fn click_region(&mut self, region_id: Option<&str>) -> bool {
        self.commit(|state| toggle(&mut state.selected_region_id, region_id))
    }

    pub fn click_marker(&mut self, marker_id: &str) -> bool {
        self.commit(|state| toggle(&mut state.selected_marker_id, Some(marker_id)))
    }

    /// Enter/Space on a focused marker behaves like a click.
    pub fn marker_key(&mut self, marker_id: &str, key: Key) -> bool {
        key.activates() && self.click_marker(marker_id)
    }

    pub fn region_key(&mut self, region_id: &str, key: Key) -> bool {
        key.activates() && self.click_region(Some(region_id))
    }

    /// Canvas-level keys: Escape clears both selections.
    pub fn key_down(&mut self, key: Key) -> bool {
        if key != Key::Escape {
            return false;
        }
        self.clear_selection()
    }

    pub fn clear_selection(&mut self) -> bool {
        self.commit(|state| {
            let changed = state.selected_region_id.is_some() || state.selected_marker_id.is_some();
            state.selected_region_id = None;
            state.selected_marker_id = None;
            changed
        })
    }
}

impl Default for CanvasController {
    fn default() -> Self {
        CanvasController::new(CanvasConfig::default())
    }
}
