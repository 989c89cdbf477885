//! Bottom-sheet panel that rests at discrete snap heights.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::view::{Key, PointerId};

/// A named resting height, as a fraction of the container height.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapPoint {
    pub name: String,
    pub fraction: f64,
    /// Floor in px so small screens never collapse the panel to nothing.
    #[serde(default)]
    pub min_height: f64,
}

impl SnapPoint {
    pub fn new(name: impl Into<String>, fraction: f64) -> Self {
        SnapPoint {
            name: name.into(),
            fraction,
            min_height: 0.0,
        }
    }

    pub fn with_min_height(mut self, min_height: f64) -> Self {
        self.min_height = min_height;
        self
    }

    pub fn height_in(&self, container_height: f64) -> f64 {
        (self.fraction * container_height).max(self.min_height)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Ordered smallest to largest.
    pub snap_points: Vec<SnapPoint>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        PanelConfig {
            snap_points: vec![
                SnapPoint::new("peek", 0.25).with_min_height(120.0),
                SnapPoint::new("half", 0.5),
                SnapPoint::new("full", 0.9),
            ],
        }
    }
}

/// Index of the snap point whose height is closest to `height`.
///
/// Ties go to the earlier point in enumeration order.
pub fn nearest_snap(points: &[SnapPoint], container_height: f64, height: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, point) in points.iter().enumerate() {
        let distance = (point.height_in(container_height) - height).abs();
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}

#[derive(Clone, Copy, Debug)]
struct PanelDrag {
    pointer_id: PointerId,
    start_pointer_y: f64,
    start_height: f64,
    live_height: f64,
}

pub struct SnapPanel {
    points: Vec<SnapPoint>,
    container_height: f64,
    active: usize,
    drag: Option<PanelDrag>,
    subject: Option<String>,
    snap: watch::Sender<String>,
}

impl SnapPanel {
    pub fn new(config: PanelConfig, container_height: f64) -> Self {
        let points = if config.snap_points.is_empty() {
            tracing::warn!("No snap points configured, using defaults");
            PanelConfig::default().snap_points
        } else {
            config.snap_points
        };
        let active = points.len() / 2;
        let (snap, _) = watch::channel(points[active].name.clone());
        SnapPanel {
            points,
            container_height: container_height.max(0.0),
            active,
            drag: None,
            subject: None,
            snap,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.snap.subscribe()
    }

    pub fn snap_points(&self) -> &[SnapPoint] {
        &self.points
    }

    pub fn active(&self) -> &SnapPoint {
        &self.points[self.active]
    }

    pub fn active_name(&self) -> &str {
        &self.points[self.active].name
    }

    pub fn container_height(&self) -> f64 {
        self.container_height
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn height_of(&self, index: usize) -> f64 {
        self.points
            .get(index)
            .map_or(0.0, |point| point.height_in(self.container_height))
    }

    /// Live drag height while dragging, otherwise the active snap height.
    pub fn height(&self) -> f64 {
        match &self.drag {
            Some(drag) => drag.live_height,
            None => self.height_of(self.active),
        }
    }

    // Floors can push the smallest point above a larger one on tiny screens
    fn height_range(&self) -> (f64, f64) {
        (0..self.points.len())
            .map(|index| self.height_of(index))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| (lo.min(h), hi.max(h)))
    }

    fn set_active(&mut self, index: usize) {
        self.active = index;
        let name = self.points[index].name.clone();
        self.snap.send_if_modified(|current| {
            if *current == name {
                return false;
            }
            *current = name;
            true
        });
    }

    pub fn drag_start(&mut self, pointer_id: PointerId, pointer_y: f64) {
        let start_height = self.height();
        self.drag = Some(PanelDrag {
            pointer_id,
            start_pointer_y: pointer_y,
            start_height,
            live_height: start_height,
        });
    }

    /// Dragging up grows the panel. Returns the live height for our pointer.
    pub fn drag_move(&mut self, pointer_id: PointerId, pointer_y: f64) -> Option<f64> {
        let (lo, hi) = self.height_range();
        let drag = self.drag.as_mut().filter(|d| d.pointer_id == pointer_id)?;
        let height = drag.start_height + (drag.start_pointer_y - pointer_y);
        drag.live_height = height.clamp(lo, hi);
        Some(drag.live_height)
    }

    /// Settles on the nearest snap point and discards the live height.
    pub fn drag_end(&mut self, pointer_id: PointerId) -> Option<&SnapPoint> {
        let drag = self.drag.take_if(|d| d.pointer_id == pointer_id)?;
        let index = nearest_snap(&self.points, self.container_height, drag.live_height);
        tracing::debug!(
            "Panel settled at {} from live height {}",
            self.points[index].name,
            drag.live_height
        );
        self.set_active(index);
        Some(self.active())
    }

    /// Lost capture ends the gesture the same way a release does.
    pub fn drag_cancel(&mut self, pointer_id: PointerId) -> Option<&SnapPoint> {
        self.drag_end(pointer_id)
    }

    /// ArrowUp/ArrowDown step one snap point; no-op at either end.
    pub fn key(&mut self, key: Key) -> bool {
        let target = match key {
            Key::ArrowUp if self.active + 1 < self.points.len() => self.active + 1,
            Key::ArrowDown if self.active > 0 => self.active - 1,
            _ => return false,
        };
        self.drag = None;
        self.set_active(target);
        true
    }

    pub fn select(&mut self, name: &str) -> bool {
        let Some(index) = self.points.iter().position(|point| point.name == name) else {
            return false;
        };
        self.drag = None;
        self.set_active(index);
        true
    }

    /// New measured container height. The active point keeps its fraction.
    pub fn resize_container(&mut self, container_height: f64) {
        self.container_height = container_height.max(0.0);
        let (lo, hi) = self.height_range();
        if let Some(drag) = self.drag.as_mut() {
            drag.live_height = drag.live_height.clamp(lo, hi);
        }
    }

    /// Switching subject re-centres the panel and drops any drag.
    pub fn set_subject(&mut self, subject: Option<&str>) {
        if self.subject.as_deref() == subject {
            return;
        }
        self.subject = subject.map(str::to_string);
        self.drag = None;
        self.set_active(self.points.len() / 2);
    }
}
