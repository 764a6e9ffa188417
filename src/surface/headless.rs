use std::time::{Duration, Instant};

use smallvec::SmallVec;

use super::{
    CameraAnimator, CameraPose, Container, Cursor, Easing, Layer, LayerKind, MapBackend,
    MapOptions, PaintProperty,
};
use crate::error::{MapError, Result};
use crate::geo::{self, LngLat};

/// In-memory rendering backend. Keeps sources, layers, paint state, cursor
/// and an animated camera so the map can run without a window, and so tests
/// can inspect exactly what a real renderer would have been told to draw.
pub struct HeadlessBackend {
    container: Option<String>,
    options: Option<MapOptions>,
    /// Polls left before the style counts as loaded.
    loading_polls: u32,
    sources: Vec<(String, Vec<LngLat>)>,
    /// Registration order; later layers draw on top.
    layers: Vec<Layer>,
    cursor: Cursor,
    camera: CameraAnimator,
    remove_calls: u32,
}

impl HeadlessBackend {
    /// Backend whose style loads on the first poll.
    pub fn new() -> Self {
        Self::loading_for(0)
    }

    /// Backend that reports "not loaded" for `polls` polls first.
    pub fn loading_for(polls: u32) -> Self {
        Self {
            container: None,
            options: None,
            loading_polls: polls,
            sources: Vec::new(),
            layers: Vec::new(),
            cursor: Cursor::Default,
            camera: CameraAnimator::new(CameraPose::new(LngLat::new(0.0, 0.0), 0.0)),
            remove_calls: 0,
        }
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn options(&self) -> Option<&MapOptions> {
        self.options.as_ref()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn source(&self, id: &str) -> Option<&[LngLat]> {
        self.sources
            .iter()
            .find(|(sid, _)| sid == id)
            .map(|(_, ring)| ring.as_slice())
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Current opacity of a fill layer.
    pub fn fill_opacity(&self, id: &str) -> Option<f32> {
        match self.layer(id)?.kind {
            LayerKind::Fill { opacity, .. } => Some(opacity),
            _ => None,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_flying(&self, now: Instant) -> bool {
        self.camera.is_active(now)
    }

    pub fn remove_calls(&self) -> u32 {
        self.remove_calls
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MapBackend for HeadlessBackend {
    fn create(&mut self, container: &Container, options: &MapOptions) -> Result<()> {
        if self.container.is_some() {
            return Err(MapError::Initialization {
                container: container.id.clone(),
                width: container.width,
                height: container.height,
            });
        }
        self.container = Some(container.id.clone());
        self.camera.jump_to(options.camera);
        self.options = Some(options.clone());
        Ok(())
    }

    fn poll_loaded(&mut self) -> bool {
        if self.container.is_none() {
            return false;
        }
        if self.loading_polls > 0 {
            self.loading_polls -= 1;
            return false;
        }
        true
    }

    fn add_source(&mut self, id: &str, ring: &[LngLat]) {
        self.sources.retain(|(sid, _)| sid != id);
        self.sources.push((id.to_string(), ring.to_vec()));
    }

    fn add_layer(&mut self, layer: Layer) {
        self.layers.retain(|l| l.id != layer.id);
        self.layers.push(layer);
    }

    fn set_paint_property(&mut self, layer: &str, property: PaintProperty) {
        let Some(target) = self.layers.iter_mut().find(|l| l.id == layer) else {
            log::warn!("paint property on missing layer '{layer}'");
            return;
        };
        match (&mut target.kind, property) {
            (LayerKind::Fill { opacity, .. }, PaintProperty::FillOpacity(v)) => *opacity = v,
            (_, property) => {
                log::warn!("paint property {property:?} does not apply to layer '{layer}'");
            }
        }
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn fly_to(&mut self, target: CameraPose, duration: Duration, now: Instant) {
        self.camera.gc(now);
        self.camera.fly_to(target, duration, Easing::EaseInOut, now);
    }

    fn camera(&self, now: Instant) -> CameraPose {
        self.camera.pose(now)
    }

    fn hit_test(&self, point: LngLat) -> SmallVec<[String; 4]> {
        self.layers
            .iter()
            .rev()
            .filter(|l| matches!(l.kind, LayerKind::Fill { .. }))
            .filter(|l| self.source(&l.source).is_some_and(|ring| geo::contains(ring, point)))
            .map(|l| l.id.clone())
            .collect()
    }

    fn remove(&mut self) {
        self.remove_calls += 1;
        self.sources.clear();
        self.layers.clear();
        self.cursor = Cursor::Default;
        // Abandon any flight; the camera rests on its last target.
        self.camera.jump_to(self.camera.target());
        self.container = None;
    }
}
