//! Map surface lifecycle over a pluggable rendering backend.
//!
//! `MapSurface` owns the backend from `initialize` to `teardown`. It gates
//! layer registration on the one-shot `Ready` event, keeps the pointer
//! handler bindings in a slot map, and turns raw pointer input into
//! per-layer enter/leave/click events. Teardown is idempotent and also runs
//! on drop.

mod animation;
mod headless;

pub use animation::{CameraAnimator, CameraPose, Easing};
pub use headless::HeadlessBackend;

use std::collections::HashSet;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::color::Color;
use crate::config::MapConfig;
use crate::error::{MapError, Result};
use crate::geo::LngLat;

new_key_type! {
    /// Handle to a registered pointer handler binding.
    pub struct HandlerId;
}

/// Page element the map renders into.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: String,
    pub width: u32,
    pub height: u32,
    /// Whether the element is attached to the document.
    pub attached: bool,
}

impl Container {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            attached: true,
        }
    }

    /// A container not yet mounted; initializing against it fails.
    pub fn detached(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            width: 0,
            height: 0,
            attached: false,
        }
    }

    pub fn is_renderable(&self) -> bool {
        self.attached && self.width > 0 && self.height > 0
    }
}

/// Options handed to the backend when the map is created.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub style_url: String,
    pub camera: CameraPose,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl From<&MapConfig> for MapOptions {
    fn from(config: &MapConfig) -> Self {
        Self {
            style_url: config.style_url.clone(),
            camera: CameraPose::new(config.center, config.clamp_zoom(config.zoom)),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    Fill {
        color: Color,
        opacity: f32,
    },
    Line {
        color: Color,
        width: f32,
    },
    Symbol {
        text: String,
        /// Point the label is placed at.
        anchor: LngLat,
        size: f32,
        font: Vec<String>,
        color: Color,
        halo_color: Color,
        halo_width: f32,
    },
}

/// Named rendering instruction bound to a source.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintProperty {
    FillOpacity(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Enter,
    Leave,
    Click,
}

/// Pointer interaction on a specific layer, produced for bound handlers only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEvent {
    pub kind: PointerKind,
    pub layer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Ready,
}

/// Capability set the map needs from a rendering library.
pub trait MapBackend {
    /// Create the native map inside `container`.
    fn create(&mut self, container: &Container, options: &MapOptions) -> Result<()>;
    /// True once the style has loaded and layers may be added.
    fn poll_loaded(&mut self) -> bool;
    /// Register a polygon source with a single outer ring.
    fn add_source(&mut self, id: &str, ring: &[LngLat]);
    fn add_layer(&mut self, layer: Layer);
    fn set_paint_property(&mut self, layer: &str, property: PaintProperty);
    fn set_cursor(&mut self, cursor: Cursor);
    /// Animate the camera. A new call supersedes any flight in progress.
    fn fly_to(&mut self, target: CameraPose, duration: Duration, now: Instant);
    fn camera(&self, now: Instant) -> CameraPose;
    /// Fill layers whose geometry contains `point`, topmost first.
    fn hit_test(&self, point: LngLat) -> SmallVec<[String; 4]>;
    /// Release every native resource.
    fn remove(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Loading,
    Ready,
    TornDown,
}

#[derive(Debug, Clone)]
struct Binding {
    kind: PointerKind,
    layer: String,
}

pub struct MapSurface<B: MapBackend> {
    backend: B,
    config: MapConfig,
    state: SurfaceState,
    layers: HashSet<String>,
    sources: HashSet<String>,
    handlers: SlotMap<HandlerId, Binding>,
    /// Layers currently under the pointer.
    hovered: HashSet<String>,
}

impl<B: MapBackend> MapSurface<B> {
    /// Create the map in `container`. Fails without retrying when the
    /// container has no renderable area.
    pub fn initialize(mut backend: B, container: &Container, config: MapConfig) -> Result<Self> {
        if !container.is_renderable() {
            log::error!(
                "map container '{}' not renderable (attached: {}, {}x{})",
                container.id,
                container.attached,
                container.width,
                container.height
            );
            return Err(MapError::Initialization {
                container: container.id.clone(),
                width: container.width,
                height: container.height,
            });
        }
        if let Err(e) = backend.create(container, &MapOptions::from(&config)) {
            log::error!("map creation in '{}' failed: {e}", container.id);
            backend.remove();
            return Err(e);
        }
        log::info!(
            "map created in '{}' ({}x{}), zoom {}..{}",
            container.id,
            container.width,
            container.height,
            config.min_zoom,
            config.max_zoom
        );
        Ok(Self {
            backend,
            config,
            state: SurfaceState::Loading,
            layers: HashSet::new(),
            sources: HashSet::new(),
            handlers: SlotMap::with_key(),
            hovered: HashSet::new(),
        })
    }

    /// Pump the backend. Yields `Ready` exactly once per surface.
    pub fn poll(&mut self) -> Option<SurfaceEvent> {
        if self.state != SurfaceState::Loading {
            return None;
        }
        if self.backend.poll_loaded() {
            self.state = SurfaceState::Ready;
            log::info!("map surface ready");
            return Some(SurfaceEvent::Ready);
        }
        None
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SurfaceState::Ready
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            SurfaceState::Ready => Ok(()),
            SurfaceState::Loading => Err(MapError::NotReady),
            SurfaceState::TornDown => Err(MapError::TornDown),
        }
    }

    pub fn add_source(&mut self, id: &str, ring: &[LngLat]) -> Result<()> {
        self.ensure_ready()?;
        self.backend.add_source(id, ring);
        self.sources.insert(id.to_string());
        Ok(())
    }

    pub fn add_layer(&mut self, layer: Layer) -> Result<()> {
        self.ensure_ready()?;
        if !self.sources.contains(&layer.source) {
            return Err(MapError::UnknownLayer(layer.source));
        }
        self.layers.insert(layer.id.clone());
        self.backend.add_layer(layer);
        Ok(())
    }

    pub fn has_layer(&self, id: &str) -> bool {
        self.layers.contains(id)
    }

    /// Bind a pointer handler to a layer. Events for it are produced by the
    /// `pointer_*` methods.
    pub fn on(&mut self, kind: PointerKind, layer: &str) -> Result<HandlerId> {
        self.ensure_ready()?;
        if !self.layers.contains(layer) {
            return Err(MapError::UnknownLayer(layer.to_string()));
        }
        Ok(self.handlers.insert(Binding {
            kind,
            layer: layer.to_string(),
        }))
    }

    pub fn off(&mut self, handler: HandlerId) -> bool {
        self.handlers.remove(handler).is_some()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    fn is_bound(&self, kind: PointerKind, layer: &str) -> bool {
        self.handlers
            .values()
            .any(|b| b.kind == kind && b.layer == layer)
    }

    /// Paint updates after teardown are dropped.
    pub fn set_paint_property(&mut self, layer: &str, property: PaintProperty) {
        if self.state == SurfaceState::TornDown || !self.layers.contains(layer) {
            return;
        }
        self.backend.set_paint_property(layer, property);
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        if self.state == SurfaceState::TornDown {
            return;
        }
        self.backend.set_cursor(cursor);
    }

    /// Fire-and-forget camera flight, zoom clamped to the configured bounds.
    pub fn fly_to(&mut self, center: LngLat, zoom: f64, duration: Duration, now: Instant) {
        if self.state == SurfaceState::TornDown {
            return;
        }
        let target = CameraPose::new(center, self.config.clamp_zoom(zoom));
        log::debug!(
            "fly to ({:.3}, {:.3}) z{:.1} over {:?}",
            center.lng,
            center.lat,
            target.zoom,
            duration
        );
        self.backend.fly_to(target, duration, now);
    }

    pub fn camera(&self, now: Instant) -> CameraPose {
        self.backend.camera(now)
    }

    /// Pointer moved to `point`. Returns enter/leave events for every bound
    /// layer whose hover state changed; each layer is tracked on its own.
    pub fn pointer_moved(&mut self, point: LngLat) -> Vec<LayerEvent> {
        if self.state != SurfaceState::Ready {
            return Vec::new();
        }
        let under: HashSet<String> = self.backend.hit_test(point).into_iter().collect();
        self.update_hover(under)
    }

    /// Pointer left the map canvas.
    pub fn pointer_left(&mut self) -> Vec<LayerEvent> {
        if self.state != SurfaceState::Ready {
            return Vec::new();
        }
        self.update_hover(HashSet::new())
    }

    fn update_hover(&mut self, under: HashSet<String>) -> Vec<LayerEvent> {
        let mut events = Vec::new();
        let mut left: Vec<&String> = self.hovered.difference(&under).collect();
        left.sort();
        for layer in left {
            if self.is_bound(PointerKind::Leave, layer) {
                events.push(LayerEvent {
                    kind: PointerKind::Leave,
                    layer: layer.clone(),
                });
            }
        }
        let mut entered: Vec<&String> = under.difference(&self.hovered).collect();
        entered.sort();
        for layer in entered {
            if self.is_bound(PointerKind::Enter, layer) {
                events.push(LayerEvent {
                    kind: PointerKind::Enter,
                    layer: layer.clone(),
                });
            }
        }
        self.hovered = under;
        events
    }

    /// Record a hover change that did not come from the pointer, so the
    /// next pointer move diffs against it. Unknown layers are ignored.
    pub fn mark_hovered(&mut self, layer: &str, hovered: bool) {
        if self.state != SurfaceState::Ready || !self.layers.contains(layer) {
            return;
        }
        if hovered {
            self.hovered.insert(layer.to_string());
        } else {
            self.hovered.remove(layer);
        }
    }

    /// Click at `point`. Only the topmost hit layer with a click binding
    /// receives it.
    pub fn pointer_clicked(&self, point: LngLat) -> Option<LayerEvent> {
        if self.state != SurfaceState::Ready {
            return None;
        }
        self.backend
            .hit_test(point)
            .into_iter()
            .find(|layer| self.is_bound(PointerKind::Click, layer))
            .map(|layer| LayerEvent {
                kind: PointerKind::Click,
                layer,
            })
    }

    /// Release the map and every binding. Safe to call repeatedly, before
    /// `Ready`, or while a flight is in progress.
    pub fn teardown(&mut self) {
        if self.state == SurfaceState::TornDown {
            return;
        }
        let pending = self.state == SurfaceState::Loading;
        self.handlers.clear();
        self.hovered.clear();
        self.layers.clear();
        self.sources.clear();
        self.backend.remove();
        self.state = SurfaceState::TornDown;
        log::info!(
            "map surface torn down{}",
            if pending { " before ready" } else { "" }
        );
    }
}

impl<B: MapBackend> Drop for MapSurface<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_surface() -> MapSurface<HeadlessBackend> {
        let mut surface = MapSurface::initialize(
            HeadlessBackend::new(),
            &Container::new("map", 800, 600),
            MapConfig::default(),
        )
        .unwrap();
        assert_eq!(surface.poll(), Some(SurfaceEvent::Ready));
        surface
    }

    fn square(x: f64, y: f64) -> Vec<LngLat> {
        vec![
            LngLat::new(x, y),
            LngLat::new(x + 2.0, y),
            LngLat::new(x + 2.0, y + 2.0),
            LngLat::new(x, y + 2.0),
            LngLat::new(x, y),
        ]
    }

    fn add_fill(surface: &mut MapSurface<HeadlessBackend>, id: &str, ring: &[LngLat]) {
        surface.add_source(id, ring).unwrap();
        surface
            .add_layer(Layer {
                id: format!("{id}-fill"),
                source: id.to_string(),
                kind: LayerKind::Fill {
                    color: Color::hex(0xFF, 0, 0),
                    opacity: 0.5,
                },
            })
            .unwrap();
    }

    #[test]
    fn detached_container_fails() {
        let err = MapSurface::initialize(
            HeadlessBackend::new(),
            &Container::detached("map"),
            MapConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, MapError::Initialization { .. }));
    }

    #[test]
    fn zero_sized_container_fails() {
        let result = MapSurface::initialize(
            HeadlessBackend::new(),
            &Container::new("map", 0, 600),
            MapConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn ready_fires_exactly_once() {
        let mut surface = MapSurface::initialize(
            HeadlessBackend::loading_for(2),
            &Container::new("map", 800, 600),
            MapConfig::default(),
        )
        .unwrap();
        assert_eq!(surface.poll(), None);
        assert_eq!(surface.poll(), None);
        assert_eq!(surface.poll(), Some(SurfaceEvent::Ready));
        assert_eq!(surface.poll(), None);
        assert!(surface.is_ready());
    }

    #[test]
    fn registration_before_ready_is_rejected() {
        let mut surface = MapSurface::initialize(
            HeadlessBackend::loading_for(1),
            &Container::new("map", 800, 600),
            MapConfig::default(),
        )
        .unwrap();
        assert_eq!(surface.add_source("a", &square(0.0, 0.0)), Err(MapError::NotReady));
    }

    #[test]
    fn layer_needs_existing_source() {
        let mut surface = ready_surface();
        let err = surface.add_layer(Layer {
            id: "x-fill".into(),
            source: "x".into(),
            kind: LayerKind::Fill {
                color: Color::hex(0, 0, 0),
                opacity: 0.5,
            },
        });
        assert_eq!(err, Err(MapError::UnknownLayer("x".into())));
    }

    #[test]
    fn handler_on_unknown_layer_fails() {
        let mut surface = ready_surface();
        assert!(surface.on(PointerKind::Click, "nope-fill").is_err());
    }

    #[test]
    fn hover_tracked_per_layer() {
        let mut surface = ready_surface();
        add_fill(&mut surface, "a", &square(0.0, 0.0));
        add_fill(&mut surface, "b", &square(1.0, 1.0));
        for layer in ["a-fill", "b-fill"] {
            surface.on(PointerKind::Enter, layer).unwrap();
            surface.on(PointerKind::Leave, layer).unwrap();
        }

        let events = surface.pointer_moved(LngLat::new(0.5, 0.5));
        assert_eq!(
            events,
            vec![LayerEvent {
                kind: PointerKind::Enter,
                layer: "a-fill".into()
            }]
        );

        // Overlap: b entered, a stays hovered.
        let events = surface.pointer_moved(LngLat::new(1.5, 1.5));
        assert_eq!(
            events,
            vec![LayerEvent {
                kind: PointerKind::Enter,
                layer: "b-fill".into()
            }]
        );

        let events = surface.pointer_left();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind == PointerKind::Leave));
    }

    #[test]
    fn unbound_layers_produce_no_events() {
        let mut surface = ready_surface();
        add_fill(&mut surface, "a", &square(0.0, 0.0));
        assert!(surface.pointer_moved(LngLat::new(0.5, 0.5)).is_empty());
        assert!(surface.pointer_clicked(LngLat::new(0.5, 0.5)).is_none());
    }

    #[test]
    fn click_goes_to_topmost_layer() {
        let mut surface = ready_surface();
        add_fill(&mut surface, "a", &square(0.0, 0.0));
        add_fill(&mut surface, "b", &square(1.0, 1.0));
        surface.on(PointerKind::Click, "a-fill").unwrap();
        surface.on(PointerKind::Click, "b-fill").unwrap();

        let hit = surface.pointer_clicked(LngLat::new(1.5, 1.5)).unwrap();
        assert_eq!(hit.layer, "b-fill");
        let hit = surface.pointer_clicked(LngLat::new(0.5, 0.5)).unwrap();
        assert_eq!(hit.layer, "a-fill");
        assert!(surface.pointer_clicked(LngLat::new(9.0, 9.0)).is_none());
    }

    #[test]
    fn off_removes_binding() {
        let mut surface = ready_surface();
        add_fill(&mut surface, "a", &square(0.0, 0.0));
        let id = surface.on(PointerKind::Click, "a-fill").unwrap();
        assert!(surface.off(id));
        assert!(!surface.off(id));
        assert!(surface.pointer_clicked(LngLat::new(0.5, 0.5)).is_none());
    }

    #[test]
    fn fly_to_clamps_zoom() {
        let mut surface = ready_surface();
        let t0 = Instant::now();
        surface.fly_to(LngLat::new(-10.0, 28.0), 15.0, Duration::ZERO, t0);
        assert_eq!(surface.camera(t0).zoom, 9.0);
    }

    #[test]
    fn teardown_is_idempotent_and_silences_events() {
        let mut surface = ready_surface();
        add_fill(&mut surface, "a", &square(0.0, 0.0));
        surface.on(PointerKind::Enter, "a-fill").unwrap();
        surface.on(PointerKind::Click, "a-fill").unwrap();

        surface.teardown();
        surface.teardown();
        assert_eq!(surface.state(), SurfaceState::TornDown);
        assert_eq!(surface.handler_count(), 0);
        assert_eq!(surface.backend().remove_calls(), 1);
        assert!(surface.pointer_moved(LngLat::new(0.5, 0.5)).is_empty());
        assert!(surface.pointer_clicked(LngLat::new(0.5, 0.5)).is_none());
        assert_eq!(surface.add_source("b", &square(5.0, 5.0)), Err(MapError::TornDown));
    }

    #[test]
    fn teardown_before_ready_abandons_load() {
        let mut surface = MapSurface::initialize(
            HeadlessBackend::loading_for(3),
            &Container::new("map", 800, 600),
            MapConfig::default(),
        )
        .unwrap();
        surface.teardown();
        surface.teardown();
        for _ in 0..5 {
            assert_eq!(surface.poll(), None);
        }
    }

    /// Backend whose native map can never be created.
    struct BrokenBackend {
        removed: std::rc::Rc<std::cell::Cell<u32>>,
    }

    impl MapBackend for BrokenBackend {
        fn create(&mut self, container: &Container, _: &MapOptions) -> Result<()> {
            Err(MapError::Initialization {
                container: container.id.clone(),
                width: container.width,
                height: container.height,
            })
        }
        fn poll_loaded(&mut self) -> bool {
            false
        }
        fn add_source(&mut self, _: &str, _: &[LngLat]) {}
        fn add_layer(&mut self, _: Layer) {}
        fn set_paint_property(&mut self, _: &str, _: PaintProperty) {}
        fn set_cursor(&mut self, _: Cursor) {}
        fn fly_to(&mut self, _: CameraPose, _: Duration, _: Instant) {}
        fn camera(&self, _: Instant) -> CameraPose {
            CameraPose::new(LngLat::new(0.0, 0.0), 0.0)
        }
        fn hit_test(&self, _: LngLat) -> SmallVec<[String; 4]> {
            SmallVec::new()
        }
        fn remove(&mut self) {
            self.removed.set(self.removed.get() + 1);
        }
    }

    #[test]
    fn failed_create_still_removes_backend() {
        let removed = std::rc::Rc::new(std::cell::Cell::new(0));
        let result = MapSurface::initialize(
            BrokenBackend {
                removed: removed.clone(),
            },
            &Container::new("map", 800, 600),
            MapConfig::default(),
        );
        assert!(matches!(result, Err(MapError::Initialization { .. })));
        assert_eq!(removed.get(), 1);
    }

    #[test]
    fn marked_hover_is_diffed_by_next_move() {
        let mut surface = ready_surface();
        add_fill(&mut surface, "a", &square(0.0, 0.0));
        add_fill(&mut surface, "b", &square(5.0, 5.0));
        for layer in ["a-fill", "b-fill"] {
            surface.on(PointerKind::Enter, layer).unwrap();
            surface.on(PointerKind::Leave, layer).unwrap();
        }

        surface.mark_hovered("b-fill", true);
        let events = surface.pointer_moved(LngLat::new(0.5, 0.5));
        assert_eq!(
            events,
            vec![
                LayerEvent {
                    kind: PointerKind::Leave,
                    layer: "b-fill".into()
                },
                LayerEvent {
                    kind: PointerKind::Enter,
                    layer: "a-fill".into()
                },
            ]
        );

        // Still over a, but it was un-hovered from elsewhere: re-entered.
        surface.mark_hovered("a-fill", false);
        let events = surface.pointer_moved(LngLat::new(0.6, 0.6));
        assert_eq!(
            events,
            vec![LayerEvent {
                kind: PointerKind::Enter,
                layer: "a-fill".into()
            }]
        );

        surface.mark_hovered("nope-fill", true);
        assert!(surface.pointer_left().iter().all(|e| e.layer == "a-fill"));
    }

    #[test]
    fn teardown_mid_flight() {
        let mut surface = ready_surface();
        let t0 = Instant::now();
        surface.fly_to(LngLat::new(-14.0, 23.0), 6.5, Duration::from_secs(2), t0);
        surface.teardown();
        // Further flights are dropped without raising.
        surface.fly_to(LngLat::new(-8.0, 30.0), 6.5, Duration::from_secs(2), t0);
        assert_eq!(surface.backend().remove_calls(), 1);
    }
}
