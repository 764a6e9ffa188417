//! Per-region layer registration and interaction wiring.
//!
//! Every region gets one polygon source named by its id and three layers
//! named `{id}-fill`, `{id}-line` and `{id}-label`. The fill layer is also
//! the hit-test surface: hover enter/leave and click handlers bind to it.
//! Pointer input arrives as [`LayerEvent`]s from the surface, is mapped
//! back to a region and re-published as a [`RegionEvent`]; synthetic
//! `RegionEvent`s go through the same path via [`RegionLayerManager::dispatch`].

use std::collections::HashSet;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crate::catalog::{Region, RegionId};
use crate::color::MapTheme;
use crate::error::{MapError, Result};
use crate::events::{EventBus, EventLog, RegionEvent, RegionEventKind};
use crate::geo;
use crate::selection::SelectionState;
use crate::surface::{
    Cursor, HandlerId, Layer, LayerEvent, LayerKind, MapBackend, MapSurface, PaintProperty,
    PointerKind,
};

pub fn fill_layer_id(id: &str) -> String {
    format!("{id}-fill")
}

pub fn line_layer_id(id: &str) -> String {
    format!("{id}-line")
}

pub fn label_layer_id(id: &str) -> String {
    format!("{id}-label")
}

/// Names and handlers registered for one region.
#[derive(Debug, Clone)]
pub struct LayerSet {
    pub region: RegionId,
    pub source: String,
    pub fill: String,
    pub line: String,
    pub label: String,
    pub handlers: Vec<HandlerId>,
    center: geo::LngLat,
}

pub struct RegionLayerManager {
    theme: MapTheme,
    layer_sets: Vec<LayerSet>,
    hovered: HashSet<RegionId>,
    bus: EventBus,
}

impl RegionLayerManager {
    pub fn new(theme: MapTheme) -> Self {
        Self {
            theme,
            layer_sets: Vec::new(),
            hovered: HashSet::new(),
            bus: EventBus::new(),
        }
    }

    /// Register sources, layers and handlers for `regions`, in order. Must
    /// run once, after the surface is ready.
    pub fn register_all<B: MapBackend>(
        &mut self,
        surface: &mut MapSurface<B>,
        regions: &[Region],
    ) -> Result<()> {
        if !self.layer_sets.is_empty() {
            return Err(MapError::AlreadyRegistered);
        }
        if !surface.is_ready() {
            return Err(MapError::NotReady);
        }

        let fill_opacity = surface.config().fill_opacity;
        let outline_width = surface.config().outline_width;
        for region in regions {
            let set = self.register_region(surface, region, fill_opacity, outline_width)?;
            self.layer_sets.push(set);
        }
        log::info!(
            "registered {} regions ({} layers, {} handlers)",
            self.layer_sets.len(),
            self.layer_sets.len() * 3,
            surface.handler_count()
        );
        Ok(())
    }

    fn register_region<B: MapBackend>(
        &self,
        surface: &mut MapSurface<B>,
        region: &Region,
        fill_opacity: f32,
        outline_width: f32,
    ) -> Result<LayerSet> {
        let source = region.id.to_string();
        let fill = fill_layer_id(region.id);
        let line = line_layer_id(region.id);
        let label = label_layer_id(region.id);

        surface.add_source(&source, region.polygon)?;
        surface.add_layer(Layer {
            id: fill.clone(),
            source: source.clone(),
            kind: LayerKind::Fill {
                color: region.color,
                opacity: fill_opacity,
            },
        })?;
        surface.add_layer(Layer {
            id: line.clone(),
            source: source.clone(),
            kind: LayerKind::Line {
                color: region.color,
                width: outline_width,
            },
        })?;
        let anchor = geo::centroid(region.polygon).unwrap_or(region.center);
        surface.add_layer(Layer {
            id: label.clone(),
            source: source.clone(),
            kind: LayerKind::Symbol {
                text: region.name.to_uppercase(),
                anchor,
                size: self.theme.label_size,
                font: self.theme.label_font.clone(),
                color: self.theme.label_text,
                halo_color: self.theme.label_halo,
                halo_width: self.theme.label_halo_width,
            },
        })?;

        let handlers = vec![
            surface.on(PointerKind::Enter, &fill)?,
            surface.on(PointerKind::Leave, &fill)?,
            surface.on(PointerKind::Click, &fill)?,
        ];
        log::debug!("registered layers for region '{}'", region.id);

        Ok(LayerSet {
            region: region.id,
            source,
            fill,
            line,
            label,
            handlers,
            center: region.center,
        })
    }

    pub fn layer_sets(&self) -> &[LayerSet] {
        &self.layer_sets
    }

    pub fn is_registered(&self) -> bool {
        !self.layer_sets.is_empty()
    }

    pub fn is_hovered(&self, region: &str) -> bool {
        self.hovered.contains(region)
    }

    pub fn subscribe(&mut self) -> Receiver<RegionEvent> {
        self.bus.subscribe()
    }

    pub fn history(&self) -> &EventLog {
        self.bus.log()
    }

    fn layer_set(&self, region: &str) -> Result<&LayerSet> {
        self.layer_sets
            .iter()
            .find(|s| s.region == region)
            .ok_or_else(|| MapError::UnknownRegion(region.to_string()))
    }

    /// Route a pointer event from the surface. Events on layers this
    /// manager did not register are ignored.
    pub fn handle<B: MapBackend>(
        &mut self,
        surface: &mut MapSurface<B>,
        selection: &mut SelectionState,
        event: &LayerEvent,
        now: Instant,
    ) -> Result<()> {
        let Some(region) = self
            .layer_sets
            .iter()
            .find(|s| s.fill == event.layer)
            .map(|s| s.region)
        else {
            log::debug!("ignoring {:?} on foreign layer '{}'", event.kind, event.layer);
            return Ok(());
        };
        let kind = match event.kind {
            PointerKind::Enter => RegionEventKind::Hover,
            PointerKind::Leave => RegionEventKind::Leave,
            PointerKind::Click => RegionEventKind::Click,
        };
        self.dispatch(surface, selection, RegionEvent { kind, region }, now)
    }

    /// Apply a region event and publish it to subscribers.
    pub fn dispatch<B: MapBackend>(
        &mut self,
        surface: &mut MapSurface<B>,
        selection: &mut SelectionState,
        event: RegionEvent,
        now: Instant,
    ) -> Result<()> {
        let set = self.layer_set(event.region)?;
        let region = set.region;
        let fill = set.fill.clone();
        let center = set.center;

        match event.kind {
            RegionEventKind::Hover => {
                self.hovered.insert(region);
                surface.mark_hovered(&fill, true);
                let opacity = surface.config().hover_opacity;
                surface.set_paint_property(&fill, PaintProperty::FillOpacity(opacity));
                surface.set_cursor(Cursor::Pointer);
            }
            RegionEventKind::Leave => {
                self.hovered.remove(region);
                surface.mark_hovered(&fill, false);
                let opacity = surface.config().fill_opacity;
                surface.set_paint_property(&fill, PaintProperty::FillOpacity(opacity));
                if self.hovered.is_empty() {
                    surface.set_cursor(Cursor::Default);
                }
            }
            RegionEventKind::Click => {
                selection.select(region);
                let zoom = surface.config().fly_zoom;
                let duration = Duration::from_millis(surface.config().fly_duration_ms);
                surface.fly_to(center, zoom, duration, now);
                log::info!("selected region '{region}'");
            }
        }
        self.bus.publish(RegionEvent {
            kind: event.kind,
            region,
        });
        Ok(())
    }

    /// Unbind every handler, forget the layer sets and disconnect
    /// subscribers. The surface owns the native layers and releases them in
    /// its own teardown.
    pub fn clear<B: MapBackend>(&mut self, surface: &mut MapSurface<B>) {
        for set in self.layer_sets.drain(..) {
            for handler in set.handlers {
                surface.off(handler);
            }
        }
        self.hovered.clear();
        self.bus.close();
    }
}
