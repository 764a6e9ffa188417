//! The desert region map as the page mounts it: surface, layers, selection
//! and panel wired together.

use std::sync::mpsc::Receiver;
use std::time::Instant;

use crate::catalog::{RegionCatalog, RegionId};
use crate::color::MapTheme;
use crate::config::MapConfig;
use crate::error::{MapError, Result};
use crate::events::RegionEvent;
use crate::geo::LngLat;
use crate::i18n::{Language, LocalizationResolver};
use crate::layers::RegionLayerManager;
use crate::panel::{PanelContent, RegionPanel};
use crate::selection::SelectionState;
use crate::surface::{CameraPose, Container, MapBackend, MapSurface, SurfaceEvent};

pub struct RegionMap<B: MapBackend> {
    surface: MapSurface<B>,
    layers: RegionLayerManager,
    selection: SelectionState,
    catalog: RegionCatalog,
    resolver: LocalizationResolver,
    panel: RegionPanel,
    language: Language,
}

impl<B: MapBackend> RegionMap<B> {
    /// Create the surface. Layers are registered later, when `pump` sees
    /// the surface become ready.
    pub fn mount(
        backend: B,
        container: &Container,
        config: MapConfig,
        language_tag: &str,
    ) -> Result<Self> {
        let surface = MapSurface::initialize(backend, container, config)?;
        let mut map = Self {
            surface,
            layers: RegionLayerManager::new(MapTheme::default()),
            selection: SelectionState::new(),
            catalog: RegionCatalog::builtin(),
            resolver: LocalizationResolver::builtin(),
            panel: RegionPanel::new(),
            language: Language::resolve(language_tag),
        };
        map.refresh_panel()?;
        Ok(map)
    }

    /// Drive the surface's event pump. Returns true on the call that
    /// observed `Ready` and registered the region layers.
    pub fn pump(&mut self) -> Result<bool> {
        match self.surface.poll() {
            Some(SurfaceEvent::Ready) => {
                self.layers
                    .register_all(&mut self.surface, self.catalog.all())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Pump until the layers are registered, giving up after `max_polls`.
    pub fn pump_until_ready(&mut self, max_polls: u32) -> Result<()> {
        if self.layers.is_registered() {
            return Ok(());
        }
        for _ in 0..max_polls {
            if self.pump()? {
                return Ok(());
            }
        }
        log::error!("map never became ready after {max_polls} polls");
        Err(MapError::NotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.surface.is_ready()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, tag: &str) -> Result<()> {
        let language = Language::resolve(tag);
        if language != self.language {
            log::info!("language {} -> {}", self.language.tag(), language.tag());
            self.language = language;
        }
        self.refresh_panel()?;
        Ok(())
    }

    pub fn pointer_moved(&mut self, point: LngLat, now: Instant) -> Result<()> {
        for event in self.surface.pointer_moved(point) {
            self.layers
                .handle(&mut self.surface, &mut self.selection, &event, now)?;
        }
        Ok(())
    }

    pub fn pointer_left(&mut self, now: Instant) -> Result<()> {
        for event in self.surface.pointer_left() {
            self.layers
                .handle(&mut self.surface, &mut self.selection, &event, now)?;
        }
        Ok(())
    }

    pub fn pointer_clicked(&mut self, point: LngLat, now: Instant) -> Result<()> {
        if let Some(event) = self.surface.pointer_clicked(point) {
            self.layers
                .handle(&mut self.surface, &mut self.selection, &event, now)?;
            self.refresh_panel()?;
        }
        Ok(())
    }

    /// Replay a synthetic region event as if it came from the pointer.
    pub fn dispatch(&mut self, event: RegionEvent, now: Instant) -> Result<()> {
        self.layers
            .dispatch(&mut self.surface, &mut self.selection, event, now)?;
        self.refresh_panel()?;
        Ok(())
    }

    fn refresh_panel(&mut self) -> Result<bool> {
        self.panel.refresh(
            &self.selection,
            self.language,
            &self.catalog,
            &self.resolver,
        )
    }

    pub fn panel(&self) -> &PanelContent {
        self.panel.content()
    }

    pub fn selected(&self) -> Option<RegionId> {
        self.selection.selected()
    }

    pub fn subscribe_selection(&mut self) -> Receiver<Option<RegionId>> {
        self.selection.subscribe()
    }

    pub fn subscribe_events(&mut self) -> Receiver<RegionEvent> {
        self.layers.subscribe()
    }

    pub fn camera(&self, now: Instant) -> CameraPose {
        self.surface.camera(now)
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn surface(&self) -> &MapSurface<B> {
        &self.surface
    }

    pub fn layers(&self) -> &RegionLayerManager {
        &self.layers
    }

    /// Unmount: release the surface, drop layer bookkeeping and clear the
    /// selection. Idempotent.
    pub fn teardown(&mut self) {
        self.layers.clear(&mut self.surface);
        self.surface.teardown();
        self.selection.clear();
        if let Err(e) = self.refresh_panel() {
            log::warn!("panel refresh after teardown failed: {e}");
        }
    }
}
