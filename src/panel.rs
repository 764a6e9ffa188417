use crate::catalog::RegionCatalog;
use crate::color::Color;
use crate::error::Result;
use crate::i18n::{Language, LocalizationResolver, format_count, labels_for};
use crate::selection::SelectionState;

/// Display text for the stats panel beside the map.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    /// Nothing selected yet.
    Prompt { text: String, rtl: bool },
    Region {
        title: String,
        accent: Color,
        description: String,
        /// Caption/value pairs: population, area, cities.
        stats: Vec<(String, String)>,
        rtl: bool,
    },
}

impl PanelContent {
    pub fn is_rtl(&self) -> bool {
        match self {
            PanelContent::Prompt { rtl, .. } | PanelContent::Region { rtl, .. } => *rtl,
        }
    }

    /// Plain-text rendering, one line per item.
    pub fn lines(&self) -> Vec<String> {
        match self {
            PanelContent::Prompt { text, .. } => vec![text.clone()],
            PanelContent::Region {
                title,
                description,
                stats,
                ..
            } => {
                let mut lines = vec![title.clone(), description.clone()];
                lines.extend(stats.iter().map(|(k, v)| format!("{k}: {v}")));
                lines
            }
        }
    }
}

/// Re-derives its content when the selection or the language changes and
/// does nothing otherwise.
pub struct RegionPanel {
    /// (selection revision, language) the content was built for.
    built_for: Option<(u64, Language)>,
    content: PanelContent,
    rebuilds: u32,
}

impl RegionPanel {
    pub fn new() -> Self {
        Self {
            built_for: None,
            content: PanelContent::Prompt {
                text: String::new(),
                rtl: false,
            },
            rebuilds: 0,
        }
    }

    pub fn content(&self) -> &PanelContent {
        &self.content
    }

    /// How many times the content was rebuilt.
    pub fn rebuilds(&self) -> u32 {
        self.rebuilds
    }

    /// Rebuild if stale. Returns whether the content changed.
    pub fn refresh(
        &mut self,
        selection: &SelectionState,
        language: Language,
        catalog: &RegionCatalog,
        resolver: &LocalizationResolver,
    ) -> Result<bool> {
        let key = (selection.revision(), language);
        if self.built_for == Some(key) {
            return Ok(false);
        }

        let labels = labels_for(language);
        let rtl = language.is_rtl();
        self.content = match selection.selected() {
            None => PanelContent::Prompt {
                text: labels.click_prompt.to_string(),
                rtl,
            },
            Some(id) => {
                let region = catalog.get(id)?;
                let stats = vec![
                    (
                        labels.population.to_string(),
                        format_count(region.stats.population, language),
                    ),
                    (
                        labels.area.to_string(),
                        format!(
                            "{} km²",
                            format_count(region.stats.area_km2.round() as u64, language)
                        ),
                    ),
                    (
                        labels.cities.to_string(),
                        region.stats.city_count.to_string(),
                    ),
                ];
                PanelContent::Region {
                    title: region.name.to_string(),
                    accent: region.color,
                    description: resolver.describe_in(region, language).to_string(),
                    stats,
                    rtl,
                }
            }
        };
        self.built_for = Some(key);
        self.rebuilds += 1;
        log::debug!("panel rebuilt for rev {} ({})", key.0, language.tag());
        Ok(true)
    }
}

impl Default for RegionPanel {
    fn default() -> Self {
        Self::new()
    }
}
