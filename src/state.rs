use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color::ScoreScale;
use crate::config::PresentationConfig;
use crate::data::aggregate::{SeriesSet, compute_map_series, compute_series_by};
use crate::data::cache::DatasetCache;
use crate::figure::{BarFigure, ChoroplethFigure, bar_figure, choropleth_figure};

// ---------------------------------------------------------------------------
// Chart views
// ---------------------------------------------------------------------------

/// Stacked bar chart for the current region and year.
#[derive(Debug, Clone)]
pub struct BarView {
    pub series: SeriesSet,
    pub figure: BarFigure,
}

/// Choropleth for the current year.
#[derive(Debug, Clone)]
pub struct MapView {
    pub series: SeriesSet,
    pub figure: ChoroplethFigure,
    pub scale: ScoreScale,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Every control change goes through a setter that recomputes the affected
/// chart synchronously; views are rebuilt, never patched.
pub struct AppState {
    pub config: PresentationConfig,

    /// Reports loaded so far, keyed by year.
    pub cache: DatasetCache,

    /// Current dropdown value.
    pub region: String,

    /// Current slider value.
    pub year: u16,

    /// Slider position into `config.years`; may run ahead of `year` while
    /// the handle is being dragged.
    pub slider_index: usize,

    pub bar: Option<BarView>,
    pub map: Option<MapView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: PresentationConfig) -> Self {
        let cache = DatasetCache::new(&config.data_dir, &config.years);
        let mut state = Self {
            region: config.default_region.clone(),
            year: config.first_year(),
            slider_index: 0,
            cache,
            config,
            bar: None,
            map: None,
            status_message: None,
        };
        state.refresh();
        state
    }

    /// Dropdown changed.
    pub fn set_region(&mut self, region: &str) {
        if self.region != region {
            self.region = region.to_string();
            self.status_message = None;
            self.refresh_bar();
        }
    }

    /// Slider changed. Both charts follow the year.
    pub fn set_year(&mut self, year: u16) {
        if let Some(i) = self.config.years.iter().position(|&y| y == year) {
            self.slider_index = i;
        }
        if self.year != year {
            self.year = year;
            self.refresh();
        }
    }

    /// A different data folder was chosen.
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        log::info!("Data folder set to {}", dir.display());
        self.cache.set_dir(dir);
        self.refresh();
    }

    pub fn refresh(&mut self) {
        self.status_message = None;
        self.refresh_bar();
        self.refresh_map();
    }

    /// Rebuild the stacked bar chart for the current selection.
    pub fn refresh_bar(&mut self) {
        let sort = self.config.sort;
        match self.cache.get(self.year) {
            Ok(dataset) => {
                let series = compute_series_by(dataset, &self.region, sort);
                let figure = bar_figure(&series, &self.config);
                self.bar = Some(BarView { series, figure });
            }
            Err(e) => {
                self.report(&e);
                self.bar = None;
            }
        }
    }

    /// Rebuild the choropleth for the current year.
    pub fn refresh_map(&mut self) {
        match self.cache.get(self.year) {
            Ok(dataset) => {
                let series = compute_map_series(dataset);
                let figure = choropleth_figure(&series, &self.config);
                let values = series.series.first().map(|s| s.values.as_slice()).unwrap_or(&[]);
                let scale = ScoreScale::fit(
                    self.config.color_scale,
                    self.config.reverse_scale,
                    values,
                );
                self.map = Some(MapView {
                    series,
                    figure,
                    scale,
                });
            }
            Err(e) => {
                self.report(&e);
                self.map = None;
            }
        }
    }

    fn report(&mut self, e: &anyhow::Error) {
        log::error!("Failed to load {} report: {e:#}", self.year);
        self.status_message = Some(format!("Error: {e:#}"));
    }

    /// Write the current figures as `bar.json` and `choropleth.json`.
    pub fn export_figures(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        if let Some(bar) = &self.bar {
            written.push(write_json(dir, "bar.json", &bar.figure)?);
        }
        if let Some(map) = &self.map {
            written.push(write_json(dir, "choropleth.json", &map.figure)?);
        }
        Ok(written)
    }
}

/// Serialize `value` as pretty JSON into `dir/name`.
pub fn write_json<T: serde::Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(name);
    let text = serde_json::to_string_pretty(value).context("serializing figure")?;
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}
