//! Presentation configuration.
//!
//! Everything that differs between dashboard variants (palette, titles,
//! slider years, sort order, colour scale) lives here; the pipeline itself
//! is the same for all of them. A JSON file can pick a preset and override
//! any of its keys:
//!
//! ```json
//! { "preset": "classic", "years": [2015, 2016, 2017], "data_dir": "data" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::color::ColorScale;
use crate::data::aggregate::SortKey;
use crate::data::schema::{DEFAULT_REGION, REGIONS, YearSchema};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "HAPPINESS_DASH_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "happiness-dash.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Built-in dashboard variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Warm palette, 2018/2019 year slider.
    #[default]
    Sunset,
    /// Blue palette over a green choropleth, 2018 only.
    Greens,
    /// The 2015 layout: blue palette, happiest country first.
    Classic,
}

const SUNSET_PALETTE: [&str; 6] = [
    "#7B0000", "#D53C00", "#FF8700", "#F5BD1F", "#FFD93D", "#EDFF74",
];

const BLUE_PALETTE: [&str; 6] = [
    "#173F5F", "#20639B", "#3CAEA3", "#F6D55C", "#ED553B", "#ED553B",
];

/// Source attribution shown under the choropleth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub url: String,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            text: "Source: CIA World Factbook".to_string(),
            url: "https://www.cia.gov/library/publications/the-world-factbook/fields/2195.html"
                .to_string(),
        }
    }
}

/// Titles, colours and control ranges for one dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub preset: Preset,
    pub title: String,
    pub subtitle: String,
    /// Bar chart title is this prefix followed by the region.
    pub bar_title_prefix: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    /// One hex colour per component, bottom of the stack first.
    pub palette: Vec<String>,
    pub sort: SortKey,
    /// Choropleth title is the year followed by this suffix.
    pub map_title_suffix: String,
    pub color_scale: ColorScale,
    pub reverse_scale: bool,
    pub colorbar_title: String,
    pub marker_line_color: String,
    pub marker_line_width: f64,
    pub annotation: Annotation,
    /// Years offered by the slider, ascending.
    pub years: Vec<u16>,
    pub default_region: String,
    /// Folder holding `<year>.csv` (or `.json` / `.parquet`) files.
    pub data_dir: PathBuf,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self::preset(Preset::Sunset)
    }
}

impl PresentationConfig {
    pub fn preset(preset: Preset) -> Self {
        let palette = match preset {
            Preset::Sunset => &SUNSET_PALETTE,
            Preset::Greens | Preset::Classic => &BLUE_PALETTE,
        };
        let base = Self {
            preset,
            title: "World Happiness Dash".to_string(),
            subtitle: "World Happiness Based by Region".to_string(),
            bar_title_prefix: "Happiness Scores in ".to_string(),
            x_axis_title: "Country".to_string(),
            y_axis_title: "Happiness Overall".to_string(),
            palette: palette.iter().map(|c| c.to_string()).collect(),
            sort: SortKey::RankDescending,
            map_title_suffix: " World Happiness".to_string(),
            color_scale: ColorScale::Sunset,
            reverse_scale: true,
            colorbar_title: "Happiness Score".to_string(),
            marker_line_color: "darkgray".to_string(),
            marker_line_width: 0.5,
            annotation: Annotation::default(),
            years: vec![2018, 2019],
            default_region: DEFAULT_REGION.to_string(),
            data_dir: PathBuf::from("data"),
        };
        match preset {
            Preset::Sunset => base,
            Preset::Greens => Self {
                color_scale: ColorScale::Greens,
                years: vec![2018],
                ..base
            },
            Preset::Classic => Self {
                color_scale: ColorScale::Greens,
                y_axis_title: "Happiness Levels".to_string(),
                sort: SortKey::ScoreDescending,
                years: vec![2015],
                ..base
            },
        }
    }

    /// Parse a JSON config. The `preset` key picks the base, every other key
    /// overrides it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let overrides: JsonValue = serde_json::from_str(text)?;
        let JsonValue::Object(overrides) = overrides else {
            return Err(ConfigError::Invalid("expected a JSON object".to_string()));
        };

        let preset: Preset = match overrides.get("preset") {
            Some(p) => serde_json::from_value(p.clone())?,
            None => Preset::default(),
        };

        let mut merged = serde_json::to_value(Self::preset(preset))?;
        if let JsonValue::Object(base) = &mut merged {
            base.extend(overrides);
        }

        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Load from `$HAPPINESS_DASH_CONFIG`, then `./happiness-dash.json`,
    /// falling back to the default preset when neither exists.
    pub fn from_default_location() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            log::info!("Loading config from {path} (${CONFIG_ENV})");
            return Self::from_file(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            log::info!("Loading config from {}", local.display());
            return Self::from_file(local);
        }
        log::info!("No config file found, using the default preset");
        Ok(Self::default())
    }

    /// Reject year or region choices no report can satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.years.is_empty() {
            return Err(ConfigError::Invalid("years must not be empty".to_string()));
        }
        if let Some(y) = self
            .years
            .iter()
            .find(|&&y| YearSchema::for_year(y).is_err())
        {
            return Err(ConfigError::Invalid(format!("no report layout for year {y}")));
        }
        if !self.years.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConfigError::Invalid(
                "years must be strictly ascending".to_string(),
            ));
        }
        if !REGIONS.contains(&self.default_region.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown default region '{}'",
                self.default_region
            )));
        }
        Ok(())
    }

    /// Full bar chart title for a region.
    pub fn bar_title(&self, region: &str) -> String {
        format!("{}{}", self.bar_title_prefix, region)
    }

    /// Full choropleth title for a year.
    pub fn map_title(&self, year: u16) -> String {
        format!("{year}{}", self.map_title_suffix)
    }

    pub fn first_year(&self) -> u16 {
        self.years.first().copied().unwrap_or(2018)
    }
}
