//! Renderer-facing figure descriptions.
//!
//! A figure is everything a chart renderer needs besides the numbers
//! themselves: titles, axis labels, per-series colours and the stacking mode.
//! The types serialize to the `{ "data": [...], "layout": {...} }` shape
//! plotly-style web renderers accept, and the native UI draws from the same
//! values.

use serde::Serialize;

use crate::color::series_colors;
use crate::config::PresentationConfig;
use crate::data::aggregate::{SCORE_SERIES, SeriesSet};

// ---------------------------------------------------------------------------
// Shared layout pieces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Stack,
}

// ---------------------------------------------------------------------------
// Stacked bar chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarMarker {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub marker: BarMarker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarLayout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub barmode: BarMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarFigure {
    pub data: Vec<BarTrace>,
    pub layout: BarLayout,
}

/// One stacked trace per series, all sharing the set's country axis.
pub fn bar_figure(set: &SeriesSet, config: &PresentationConfig) -> BarFigure {
    let colors = series_colors(&config.palette, set.series.len());
    let data = set
        .series
        .iter()
        .zip(colors)
        .map(|(s, color)| BarTrace {
            kind: "bar",
            name: s.name.clone(),
            x: set.countries.clone(),
            y: s.values.clone(),
            marker: BarMarker { color },
        })
        .collect();

    BarFigure {
        data,
        layout: BarLayout {
            title: Title::new(config.bar_title(set.region.as_deref().unwrap_or_default())),
            xaxis: Axis {
                title: Title::new(&config.x_axis_title),
            },
            yaxis: Axis {
                title: Title::new(&config.y_axis_title),
            },
            barmode: BarMode::Stack,
        },
    }
}

// ---------------------------------------------------------------------------
// Choropleth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLine {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethMarker {
    pub line: MarkerLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethTrace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Locations are full country names, not ISO codes.
    pub locationmode: &'static str,
    pub locations: Vec<String>,
    pub z: Vec<f64>,
    pub text: Vec<String>,
    pub colorscale: &'static str,
    pub autocolorscale: bool,
    pub reversescale: bool,
    pub marker: ChoroplethMarker,
    pub colorbar: ColorBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geo {
    pub showframe: bool,
    pub showcoastlines: bool,
    pub projection: Projection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperAnnotation {
    pub x: f64,
    pub y: f64,
    pub xref: &'static str,
    pub yref: &'static str,
    pub text: String,
    pub showarrow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethLayout {
    pub title: Title,
    pub geo: Geo,
    pub annotations: Vec<PaperAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethFigure {
    pub data: Vec<ChoroplethTrace>,
    pub layout: ChoroplethLayout,
}

/// Choropleth of the set's score series. Country names the renderer cannot
/// place are left for it to drop.
pub fn choropleth_figure(set: &SeriesSet, config: &PresentationConfig) -> ChoroplethFigure {
    let z = set
        .named(SCORE_SERIES)
        .or_else(|| set.series.first())
        .map(|s| s.values.clone())
        .unwrap_or_default();

    let annotation = &config.annotation;
    ChoroplethFigure {
        data: vec![ChoroplethTrace {
            kind: "choropleth",
            locationmode: "country names",
            locations: set.countries.clone(),
            z,
            text: set.countries.clone(),
            colorscale: config.color_scale.renderer_name(),
            autocolorscale: false,
            reversescale: config.reverse_scale,
            marker: ChoroplethMarker {
                line: MarkerLine {
                    color: config.marker_line_color.clone(),
                    width: config.marker_line_width,
                },
            },
            colorbar: ColorBar {
                title: Title::new(&config.colorbar_title),
            },
        }],
        layout: ChoroplethLayout {
            title: Title::new(config.map_title(set.year)),
            geo: Geo {
                showframe: false,
                showcoastlines: false,
                projection: Projection {
                    kind: "equirectangular",
                },
            },
            annotations: vec![PaperAnnotation {
                x: 0.55,
                y: 0.1,
                xref: "paper",
                yref: "paper",
                text: format!("<a href=\"{}\">{}</a>", annotation.url, annotation.text),
                showarrow: false,
            }],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::data::aggregate::{compute_map_series, compute_series};
    use crate::data::model::{Dataset, Record};
    use crate::data::schema::YearSchema;

    fn dataset() -> Dataset {
        let rec = |country: &str, region: &str, rank: u32, score: f64| Record {
            country: country.to_string(),
            region: Some(region.to_string()),
            overall_rank: rank,
            score,
            components: [1.3, 1.5, 0.9, 0.6, 0.2, 0.4],
        };
        Dataset::from_records(
            YearSchema::for_year(2018).unwrap(),
            vec![
                rec("Finland", "Western Europe", 1, 7.632),
                rec("Norway", "Western Europe", 2, 7.594),
                rec("Chad", "Sub-Saharan Africa", 130, 4.301),
            ],
        )
    }

    #[test]
    fn bar_figure_stacks_one_trace_per_component() {
        let config = PresentationConfig::default();
        let fig = bar_figure(&compute_series(&dataset(), "Western Europe"), &config);
        assert_eq!(fig.data.len(), 6);
        assert_eq!(fig.layout.barmode, BarMode::Stack);
        assert_eq!(fig.layout.title.text, "Happiness Scores in Western Europe");
        assert_eq!(fig.layout.xaxis.title.text, "Country");
        assert_eq!(fig.layout.yaxis.title.text, "Happiness Overall");
        for (trace, color) in fig.data.iter().zip(&config.palette) {
            assert_eq!(trace.x, vec!["Norway", "Finland"]);
            assert_eq!(&trace.marker.color, color);
        }
        assert_eq!(fig.data[0].name, "Economy");
        assert_eq!(fig.data[5].name, "Perceptions of corruption");
    }

    #[test]
    fn empty_region_gives_empty_but_valid_figure() {
        let fig = bar_figure(
            &compute_series(&dataset(), "North America"),
            &PresentationConfig::default(),
        );
        assert_eq!(fig.data.len(), 6);
        assert!(fig.data.iter().all(|t| t.x.is_empty() && t.y.is_empty()));
        assert_eq!(fig.layout.title.text, "Happiness Scores in North America");
    }

    #[test]
    fn bar_figure_serializes_in_renderer_shape() {
        let fig = bar_figure(
            &compute_series(&dataset(), "Western Europe"),
            &PresentationConfig::default(),
        );
        let json = serde_json::to_value(&fig).unwrap();
        assert_eq!(json["layout"]["barmode"], "stack");
        assert_eq!(json["data"][0]["type"], "bar");
        assert_eq!(json["data"][0]["marker"]["color"], "#7B0000");
        assert_eq!(json["data"][0]["x"][1], "Finland");
    }

    #[test]
    fn choropleth_uses_country_names_and_scores() {
        let config = PresentationConfig::preset(Preset::Greens);
        let fig = choropleth_figure(&compute_map_series(&dataset()), &config);
        let trace = &fig.data[0];
        assert_eq!(trace.locationmode, "country names");
        assert_eq!(trace.locations, vec!["Finland", "Norway", "Chad"]);
        assert_eq!(trace.z, vec![7.632, 7.594, 4.301]);
        assert_eq!(trace.colorscale, "Greens");
        assert!(trace.reversescale);
        assert_eq!(fig.layout.title.text, "2018 World Happiness");

        let json = serde_json::to_value(&fig).unwrap();
        assert_eq!(json["layout"]["geo"]["projection"]["type"], "equirectangular");
        assert_eq!(json["data"][0]["colorbar"]["title"]["text"], "Happiness Score");
    }
}
