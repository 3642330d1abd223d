use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Component – one ingredient of the happiness score
// ---------------------------------------------------------------------------

/// The six explained components every yearly report carries, whatever the
/// column happens to be called that year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Component {
    Economy,
    SocialSupport,
    Health,
    Freedom,
    Generosity,
    Corruption,
}

impl Component {
    /// Stacking order, bottom to top.
    pub const ALL: [Component; 6] = [
        Component::Economy,
        Component::SocialSupport,
        Component::Health,
        Component::Freedom,
        Component::Generosity,
        Component::Corruption,
    ];

    /// Position of this component in [`Component::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Component::Economy => "economy",
            Component::SocialSupport => "social support",
            Component::Health => "health",
            Component::Freedom => "freedom",
            Component::Generosity => "generosity",
            Component::Corruption => "corruption",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Regions offered by the dropdown
// ---------------------------------------------------------------------------

/// The ten region labels the region dropdown offers.
pub const REGIONS: [&str; 10] = [
    "Australia and New Zealand",
    "Central and Eastern Europe",
    "Eastern Asia",
    "Latin America and Caribbean",
    "Middle East and Northern Africa",
    "North America",
    "Southeastern Asia",
    "Southern Asia",
    "Sub-Saharan Africa",
    "Western Europe",
];

pub const DEFAULT_REGION: &str = "Central and Eastern Europe";

// ---------------------------------------------------------------------------
// YearSchema – column names for one yearly file
// ---------------------------------------------------------------------------

/// Raw column name and chart label for a single component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentColumn {
    pub component: Component,
    pub column: &'static str,
    pub display_name: &'static str,
}

/// Column layout of one year's report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSchema {
    pub year: u16,
    pub country: &'static str,
    /// The 2019 report dropped the region column.
    pub region: Option<&'static str>,
    pub rank: &'static str,
    pub score: &'static str,
    /// Ordered like [`Component::ALL`].
    pub components: [ComponentColumn; 6],
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("no column layout known for year {0}")]
    UnknownYear(u16),
    #[error("{year} report is missing column '{column}'")]
    MissingColumn { year: u16, column: String },
}

const fn col(
    component: Component,
    column: &'static str,
    display_name: &'static str,
) -> ComponentColumn {
    ComponentColumn {
        component,
        column,
        display_name,
    }
}

const SCHEMA_2015: YearSchema = YearSchema {
    year: 2015,
    country: "Country",
    region: Some("Region"),
    rank: "Happiness Rank",
    score: "Happiness Score",
    components: [
        col(Component::Economy, "Economy (GDP per Capita)", "Economy"),
        col(Component::SocialSupport, "Family", "Family"),
        col(Component::Health, "Health (Life Expectancy)", "Life Expectancy"),
        col(Component::Freedom, "Freedom", "Freedom"),
        col(Component::Generosity, "Generosity", "Generosity"),
        col(
            Component::Corruption,
            "Trust (Government Corruption)",
            "Trust in the Government",
        ),
    ],
};

const SCHEMA_2016: YearSchema = YearSchema {
    year: 2016,
    ..SCHEMA_2015
};

const SCHEMA_2017: YearSchema = YearSchema {
    year: 2017,
    country: "Country",
    region: Some("Region"),
    rank: "Happiness.Rank",
    score: "Happiness.Score",
    components: [
        col(Component::Economy, "Economy..GDP.per.Capita.", "Economy"),
        col(Component::SocialSupport, "Family", "Family"),
        col(Component::Health, "Health..Life.Expectancy.", "Life Expectancy"),
        col(Component::Freedom, "Freedom", "Freedom"),
        col(Component::Generosity, "Generosity", "Generosity"),
        col(
            Component::Corruption,
            "Trust..Government.Corruption.",
            "Trust in the Government",
        ),
    ],
};

const SCHEMA_2018: YearSchema = YearSchema {
    year: 2018,
    country: "Country",
    region: Some("Region"),
    rank: "Overall rank",
    score: "Score",
    components: [
        col(Component::Economy, "GDP per capita", "Economy"),
        col(Component::SocialSupport, "Social support", "Social support"),
        col(
            Component::Health,
            "Healthy life expectancy",
            "Healthy life expectancy",
        ),
        col(Component::Freedom, "Freedom to make life choices", "Freedom"),
        col(Component::Generosity, "Generosity", "Generosity"),
        col(
            Component::Corruption,
            "Perceptions of corruption",
            "Perceptions of corruption",
        ),
    ],
};

const SCHEMA_2019: YearSchema = YearSchema {
    year: 2019,
    region: None,
    ..SCHEMA_2018
};

static SCHEMAS: [YearSchema; 5] = [
    SCHEMA_2015,
    SCHEMA_2016,
    SCHEMA_2017,
    SCHEMA_2018,
    SCHEMA_2019,
];

impl YearSchema {
    /// Look up the column layout for a report year.
    pub fn for_year(year: u16) -> Result<&'static YearSchema, SchemaError> {
        SCHEMAS
            .iter()
            .find(|s| s.year == year)
            .ok_or(SchemaError::UnknownYear(year))
    }

    /// Every year with a known layout, oldest first.
    pub fn known_years() -> impl Iterator<Item = u16> {
        SCHEMAS.iter().map(|s| s.year)
    }

    pub fn component(&self, component: Component) -> &ComponentColumn {
        &self.components[component.index()]
    }

    /// Chart label for a component in this year's report.
    pub fn display_name(&self, component: Component) -> &'static str {
        self.component(component).display_name
    }

    /// All column names the file must provide, in header order used by the
    /// sample generator.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut cols = vec![self.rank, self.country];
        cols.extend(self.region);
        cols.push(self.score);
        cols.extend(self.components.iter().map(|c| c.column));
        cols
    }

    /// Locate every required column in `headers`. Headers are compared after
    /// trimming, since the raw files carry stray whitespace.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Result<ColumnIndex, SchemaError> {
        let find = |name: &str| -> Result<usize, SchemaError> {
            headers
                .iter()
                .position(|h| h.as_ref().trim() == name)
                .ok_or_else(|| SchemaError::MissingColumn {
                    year: self.year,
                    column: name.to_string(),
                })
        };

        let mut components = [0usize; 6];
        for (slot, c) in components.iter_mut().zip(self.components.iter()) {
            *slot = find(c.column)?;
        }

        Ok(ColumnIndex {
            country: find(self.country)?,
            region: self.region.map(&find).transpose()?,
            rank: find(self.rank)?,
            score: find(self.score)?,
            components,
        })
    }
}

/// Positions of the schema's columns within a concrete file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    pub country: usize,
    pub region: Option<usize>,
    pub rank: usize,
    pub score: usize,
    pub components: [usize; 6],
}
