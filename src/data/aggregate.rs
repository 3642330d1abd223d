use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::filter::records_in_region;
use super::model::{Dataset, Record};
use super::schema::Component;

/// Name of the single series the choropleth consumes.
pub const SCORE_SERIES: &str = "Score";

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Row order of a [`SeriesSet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Worst-ranked country first.
    #[default]
    RankDescending,
    /// Happiest country first.
    ScoreDescending,
}

/// One named value series, aligned to its set's country axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    /// `None` for the score series.
    pub component: Option<Component>,
    pub values: Vec<f64>,
}

/// Aligned series ready for a chart: every `values` vector has the same
/// length as `countries` and is indexed by it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSet {
    pub year: u16,
    /// Region filter the set was built with, if any.
    pub region: Option<String>,
    pub countries: Vec<String>,
    pub series: Vec<Series>,
}

impl SeriesSet {
    /// Number of countries on the axis.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn component(&self, component: Component) -> Option<&Series> {
        self.series.iter().find(|s| s.component == Some(component))
    }

    pub fn named(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// `(country, value)` pairs of one series.
    pub fn pairs<'a>(&'a self, series: &'a Series) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.countries
            .iter()
            .map(String::as_str)
            .zip(series.values.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Group & reduce
// ---------------------------------------------------------------------------

/// Per-country reduction of every numeric field.
#[derive(Debug, Clone)]
struct CountryTotals {
    country: String,
    rank: u64,
    score: f64,
    components: [f64; 6],
}

/// Sum that skips missing values; a group whose only value is missing
/// reduces to zero.
fn add_present(acc: f64, v: f64) -> f64 {
    if v.is_nan() { acc } else { acc + v }
}

/// Group records by trimmed country name and sum every numeric field.
///
/// Countries are unique within a published report, so groups normally hold a
/// single record and the sum returns it unchanged. Groups come out in
/// ascending country order.
fn group_by_country<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<CountryTotals> {
    let mut groups: BTreeMap<String, CountryTotals> = BTreeMap::new();

    for rec in records {
        let country = rec.country.trim();
        let totals = groups
            .entry(country.to_string())
            .or_insert_with(|| CountryTotals {
                country: country.to_string(),
                rank: 0,
                score: 0.0,
                components: [0.0; 6],
            });
        totals.rank += u64::from(rec.overall_rank);
        totals.score = add_present(totals.score, rec.score);
        for (acc, &v) in totals.components.iter_mut().zip(rec.components.iter()) {
            *acc = add_present(*acc, v);
        }
    }

    groups.into_values().collect()
}

fn sort_totals(rows: &mut [CountryTotals], key: SortKey) {
    match key {
        SortKey::RankDescending => rows.sort_by(|a, b| b.rank.cmp(&a.rank)),
        SortKey::ScoreDescending => rows.sort_by(|a, b| b.score.total_cmp(&a.score)),
    }
}

// ---------------------------------------------------------------------------
// Public pipeline
// ---------------------------------------------------------------------------

/// Component series for the stacked bar chart of one region, worst-ranked
/// country first.
pub fn compute_series(dataset: &Dataset, region: &str) -> SeriesSet {
    compute_series_by(dataset, region, SortKey::RankDescending)
}

/// Component series for one region with an explicit row order.
///
/// An unknown region produces an empty set: no countries, and all six series
/// present with no values.
pub fn compute_series_by(dataset: &Dataset, region: &str, sort: SortKey) -> SeriesSet {
    let matching = records_in_region(dataset, region);
    let mut rows = group_by_country(matching);
    sort_totals(&mut rows, sort);

    log::debug!(
        "{} report, region '{}': {} countries ({sort:?})",
        dataset.year(),
        region.trim(),
        rows.len()
    );

    let series = Component::ALL
        .iter()
        .map(|&c| Series {
            name: dataset.schema.display_name(c).to_string(),
            component: Some(c),
            values: rows.iter().map(|r| r.components[c.index()]).collect(),
        })
        .collect();

    SeriesSet {
        year: dataset.year(),
        region: Some(region.trim().to_string()),
        countries: rows.into_iter().map(|r| r.country).collect(),
        series,
    }
}

/// Score per country for the choropleth, over the whole report.
///
/// Countries keep the order of their first appearance in the file and are
/// emitted with full, trimmed names for the renderer's location matching.
pub fn compute_map_series(dataset: &Dataset) -> SeriesSet {
    let mut first_seen: Vec<&str> = Vec::new();
    for rec in &dataset.records {
        let name = rec.country.trim();
        if !first_seen.contains(&name) {
            first_seen.push(name);
        }
    }

    let totals: BTreeMap<String, CountryTotals> = group_by_country(&dataset.records)
        .into_iter()
        .map(|t| (t.country.clone(), t))
        .collect();

    let scores = first_seen
        .iter()
        .map(|c| totals.get(*c).map_or(0.0, |t| t.score))
        .collect();

    SeriesSet {
        year: dataset.year(),
        region: None,
        countries: first_seen.into_iter().map(str::to_string).collect(),
        series: vec![Series {
            name: SCORE_SERIES.to_string(),
            component: None,
            values: scores,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::YearSchema;

    fn record(country: &str, region: &str, rank: u32, economy: f64) -> Record {
        Record {
            country: country.to_string(),
            region: Some(region.to_string()),
            overall_rank: rank,
            score: 8.0 - rank as f64 * 0.1,
            components: [economy, 1.0, 0.8, 0.6, 0.3, 0.2],
        }
    }

    fn dataset(year: u16, records: Vec<Record>) -> Dataset {
        Dataset::from_records(YearSchema::for_year(year).unwrap(), records)
    }

    fn assert_aligned(set: &SeriesSet) {
        for s in &set.series {
            assert_eq!(s.values.len(), set.countries.len(), "series {}", s.name);
        }
    }

    #[test]
    fn rank_descending_puts_denmark_before_norway() {
        let ds = dataset(
            2018,
            vec![
                record("Norway", "Western Europe", 1, 1.6),
                record("Denmark", "Western Europe", 2, 1.5),
            ],
        );
        let set = compute_series(&ds, "Western Europe");
        assert_eq!(set.countries, vec!["Denmark", "Norway"]);
        let economy = set.named("Economy").unwrap();
        assert_eq!(economy.values, vec![1.5, 1.6]);
        let pairs: Vec<(&str, f64)> = set.pairs(economy).collect();
        assert_eq!(pairs, vec![("Denmark", 1.5), ("Norway", 1.6)]);
        assert_aligned(&set);
    }

    #[test]
    fn ranks_three_one_two_sort_to_three_two_one() {
        let ds = dataset(
            2018,
            vec![
                record("C", "Eastern Asia", 3, 0.3),
                record("A", "Eastern Asia", 1, 0.1),
                record("B", "Eastern Asia", 2, 0.2),
            ],
        );
        let set = compute_series(&ds, "Eastern Asia");
        assert_eq!(set.countries, vec!["C", "B", "A"]);
        assert_eq!(set.component(Component::Economy).unwrap().values, vec![0.3, 0.2, 0.1]);
    }

    #[test]
    fn equal_ranks_resolve_alphabetically() {
        let ds = dataset(
            2018,
            vec![
                record("Zambia", "Sub-Saharan Africa", 5, 0.1),
                record("Angola", "Sub-Saharan Africa", 5, 0.2),
            ],
        );
        let set = compute_series(&ds, "Sub-Saharan Africa");
        assert_eq!(set.countries, vec!["Angola", "Zambia"]);
    }

    #[test]
    fn every_series_shares_the_country_axis() {
        let ds = dataset(
            2015,
            vec![
                record("Mexico", "Latin America and Caribbean", 14, 1.0),
                record("Brazil", "Latin America and Caribbean", 16, 0.98),
                record("Chile", "Latin America and Caribbean", 27, 1.1),
                record("Canada", "North America", 5, 1.3),
            ],
        );
        let set = compute_series(&ds, "Latin America and Caribbean");
        assert_eq!(set.series.len(), 6);
        assert_eq!(set.len(), 3);
        assert_aligned(&set);
        let names: Vec<&str> = set.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Economy",
                "Family",
                "Life Expectancy",
                "Freedom",
                "Generosity",
                "Trust in the Government"
            ]
        );
    }

    #[test]
    fn unknown_region_yields_empty_set() {
        let ds = dataset(2018, vec![record("Norway", "Western Europe", 1, 1.6)]);
        let set = compute_series(&ds, "Atlantis");
        assert!(set.is_empty());
        assert_eq!(set.series.len(), 6);
        assert!(set.series.iter().all(|s| s.values.is_empty()));
    }

    #[test]
    fn regionless_report_yields_empty_set() {
        let mut r = record("Finland", "", 1, 1.3);
        r.region = None;
        let ds = dataset(2019, vec![r]);
        assert!(compute_series(&ds, "Western Europe").is_empty());
    }

    #[test]
    fn whitespace_is_normalised_before_matching_and_grouping() {
        let ds = dataset(
            2018,
            vec![
                record(" Norway ", " Western Europe ", 1, 1.6),
                record("Denmark", "Western Europe", 2, 1.5),
            ],
        );
        let set = compute_series(&ds, "Western Europe");
        assert_eq!(set.countries, vec!["Denmark", "Norway"]);
        assert_eq!(set.region.as_deref(), Some("Western Europe"));
    }

    #[test]
    fn sum_of_one_is_identity() {
        let r = record("Norway", "Western Europe", 1, 1.456);
        let totals = group_by_country([&r]);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].components, r.components);
        assert_eq!(totals[0].score, r.score);
        assert_eq!(totals[0].rank, 1);
    }

    #[test]
    fn duplicate_country_rows_are_summed() {
        let ds = dataset(
            2018,
            vec![
                record("Norway", "Western Europe", 1, 1.0),
                record("Norway", "Western Europe", 4, 0.5),
                record("Denmark", "Western Europe", 2, 1.5),
            ],
        );
        let set = compute_series(&ds, "Western Europe");
        assert_eq!(set.countries, vec!["Norway", "Denmark"]);
        assert_eq!(set.component(Component::Economy).unwrap().values, vec![1.5, 1.5]);
    }

    #[test]
    fn missing_value_reduces_to_zero() {
        let mut r = record("United Arab Emirates", "Middle East and Northern Africa", 20, 2.1);
        r.components[Component::Corruption.index()] = f64::NAN;
        let ds = dataset(2018, vec![r]);
        let set = compute_series(&ds, "Middle East and Northern Africa");
        assert_eq!(set.component(Component::Corruption).unwrap().values, vec![0.0]);
    }

    #[test]
    fn score_sort_puts_happiest_first() {
        let ds = dataset(
            2015,
            vec![
                record("Norway", "Western Europe", 4, 1.4),
                record("Switzerland", "Western Europe", 1, 1.39),
                record("Iceland", "Western Europe", 2, 1.3),
            ],
        );
        let set = compute_series_by(&ds, "Western Europe", SortKey::ScoreDescending);
        assert_eq!(set.countries, vec!["Switzerland", "Iceland", "Norway"]);
    }

    #[test]
    fn map_series_covers_whole_report_in_file_order() {
        let ds = dataset(
            2018,
            vec![
                record("Finland ", "Western Europe", 1, 1.3),
                record("Chad", "Sub-Saharan Africa", 130, 0.35),
                record("Canada", "North America", 7, 1.33),
            ],
        );
        let set = compute_map_series(&ds);
        assert_eq!(set.countries, vec!["Finland", "Chad", "Canada"]);
        assert_eq!(set.series.len(), 1);
        let score = set.named(SCORE_SERIES).unwrap();
        let raw: Vec<f64> = ds.records.iter().map(|r| r.score).collect();
        assert_eq!(score.values, raw);
        assert_eq!(set.region, None);
        assert_eq!(set.year, 2018);
    }
}
