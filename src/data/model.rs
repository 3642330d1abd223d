use std::collections::BTreeSet;

use super::schema::{Component, YearSchema};

// ---------------------------------------------------------------------------
// Record – one row of a yearly report
// ---------------------------------------------------------------------------

/// One country's entry in a yearly happiness report.
///
/// String fields are kept exactly as read; the raw files carry stray
/// whitespace, which the pipeline strips before comparing or emitting.
/// Missing numeric cells (`N/A`, empty) are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub country: String,
    /// Absent for years whose report has no region column.
    pub region: Option<String>,
    pub overall_rank: u32,
    pub score: f64,
    /// Indexed by [`Component::index`].
    pub components: [f64; 6],
}

impl Record {
    pub fn component(&self, component: Component) -> f64 {
        self.components[component.index()]
    }
}

// ---------------------------------------------------------------------------
// Dataset – one loaded yearly report
// ---------------------------------------------------------------------------

/// The full parsed report for one year. Immutable after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Column layout the file was read with.
    pub schema: &'static YearSchema,
    /// Rows in file order.
    pub records: Vec<Record>,
    /// Distinct trimmed region labels present in the file.
    pub regions: BTreeSet<String>,
}

impl Dataset {
    /// Build the region index from the loaded records.
    pub fn from_records(schema: &'static YearSchema, records: Vec<Record>) -> Self {
        let regions = records
            .iter()
            .filter_map(|r| r.region.as_deref())
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();
        Dataset {
            schema,
            records,
            regions,
        }
    }

    pub fn year(&self) -> u16 {
        self.schema.year
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the report carries a region column at all.
    pub fn has_regions(&self) -> bool {
        self.schema.region.is_some()
    }
}
