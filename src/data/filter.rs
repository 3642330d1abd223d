use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Region filter
// ---------------------------------------------------------------------------

/// Whether a raw region cell names the requested region. Both sides are
/// compared trimmed; a record without a region never matches.
pub fn region_matches(record: &Record, region: &str) -> bool {
    record
        .region
        .as_deref()
        .is_some_and(|r| r.trim() == region.trim())
}

/// Records of `dataset` that belong to `region`, in file order.
///
/// A region that appears nowhere in the data (or a report without a region
/// column) yields an empty list, never an error.
pub fn records_in_region<'a>(dataset: &'a Dataset, region: &str) -> Vec<&'a Record> {
    dataset
        .records
        .iter()
        .filter(|r| region_matches(r, region))
        .collect()
}
