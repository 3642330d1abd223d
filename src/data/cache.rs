use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::loader::{SUPPORTED_EXTENSIONS, load_file};
use super::model::Dataset;
use super::schema::YearSchema;

// ---------------------------------------------------------------------------
// DatasetCache – year → loaded report
// ---------------------------------------------------------------------------

/// Loads each year's report at most once from `<dir>/<year>.<ext>`.
///
/// Only the years the dashboard offers can be requested; anything else is a
/// caller error, reported before touching the disk.
#[derive(Debug, Clone)]
pub struct DatasetCache {
    dir: PathBuf,
    years: Vec<u16>,
    loaded: BTreeMap<u16, Dataset>,
}

impl DatasetCache {
    pub fn new(dir: impl Into<PathBuf>, years: &[u16]) -> Self {
        Self {
            dir: dir.into(),
            years: years.to_vec(),
            loaded: BTreeMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn years(&self) -> &[u16] {
        &self.years
    }

    /// Point the cache at another folder, dropping everything loaded so far.
    pub fn set_dir(&mut self, dir: impl Into<PathBuf>) {
        self.dir = dir.into();
        self.loaded.clear();
    }

    pub fn is_loaded(&self, year: u16) -> bool {
        self.loaded.contains_key(&year)
    }

    /// First existing `<year>.<ext>` file in the folder.
    pub fn locate(&self, year: u16) -> Option<PathBuf> {
        SUPPORTED_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{year}.{ext}")))
            .find(|p| p.is_file())
    }

    /// The report for `year`, loading it on first use.
    pub fn get(&mut self, year: u16) -> Result<&Dataset> {
        if !self.years.contains(&year) {
            bail!("year {year} is not one of the offered years {:?}", self.years);
        }

        if !self.loaded.contains_key(&year) {
            let schema = YearSchema::for_year(year)?;
            let path = self.locate(year).with_context(|| {
                format!("no report file for {year} in {}", self.dir.display())
            })?;
            let dataset = load_file(&path, schema)?;
            log::info!(
                "Loaded {} report: {} countries, {} regions from {}",
                year,
                dataset.len(),
                dataset.regions.len(),
                path.display()
            );
            self.loaded.insert(year, dataset);
        }

        self.loaded
            .get(&year)
            .with_context(|| format!("{year} report missing from cache"))
    }
}
