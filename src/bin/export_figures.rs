//! Build the bar chart and choropleth for one selection and write them as
//! JSON for an external renderer.
//!
//! ```text
//! export_figures <data_dir> <year> <region> [out_dir]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use happiness_dash::config::PresentationConfig;
use happiness_dash::data::aggregate::{compute_map_series, compute_series_by};
use happiness_dash::data::cache::DatasetCache;
use happiness_dash::figure::{bar_figure, choropleth_figure};
use happiness_dash::state::write_json;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        bail!("usage: export_figures <data_dir> <year> <region> [out_dir]");
    }
    let data_dir = PathBuf::from(&args[0]);
    let year: u16 = args[1]
        .parse()
        .with_context(|| format!("'{}' is not a year", args[1]))?;
    let region = &args[2];
    let out_dir = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let config = PresentationConfig::from_default_location()?;
    if !config.years.contains(&year) {
        log::warn!(
            "{year} is outside the configured slider years {:?}; exporting anyway",
            config.years
        );
    }

    let mut cache = DatasetCache::new(&data_dir, &[year]);
    let dataset = cache.get(year)?;

    let bar = compute_series_by(dataset, region, config.sort);
    if bar.is_empty() {
        log::warn!("no countries in region '{region}' for {year}");
    }
    let map = compute_map_series(dataset);

    write_json(&out_dir, "bar.json", &bar_figure(&bar, &config))?;
    write_json(&out_dir, "choropleth.json", &choropleth_figure(&map, &config))?;

    println!(
        "Exported {} bar countries and {} map countries to {}",
        bar.len(),
        map.len(),
        out_dir.display()
    );
    Ok(())
}
