use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use happiness_dash::data::schema::{Component, YearSchema};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (country, region, typical score)
const COUNTRIES: [(&str, &str, f64); 30] = [
    ("Australia", "Australia and New Zealand", 7.28),
    ("New Zealand", "Australia and New Zealand", 7.30),
    ("Czech Republic", "Central and Eastern Europe", 6.70),
    ("Poland", "Central and Eastern Europe", 6.12),
    ("Ukraine", "Central and Eastern Europe", 4.10),
    ("Japan", "Eastern Asia", 5.92),
    ("South Korea", "Eastern Asia", 5.88),
    ("Mongolia", "Eastern Asia", 5.00),
    ("Costa Rica", "Latin America and Caribbean", 7.10),
    ("Mexico", "Latin America and Caribbean", 6.49),
    ("Brazil", "Latin America and Caribbean", 6.42),
    ("Haiti", "Latin America and Caribbean", 3.60),
    ("Israel", "Middle East and Northern Africa", 7.19),
    ("Egypt", "Middle East and Northern Africa", 4.30),
    ("United Arab Emirates", "Middle East and Northern Africa", 6.77),
    ("Canada", "North America", 7.33),
    ("United States", "North America", 6.89),
    ("Thailand", "Southeastern Asia", 6.07),
    ("Vietnam", "Southeastern Asia", 5.10),
    ("India", "Southern Asia", 4.19),
    ("Nepal", "Southern Asia", 4.88),
    ("Afghanistan", "Southern Asia", 3.40),
    ("Mauritius", "Sub-Saharan Africa", 5.89),
    ("Nigeria", "Sub-Saharan Africa", 5.16),
    ("Chad", "Sub-Saharan Africa", 4.30),
    ("Finland", "Western Europe", 7.63),
    ("Norway", "Western Europe", 7.59),
    ("Denmark", "Western Europe", 7.55),
    ("Switzerland", "Western Europe", 7.49),
    ("Greece", "Western Europe", 5.36),
];

/// Typical share of the score explained by each component.
const SHARES: [f64; 6] = [0.17, 0.20, 0.12, 0.08, 0.04, 0.02];

struct Row {
    rank: i64,
    country: String,
    region: String,
    score: f64,
    /// `None` where the published file says `N/A`.
    components: [Option<f64>; 6],
}

fn generate_year(year: u16, rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows: Vec<Row> = COUNTRIES
        .iter()
        .enumerate()
        .map(|(i, &(country, region, typical))| {
            let score = (typical + rng.gauss(0.0, 0.08)).clamp(2.5, 8.0);
            let mut components = [None; 6];
            for (slot, share) in components.iter_mut().zip(SHARES) {
                *slot = Some((score * share + rng.gauss(0.0, 0.03)).max(0.0));
            }
            // The real files pad some labels with whitespace.
            let region = if i % 7 == 0 {
                format!(" {region} ")
            } else {
                region.to_string()
            };
            Row {
                rank: 0,
                country: country.to_string(),
                region,
                score,
                components,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as i64 + 1;
    }

    // 2018 publishes one corruption figure as N/A.
    if year == 2018 {
        if let Some(row) = rows.iter_mut().find(|r| r.country == "United Arab Emirates") {
            row.components[Component::Corruption.index()] = None;
        }
    }
    rows
}

fn write_csv(path: &Path, schema: &YearSchema, rows: &[Row]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(schema.columns())?;

    for row in rows {
        let mut record = vec![row.rank.to_string(), row.country.clone()];
        if schema.region.is_some() {
            record.push(row.region.clone());
        }
        record.push(format!("{:.3}", row.score));
        record.extend(row.components.iter().map(|c| match c {
            Some(v) => format!("{v:.3}"),
            None => "N/A".to_string(),
        }));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, schema: &YearSchema, rows: &[Row]) -> Result<()> {
    let mut fields = vec![
        Field::new(schema.rank, DataType::Int64, false),
        Field::new(schema.country, DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.rank))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.country.as_str()))),
    ];
    if let Some(region) = schema.region {
        fields.push(Field::new(region, DataType::Utf8, false));
        columns.push(Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.region.as_str()),
        )));
    }
    fields.push(Field::new(schema.score, DataType::Float64, false));
    columns.push(Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.score))));
    for c in &schema.components {
        fields.push(Field::new(c.column, DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from_iter(
            rows.iter().map(|r| r.components[c.component.index()]),
        )));
    }

    let arrow_schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(arrow_schema.clone(), columns)
        .context("building record batch")?;

    let file =
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, arrow_schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    for year in YearSchema::known_years() {
        let schema = YearSchema::for_year(year)?;
        let rows = generate_year(year, &mut rng);

        // 2019 goes out as Parquet, earlier years as CSV.
        let path = if year == 2019 {
            let path = out_dir.join(format!("{year}.parquet"));
            write_parquet(&path, schema, &rows)?;
            path
        } else {
            let path = out_dir.join(format!("{year}.csv"));
            write_csv(&path, schema, &rows)?;
            path
        };
        log::info!("Wrote {} countries to {}", rows.len(), path.display());
    }

    Ok(())
}
