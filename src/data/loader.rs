use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Record};
use super::schema::{ColumnIndex, YearSchema};

/// Extensions tried, in order, when looking for a year's file in a folder.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["csv", "json", "parquet", "pq"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one year's report from a file, reading columns through `schema`.
/// Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the published layout, one header row
/// * `.json`    – `[{ "Country": "...", "Score": 7.6, ... }, ...]`
/// * `.parquet` – one column per schema field
pub fn load_file(path: &Path, schema: &'static YearSchema) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            load_csv(file, schema)
        }
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            load_json(&text, schema)
        }
        "parquet" | "pq" => load_parquet(path, schema),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {} report from {}", schema.year, path.display()))?;

    let blank = dataset
        .records
        .iter()
        .filter(|r| r.country.trim().is_empty())
        .count();
    if blank > 0 {
        log::warn!("{} report has {blank} row(s) without a country name", schema.year);
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Cell parsing shared by all formats
// ---------------------------------------------------------------------------

fn is_missing(s: &str) -> bool {
    s.is_empty() || matches!(s, "N/A" | "NA" | "NaN" | "nan" | "null")
}

/// Parse a numeric cell. Blank and `N/A`-style cells become `NaN`, the same
/// way a data-frame reader treats them.
fn parse_number(s: &str, row: usize, col: &str) -> Result<f64> {
    let s = s.trim();
    if is_missing(s) {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .with_context(|| format!("Row {row}, '{col}': '{s}' is not a number"))
}

/// Parse the rank cell. Ranks are integers but some exports write `12.0`.
/// A missing rank counts as 0, which is what the group sum makes of it.
fn parse_rank(s: &str, row: usize, col: &str) -> Result<u32> {
    let s = s.trim();
    if is_missing(s) {
        return Ok(0);
    }
    if let Ok(r) = s.parse::<u32>() {
        return Ok(r);
    }
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => bail!("Row {row}, '{col}': '{s}' is not a rank"),
    }
}

fn rank_from_f64(v: f64, row: usize, col: &str) -> Result<u32> {
    if v.is_nan() {
        return Ok(0);
    }
    if v.fract() == 0.0 && v >= 0.0 && v <= u32::MAX as f64 {
        Ok(v as u32)
    } else {
        bail!("Row {row}, '{col}': {v} is not a rank")
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the year's column names, one country per row.
pub fn load_csv<R: Read>(input: R, schema: &'static YearSchema) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = schema.resolve(&headers)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |i: usize| row.get(i).unwrap_or("");
        records.push(build_record(schema, &idx, row_no, cell)?);
    }

    Ok(Dataset::from_records(schema, records))
}

fn build_record<'a>(
    schema: &YearSchema,
    idx: &ColumnIndex,
    row_no: usize,
    cell: impl Fn(usize) -> &'a str,
) -> Result<Record> {
    let mut components = [0.0; 6];
    for (value, (col, &i)) in components
        .iter_mut()
        .zip(schema.components.iter().zip(idx.components.iter()))
    {
        *value = parse_number(cell(i), row_no, col.column)?;
    }

    Ok(Record {
        country: cell(idx.country).to_string(),
        region: idx.region.map(|i| cell(i).to_string()),
        overall_rank: parse_rank(cell(idx.rank), row_no, schema.rank)?,
        score: parse_number(cell(idx.score), row_no, schema.score)?,
        components,
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Overall rank": 1, "Country": "Finland", "Region": "Western Europe",
///     "Score": 7.632, "GDP per capita": 1.305, ... },
///   ...
/// ]
/// ```
pub fn load_json(text: &str, schema: &'static YearSchema) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let keys: Vec<&String> = obj.keys().collect();
        let values: Vec<&JsonValue> = obj.values().collect();
        let idx = schema
            .resolve(&keys)
            .with_context(|| format!("Row {i}"))?;

        let text = |j: usize| json_to_text(values[j]);
        let number = |j: usize, col: &str| json_to_f64(values[j], i, col);

        let mut components = [0.0; 6];
        for (value, (col, &j)) in components
            .iter_mut()
            .zip(schema.components.iter().zip(idx.components.iter()))
        {
            *value = number(j, col.column)?;
        }

        records.push(Record {
            country: text(idx.country),
            region: idx.region.map(text),
            overall_rank: rank_from_f64(number(idx.rank, schema.rank)?, i, schema.rank)?,
            score: number(idx.score, schema.score)?,
            components,
        });
    }

    Ok(Dataset::from_records(schema, records))
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_to_f64(val: &JsonValue, row: usize, col: &str) -> Result<f64> {
    match val {
        JsonValue::Number(n) => n
            .as_f64()
            .with_context(|| format!("Row {row}, '{col}': {n} out of range")),
        JsonValue::String(s) => parse_number(s, row, col),
        JsonValue::Null => Ok(f64::NAN),
        other => bail!("Row {row}, '{col}': expected a number, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per schema field.
///
/// String columns may be Utf8 or LargeUtf8; numeric columns may be any of
/// Int32/Int64/Float32/Float64, or text that parses as a number.
pub fn load_parquet(path: &Path, schema: &'static YearSchema) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut row_no = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let names: Vec<String> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        let idx = schema.resolve(&names)?;

        for row in 0..batch.num_rows() {
            let text = |i: usize| extract_text(batch.column(i), row);
            let number = |i: usize, col: &str| extract_f64(batch.column(i), row, row_no, col);

            let mut components = [0.0; 6];
            for (value, (col, &i)) in components
                .iter_mut()
                .zip(schema.components.iter().zip(idx.components.iter()))
            {
                *value = number(i, col.column)?;
            }

            records.push(Record {
                country: text(idx.country)?,
                region: idx.region.map(text).transpose()?,
                overall_rank: rank_from_f64(number(idx.rank, schema.rank)?, row_no, schema.rank)?,
                score: number(idx.score, schema.score)?,
                components,
            });
            row_no += 1;
        }
    }

    Ok(Dataset::from_records(schema, records))
}

// -- Parquet / Arrow helpers --

fn extract_text(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected a string column, got {other:?}"),
    }
}

fn extract_f64(col: &Arc<dyn Array>, row: usize, row_no: usize, name: &str) -> Result<f64> {
    if col.is_null(row) {
        return Ok(f64::NAN);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        DataType::Utf8 => {
            let s = any
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            return parse_number(s.value(row), row_no, name);
        }
        other => bail!("Row {row_no}, '{name}': unsupported column type {other:?}"),
    };
    value.with_context(|| format!("Row {row_no}, '{name}': column type mismatch"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use arrow::array::ArrayRef;
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::aggregate::compute_series;
    use crate::data::schema::{Component, SchemaError};

    const CSV_2018: &str = "\
Overall rank,Country,Region,Score,GDP per capita,Social support,Healthy life expectancy,Freedom to make life choices,Generosity,Perceptions of corruption
1,Finland,Western Europe,7.632,1.305,1.592,0.874,0.681,0.202,0.393
2,Norway, Western Europe ,7.594,1.456,1.582,0.861,0.686,0.286,0.340
20,United Arab Emirates,Middle East and Northern Africa,6.774,2.096,0.776,0.670,0.284,0.186,N/A
";

    #[test]
    fn csv_reads_all_rows_in_file_order() {
        let schema = YearSchema::for_year(2018).unwrap();
        let ds = load_csv(Cursor::new(CSV_2018), schema).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[0].country, "Finland");
        assert_eq!(ds.records[1].overall_rank, 2);
        assert_eq!(ds.records[1].score, 7.594);
        assert_eq!(ds.records[0].component(Component::Economy), 1.305);
        assert_eq!(ds.records[0].component(Component::Corruption), 0.393);
    }

    #[test]
    fn csv_keeps_raw_strings_but_indexes_trimmed_regions() {
        let schema = YearSchema::for_year(2018).unwrap();
        let ds = load_csv(Cursor::new(CSV_2018), schema).unwrap();
        assert_eq!(ds.records[1].region.as_deref(), Some(" Western Europe "));
        assert!(ds.regions.contains("Western Europe"));
        assert_eq!(ds.regions.len(), 2);
    }

    #[test]
    fn csv_not_available_cell_becomes_nan() {
        let schema = YearSchema::for_year(2018).unwrap();
        let ds = load_csv(Cursor::new(CSV_2018), schema).unwrap();
        assert!(ds.records[2].component(Component::Corruption).is_nan());
    }

    #[test]
    fn csv_with_wrong_year_layout_fails() {
        let schema = YearSchema::for_year(2015).unwrap();
        let err = load_csv(Cursor::new(CSV_2018), schema).unwrap_err();
        let schema_err = err.downcast_ref::<SchemaError>().unwrap();
        assert!(matches!(schema_err, SchemaError::MissingColumn { year: 2015, .. }));
    }

    #[test]
    fn csv_bad_number_is_reported() {
        let schema = YearSchema::for_year(2019).unwrap();
        let csv = "\
Overall rank,Country,Score,GDP per capita,Social support,Healthy life expectancy,Freedom to make life choices,Generosity,Perceptions of corruption
1,Finland,seven,1.3,1.5,0.9,0.6,0.2,0.4
";
        let err = load_csv(Cursor::new(csv), schema).unwrap_err();
        assert!(format!("{err:#}").contains("'seven' is not a number"));
    }

    #[test]
    fn rank_accepts_integral_floats() {
        assert_eq!(parse_rank("12.0", 0, "rank").unwrap(), 12);
        assert!(parse_rank("1.5", 0, "rank").is_err());
        assert!(parse_rank("-3", 0, "rank").is_err());
    }

    #[test]
    fn missing_rank_counts_as_zero() {
        assert_eq!(parse_rank("N/A", 0, "rank").unwrap(), 0);
        assert_eq!(parse_rank("  ", 0, "rank").unwrap(), 0);
        assert_eq!(rank_from_f64(f64::NAN, 0, "rank").unwrap(), 0);

        let schema = YearSchema::for_year(2019).unwrap();
        let csv = "\
Overall rank,Country,Score,GDP per capita,Social support,Healthy life expectancy,Freedom to make life choices,Generosity,Perceptions of corruption
N/A,Finland,7.769,1.340,1.587,0.986,0.596,0.153,0.393
2,Denmark,7.600,1.383,1.573,0.996,0.592,0.252,0.410
";
        let ds = load_csv(Cursor::new(csv), schema).unwrap();
        assert_eq!(ds.records[0].overall_rank, 0);
        assert_eq!(ds.records[1].overall_rank, 2);
    }

    #[test]
    fn json_records_follow_the_year_layout() {
        let schema = YearSchema::for_year(2015).unwrap();
        let json = r#"[
            {"Country": "Switzerland", "Region": "Western Europe", "Happiness Rank": 1,
             "Happiness Score": 7.587, "Economy (GDP per Capita)": 1.39651, "Family": 1.34951,
             "Health (Life Expectancy)": 0.94143, "Freedom": 0.66557,
             "Trust (Government Corruption)": 0.41978, "Generosity": 0.29678,
             "Dystopia Residual": 2.51738},
            {"Country": "Iceland", "Region": "Western Europe", "Happiness Rank": 2,
             "Happiness Score": 7.561, "Economy (GDP per Capita)": 1.30232, "Family": 1.40223,
             "Health (Life Expectancy)": 0.94784, "Freedom": 0.62877,
             "Trust (Government Corruption)": null, "Generosity": "0.4363",
             "Dystopia Residual": 2.70201}
        ]"#;
        let ds = load_json(json, schema).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].country, "Switzerland");
        assert_eq!(ds.records[1].overall_rank, 2);
        assert_eq!(ds.records[1].component(Component::Generosity), 0.4363);
        assert!(ds.records[1].component(Component::Corruption).is_nan());
        assert_eq!(ds.records[0].component(Component::SocialSupport), 1.34951);
    }

    #[test]
    fn json_must_be_an_array() {
        let schema = YearSchema::for_year(2019).unwrap();
        assert!(load_json("{}", schema).is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let schema = YearSchema::for_year(2019).unwrap();
        let err = load_file(Path::new("2019.xlsx"), schema).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension: .xlsx"));
    }

    fn write_parquet_2018(name: &str, with_region: bool) -> std::path::PathBuf {
        let schema = YearSchema::for_year(2018).unwrap();
        let dir = std::env::temp_dir().join(format!(
            "happiness-dash-loader-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("2018.parquet");

        let mut fields = vec![
            Field::new(schema.rank, DataType::Int64, false),
            Field::new(schema.country, DataType::Utf8, false),
        ];
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec!["Norway", "Denmark"])),
        ];
        if with_region {
            fields.push(Field::new(schema.region.unwrap(), DataType::Utf8, false));
            columns.push(Arc::new(StringArray::from(vec![
                " Western Europe ",
                "Western Europe",
            ])));
        }
        fields.push(Field::new(schema.score, DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from(vec![7.594, 7.555])));
        for c in &schema.components {
            let values = if c.component == Component::Economy {
                vec![Some(1.6), None]
            } else {
                vec![Some(0.5), Some(0.4)]
            };
            fields.push(Field::new(c.column, DataType::Float64, true));
            columns.push(Arc::new(Float64Array::from(values)));
        }

        let arrow_schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(arrow_schema.clone(), columns).unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, arrow_schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        path
    }

    #[test]
    fn parquet_report_feeds_the_pipeline() {
        let schema = YearSchema::for_year(2018).unwrap();
        let path = write_parquet_2018("ok", true);
        let ds = load_file(&path, schema).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].country, "Norway");
        assert_eq!(ds.records[0].region.as_deref(), Some(" Western Europe "));
        assert_eq!(ds.records[1].overall_rank, 2);
        assert_eq!(ds.records[0].component(Component::Economy), 1.6);
        assert!(ds.records[1].component(Component::Economy).is_nan());
        assert_eq!(ds.regions.len(), 1);

        let set = compute_series(&ds, "Western Europe");
        assert_eq!(set.countries, vec!["Denmark", "Norway"]);
        assert_eq!(set.component(Component::Economy).unwrap().values, vec![0.0, 1.6]);
    }

    #[test]
    fn parquet_without_region_column_is_a_schema_error() {
        let schema = YearSchema::for_year(2018).unwrap();
        let path = write_parquet_2018("noregion", false);
        let err = load_file(&path, schema).unwrap_err();
        let schema_err = err.downcast_ref::<SchemaError>().unwrap();
        assert!(matches!(
            schema_err,
            SchemaError::MissingColumn { year: 2018, column } if column == "Region"
        ));
    }
}
