use std::path::Path;

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{DataSourceError, RowParseWarning};
use super::model::{Column, IncidentTable, SourceRecord};

// ---------------------------------------------------------------------------
// Options & output
// ---------------------------------------------------------------------------

/// Knobs for reading a backing file. The default reads comma-separated
/// `.csv`, tab-separated `.tsv` and the built-in date formats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field delimiter for delimited text; `None` picks one from the extension.
    pub delimiter: Option<u8>,
    /// Extra `strftime` patterns tried after the built-in date formats.
    pub date_formats: Vec<String>,
}

/// A loaded table plus the non-fatal cell problems found while reading it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedDataset {
    pub table: IncidentTable,
    pub warnings: Vec<RowParseWarning>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an incident table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text with a header row (comma by default)
/// * `.tsv`          – tab-separated text with a header row
/// * `.json`         – `[{ "Date": "...", "Country": "...", ... }, ...]`
/// * `.parquet`      – one column per source field, any scalar type
///
/// Only structural problems fail the load. Bad cells become nulls and are
/// reported in [`LoadedDataset::warnings`].
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<LoadedDataset, DataSourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut parser = RowParser::new(options);

    let records = match ext.as_str() {
        "csv" | "txt" => load_delimited(path, options.delimiter.unwrap_or(b','), &mut parser)?,
        "tsv" => load_delimited(path, options.delimiter.unwrap_or(b'\t'), &mut parser)?,
        "json" => load_json(path, &mut parser)?,
        "parquet" | "pq" => load_parquet(path, &mut parser)?,
        other => {
            return Err(DataSourceError::UnsupportedFormat {
                extension: other.to_string(),
            })
        }
    };

    let warnings = parser.warnings;
    for w in &warnings {
        log::debug!("{}: {w}", path.display());
    }
    if !warnings.is_empty() {
        log::warn!(
            "{}: {} cell(s) could not be parsed and were left empty",
            path.display(),
            warnings.len()
        );
    }

    let table: IncidentTable = records.into_iter().collect();
    log::info!("Loaded {} incidents from {}", table.len(), path.display());

    Ok(LoadedDataset { table, warnings })
}

// ---------------------------------------------------------------------------
// Raw rows → SourceRecord
// ---------------------------------------------------------------------------

/// The eight required cells of one row as text, indexed by [`Column`].
#[derive(Debug, Default)]
struct RawRow {
    cells: [Option<String>; 8],
}

impl RawRow {
    fn set(&mut self, column: Column, value: Option<String>) {
        self.cells[column as usize] = value;
    }

    fn get(&self, column: Column) -> Option<&str> {
        self.cells[column as usize].as_deref()
    }
}

/// Cells that mean "no value", matching common spreadsheet / dataframe exports.
fn is_missing(s: &str) -> bool {
    matches!(
        s,
        "" | "NA" | "N/A" | "NaN" | "nan" | "null" | "NULL" | "None" | "NaT"
    )
}

struct RowParser {
    dates: DateParser,
    warnings: Vec<RowParseWarning>,
}

impl RowParser {
    fn new(options: &LoadOptions) -> Self {
        RowParser {
            dates: DateParser::new(options.date_formats.clone()),
            warnings: Vec::new(),
        }
    }

    /// Text of one raw cell. Invalid UTF-8 is replaced with U+FFFD and
    /// reported.
    fn decode(&mut self, row: usize, column: Column, bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => {
                let lossy = String::from_utf8_lossy(bytes).into_owned();
                self.warnings.push(RowParseWarning {
                    row,
                    column,
                    value: lossy.clone(),
                    reason: "is not valid UTF-8",
                });
                lossy
            }
        }
    }

    fn parse(&mut self, row: usize, raw: &RawRow) -> SourceRecord {
        SourceRecord {
            date: self.field(row, raw, Column::Date, |s, p| {
                p.dates.parse(s).ok_or("is not a recognised date")
            }),
            latitude: self.field(row, raw, Column::Latitude, |s, _| parse_coordinate(s)),
            longitude: self.field(row, raw, Column::Longitude, |s, _| parse_coordinate(s)),
            country: text(raw, Column::Country),
            vessel_type: text(raw, Column::VesselType),
            incident_type: text(raw, Column::IncidentType),
            casualties: self.field(row, raw, Column::Casualties, |s, _| parse_casualties(s)),
            cargo_loss: text(raw, Column::CargoLoss),
        }
    }

    /// Parse one typed cell; failures are recorded and become `None`.
    fn field<T>(
        &mut self,
        row: usize,
        raw: &RawRow,
        column: Column,
        parse: impl Fn(&str, &Self) -> Result<T, &'static str>,
    ) -> Option<T> {
        let value = raw.get(column).map(str::trim).filter(|s| !is_missing(s))?;
        match parse(value, self) {
            Ok(v) => Some(v),
            Err(reason) => {
                self.warnings.push(RowParseWarning {
                    row,
                    column,
                    value: value.to_string(),
                    reason,
                });
                None
            }
        }
    }
}

fn text(raw: &RawRow, column: Column) -> Option<String> {
    raw.get(column)
        .map(str::trim)
        .filter(|s| !is_missing(s))
        .map(str::to_string)
}

fn parse_coordinate(s: &str) -> Result<f64, &'static str> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err("is not a finite coordinate"),
        Err(_) => Err("is not a number"),
    }
}

/// Non-negative whole number. Integral floats such as `12.0` are accepted.
fn parse_casualties(s: &str) -> Result<u32, &'static str> {
    if let Ok(n) = s.parse::<u32>() {
        return Ok(n);
    }
    let v: f64 = s.parse().map_err(|_| "is not a number")?;
    if !v.is_finite() || v.fract() != 0.0 {
        return Err("is not a whole number");
    }
    if v < 0.0 {
        return Err("is negative");
    }
    if v > f64::from(u32::MAX) {
        return Err("is out of range");
    }
    Ok(v as u32)
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %b %Y", "%b %d, %Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Permissive calendar-date parser: built-in formats first, then any
/// user-supplied ones. Time-of-day and offsets are discarded.
#[derive(Debug, Clone, Default)]
pub struct DateParser {
    extra_formats: Vec<String>,
}

impl DateParser {
    pub fn new(extra_formats: Vec<String>) -> Self {
        DateParser { extra_formats }
    }

    pub fn parse(&self, s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        let builtin = DATE_FORMATS
            .iter()
            .chain(DATETIME_FORMATS)
            .copied();
        let extra = self.extra_formats.iter().map(String::as_str);

        builtin
            .chain(extra)
            .find_map(|fmt| parse_with(s, fmt))
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    }
}

fn parse_with(s: &str, fmt: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, fmt)
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()))
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_delimited(
    path: &Path,
    delimiter: u8,
    parser: &mut RowParser,
) -> Result<Vec<SourceRecord>, DataSourceError> {
    let file = std::fs::File::open(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| DataSourceError::parse(path, "delimited", e))?
        .clone();
    let positions = resolve_columns(path, |column| {
        headers
            .iter()
            .position(|h| h.trim().trim_start_matches('\u{feff}') == column.header())
    })?;

    // Byte records so one badly encoded cell cannot fail the whole table.
    let mut records = Vec::new();
    for (row, result) in reader.byte_records().enumerate() {
        let record = result.map_err(|e| DataSourceError::parse(path, "delimited", e))?;

        let mut raw = RawRow::default();
        for (column, idx) in Column::REQUIRED.iter().zip(positions) {
            let cell = record.get(idx).map(|bytes| parser.decode(row, *column, bytes));
            raw.set(*column, cell);
        }
        records.push(parser.parse(row, &raw));
    }

    Ok(records)
}

/// Locate every required column, reporting all missing ones at once.
fn resolve_columns(
    path: &Path,
    find: impl Fn(Column) -> Option<usize>,
) -> Result<[usize; 8], DataSourceError> {
    let mut positions = [0usize; 8];
    let mut missing = Vec::new();
    for column in Column::REQUIRED {
        match find(column) {
            Some(idx) => positions[column as usize] = idx,
            None => missing.push(column),
        }
    }
    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(DataSourceError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        })
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Date": "2021-03-14", "Country": "Peru", "Casualties": 4, ... },
///   ...
/// ]
/// ```
///
/// A required key absent from every record is a missing column; a key absent
/// from only some records is a null cell. An empty array has no columns at
/// all and is rejected like a CSV without a header row.
fn load_json(path: &Path, parser: &mut RowParser) -> Result<Vec<SourceRecord>, DataSourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| DataSourceError::parse(path, "JSON", e))?;

    let rows = root
        .as_array()
        .ok_or_else(|| DataSourceError::parse(path, "JSON", "expected a top-level array"))?;

    let mut objects = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or_else(|| {
            DataSourceError::parse(path, "JSON", format!("row {i} is not an object"))
        })?;
        objects.push(obj);
    }

    resolve_columns(path, |column| {
        objects
            .iter()
            .any(|o| o.contains_key(column.header()))
            .then_some(0)
    })?;

    let records = objects
        .iter()
        .enumerate()
        .map(|(row, obj)| {
            let mut raw = RawRow::default();
            for column in Column::REQUIRED {
                raw.set(column, obj.get(column.header()).and_then(json_to_text));
            }
            parser.parse(row, &raw)
        })
        .collect();

    Ok(records)
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the incident table.
///
/// Column types are not prescribed: every cell is rendered with Arrow's
/// display formatter (so `Date32`, timestamps, integers, floats and strings
/// all work) and then goes through the same row parser as CSV.
fn load_parquet(path: &Path, parser: &mut RowParser) -> Result<Vec<SourceRecord>, DataSourceError> {
    let file = std::fs::File::open(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataSourceError::parse(path, "parquet", e))?;

    let schema = builder.schema().clone();
    let positions = resolve_columns(path, |column| schema.index_of(column.header()).ok())?;

    let reader = builder
        .build()
        .map_err(|e| DataSourceError::parse(path, "parquet", e))?;

    let mut records = Vec::new();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.map_err(|e| DataSourceError::parse(path, "parquet", e))?;

        for row in 0..batch.num_rows() {
            let mut raw = RawRow::default();
            for (column, idx) in Column::REQUIRED.iter().zip(positions) {
                let col = batch.column(idx);
                let cell = if col.is_null(row) {
                    None
                } else {
                    array_value_to_string(col.as_ref(), row).ok()
                };
                raw.set(*column, cell);
            }
            records.push(parser.parse(row_offset + row, &raw));
        }
        row_offset += batch.num_rows();
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::data::model::{Month, Severity};

    const HEADER: &str = "Date,Latitude,Longitude,Country,Vessel_Type,Incident_Type,Casualties,Cargo_Loss";

    fn write_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn write_bytes(suffix: &str, contents: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    fn load(suffix: &str, contents: &str) -> LoadedDataset {
        let file = write_file(suffix, contents);
        load_file(file.path(), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn loads_csv_and_derives_columns() {
        let ds = load(
            ".csv",
            &format!(
                "{HEADER}\n\
                 2021-01-05,1.5,2.5,X,Tanker,Collision,5,No\n\
                 2022-07-19,-3.0,40.0,Y,Cargo,Piracy,60,Yes\n"
            ),
        );

        assert!(ds.warnings.is_empty());
        let rows = ds.table.incidents();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].year, Some(2021));
        assert_eq!(rows[0].month, Some(Month::Jan));
        assert_eq!(rows[0].severity, Severity::Low);
        assert_eq!(rows[0].cargo_loss_flag, 0);
        assert_eq!(rows[0].coordinates(), Some((1.5, 2.5)));

        assert_eq!(rows[1].month_name(), Some("Jul"));
        assert_eq!(rows[1].severity, Severity::High);
        assert_eq!(rows[1].cargo_loss_flag, 1);
        assert_eq!(ds.table.catalog().countries, vec!["X".to_string(), "Y".to_string()]);
    }

    #[test]
    fn unparseable_date_keeps_row_with_null_calendar_fields() {
        let ds = load(
            ".csv",
            &format!("{HEADER}\nnot a date,1,2,X,Tanker,Collision,3,No\n"),
        );

        let row = &ds.table.incidents()[0];
        assert_eq!(row.date, None);
        assert_eq!(row.year, None);
        assert_eq!(row.month_name(), None);
        assert_eq!(row.country.as_deref(), Some("X"));
        assert_eq!(
            ds.warnings,
            vec![RowParseWarning {
                row: 0,
                column: Column::Date,
                value: "not a date".into(),
                reason: "is not a recognised date",
            }]
        );
    }

    #[test]
    fn casualty_cells_are_parsed_leniently() {
        let ds = load(
            ".csv",
            &format!(
                "{HEADER}\n\
                 2021-01-01,1,1,X,T,C,12.0,No\n\
                 2021-01-01,1,1,X,T,C,,No\n\
                 2021-01-01,1,1,X,T,C,-3,No\n\
                 2021-01-01,1,1,X,T,C,many,No\n"
            ),
        );

        let casualties: Vec<_> = ds.table.incidents().iter().map(|i| i.casualties).collect();
        assert_eq!(casualties, vec![Some(12), None, None, None]);
        let bad_rows: Vec<_> = ds.warnings.iter().map(|w| (w.row, w.column)).collect();
        assert_eq!(bad_rows, vec![(2, Column::Casualties), (3, Column::Casualties)]);
    }

    #[test]
    fn blank_and_na_cells_are_null() {
        let ds = load(
            ".csv",
            &format!("{HEADER}\n2021-02-01,NaN,,N/A,Tanker,Collision,1,\n"),
        );
        let row = &ds.table.incidents()[0];
        assert_eq!(row.latitude, None);
        assert_eq!(row.longitude, None);
        assert_eq!(row.country, None);
        assert_eq!(row.cargo_loss, None);
        assert_eq!(row.cargo_loss_flag, 0);
        assert!(ds.warnings.is_empty());
    }

    #[test]
    fn missing_columns_are_reported_together() {
        let file = write_file(".csv", "Date,Country,Latitude\n2021-01-01,X,1\n");
        let err = load_file(file.path(), &LoadOptions::default()).unwrap_err();
        match err {
            DataSourceError::MissingColumns { missing, .. } => assert_eq!(
                missing,
                vec![
                    Column::Longitude,
                    Column::VesselType,
                    Column::IncidentType,
                    Column::Casualties,
                    Column::CargoLoss,
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file(Path::new("/nonexistent/incidents.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, DataSourceError::Io { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_file(".xlsx", "");
        let err = load_file(file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataSourceError::UnsupportedFormat { extension } if extension == "xlsx"));
    }

    #[test]
    fn header_columns_may_be_reordered_and_extra() {
        let ds = load(
            ".csv",
            "Id,Cargo_Loss,Casualties,Incident_Type,Vessel_Type,Country,Longitude,Latitude,Date\n\
             7,Yes,20,Fire,Ferry,Z,4,3,2020-12-31\n",
        );
        let row = &ds.table.incidents()[0];
        assert_eq!(row.coordinates(), Some((3.0, 4.0)));
        assert_eq!(row.severity, Severity::Medium);
        assert_eq!(row.month, Some(Month::Dec));
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let ds = load(
            ".tsv",
            &format!(
                "{}\n2021-05-05\t1\t2\tX\tTanker\tCollision\t4\tNo\n",
                HEADER.replace(',', "\t")
            ),
        );
        assert_eq!(ds.table.len(), 1);
        assert_eq!(ds.table.incidents()[0].casualties, Some(4));
    }

    #[test]
    fn explicit_delimiter_overrides_extension() {
        let file = write_file(
            ".csv",
            &format!("{}\n2021-05-05;1;2;X;Tanker;Collision;4;No\n", HEADER.replace(',', ";")),
        );
        let options = LoadOptions {
            delimiter: Some(b';'),
            ..LoadOptions::default()
        };
        let ds = load_file(file.path(), &options).unwrap();
        assert_eq!(ds.table.incidents()[0].country.as_deref(), Some("X"));
    }

    #[test]
    fn loads_json_records() {
        let ds = load(
            ".json",
            r#"[
                {"Date": "2021-04-02", "Latitude": 1.0, "Longitude": 2.0, "Country": "X",
                 "Vessel_Type": "Tanker", "Incident_Type": "Fire", "Casualties": 11, "Cargo_Loss": "Yes"},
                {"Date": null, "Latitude": null, "Longitude": 2.0, "Country": "Y",
                 "Vessel_Type": "Cargo", "Incident_Type": "Fire", "Casualties": null, "Cargo_Loss": "No"}
            ]"#,
        );
        let rows = ds.table.incidents();
        assert_eq!(rows[0].severity, Severity::Medium);
        assert_eq!(rows[0].cargo_loss_flag, 1);
        assert_eq!(rows[1].date, None);
        assert_eq!(rows[1].coordinates(), None);
        assert_eq!(rows[1].severity, Severity::Low);
        assert!(ds.warnings.is_empty());
    }

    #[test]
    fn latin1_cell_is_replaced_not_fatal() {
        let mut contents = format!("{HEADER}\n2021-01-05,1.5,2.5,X,Tanker,Collision,5,No\n")
            .into_bytes();
        contents.extend_from_slice(b"2021-02-05,1.5,2.5,C\xf4te d'Ivoire,Cargo,Fire,2,No\n");
        let file = write_bytes(".csv", &contents);

        let ds = load_file(file.path(), &LoadOptions::default()).unwrap();
        let rows = ds.table.incidents();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country.as_deref(), Some("X"));
        assert_eq!(rows[1].country.as_deref(), Some("C\u{fffd}te d'Ivoire"));
        assert_eq!(rows[1].casualties, Some(2));
        assert_eq!(
            ds.warnings,
            vec![RowParseWarning {
                row: 1,
                column: Column::Country,
                value: "C\u{fffd}te d'Ivoire".into(),
                reason: "is not valid UTF-8",
            }]
        );
    }

    #[test]
    fn empty_json_array_has_no_columns() {
        let file = write_file(".json", "[]");
        let err = load_file(file.path(), &LoadOptions::default()).unwrap_err();
        match err {
            DataSourceError::MissingColumns { missing, .. } => {
                assert_eq!(missing, Column::REQUIRED.to_vec())
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_csv_is_an_empty_table() {
        let ds = load(".csv", &format!("{HEADER}\n"));
        assert!(ds.table.is_empty());
        assert!(ds.warnings.is_empty());
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        let file = write_file(".json", r#"{"Date": "2021-01-01"}"#);
        let err = load_file(file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataSourceError::Parse { format: "JSON", .. }));
    }

    #[test]
    fn loads_parquet_with_typed_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Date", DataType::Utf8, true),
            Field::new("Latitude", DataType::Float64, true),
            Field::new("Longitude", DataType::Float64, true),
            Field::new("Country", DataType::Utf8, true),
            Field::new("Vessel_Type", DataType::Utf8, true),
            Field::new("Incident_Type", DataType::Utf8, true),
            Field::new("Casualties", DataType::Int64, true),
            Field::new("Cargo_Loss", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("2023-09-01"), Some("??")])),
                Arc::new(Float64Array::from(vec![Some(1.0), None])),
                Arc::new(Float64Array::from(vec![Some(2.0), Some(3.0)])),
                Arc::new(StringArray::from(vec![Some("X"), Some("Y")])),
                Arc::new(StringArray::from(vec![Some("Tanker"), Some("Cargo")])),
                Arc::new(StringArray::from(vec![Some("Fire"), Some("Piracy")])),
                Arc::new(Int64Array::from(vec![Some(75), None])),
                Arc::new(StringArray::from(vec![Some("Yes"), Some("No")])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let out = std::fs::File::create(file.path()).unwrap();
        let mut writer = ArrowWriter::try_new(out, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path(), &LoadOptions::default()).unwrap();
        let rows = ds.table.incidents();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, Some(Month::Sep));
        assert_eq!(rows[0].casualties, Some(75));
        assert_eq!(rows[0].severity, Severity::High);
        assert_eq!(rows[1].date, None);
        assert_eq!(rows[1].latitude, None);
        assert_eq!(ds.warnings.len(), 1);
        assert_eq!(ds.warnings[0].column, Column::Date);
    }

    #[test]
    fn reloading_produces_an_identical_table() {
        let file = write_file(
            ".csv",
            &format!(
                "{HEADER}\n\
                 2021-01-05,1.5,2.5,X,Tanker,Collision,5,No\n\
                 bogus,,,Y,Cargo,Piracy,,Yes\n"
            ),
        );
        let first = load_file(file.path(), &LoadOptions::default()).unwrap();
        let second = load_file(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn date_parser_accepts_common_layouts() {
        let parser = DateParser::default();
        let expected = NaiveDate::from_ymd_opt(2021, 3, 14);
        for s in [
            "2021-03-14",
            "2021/03/14",
            "03/14/2021",
            "2021-03-14 08:30:00",
            "2021-03-14T08:30:00.250",
            "2021-03-14T08:30:00+02:00",
            "14 Mar 2021",
        ] {
            assert_eq!(parser.parse(s), expected, "{s}");
        }
        assert_eq!(parser.parse("2021-02-30"), None);
        assert_eq!(parser.parse("yesterday"), None);
    }

    #[test]
    fn date_parser_uses_extra_formats() {
        let parser = DateParser::new(vec!["%d.%m.%Y".into()]);
        assert_eq!(parser.parse("14.03.2021"), NaiveDate::from_ymd_opt(2021, 3, 14));
        assert_eq!(DateParser::default().parse("14.03.2021"), None);
    }
}
