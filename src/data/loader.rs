use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{columns, Opportunity, OpportunityTable};
use crate::error::{DataSourceError, SourcePosition};

// ---------------------------------------------------------------------------
// Process-wide cache
// ---------------------------------------------------------------------------

type TableCache = HashMap<PathBuf, Arc<OpportunityTable>>;

static CACHE: OnceLock<Mutex<TableCache>> = OnceLock::new();

fn cache() -> MutexGuard<'static, TableCache> {
    CACHE
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Load a dataset, memoized per canonical path for the process lifetime.
///
/// Only successful loads are cached. There is no TTL: new data on disk is
/// picked up after [`invalidate`] or [`clear_cache`].
pub fn load(path: &Path) -> Result<Arc<OpportunityTable>, DataSourceError> {
    let key = path.canonicalize().map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(table) = cache().get(&key) {
        log::debug!("Dataset cache hit for {}", key.display());
        return Ok(Arc::clone(table));
    }

    let table = Arc::new(load_file(&key)?);
    log::info!(
        "Loaded {} opportunities from {} ({} regions, {} segments)",
        table.len(),
        key.display(),
        table.regions.len(),
        table.segments.len()
    );

    // First writer wins so every caller shares one table.
    let cached = cache().entry(key).or_insert(table).clone();
    Ok(cached)
}

/// Drop the cached table for one path. Returns whether an entry existed.
pub fn invalidate(path: &Path) -> bool {
    let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let removed = cache().remove(&key).is_some();
    if removed {
        log::info!("Invalidated cached dataset {}", key.display());
    }
    removed
}

/// Drop every cached table.
pub fn clear_cache() {
    let mut cache = cache();
    log::info!("Clearing {} cached dataset(s)", cache.len());
    cache.clear();
}

// ---------------------------------------------------------------------------
// Uncached entry-point
// ---------------------------------------------------------------------------

/// Load an opportunity table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` or no extension – header row + one opportunity per line
/// * `.json`    – `[{ "Deal_ID": ..., "Region": ..., ... }, ...]`
/// * `.parquet` – one column per field, any Arrow type with a text rendering
pub fn load_file(path: &Path) -> Result<OpportunityTable, DataSourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "" | "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataSourceError::UnsupportedFormat(other.to_string())),
    }
}

fn open(path: &Path) -> Result<File, DataSourceError> {
    File::open(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Schema: positions of the required columns
// ---------------------------------------------------------------------------

/// Position of every required column in the source header.
///
/// Resolved once per source so a renamed or missing column fails the load
/// before any row is read.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    deal_id: usize,
    region: usize,
    segment: usize,
    stage: usize,
    size: usize,
    lead_source: usize,
    salesperson: usize,
    closure_date: usize,
}

impl ColumnIndex {
    fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, DataSourceError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.as_ref() == name)
                .ok_or(DataSourceError::MissingColumn(name))
        };

        // `Company_Size` is the raw name; sources already renamed are accepted.
        let segment = find(columns::COMPANY_SIZE).or_else(|_| {
            find(columns::CUSTOMER_SEGMENT)
                .map_err(|_| DataSourceError::MissingColumn(columns::COMPANY_SIZE))
        })?;

        Ok(ColumnIndex {
            deal_id: find(columns::DEAL_ID)?,
            region: find(columns::REGION)?,
            segment,
            stage: find(columns::DEAL_STAGE)?,
            size: find(columns::DEAL_SIZE)?,
            lead_source: find(columns::LEAD_SOURCE)?,
            salesperson: find(columns::SALESPERSON)?,
            closure_date: find(columns::DEAL_CLOSURE_DATE)?,
        })
    }

    /// Build one opportunity from the cells of a source row.
    ///
    /// `cell` returns `None` for null / empty cells. `Deal_ID` and `Deal_Size`
    /// must be present; blank categorical cells become empty labels, which
    /// every grouping skips.
    fn opportunity(
        &self,
        at: SourcePosition,
        cell: impl Fn(usize) -> Option<String>,
    ) -> Result<Opportunity, DataSourceError> {
        let invalid = |column: &'static str, value: String| DataSourceError::InvalidValue {
            at,
            column,
            value,
        };
        let label = |idx: usize| cell(idx).unwrap_or_default();

        let deal_id = cell(self.deal_id).ok_or_else(|| invalid(columns::DEAL_ID, String::new()))?;
        let raw_size = cell(self.size).ok_or_else(|| invalid(columns::DEAL_SIZE, String::new()))?;
        let deal_size = parse_amount(&raw_size)
            .ok_or_else(|| invalid(columns::DEAL_SIZE, raw_size.clone()))?;

        Ok(Opportunity {
            deal_id,
            region: label(self.region),
            customer_segment: label(self.segment),
            deal_stage: label(self.stage),
            deal_size,
            lead_source: label(self.lead_source),
            salesperson: label(self.salesperson),
            deal_closure_date: cell(self.closure_date),
        })
    }
}

/// Parse a monetary cell, tolerating a sign, a `£` and thousands separators
/// (`-£1,500` reads back what [`gbp`](crate::report::format::gbp) writes).
fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let cleaned: String = unsigned
        .strip_prefix('£')
        .unwrap_or(unsigned)
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if negative && cleaned.starts_with(['-', '+']) {
        return None;
    }
    let value = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -value } else { value })
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<OpportunityTable, DataSourceError> {
    read_csv(open(path)?)
}

/// CSV layout: header row with column names, one opportunity per record.
/// Columns not named in the schema are ignored.
pub fn read_csv<R: Read>(reader: R) -> Result<OpportunityTable, DataSourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let index = ColumnIndex::resolve(&headers)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        // Quoted fields may span lines, so ask the reader where the record began.
        let at = SourcePosition::Line(record.position().map_or(0, |p| p.line()));
        let row = index.opportunity(at, |i| record.get(i).and_then(non_empty))?;
        rows.push(row);
    }

    Ok(OpportunityTable::from_rows(rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Deal_ID": 1, "Region": "UK", "Company_Size": "SMB", "Deal_Size": 1200.0, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<OpportunityTable, DataSourceError> {
    let mut text = String::new();
    open(path)?
        .read_to_string(&mut text)
        .map_err(|source| DataSourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<OpportunityTable, DataSourceError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root
        .as_array()
        .ok_or_else(|| DataSourceError::NotTabular("expected a top-level JSON array".into()))?;

    let objects: Vec<&Map<String, JsonValue>> = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            rec.as_object()
                .ok_or_else(|| DataSourceError::NotTabular(format!("record {i} is not an object")))
        })
        .collect::<Result<_, _>>()?;

    let Some(first) = objects.first() else {
        return Ok(OpportunityTable::default());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let index = ColumnIndex::resolve(&headers)?;

    let mut rows = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        let at = SourcePosition::Record(i + 1);
        let row = index.opportunity(at, |col| obj.get(headers[col]).and_then(json_to_text))?;
        rows.push(row);
    }

    Ok(OpportunityTable::from_rows(rows))
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => non_empty(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing opportunities.
///
/// Each schema column is read through Arrow's display formatting, so integer
/// IDs, float sizes, `Date32` and timestamp closure dates all work.
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<OpportunityTable, DataSourceError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let index = ColumnIndex::resolve(&headers)?;

    let reader = builder.build()?;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let offset = rows.len();

        for row in 0..batch.num_rows() {
            let cells = (0..batch.num_columns())
                .map(|col| cell_text(batch.column(col).as_ref(), row))
                .collect::<Result<Vec<_>, _>>()?;
            let at = SourcePosition::Record(offset + row + 1);
            rows.push(index.opportunity(at, |col| cells[col].clone())?);
        }
    }

    Ok(OpportunityTable::from_rows(rows))
}

fn cell_text(array: &dyn Array, row: usize) -> Result<Option<String>, DataSourceError> {
    if array.is_null(row) {
        return Ok(None);
    }
    Ok(non_empty(&array_value_to_string(array, row)?))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{
        ArrayRef, Date32Array, Float64Array, Int64Array, StringArray, TimestampNanosecondArray,
    };
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::CLOSED_WON;
    use crate::report::format::gbp;
    use crate::report::revenue::revenue_report;

    /// Serializes the tests that observe or clear the process-wide cache.
    static CACHE_LOCK: Mutex<()> = Mutex::new(());

    fn cache_lock() -> MutexGuard<'static, ()> {
        CACHE_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    const HEADER: &str =
        "Deal_ID,Region,Company_Size,Deal_Stage,Deal_Size,Lead_Source,Salesperson,Deal_Closure_Date";

    fn csv_bytes(rows: &[&str]) -> Vec<u8> {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.into_bytes()
    }

    fn write_temp(suffix: &str, content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn csv_renames_company_size_to_segment() {
        let table = read_csv(&csv_bytes(&[
            "1,UK,SMB,Closed Won,100,Website,Alice,2025-01-10",
            "2,US,Enterprise,Proposal,\"£2,500\",Referral,Bob,",
        ])[..])
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].customer_segment, "SMB");
        assert_eq!(table.rows[0].deal_stage, CLOSED_WON);
        assert_eq!(table.rows[1].deal_size, 2500.0);
        assert_eq!(table.rows[1].deal_closure_date, None);
        assert!(table.segments.contains("Enterprise"));
    }

    #[test]
    fn csv_accepts_already_renamed_segment_column() {
        let text = "Deal_ID,Region,Customer_Segment,Deal_Stage,Deal_Size,Lead_Source,Salesperson,Deal_Closure_Date,Notes\n\
                    7,DE,SMB,Open,10.5,Event,Cara,garbage,extra";
        let table = read_csv(text.as_bytes()).unwrap();
        assert_eq!(table.rows[0].customer_segment, "SMB");
        assert_eq!(table.rows[0].deal_closure_date.as_deref(), Some("garbage"));
    }

    #[test]
    fn missing_column_fails_before_rows() {
        let text = "Deal_ID,Region,Company_Size,Deal_Stage,Deal_Size,Salesperson,Deal_Closure_Date\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn(columns::LEAD_SOURCE)));

        let text = "Deal_ID,Region,Deal_Stage,Deal_Size,Lead_Source,Salesperson,Deal_Closure_Date\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn(columns::COMPANY_SIZE)));
    }

    #[test]
    fn non_numeric_deal_size_reports_line() {
        let err = read_csv(&csv_bytes(&[
            "1,UK,SMB,Open,100,Website,Alice,",
            "2,UK,SMB,Open,lots,Website,Alice,",
        ])[..])
        .unwrap_err();
        match err {
            DataSourceError::InvalidValue { at, column, value } => {
                assert_eq!(at, SourcePosition::Line(3));
                assert_eq!(column, columns::DEAL_SIZE);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn multiline_record_reports_its_first_line() {
        let err = read_csv(&csv_bytes(&[
            "1,UK,SMB,Open,100,Website,\"Alice\nSmith\",",
            "2,UK,SMB,Open,lots,Website,Bob,",
        ])[..])
        .unwrap_err();
        assert!(matches!(
            err,
            DataSourceError::InvalidValue { at: SourcePosition::Line(4), .. }
        ));
        assert!(err.to_string().starts_with("line 4:"));
    }

    #[test]
    fn amounts_accept_sign_currency_and_grouping() {
        assert_eq!(parse_amount("£2,500"), Some(2500.0));
        assert_eq!(parse_amount(" -£1,500 "), Some(-1500.0));
        assert_eq!(parse_amount(&gbp(-1500.0)), Some(-1500.0));
        assert_eq!(parse_amount("-12.5"), Some(-12.5));
        assert_eq!(parse_amount("--5"), None);
        assert_eq!(parse_amount("£"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn blank_labels_are_kept_as_empty() {
        let table = read_csv(&csv_bytes(&[
            "1,UK,SMB,Closed Won,100,,,2025-01-10",
            "2,,SMB,,40,Event,Bob,",
        ])[..])
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].lead_source, "");
        assert_eq!(table.rows[0].salesperson, "");
        assert_eq!(table.rows[1].region, "");
        let regions: Vec<&str> = table.regions.iter().map(String::as_str).collect();
        assert_eq!(regions, ["UK"]);
        assert!(!table.stages.contains(""));
    }

    #[test]
    fn empty_deal_id_is_invalid() {
        let err = read_csv(&csv_bytes(&[",UK,SMB,Open,100,Website,Alice,"])[..]).unwrap_err();
        assert!(matches!(
            err,
            DataSourceError::InvalidValue { column: columns::DEAL_ID, .. }
        ));
    }

    #[test]
    fn json_records_with_numeric_ids() {
        let text = r#"[
            {"Deal_ID": 1, "Region": "UK", "Company_Size": "SMB", "Deal_Stage": "Closed Won",
             "Deal_Size": 1200.5, "Lead_Source": "Website", "Salesperson": "Alice",
             "Deal_Closure_Date": "2025-01-10"},
            {"Deal_ID": 2, "Region": "US", "Company_Size": "SMB", "Deal_Stage": "Open",
             "Deal_Size": 300, "Lead_Source": "Event", "Salesperson": "Bob",
             "Deal_Closure_Date": null}
        ]"#;
        let table = parse_json(text).unwrap();
        assert_eq!(table.rows[0].deal_id, "1");
        assert_eq!(table.rows[0].deal_size, 1200.5);
        assert_eq!(table.rows[1].deal_closure_date, None);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(matches!(parse_json("{}"), Err(DataSourceError::NotTabular(_))));
        assert!(matches!(parse_json("[1, 2]"), Err(DataSourceError::NotTabular(_))));
        assert!(matches!(parse_json("[{"), Err(DataSourceError::Json(_))));
        assert!(parse_json("[]").unwrap().is_empty());
    }

    #[test]
    fn json_errors_name_the_record() {
        let text = r#"[
            {"Deal_ID": 1, "Region": "UK", "Company_Size": "SMB", "Deal_Stage": "Open",
             "Deal_Size": 10, "Lead_Source": "Web", "Salesperson": "Al", "Deal_Closure_Date": null},
            {"Deal_ID": 2, "Region": "UK", "Company_Size": "SMB", "Deal_Stage": "Open",
             "Deal_Size": "lots", "Lead_Source": "Web", "Salesperson": "Al",
             "Deal_Closure_Date": null}
        ]"#;
        let err = parse_json(text).unwrap_err();
        assert!(matches!(
            err,
            DataSourceError::InvalidValue { at: SourcePosition::Record(2), .. }
        ));
        assert!(err.to_string().starts_with("record 2:"));
    }

    /// Two deals (1 won and dated, 2 open with a null date) in a Parquet file.
    fn write_parquet(closure_dates: ArrayRef) -> tempfile::NamedTempFile {
        let schema = Arc::new(Schema::new(vec![
            Field::new(columns::DEAL_ID, DataType::Int64, false),
            Field::new(columns::REGION, DataType::Utf8, false),
            Field::new(columns::COMPANY_SIZE, DataType::Utf8, false),
            Field::new(columns::DEAL_STAGE, DataType::Utf8, false),
            Field::new(columns::DEAL_SIZE, DataType::Float64, false),
            Field::new(columns::LEAD_SOURCE, DataType::Utf8, false),
            Field::new(columns::SALESPERSON, DataType::Utf8, false),
            Field::new(columns::DEAL_CLOSURE_DATE, closure_dates.data_type().clone(), true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec!["UK", "US"])),
            Arc::new(StringArray::from(vec!["SMB", "Enterprise"])),
            Arc::new(StringArray::from(vec![CLOSED_WON, "Proposal"])),
            Arc::new(Float64Array::from(vec![100.0, 50.0])),
            Arc::new(StringArray::from(vec!["Website", "Event"])),
            Arc::new(StringArray::from(vec!["Alice", "Bob"])),
            closure_dates,
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer =
            ArrowWriter::try_new(File::create(file.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    fn assert_parquet_opportunities(table: &OpportunityTable, first_date: &str) {
        assert_eq!(table.len(), 2);
        let first = &table.rows[0];
        assert_eq!(first.deal_id, "1");
        assert_eq!(first.customer_segment, "SMB");
        assert_eq!(first.deal_size, 100.0);
        assert_eq!(first.deal_closure_date.as_deref(), Some(first_date));
        assert_eq!(table.rows[1].deal_id, "2");
        assert_eq!(table.rows[1].deal_closure_date, None);

        let rows: Vec<&Opportunity> = table.rows.iter().collect();
        let metrics = revenue_report(&rows).metrics;
        assert_eq!(metrics.total_revenue, 100.0);
        assert_eq!(metrics.total_closed_won, 1);
        assert_eq!(metrics.total_deals, 2);
        assert_eq!(metrics.win_rate, 50.0);
    }

    #[test]
    fn parquet_with_date32_closure_dates() {
        // 2025-01-10 is day 20098 of the Unix epoch.
        let dates: ArrayRef = Arc::new(Date32Array::from(vec![Some(20_098), None]));
        let file = write_parquet(dates);
        let table = load_file(file.path()).unwrap();
        assert_parquet_opportunities(&table, "2025-01-10");
    }

    #[test]
    fn parquet_with_timestamp_closure_dates() {
        let midnight = 20_098_i64 * 86_400 * 1_000_000_000;
        let dates: ArrayRef = Arc::new(TimestampNanosecondArray::from(vec![Some(midnight), None]));
        let file = write_parquet(dates);
        let table = load_file(file.path()).unwrap();
        assert_parquet_opportunities(&table, "2025-01-10T00:00:00");
    }

    #[test]
    fn parquet_missing_column_is_rejected() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            columns::DEAL_ID,
            DataType::Int64,
            false,
        )]));
        let ids: ArrayRef = Arc::new(Int64Array::from(vec![1]));
        let batch = RecordBatch::try_new(schema.clone(), vec![ids]).unwrap();
        let file = tempfile::Builder::new().suffix(".pq").tempfile().unwrap();
        let mut writer =
            ArrowWriter::try_new(File::create(file.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn(columns::COMPANY_SIZE)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("opportunities.xlsx")).unwrap_err();
        assert!(matches!(err, DataSourceError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataSourceError::Io { .. }));
    }

    #[test]
    fn load_is_memoized_until_invalidated() {
        let _guard = cache_lock();
        let file = write_temp(".csv", &csv_bytes(&["1,UK,SMB,Open,100,Website,Alice,"]));

        let first = load(file.path()).unwrap();
        let second = load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // New data on disk is invisible until the entry is dropped.
        std::fs::write(
            file.path(),
            csv_bytes(&[
                "1,UK,SMB,Open,100,Website,Alice,",
                "2,UK,SMB,Open,100,Website,Alice,",
            ]),
        )
        .unwrap();
        assert_eq!(load(file.path()).unwrap().len(), 1);

        assert!(invalidate(file.path()));
        assert_eq!(load(file.path()).unwrap().len(), 2);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let file = write_temp(".csv", b"Deal_ID\n1\n");
        assert!(load(file.path()).is_err());
        assert!(!invalidate(file.path()));
    }

    #[test]
    fn clear_cache_forces_every_path_to_be_reread() {
        let _guard = cache_lock();
        let one_row = csv_bytes(&["1,UK,SMB,Open,100,Website,Alice,"]);
        let a = write_temp(".csv", &one_row);
        let b = write_temp(".csv", &one_row);

        let first_a = load(a.path()).unwrap();
        let first_b = load(b.path()).unwrap();
        assert!(Arc::ptr_eq(&first_a, &load(a.path()).unwrap()));
        assert!(Arc::ptr_eq(&first_b, &load(b.path()).unwrap()));

        std::fs::write(
            a.path(),
            csv_bytes(&[
                "1,UK,SMB,Open,100,Website,Alice,",
                "2,US,SMB,Open,100,Website,Bob,",
            ]),
        )
        .unwrap();
        clear_cache();

        let again_a = load(a.path()).unwrap();
        let again_b = load(b.path()).unwrap();
        assert!(!Arc::ptr_eq(&first_a, &again_a));
        assert!(!Arc::ptr_eq(&first_b, &again_b));
        assert_eq!(again_a.len(), 2);
        assert_eq!(again_b.len(), 1);
    }
}
