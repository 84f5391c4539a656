use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde_json::Value as JsonValue;

use super::model::{Column, ColumnKind, Table, Value};
use crate::config::Config;
use crate::error::LoadError;

/// Cell spellings read as missing, matching the Pandas `read_csv` defaults
/// that occur in the credit dataset.
const NULL_MARKERS: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the dataset described by `config`.
///
/// Creates the image directory, unpacks the archive, picks the data file,
/// parses it and drops the leading index column.
pub fn load(config: &Config) -> Result<Table, LoadError> {
    ensure_dir(&config.image_dir)?;

    if !config.archive_path.exists() {
        return Err(LoadError::MissingInput(config.archive_path.clone()));
    }

    let data_path = extract_archive(&config.archive_path, &config.extract_dir)?;
    log::info!("Reading data file {}", data_path.display());

    let table = load_file(&data_path)?.drop_first_column();
    log::info!(
        "Loaded {} rows x {} columns",
        table.n_rows(),
        table.n_columns()
    );
    Ok(table)
}

/// Load a table from a data file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` / no extension – delimited text with a header row
/// * `.json` – `[{ "col": value, ... }, ...]` (records orientation)
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" | "" => load_csv(path),
        "json" => load_json(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

fn ensure_dir(dir: &Path) -> Result<(), LoadError> {
    std::fs::create_dir_all(dir).map_err(|e| LoadError::io(dir, e))
}

// ---------------------------------------------------------------------------
// Archive extraction
// ---------------------------------------------------------------------------

/// Extract the data file of `archive_path` into `dest` and return its path.
///
/// The data file is the first regular entry by sorted name, ignoring
/// directories, `__MACOSX/` resource forks, dot-files and entries whose path
/// would escape `dest`. Only that entry is written. Selection uses the
/// archive's entry list so stale files in `dest` never shadow it.
fn extract_archive(archive_path: &Path, dest: &Path) -> Result<PathBuf, LoadError> {
    let file = File::open(archive_path).map_err(|e| LoadError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut candidates = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let Some(path) = entry.enclosed_name() else {
            log::warn!("Skipping archive entry with unsafe path: {}", entry.name());
            continue;
        };
        if is_data_candidate(&path) {
            candidates.push((path, i));
        }
    }
    candidates.sort();

    let Some((chosen, index)) = candidates.into_iter().next() else {
        return Err(LoadError::EmptyArchive(archive_path.to_path_buf()));
    };

    let total = archive.len();
    let out_path = dest.join(&chosen);
    if let Some(parent) = out_path.parent() {
        ensure_dir(parent)?;
    }
    let mut entry = archive.by_index(index)?;
    let mut out = File::create(&out_path).map_err(|e| LoadError::io(&out_path, e))?;
    io::copy(&mut entry, &mut out).map_err(|e| LoadError::io(&out_path, e))?;
    log::debug!(
        "Extracted {} from {} ({total} entries)",
        out_path.display(),
        archive_path.display()
    );

    Ok(out_path)
}

fn is_data_candidate(path: &Path) -> bool {
    let in_resource_fork = path
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == "__MACOSX"));
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'));
    !in_resource_fork && !hidden
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
/// An empty header cell (the Pandas index column) becomes `Unnamed: <i>`.
fn load_csv(path: &Path) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| LoadError::parse(path, format!("opening CSV: {e}")))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::parse(path, format!("reading CSV headers: {e}")))?
        .iter()
        .enumerate()
        .map(|(idx, h)| normalize_header_name(h, idx))
        .collect();

    if headers.is_empty() {
        return Err(LoadError::parse(path, "missing header row"));
    }

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| LoadError::parse(path, format!("CSV row {row_no}: {e}")))?;
        for (col_idx, raw) in record.iter().enumerate() {
            cells[col_idx].push(guess_value(raw));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| build_column(name, values))
        .collect();

    Table::new(columns).map_err(|e| LoadError::parse(path, e.to_string()))
}

fn normalize_header_name(name: &str, idx: usize) -> String {
    // Excel-style exports may carry a BOM on the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    if name.is_empty() {
        format!("Unnamed: {idx}")
    } else {
        name.to_string()
    }
}

fn guess_value(s: &str) -> Value {
    let s = s.trim();
    if NULL_MARKERS.contains(&s) {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "index": 0, "Age": 67, "Sex": "male", "Risk": "good" },
///   ...
/// ]
/// ```
///
/// Columns follow first-appearance order; keys absent from a record are null.
fn load_json(path: &Path) -> Result<Table, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)
        .map_err(|e| LoadError::parse(path, format!("parsing JSON: {e}")))?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::parse(path, "expected top-level JSON array"))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::parse(path, format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let columns = headers
        .into_iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|rec| rec.get(&name).map(json_to_value).unwrap_or(Value::Null))
                .collect();
            build_column(name, values)
        })
        .collect();

    Table::new(columns).map_err(|e| LoadError::parse(path, e.to_string()))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => guess_value(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Column typing
// ---------------------------------------------------------------------------

/// Infer the column dtype from its non-null cells and coerce every cell to it.
fn build_column(name: String, values: Vec<Value>) -> Column {
    let kind = infer_kind(&values);
    let values = values
        .into_iter()
        .map(|v| match (kind, v) {
            (_, Value::Null) => Value::Null,
            (ColumnKind::Float, Value::Integer(i)) => Value::Float(i as f64),
            (ColumnKind::Text, Value::String(s)) => Value::String(s),
            (ColumnKind::Text, other) => Value::String(other.to_string()),
            (_, other) => other,
        })
        .collect();
    Column::new(name, kind, values)
}

fn infer_kind(values: &[Value]) -> ColumnKind {
    let mut non_null = values.iter().filter(|v| !v.is_null()).peekable();
    if non_null.peek().is_none() {
        return ColumnKind::Text;
    }

    let (mut ints, mut floats, mut bools, mut other) = (0usize, 0usize, 0usize, 0usize);
    for v in non_null {
        match v {
            Value::Integer(_) => ints += 1,
            Value::Float(_) => floats += 1,
            Value::Bool(_) => bools += 1,
            _ => other += 1,
        }
    }

    match (ints, floats, bools, other) {
        (_, 0, 0, 0) => ColumnKind::Integer,
        (_, _, 0, 0) => ColumnKind::Float,
        (0, 0, _, 0) => ColumnKind::Bool,
        _ => ColumnKind::Text,
    }
}
