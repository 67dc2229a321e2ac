//! CSV export of an in-memory row set

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

type Derive<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

enum ColumnValue<T> {
    /// Key on the row's JSON form
    Field(&'static str),
    Derived(Derive<T>),
}

/// One exported column
pub struct Column<T> {
    pub header: &'static str,
    value: ColumnValue<T>,
}

impl<T> Column<T> {
    pub fn field(header: &'static str, key: &'static str) -> Self {
        Self {
            header,
            value: ColumnValue::Field(key),
        }
    }

    pub fn derived(header: &'static str, f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        Self {
            header,
            value: ColumnValue::Derived(Box::new(f)),
        }
    }
}

impl<T> std::fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.value {
            ColumnValue::Field(key) => *key,
            ColumnValue::Derived(_) => "<derived>",
        };
        f.debug_struct("Column")
            .field("header", &self.header)
            .field("value", &kind)
            .finish()
    }
}

fn render(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Encode rows as CSV, header first
///
/// Fields containing a comma, quote or newline are quoted with doubled
/// inner quotes.
pub fn to_csv<T: Serialize>(rows: &[T], columns: &[Column<T>]) -> ClientResult<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    wtr.write_record(columns.iter().map(|c| c.header))?;

    for row in rows {
        let json = if columns.iter().any(|c| matches!(c.value, ColumnValue::Field(_))) {
            serde_json::to_value(row)?
        } else {
            Value::Null
        };
        let record: Vec<String> = columns
            .iter()
            .map(|c| match &c.value {
                ColumnValue::Field(key) => render(json.get(*key)),
                ColumnValue::Derived(f) => f(row),
            })
            .collect();
        wtr.write_record(&record)?;
    }

    wtr.into_inner()
        .map_err(|e| ClientError::Io(e.into_error()))
}

/// `<entity>_<unix-timestamp>.csv`
pub fn export_filename(entity: &str, unix_ts: i64) -> String {
    format!("{}_{}.csv", entity, unix_ts)
}

/// Attempts at a free name before giving up
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Save an export into `dir`, returning the written path
///
/// Never overwrites: a name already taken in the same second gets a
/// `_<n>` suffix.
pub fn write_export(dir: &Path, entity: &str, bytes: &[u8]) -> ClientResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let ts = shared::util::now_unix();

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = match attempt {
            0 => export_filename(entity, ts),
            n => format!("{}_{}_{}.csv", entity, ts, n),
        };
        let path = dir.join(name);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };
        file.write_all(bytes)?;
        tracing::info!(path = %path.display(), rows_bytes = bytes.len(), "CSV exported");
        return Ok(path);
    }

    Err(ClientError::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free export name for {} in {}", entity, dir.display()),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        code: String,
        note: Option<String>,
        qty: i64,
    }

    fn columns() -> Vec<Column<Row>> {
        vec![
            Column::field("Code", "code"),
            Column::field("Note", "note"),
            Column::derived("Qty x2", |r: &Row| (r.qty * 2).to_string()),
        ]
    }

    #[test]
    fn test_round_trip_with_special_characters() {
        let rows = vec![
            Row {
                code: "A,1".into(),
                note: Some("say \"hi\"".into()),
                qty: 1,
            },
            Row {
                code: "B".into(),
                note: Some("line one\nline two".into()),
                qty: 2,
            },
            Row {
                code: "C".into(),
                note: None,
                qty: 3,
            },
        ];
        let bytes = to_csv(&rows, &columns()).unwrap();

        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("Code,Note,Qty x2\n"));
        assert!(text.contains("\"A,1\",\"say \"\"hi\"\"\",2"));

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let parsed: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(parsed[0], vec!["A,1", "say \"hi\"", "2"]);
        assert_eq!(parsed[1], vec!["B", "line one\nline two", "4"]);
        assert_eq!(parsed[2], vec!["C", "", "6"]);
    }

    #[test]
    fn test_export_is_deterministic() {
        let rows = vec![Row {
            code: "X".into(),
            note: None,
            qty: 5,
        }];
        assert_eq!(to_csv(&rows, &columns()).unwrap(), to_csv(&rows, &columns()).unwrap());
    }

    #[test]
    fn test_empty_rows_still_have_header() {
        let rows: Vec<Row> = Vec::new();
        let bytes = to_csv(&rows, &columns()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Code,Note,Qty x2\n");
    }

    #[test]
    fn test_filename_and_write() {
        assert_eq!(export_filename("affiliates", 1700000000), "affiliates_1700000000.csv");

        let dir = tempfile::TempDir::new().unwrap();
        let path = write_export(dir.path(), "members", b"a,b\n").unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("members_") && name.ends_with(".csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");
    }

    #[test]
    fn test_repeated_export_keeps_earlier_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let first = write_export(dir.path(), "orders", b"first\n").unwrap();
        let second = write_export(dir.path(), "orders", b"second\n").unwrap();
        let third = write_export(dir.path(), "orders", b"third\n").unwrap();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(std::fs::read(&first).unwrap(), b"first\n");
        assert_eq!(std::fs::read(&second).unwrap(), b"second\n");
        assert_eq!(std::fs::read(&third).unwrap(), b"third\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }
}
