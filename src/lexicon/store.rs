//! Durable, append-only lexicon storage.
//!
//! ## File format
//!
//! [`CsvLexiconStore`] keeps the lexicon as UTF-8 CSV with the header
//! `score,phrase,category` followed by one row per entry in that column
//! order. Fields are quoted when they contain commas or quotes. Blank lines
//! are ignored.
//!
//! ## Concurrency
//!
//! Rows are only ever appended. Each [`append`](LexiconStore::append) encodes
//! the whole batch into one buffer and hands it to a single `write_all` on a
//! file opened in append mode, under an in-process mutex, followed by
//! `sync_data`. Every appended row ends with a newline, so a final line
//! without one is either a hand edit or the tail of an in-flight append.
//! [`load_rows`](LexiconStore::load_rows) reads the file again under the
//! write mutex when it sees such a line, and keeps it only if the file did
//! not change in between.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use parking_lot::{Mutex, RwLock};

use crate::error::{LexRiskError, Result};
use crate::lexicon::entry::{LEXICON_HEADER, LexiconRow};

/// Storage backend for lexicon rows.
pub trait LexiconStore: Send + Sync + std::fmt::Debug {
    /// Read every persisted row, in storage order.
    fn load_rows(&self) -> Result<Vec<LexiconRow>>;

    /// Append rows as one atomic unit. Existing rows are never rewritten.
    fn append(&self, rows: &[LexiconRow]) -> Result<()>;

    /// Human-readable location, for logging.
    fn location(&self) -> String;
}

/// Reject rows that cannot round-trip through the line-oriented format.
fn validate_rows(rows: &[LexiconRow]) -> Result<()> {
    for row in rows {
        if row.phrase.trim().is_empty() {
            return Err(LexRiskError::invalid_argument("lexicon phrase is empty"));
        }
        if row.phrase.contains(['\n', '\r']) || row.category.contains(['\n', '\r']) {
            return Err(LexRiskError::invalid_argument(format!(
                "lexicon row '{}' contains a line break",
                row.phrase.escape_debug()
            )));
        }
    }
    Ok(())
}

/// Lexicon stored as a CSV file on the local filesystem.
#[derive(Debug)]
pub struct CsvLexiconStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvLexiconStore {
    /// Open the lexicon at `path`, creating it with only a header row if it
    /// does not exist yet.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                file.write_all(&header_line())?;
                file.sync_data()?;
                log::info!("created empty lexicon at {}", path.display());
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err.into()),
        }

        Ok(Self::at(path))
    }

    /// Open an existing lexicon file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LexRiskError::lexicon_load(format!(
                "lexicon file {} not found",
                path.display()
            )));
        }
        Ok(Self::at(path))
    }

    fn at(path: &Path) -> Self {
        CsvLexiconStore {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).map_err(|err| {
            LexRiskError::lexicon_load(format!("cannot read {}: {err}", self.path.display()))
        })
    }
}

impl LexiconStore for CsvLexiconStore {
    fn load_rows(&self) -> Result<Vec<LexiconRow>> {
        let data = self.read()?;
        if data.last().is_none_or(|&b| b == b'\n') {
            return parse_rows(&data, &self.location(), false);
        }

        let settled = {
            let _guard = self.write_lock.lock();
            self.read()?
        };
        let unchanged = settled == data;
        if !unchanged {
            log::debug!("{} changed while loading, re-reading", self.path.display());
        }
        parse_rows(&settled, &self.location(), unchanged)
    }

    fn append(&self, rows: &[LexiconRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        validate_rows(rows)?;
        let encoded = encode_rows(rows)?;

        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;

        let mut buffer = Vec::with_capacity(encoded.len() + 32);
        match last_byte(&mut file)? {
            None => buffer.extend_from_slice(&header_line()),
            Some(b'\n') => {}
            Some(_) => buffer.push(b'\n'),
        }
        buffer.extend_from_slice(&encoded);

        file.write_all(&buffer)?;
        file.sync_data()?;

        log::debug!("appended {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

fn header_line() -> Vec<u8> {
    let mut line = LEXICON_HEADER.join(",").into_bytes();
    line.push(b'\n');
    line
}

fn last_byte(file: &mut File) -> Result<Option<u8>> {
    if file.metadata()?.len() == 0 {
        return Ok(None);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(Some(last[0]))
}

fn encode_rows(rows: &[LexiconRow]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record([
            row.score.to_string().as_str(),
            row.phrase.trim(),
            row.category.trim(),
        ])?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|err| LexRiskError::internal(format!("failed to encode lexicon rows: {err}")))
}

/// Parse a whole lexicon file.
///
/// `source` names the file in error messages. A final line without a newline
/// is only parsed when `keep_tail` is set; otherwise it is treated as a row
/// still being appended and skipped.
pub(crate) fn parse_rows(
    data: &[u8],
    source: &str,
    keep_tail: bool,
) -> Result<Vec<LexiconRow>> {
    let (complete, tail) = match data.iter().rposition(|&b| b == b'\n') {
        Some(pos) => data.split_at(pos + 1),
        None => (data, &data[data.len()..]),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(complete);

    let headers = reader
        .headers()
        .map_err(|err| LexRiskError::lexicon_load(format!("{source}: {err}")))?
        .clone();
    check_header(&headers, source)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| LexRiskError::lexicon_load(format!("{source}: {err}")))?;
        rows.push(parse_record(&record, source)?);
    }

    if tail.iter().all(u8::is_ascii_whitespace) {
        return Ok(rows);
    }
    if !keep_tail {
        log::debug!("skipping unterminated trailing row in {source}");
        return Ok(rows);
    }
    match parse_tail(tail, source) {
        Ok(row) => rows.push(row),
        Err(err) => log::debug!("skipping incomplete trailing row in {source}: {err}"),
    }

    Ok(rows)
}

fn check_header(headers: &StringRecord, source: &str) -> Result<()> {
    let names: Vec<&str> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect();
    if names != LEXICON_HEADER {
        return Err(LexRiskError::lexicon_load(format!(
            "{source}: expected header '{}', found '{}'",
            LEXICON_HEADER.join(","),
            names.join(",")
        )));
    }
    Ok(())
}

fn parse_tail(tail: &[u8], source: &str) -> Result<LexiconRow> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(tail);
    let mut record = StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Err(LexRiskError::lexicon_load(format!("{source}: empty trailing row")));
    }
    parse_record(&record, source)
}

fn parse_record(record: &StringRecord, source: &str) -> Result<LexiconRow> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    if record.len() != LEXICON_HEADER.len() {
        return Err(LexRiskError::lexicon_load(format!(
            "{source} line {line}: expected {} fields, found {}",
            LEXICON_HEADER.len(),
            record.len()
        )));
    }

    let raw_score = record[0].trim();
    let score = raw_score.parse::<u32>().map_err(|err| {
        LexRiskError::lexicon_load(format!(
            "{source} line {line}: invalid score '{raw_score}': {err}"
        ))
    })?;

    Ok(LexiconRow::new(score, record[1].trim(), record[2].trim()))
}

/// Lexicon held in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryLexiconStore {
    rows: RwLock<Vec<LexiconRow>>,
}

impl MemoryLexiconStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<LexiconRow>) -> Self {
        MemoryLexiconStore {
            rows: RwLock::new(rows),
        }
    }
}

impl LexiconStore for MemoryLexiconStore {
    fn load_rows(&self) -> Result<Vec<LexiconRow>> {
        Ok(self.rows.read().clone())
    }

    fn append(&self, rows: &[LexiconRow]) -> Result<()> {
        validate_rows(rows)?;
        self.rows.write().extend_from_slice(rows);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_rows() {
        let data = "score,phrase,category\n40,כסף מזומן,cash\n\n25,\"offshore, account\",shell\n";
        let rows = parse_rows(data.as_bytes(), "test", false).unwrap();
        assert_eq!(
            rows,
            vec![
                LexiconRow::new(40, "כסף מזומן", "cash"),
                LexiconRow::new(25, "offshore, account", "shell"),
            ]
        );
    }

    #[test]
    fn test_parse_rows_rejects_other_column_order() {
        let data = "phrase,category,score\nכסף,cash,40\n";
        let err = parse_rows(data.as_bytes(), "test", false).unwrap_err();
        assert!(err.is_service_unavailable());
        assert!(err.to_string().contains("expected header 'score,phrase,category'"));
    }

    #[test]
    fn test_parse_rows_rejects_bad_score() {
        let data = "score,phrase,category\nforty,כסף,cash\n";
        let err = parse_rows(data.as_bytes(), "test", false).unwrap_err();
        assert!(matches!(err, LexRiskError::LexiconLoad(ref msg) if msg.contains("invalid score 'forty'")));
    }

    #[test]
    fn test_parse_rows_rejects_missing_header() {
        let err = parse_rows(b"", "test", false).unwrap_err();
        assert!(matches!(err, LexRiskError::LexiconLoad(_)));
    }

    #[test]
    fn test_parse_rows_header_without_newline() {
        let rows = parse_rows(b"score,phrase,category", "test", false).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_rows_keeps_settled_unterminated_row() {
        let data = "score,phrase,category\n40,cash,money\n5,bills,unknown";
        let rows = parse_rows(data.as_bytes(), "test", true).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], LexiconRow::new(5, "bills", "unknown"));
    }

    #[test]
    fn test_parse_rows_skips_truncated_category() {
        let data = "score,phrase,category\n40,cash,money\n5,bills,unkn";
        let rows = parse_rows(data.as_bytes(), "test", false).unwrap();
        assert_eq!(rows, vec![LexiconRow::new(40, "cash", "money")]);
    }

    #[test]
    fn test_parse_rows_skips_partial_row_even_when_settled() {
        let data = "score,phrase,category\n40,cash,money\n30,\"bil";
        let rows = parse_rows(data.as_bytes(), "test", true).unwrap();
        assert_eq!(rows, vec![LexiconRow::new(40, "cash", "money")]);
    }

    #[test]
    fn test_parse_rows_skips_partial_row() {
        let data = "score,phrase,category\n40,cash,money\n5,bil";
        let rows = parse_rows(data.as_bytes(), "test", false).unwrap();
        assert_eq!(rows, vec![LexiconRow::new(40, "cash", "money")]);
    }

    #[test]
    fn test_csv_store_create_append_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lexicon").join("words.csv");

        let store = CsvLexiconStore::create(&path).unwrap();
        assert!(store.load_rows().unwrap().is_empty());

        store
            .append(&[
                LexiconRow::new(40, "כסף מזומן", "cash"),
                LexiconRow::new(5, "quoted \"word\", here", "unknown"),
            ])
            .unwrap();

        // A second handle sees the rows.
        let reopened = CsvLexiconStore::open(&path).unwrap();
        let rows = reopened.load_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].phrase, "quoted \"word\", here");

        // Creating again keeps existing content.
        let again = CsvLexiconStore::create(&path).unwrap();
        assert_eq!(again.load_rows().unwrap().len(), 2);
    }

    #[test]
    fn test_csv_store_keeps_hand_edited_row_without_newline() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("words.csv");
        std::fs::write(&path, "score,phrase,category\n30,הלבנת הון,laundering").unwrap();

        let rows = CsvLexiconStore::open(&path).unwrap().load_rows().unwrap();
        assert_eq!(rows, vec![LexiconRow::new(30, "הלבנת הון", "laundering")]);
    }

    #[test]
    fn test_csv_store_append_after_hand_edit_without_newline() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("words.csv");
        std::fs::write(&path, "score,phrase,category\n30,הלבנת הון,laundering").unwrap();

        let store = CsvLexiconStore::open(&path).unwrap();
        store.append(&[LexiconRow::new(5, "הון", "unknown")]).unwrap();

        let rows = store.load_rows().unwrap();
        assert_eq!(
            rows,
            vec![
                LexiconRow::new(30, "הלבנת הון", "laundering"),
                LexiconRow::new(5, "הון", "unknown"),
            ]
        );
    }

    #[test]
    fn test_csv_store_append_to_empty_file_writes_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("words.csv");
        std::fs::write(&path, "").unwrap();

        let store = CsvLexiconStore::open(&path).unwrap();
        store.append(&[LexiconRow::new(5, "cash", "unknown")]).unwrap();
        assert_eq!(store.load_rows().unwrap().len(), 1);
    }

    #[test]
    fn test_csv_store_open_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = CsvLexiconStore::open(temp_dir.path().join("absent.csv")).unwrap_err();
        assert!(err.is_service_unavailable());
    }

    #[test]
    fn test_append_rejects_line_breaks() {
        let store = MemoryLexiconStore::new();
        let err = store
            .append(&[LexiconRow::new(5, "two\nlines", "unknown")])
            .unwrap_err();
        assert!(matches!(err, LexRiskError::InvalidArgument(_)));
        assert!(store.load_rows().unwrap().is_empty());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryLexiconStore::with_rows(vec![LexiconRow::new(40, "cash", "cash")]);
        store.append(&[LexiconRow::new(5, "bills", "unknown")]).unwrap();
        let rows = store.load_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(store.location(), "memory");
    }
}
