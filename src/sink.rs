//! File-backed record sinks.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{
    error::RecordError,
    record::{RunwayRecord, COLUMNS, WIND_COLUMNS},
};

pub trait RecordSink {
    fn write(&mut self, records: &[RunwayRecord]) -> Result<(), RecordError>;
}

fn create_parent(path: &Path) -> Result<(), RecordError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn header(with_wind: bool) -> String {
    let mut columns: Vec<&str> = COLUMNS.to_vec();
    if with_wind {
        columns.extend(WIND_COLUMNS);
    }
    columns.join(",")
}

pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn write(&mut self, records: &[RunwayRecord]) -> Result<(), RecordError> {
        create_parent(&self.path)?;
        let with_wind = records.iter().any(RunwayRecord::has_wind);
        let mut out = BufWriter::new(File::create(&self.path)?);
        writeln!(out, "{}", header(with_wind))?;
        for record in records {
            writeln!(out, "{}", record.to_csv_row(with_wind))?;
        }
        out.flush()?;
        tracing::info!(path = %self.path.display(), rows = records.len(), "wrote csv");
        Ok(())
    }
}

pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RecordSink for JsonSink {
    fn write(&mut self, records: &[RunwayRecord]) -> Result<(), RecordError> {
        create_parent(&self.path)?;
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)?;
        tracing::info!(path = %self.path.display(), records = records.len(), "wrote json");
        Ok(())
    }
}

pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<RunwayRecord>, RecordError> {
    let text = fs::read_to_string(path)?;
    parse_csv(&text)
}

pub fn parse_csv(text: &str) -> Result<Vec<RunwayRecord>, RecordError> {
    let mut rows = rows(text).into_iter();
    let with_wind = match rows.next() {
        Some((_, first)) if first.trim_end() == header(false) => false,
        Some((_, first)) if first.trim_end() == header(true) => true,
        Some((_, first)) => return Err(RecordError::Header(first.to_string())),
        None => return Err(RecordError::Header(String::new())),
    };
    rows.filter(|(_, row)| !row.trim().is_empty())
        .map(|(line, row)| RunwayRecord::from_csv_row(row.trim_end_matches('\r'), with_wind, line))
        .collect()
}

/// Splits on newlines outside quoted fields, pairing each row with the
/// 1-based line it starts on.
fn rows(text: &str) -> Vec<(usize, &str)> {
    let mut rows = Vec::new();
    let mut quoted = false;
    let mut line = 1;
    let mut start = (1, 0);
    for (offset, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '\n' => {
                line += 1;
                if !quoted {
                    rows.push((start.0, &text[start.1..offset]));
                    start = (line, offset + 1);
                }
            }
            _ => {}
        }
    }
    if start.1 < text.len() {
        rows.push((start.0, &text[start.1..]));
    }
    rows
}

pub fn load_json(path: impl AsRef<Path>) -> Result<Vec<RunwayRecord>, RecordError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
