use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use encoding_rs::WINDOWS_1252;

use crate::error::{IngestError, Result};

/// A fully materialized delimited table: one header row plus text cells.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, col)`, or `""` for short rows.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map_or("", String::as_str)
    }
}

/// Options controlling how a file is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Field delimiter; sniffed from the first line when `None`.
    pub delimiter: Option<u8>,
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

/// Hospital exports are a mix of UTF-8 and Windows-1252.
fn decode_cell(raw: &[u8]) -> String {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(raw).0,
    };
    text.trim().trim_matches('\u{feff}').to_string()
}

#[derive(Debug, Default, Clone, Copy)]
struct RowStats {
    total: usize,
    non_empty: usize,
    numeric: usize,
    alpha: usize,
}

impl RowStats {
    fn ratio(self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }

    fn non_empty_ratio(self) -> f64 {
        self.ratio(self.non_empty)
    }

    fn numeric_ratio(self) -> f64 {
        self.ratio(self.numeric)
    }

    fn alpha_ratio(self) -> f64 {
        self.ratio(self.alpha)
    }
}

fn row_stats(row: &[String]) -> RowStats {
    let mut stats = RowStats {
        total: row.len(),
        ..RowStats::default()
    };
    for cell in row {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            continue;
        }
        stats.non_empty += 1;
        if trimmed.parse::<f64>().is_ok() {
            stats.numeric += 1;
        }
        if trimmed.chars().any(char::is_alphabetic) {
            stats.alpha += 1;
        }
    }
    stats
}

fn is_header_like(stats: RowStats) -> bool {
    stats.non_empty_ratio() >= 0.8 && stats.alpha_ratio() >= 0.5 && stats.numeric_ratio() <= 0.1
}

/// Report exports sometimes carry a title block above the real header.
/// Pick the widest header-like row among the first few; default to row 0.
fn detect_header_row(rows: &[Vec<String>]) -> usize {
    let window = rows.len().min(5);
    let widest = rows
        .iter()
        .take(window)
        .map(|row| row.iter().filter(|cell| !cell.trim().is_empty()).count())
        .max()
        .unwrap_or(0);
    rows.iter()
        .take(window)
        .position(|row| {
            let filled = row.iter().filter(|cell| !cell.trim().is_empty()).count();
            filled == widest && is_header_like(row_stats(row))
        })
        .unwrap_or(0)
}

/// Pick the delimiter that occurs most often in the header line.
pub fn sniff_delimiter(first_line: &str) -> u8 {
    let candidates = [b';', b',', b'|', b'\t'];
    let mut best = b',';
    let mut best_count = 0usize;
    for candidate in candidates {
        let count = first_line.bytes().filter(|byte| *byte == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

fn first_line(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|error| IngestError::io(path, error))?;
    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();
    reader
        .read_until(b'\n', &mut buffer)
        .map_err(|error| IngestError::io(path, error))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    read_csv_table_with_options(path, IngestOptions::default())
}

pub fn read_csv_table_with_options(path: &Path, options: IngestOptions) -> Result<CsvTable> {
    let delimiter = match options.delimiter {
        Some(delimiter) => delimiter,
        None => sniff_delimiter(&first_line(path)?),
    };
    let file = File::open(path).map_err(|error| IngestError::io(path, error))?;
    parse_csv_table(file, delimiter).map_err(|error| IngestError::csv(path, error))
}

/// Parse delimited text from any reader.
pub fn parse_csv_table<R: Read>(reader: R, delimiter: u8) -> csv::Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let row: Vec<String> = record.iter().map(decode_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    if raw_rows.is_empty() {
        return Ok(CsvTable::default());
    }
    let header_index = detect_header_row(&raw_rows);
    let headers: Vec<String> = raw_rows[header_index]
        .iter()
        .map(|value| normalize_header(value))
        .collect();
    let rows = raw_rows
        .into_iter()
        .skip(header_index + 1)
        .map(|mut row| {
            row.resize(headers.len(), String::new());
            row
        })
        .collect();
    Ok(CsvTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_semicolons() {
        assert_eq!(sniff_delimiter("RUT;condicion\n"), b';');
        assert_eq!(sniff_delimiter("RUT,Severidad\n"), b',');
        assert_eq!(sniff_delimiter("RUT|DV|PATOLOGIA\n"), b'|');
        assert_eq!(sniff_delimiter("RUT\n"), b',');
    }

    #[test]
    fn skips_title_block() {
        let text = "Reporte de recetas\nFECHA,RUT,DIGITO,MEDICAMENTO\n01-02-2025,12345678,5,SALBUTAMOL\n";
        let table = parse_csv_table(text.as_bytes(), b',').expect("parse");
        assert_eq!(table.headers, vec!["FECHA", "RUT", "DIGITO", "MEDICAMENTO"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(0, 3), "SALBUTAMOL");
    }

    #[test]
    fn decodes_latin1_cells() {
        let bytes: &[u8] = b"Estado\nLleg\xf3\n";
        let table = parse_csv_table(bytes, b',').expect("parse");
        assert_eq!(table.cell(0, 0), "Llegó");
    }

    #[test]
    fn decodes_windows_1252_punctuation() {
        let bytes: &[u8] = b"Farmaco_Desc;Nota\n\x93SALBUTAMOL\x94;\x80 1\x96 copago\n";
        let table = parse_csv_table(bytes, b';').expect("parse");
        assert_eq!(table.cell(0, 0), "\u{201c}SALBUTAMOL\u{201d}");
        assert_eq!(table.cell(0, 1), "\u{20ac} 1\u{2013} copago");
    }

    #[test]
    fn pads_short_rows_and_drops_blank_lines() {
        let text = "A;B;C\n1;2\n;;\n3;4;5\n";
        let table = parse_csv_table(text.as_bytes(), b';').expect("parse");
        assert_eq!(table.rows, vec![vec!["1", "2", ""], vec!["3", "4", "5"]]);
    }
}
