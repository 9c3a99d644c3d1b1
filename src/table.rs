//! Shared helpers for delimited text tables.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Field delimiter implied by a file extension (`.tsv`/`.txt` are tab-separated)
pub fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") | Some("txt") | Some("tab") => b'\t',
        _ => b',',
    }
}

/// Headerless, ragged-row-tolerant CSV reader over `source`
pub fn raw_reader<R: Read>(source: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source)
}

/// Open `path` for reading with the delimiter its extension implies
pub fn open(path: &Path) -> std::io::Result<(BufReader<File>, u8)> {
    let file = File::open(path)?;
    Ok((BufReader::new(file), delimiter_for(path)))
}

/// Parse a cell as a finite number
pub fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
