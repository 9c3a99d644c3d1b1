use std::io::BufRead;

use log::debug;

use super::{Peak, Scan, SpectrumError};

/// Classified content of a single line
enum Line {
    Blank,
    Preamble,
    ScanStart {
        scan_number: u64,
        precursor_mz: Option<f64>,
    },
    RetentionTime(f64),
    Info,
    Charge,
    Peak(Peak),
    Unparsable,
}

/// Scan being accumulated between two boundary lines
struct PartialScan {
    scan_number: u64,
    precursor_mz: Option<f64>,
    retention_time: Option<f64>,
    peaks: Vec<Peak>,
    in_peak_list: bool,
}

/// Pull-based reader for MS1/MS2 text files
pub struct Ms2Reader<R: BufRead> {
    reader: R,
    buf: String,
    line_number: usize,
    pending: Option<PartialScan>,
    seen_marker: bool,
    finished: bool,
    dropped: usize,
}

impl<R: BufRead> Ms2Reader<R> {
    /// Create a new reader from a BufRead source
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_number: 0,
            pending: None,
            seen_marker: false,
            finished: false,
            dropped: 0,
        }
    }

    /// Number of scans dropped so far for having no usable peaks
    pub fn dropped_scans(&self) -> usize {
        self.dropped
    }

    /// Iterate over all remaining scans
    pub fn scans(self) -> ScanIterator<R> {
        ScanIterator { reader: self }
    }

    /// Read the next scan from the stream
    ///
    /// Returns `Ok(None)` at end of input. An input without a single scan
    /// boundary fails with [`SpectrumError::NoScanMarkers`] instead.
    pub fn next_scan(&mut self) -> Result<Option<Scan>, SpectrumError> {
        if self.finished {
            return Ok(None);
        }

        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                self.finished = true;
                if !self.seen_marker {
                    return Err(SpectrumError::NoScanMarkers);
                }
                return match self.pending.take() {
                    Some(partial) => self.complete(partial),
                    None => Ok(None),
                };
            }
            self.line_number += 1;

            match classify(&self.buf, self.line_number)? {
                Line::ScanStart {
                    scan_number,
                    precursor_mz,
                } => {
                    self.seen_marker = true;
                    let next = PartialScan {
                        scan_number,
                        precursor_mz,
                        retention_time: None,
                        peaks: Vec::new(),
                        in_peak_list: false,
                    };
                    if let Some(done) = self.pending.replace(next) {
                        if let Some(scan) = self.complete(done)? {
                            return Ok(Some(scan));
                        }
                    }
                }
                Line::RetentionTime(rt) => {
                    if let Some(partial) = self.pending.as_mut() {
                        if !partial.in_peak_list {
                            partial.retention_time = Some(rt);
                        }
                    }
                }
                Line::Peak(peak) => {
                    if let Some(partial) = self.pending.as_mut() {
                        partial.in_peak_list = true;
                        partial.peaks.push(peak);
                    }
                }
                Line::Blank | Line::Preamble | Line::Info | Line::Charge | Line::Unparsable => {}
            }
        }
    }

    fn complete(&mut self, partial: PartialScan) -> Result<Option<Scan>, SpectrumError> {
        if partial.peaks.is_empty() {
            // truncated or empty peak list
            self.dropped += 1;
            debug!("Dropping scan {} with no valid peaks", partial.scan_number);
            return Ok(None);
        }
        let retention_time =
            partial
                .retention_time
                .ok_or(SpectrumError::MissingRetentionTime {
                    scan_number: partial.scan_number,
                })?;
        Ok(Some(Scan {
            scan_number: partial.scan_number,
            retention_time,
            precursor_mz: partial.precursor_mz,
            peaks: partial.peaks,
        }))
    }
}

fn classify(raw: &str, line_number: usize) -> Result<Line, SpectrumError> {
    let line = raw.trim();
    let mut tokens = line.split_whitespace();
    let first = match tokens.next() {
        Some(token) => token,
        None => return Ok(Line::Blank),
    };

    let line = match first {
        "H" => Line::Preamble,
        "S" => {
            let invalid = || SpectrumError::InvalidScanHeader {
                line: line_number,
                content: line.to_string(),
            };
            let scan_number = tokens
                .next()
                .and_then(|t| t.parse::<u64>().ok())
                .ok_or_else(invalid)?;
            // second field repeats the scan number
            let _ = tokens.next();
            let precursor_mz = match tokens.next() {
                Some(t) => Some(t.parse::<f64>().map_err(|_| invalid())?),
                None => None,
            };
            Line::ScanStart {
                scan_number,
                precursor_mz,
            }
        }
        "I" => match (tokens.next(), tokens.next()) {
            (Some("RTime"), Some(value)) => match value.parse::<f64>() {
                Ok(rt) if rt.is_finite() => Line::RetentionTime(rt),
                _ => Line::Info,
            },
            _ => Line::Info,
        },
        "Z" => Line::Charge,
        "D" => Line::Info,
        _ => match (first.parse::<f64>(), tokens.next().map(str::parse::<f64>)) {
            (Ok(mz), Some(Ok(intensity))) if mz.is_finite() && intensity.is_finite() => {
                Line::Peak(Peak::new(mz, intensity))
            }
            _ => Line::Unparsable,
        },
    };
    Ok(line)
}

/// Iterator over scans in an MS1/MS2 text file
pub struct ScanIterator<R: BufRead> {
    reader: Ms2Reader<R>,
}

impl<R: BufRead> Iterator for ScanIterator<R> {
    type Item = Result<Scan, SpectrumError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.next_scan() {
            Ok(Some(scan)) => Some(Ok(scan)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
