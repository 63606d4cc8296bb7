#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Parsers for the two text dumps extracted from the game's memory.
//!
//! The wheel dump lists one wheel per line as comma separated hex item ids.
//! The redirect dump lists one hex wheel offset per line. A table's line
//! number is its index, so blank lines are only tolerated at the end of a
//! dump; a blank line followed by more data is rejected.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use item_wheel_core::{ItemId, ItemWheel, WheelError};
use item_wheel_tables::{ItemTables, RedirectTable, WheelTable};
use log::info;
use thiserror::Error;

/// Default file name of the wheel dump.
pub const DEFAULT_WHEEL_DUMP: &str = "itemWheel.dmp";
/// Default file name of the redirect dump.
pub const DEFAULT_REDIRECT_DUMP: &str = "wheelindexRedirect.dmp";

const ENTRY_DELIMITER: char = ',';

/// Failures raised while reading a dump.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The dump file could not be opened.
    #[error("could not open dump {}", .path.display())]
    Open {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Reading a line from the dump failed.
    #[error("could not read line {line} of dump")]
    Read {
        /// One-based line number.
        line: usize,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A wheel entry is not a catalog item identifier.
    #[error("line {line}, entry {entry}: malformed item id")]
    MalformedItemId {
        /// One-based line number.
        line: usize,
        /// One-based entry position within the line.
        entry: usize,
        /// Validation failure reported by the catalog.
        #[source]
        source: WheelError,
    },
    /// A blank line precedes further data and would shift every later index.
    #[error("line {line}: blank line inside dump")]
    BlankLine {
        /// One-based line number of the first blank line.
        line: usize,
    },
    /// A redirect line is not a hex integer.
    #[error("line {line}: '{value}' is not a hex wheel offset")]
    MalformedRedirect {
        /// One-based line number.
        line: usize,
        /// Offending text.
        value: String,
    },
}

/// Parses a wheel dump from any buffered reader.
pub fn parse_item_wheels<R: BufRead>(reader: R) -> Result<WheelTable, DumpError> {
    let mut wheels = Vec::new();
    let mut blanks = BlankLineGuard::default();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|source| DumpError::Read {
            line: line_number,
            source,
        })?;
        if !blanks.admit(line_number, &line)? {
            continue;
        }

        let wheel = line
            .split(ENTRY_DELIMITER)
            .enumerate()
            .map(|(entry, text)| {
                ItemId::from_hex(text).map_err(|source| DumpError::MalformedItemId {
                    line: line_number,
                    entry: entry + 1,
                    source,
                })
            })
            .collect::<Result<ItemWheel, DumpError>>()?;
        wheels.push(wheel);
    }
    Ok(WheelTable::new(wheels))
}

/// Parses a redirect dump from any buffered reader.
pub fn parse_wheel_redirects<R: BufRead>(reader: R) -> Result<RedirectTable, DumpError> {
    let mut offsets = Vec::new();
    let mut blanks = BlankLineGuard::default();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|source| DumpError::Read {
            line: line_number,
            source,
        })?;
        if !blanks.admit(line_number, &line)? {
            continue;
        }
        let trimmed = line.trim();

        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let offset =
            usize::from_str_radix(digits, 16).map_err(|_| DumpError::MalformedRedirect {
                line: line_number,
                value: trimmed.to_owned(),
            })?;
        offsets.push(offset);
    }
    Ok(RedirectTable::new(offsets))
}

/// Reads the wheel dump at `path`.
pub fn load_item_wheels(path: impl AsRef<Path>) -> Result<WheelTable, DumpError> {
    let path = path.as_ref();
    let wheels = parse_item_wheels(open(path)?)?;
    info!("loaded {} wheels from {}", wheels.len(), path.display());
    Ok(wheels)
}

/// Reads the redirect dump at `path`.
pub fn load_wheel_redirects(path: impl AsRef<Path>) -> Result<RedirectTable, DumpError> {
    let path = path.as_ref();
    let redirects = parse_wheel_redirects(open(path)?)?;
    info!("loaded {} redirects from {}", redirects.len(), path.display());
    Ok(redirects)
}

/// Reads both dumps and pairs them.
pub fn load_tables(
    wheel_path: impl AsRef<Path>,
    redirect_path: impl AsRef<Path>,
) -> Result<ItemTables, DumpError> {
    let wheels = load_item_wheels(wheel_path)?;
    let redirects = load_wheel_redirects(redirect_path)?;
    Ok(ItemTables::new(wheels, redirects))
}

/// Tracks blank lines so that only trailing ones are accepted.
#[derive(Debug, Default)]
struct BlankLineGuard {
    first_blank: Option<usize>,
}

impl BlankLineGuard {
    /// Returns `true` when the line carries data that should be parsed.
    fn admit(&mut self, line: usize, text: &str) -> Result<bool, DumpError> {
        if text.trim().is_empty() {
            let _ = self.first_blank.get_or_insert(line);
            return Ok(false);
        }
        match self.first_blank {
            Some(blank) => Err(DumpError::BlankLine { line: blank }),
            None => Ok(true),
        }
    }
}

fn open(path: &Path) -> Result<BufReader<File>, DumpError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| DumpError::Open {
            path: path.to_path_buf(),
            source,
        })
}
