//! Turns a raw eco2mix payload into a [`RawTable`].
//!
//! The portal has served plain text, ZIP archives disguised as `.xls` files and
//! real spreadsheets over the years, without any content type or version marker,
//! so the format is found by trying each reader in turn.

pub(crate) mod archive;
pub(crate) mod delimited;
pub mod error;
pub(crate) mod spreadsheet;

use crate::parser::delimited::{decode_latin1, decode_text, parse_delimited, Acceptance, SEPARATORS};
use crate::parser::error::ParseError;
use crate::types::raw_table::RawTable;
use log::{debug, info};

/// Parses a downloaded payload into a table of raw string cells.
///
/// Strategies, in order:
/// 1. ZIP archive: pick the data entry and continue with its bytes.
/// 2. Delimited text with tab, `;` then `,` as separator.
/// 3. Archive entry only: Latin-1 text read as tab-separated, accepting a single column.
/// 4. Plain payload only: legacy spreadsheet.
///
/// # Errors
///
/// Returns a [`ParseError`] when no strategy produces a table; an empty table is
/// never returned silently.
pub fn parse(bytes: &[u8]) -> Result<RawTable, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::EmptyPayload);
    }

    if archive::is_zip(bytes) {
        let (entry_name, data) = archive::extract_data_entry(bytes)?;
        if let Some(table) = parse_text(&data) {
            return Ok(table);
        }
        info!(
            "No separator matched archive entry '{}', reading it as Latin-1 tab-separated text",
            entry_name
        );
        return parse_delimited(&decode_latin1(&data), b'\t', Acceptance::Lenient)
            .ok_or_else(|| unrecognized(&data));
    }

    if let Some(table) = parse_text(bytes) {
        return Ok(table);
    }

    debug!("Payload is not delimited text, trying spreadsheet formats");
    spreadsheet::parse_spreadsheet(bytes).map_err(|e| {
        debug!("Spreadsheet parsing failed: {}", e);
        unrecognized(bytes)
    })
}

fn parse_text(bytes: &[u8]) -> Option<RawTable> {
    // A NUL byte never appears in the text exports; binary formats are full of them.
    if bytes.contains(&0) {
        return None;
    }
    let text = decode_text(bytes);
    SEPARATORS
        .iter()
        .find_map(|&separator| parse_delimited(&text, separator, Acceptance::Strict))
}

fn unrecognized(bytes: &[u8]) -> ParseError {
    ParseError::Unrecognized {
        size: bytes.len(),
        head: decode_latin1(&bytes[..bytes.len().min(16)]),
    }
}
