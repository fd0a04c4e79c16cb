//! Delimited text decoding for the eco2mix exports.

use crate::types::raw_table::RawTable;
use log::debug;

/// Separators tried in order until one yields a table.
pub(crate) const SEPARATORS: [u8; 3] = [b'\t', b';', b','];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// How picky [`parse_delimited`] is about the resulting table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Acceptance {
    /// At least two columns, otherwise the separator is considered wrong.
    Strict,
    /// Any non-empty header is good enough.
    Lenient,
}

/// Decodes bytes as UTF-8 when they are valid UTF-8, Latin-1 otherwise.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => decode_latin1(bytes),
    }
}

/// Latin-1 maps every byte to the code point of the same value.
pub(crate) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Parses `text` with a single separator. Rows the CSV reader rejects, and rows
/// with more non-empty cells than the header, are skipped.
pub(crate) fn parse_delimited(text: &str, separator: u8, acceptance: Acceptance) -> Option<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header = loop {
        match records.next()? {
            Ok(record) if record.iter().any(|c| !c.trim().is_empty()) => break record,
            Ok(_) => continue,
            Err(e) => {
                debug!("Unreadable header line with separator {:?}: {}", separator as char, e);
                return None;
            }
        }
    };

    let mut table = RawTable::new(header.iter().map(|c| c.trim().to_string()).collect());
    let minimum_width = match acceptance {
        Acceptance::Strict => 2,
        Acceptance::Lenient => 1,
    };
    if table.width() < minimum_width {
        return None;
    }

    let mut skipped = 0usize;
    for record in records {
        match record {
            Ok(record) => {
                if record.iter().all(|c| c.trim().is_empty()) {
                    continue;
                }
                if !table.push_row(record.iter().map(str::to_string).collect()) {
                    skipped += 1;
                }
            }
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(
            "Skipped {} malformed rows with separator {:?}",
            skipped, separator as char
        );
    }
    Some(table)
}
