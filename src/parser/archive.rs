use crate::parser::error::ParseError;
use log::debug;
use std::io::{Cursor, Read};

const ZIP_SIGNATURE: &[u8] = b"PK";
const ENTRY_EXTENSIONS: [&str; 3] = [".csv", ".txt", ".xls"];
const PRODUCT_NAME: &str = "eco2mix";

pub(crate) fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_SIGNATURE)
}

/// Extracts the data entry of a ZIP payload.
///
/// The "xls" files served by eco2mix are ZIP archives holding a single tab
/// separated text file. Entries with a data-like extension or the product name win;
/// otherwise the first entry is used.
pub(crate) fn extract_data_entry(bytes: &[u8]) -> Result<(String, Vec<u8>), ParseError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(ParseError::Archive)?;
    if archive.len() == 0 {
        return Err(ParseError::EmptyArchive);
    }

    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(ParseError::Archive)?;
        names.push(entry.name().to_string());
    }

    let index = names
        .iter()
        .position(|name| is_data_entry(name))
        .unwrap_or(0);
    let name = names[index].clone();
    debug!("Reading archive entry '{}' ({} entries)", name, names.len());

    let mut entry = archive.by_index(index).map_err(ParseError::Archive)?;
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut data)
        .map_err(|e| ParseError::ArchiveEntry(name.clone(), e))?;
    Ok((name, data))
}

fn is_data_entry(name: &str) -> bool {
    let lower = name.to_lowercase();
    ENTRY_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) || lower.contains(PRODUCT_NAME)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Builds an in-memory ZIP archive with the given entries.
    pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_prefers_data_entry() {
        let bytes = zip_bytes(&[
            ("readme.md", b"ignore me"),
            ("eCO2mix_RTE_Auvergne-Rhone-Alpes_En-cours-TR.xls", b"payload"),
        ]);
        assert!(is_zip(&bytes));
        let (name, data) = extract_data_entry(&bytes).unwrap();
        assert_eq!(name, "eCO2mix_RTE_Auvergne-Rhone-Alpes_En-cours-TR.xls");
        assert_eq!(data, b"payload");
    }

    #[test]
    fn test_falls_back_to_first_entry() {
        let bytes = zip_bytes(&[("first.bin", b"one"), ("second.bin", b"two")]);
        let (name, data) = extract_data_entry(&bytes).unwrap();
        assert_eq!(name, "first.bin");
        assert_eq!(data, b"one");
    }

    #[test]
    fn test_truncated_archive_is_an_error() {
        let result = extract_data_entry(b"PK\x03\x04 not really a zip");
        assert!(matches!(result, Err(ParseError::Archive(_))));
    }
}
