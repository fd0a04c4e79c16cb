use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Payload is empty")]
    EmptyPayload,

    #[error("Failed to open ZIP archive")]
    Archive(#[source] zip::result::ZipError),

    #[error("ZIP archive contains no entries")]
    EmptyArchive,

    #[error("Failed to read archive entry '{0}'")]
    ArchiveEntry(String, #[source] std::io::Error),

    #[error("Failed to read spreadsheet")]
    Spreadsheet(#[source] calamine::Error),

    #[error("Spreadsheet has no worksheet with a header row")]
    EmptySpreadsheet,

    // Every strategy was tried: delimited text with each separator, then spreadsheet.
    #[error("Unrecognized payload format ({size} bytes, starts with {head:?})")]
    Unrecognized { size: usize, head: String },
}
