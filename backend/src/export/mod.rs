//! File formats produced and consumed by the API: XLSX workbooks for the
//! export endpoints and CSV files for contract samples and imports.

pub mod csv;
pub mod xlsx;

pub use xlsx::{Cell, Sheet, Workbook};

/// MIME type of `.xlsx` workbooks.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type of CSV files.
pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}
