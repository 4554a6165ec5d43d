mod csv;
mod xlsx;

use painel_core::QueryResult;
use std::io::Write;
use thiserror::Error;

pub use csv::CsvExporter;
pub use xlsx::XlsxExporter;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn name(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Xlsx => "Excel",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

/// Serializes a result set to one output format. Exporters are pure
/// functions of the result set; nothing is mutated.
pub trait Exporter {
    fn name(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    fn export(&self, result: &QueryResult, writer: &mut dyn Write) -> Result<(), ExportError>;
}

pub fn export(
    result: &QueryResult,
    format: ExportFormat,
    writer: &mut dyn Write,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => CsvExporter.export(result, writer),
        ExportFormat::Xlsx => XlsxExporter.export(result, writer),
    }
}
