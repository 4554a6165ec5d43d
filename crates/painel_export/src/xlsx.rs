use crate::{ExportError, Exporter};
use painel_core::{QueryResult, Value};
use rust_xlsxwriter::{Format, Workbook};
use std::io::Write;

/// Single-sheet workbook: bold header row, typed cells where the value
/// model allows, display strings for the rest.
pub struct XlsxExporter;

impl Exporter for XlsxExporter {
    fn name(&self) -> &'static str {
        "Excel"
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn export(&self, result: &QueryResult, writer: &mut dyn Write) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let header_format = Format::new().set_bold();

        for (col, meta) in result.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, &meta.name, &header_format)?;
        }

        for (row_idx, row) in result.rows.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;

            for (col_idx, value) in row.iter().enumerate() {
                let col = col_idx as u16;

                match value {
                    Value::Null => {}
                    Value::Bool(b) => {
                        worksheet.write_boolean(excel_row, col, *b)?;
                    }
                    Value::Int(i) => {
                        worksheet.write_number(excel_row, col, *i as f64)?;
                    }
                    Value::Float(f) if f.is_finite() => {
                        worksheet.write_number(excel_row, col, *f)?;
                    }
                    other => {
                        worksheet.write_string(excel_row, col, other.as_display_string())?;
                    }
                }
            }
        }

        let buffer = workbook.save_to_buffer()?;
        writer.write_all(&buffer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use painel_core::ColumnMeta;
    use std::time::Duration;

    fn make_result() -> QueryResult {
        QueryResult {
            columns: vec![
                ColumnMeta::named("produto", "text"),
                ColumnMeta::named("valor", "numeric"),
                ColumnMeta::named("ativo", "bool"),
            ],
            rows: vec![
                vec![
                    Value::Text("Teclado".to_string()),
                    Value::Float(150.5),
                    Value::Bool(true),
                ],
                vec![Value::Text("Mouse".to_string()), Value::Null, Value::Bool(false)],
            ],
            affected_rows: None,
            execution_time: Duration::from_millis(5),
        }
    }

    #[test]
    fn produces_a_zip_container() {
        let mut buf = Vec::new();
        XlsxExporter.export(&make_result(), &mut buf).unwrap();

        // XLSX is a zip archive; check the magic bytes.
        assert!(buf.len() > 4);
        assert_eq!(&buf[..4], b"PK\x03\x04");
    }

    #[test]
    fn empty_result_still_exports_the_header() {
        let result = QueryResult {
            columns: vec![ColumnMeta::named("id", "int4")],
            rows: vec![],
            affected_rows: None,
            execution_time: Duration::ZERO,
        };

        let mut buf = Vec::new();
        XlsxExporter.export(&result, &mut buf).unwrap();
        assert!(!buf.is_empty());
    }
}
