use crate::{ExportError, Exporter};
use csv::Writer;
use painel_core::{QueryResult, Value};
use std::io::Write;

/// UTF-8 CSV with a header row; NULL is `\N` to stay distinct from the
/// empty string.
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn name(&self) -> &'static str {
        "CSV"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn export(&self, result: &QueryResult, writer: &mut dyn Write) -> Result<(), ExportError> {
        let mut csv_writer = Writer::from_writer(writer);

        csv_writer.write_record(result.column_names())?;

        for row in &result.rows {
            for value in row.iter() {
                csv_writer.write_field(value_to_csv_field(value))?;
            }
            csv_writer.write_record(None::<&[u8]>)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn value_to_csv_field(value: &Value) -> String {
    match value {
        Value::Null => "\\N".to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => {
            if f.is_nan() {
                "NaN".to_string()
            } else if f.is_infinite() {
                if f.is_sign_positive() {
                    "Infinity".to_string()
                } else {
                    "-Infinity".to_string()
                }
            } else {
                f.to_string()
            }
        }
        Value::Text(s) => s.clone(),
        Value::Bytes(b) => format!("\\x{}", hex::encode(b)),
        Value::DateTime(dt) => dt.to_rfc3339(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Time(t) => t.format("%H:%M:%S%.f").to_string(),
    }
}
