use crate::render;
use painel_core::{DbError, EqFilter, ExplorerController, ExplorerState, QueryOutcome, Value};
use painel_export::{ExportFormat, export};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::File;
use std::path::Path;

pub struct Repl {
    editor: DefaultEditor,
    explorer: ExplorerController,
    profile_name: String,
}

impl Repl {
    pub fn new(explorer: ExplorerController, profile_name: String) -> Result<Self, DbError> {
        let editor =
            DefaultEditor::new().map_err(|e| DbError::Configuration(e.to_string()))?;

        Ok(Self {
            editor,
            explorer,
            profile_name,
        })
    }

    pub fn run(&mut self) -> Result<(), DbError> {
        println!("Connected to profile '{}'.", self.profile_name);
        println!("Type \\h for help, \\q to quit.");
        println!();

        loop {
            let prompt = self.prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(&line);

                    if let Err(e) = self.dispatch(&line) {
                        println!("Error: {e}");
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye");
                    break;
                }
                Err(e) => {
                    println!("Error: {e:?}");
                    break;
                }
            }
        }

        Ok(())
    }

    fn prompt(&self) -> String {
        match self.explorer.state() {
            ExplorerState::Idle => "painel> ".to_string(),
            ExplorerState::TableSelected { table, .. }
            | ExplorerState::ColumnsSelected { table, .. }
            | ExplorerState::Rendered { table, .. } => {
                format!("painel [{}]> ", table.name)
            }
        }
    }

    fn dispatch(&mut self, line: &str) -> Result<(), DbError> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((head, tail)) => (head, tail.trim()),
            None => (line, ""),
        };

        match command {
            "\\q" | "\\quit" => {
                println!("Bye");
                std::process::exit(0);
            }
            "\\h" | "\\help" => {
                self.show_help();
                Ok(())
            }
            "\\t" | "\\tables" => self.show_tables(),
            "\\u" | "\\use" => self.use_table(rest),
            "\\cols" => self.show_columns(),
            "\\sel" => self.select_columns(rest),
            "\\run" => self.run_query(rest),
            "\\sql" => self.run_raw(rest),
            "\\insert" => self.insert(rest),
            "\\export" => self.export_last(rest),
            "\\size" => self.show_size(),
            "\\stats" => {
                self.show_stats();
                Ok(())
            }
            _ if command.starts_with('\\') => {
                println!("Unknown command: {command}");
                println!("Type \\h for help.");
                Ok(())
            }
            // Anything else is a raw read statement.
            _ => self.run_raw(line),
        }
    }

    fn show_help(&self) {
        println!("\\t              List tables.");
        println!("\\u <table>     Select a table (default columns applied).");
        println!("\\cols          Show the selected table's columns.");
        println!("\\sel a,b,c     Select columns.");
        println!("\\run [c=v ...] Run the query, optionally with equality filters.");
        println!("\\sql <stmt>    Run a raw read statement (uncapped).");
        println!("\\insert c=v .. Insert a row (form bound to the first 4 columns).");
        println!("\\export csv|xlsx <path>  Export the last result.");
        println!("\\size          On-disk size of the selected table.");
        println!("\\stats         Session counters.");
        println!("\\q             Quit.");
        println!();
    }

    fn show_tables(&mut self) -> Result<(), DbError> {
        let tables = self.explorer.list_tables()?;

        if tables.is_empty() {
            println!("No tables in the public schema.");
            return Ok(());
        }

        for table in tables.iter() {
            println!("{table}");
        }

        Ok(())
    }

    fn use_table(&mut self, name: &str) -> Result<(), DbError> {
        if name.is_empty() {
            return Err(DbError::Validation("Usage: \\u <table>".to_string()));
        }

        let columns = self.explorer.select_table(name)?;
        let selected = self.explorer.select_default_columns()?;

        println!(
            "Table '{}' selected ({} columns), showing: {}",
            name,
            columns.len(),
            selected.join(", ")
        );

        Ok(())
    }

    fn show_columns(&mut self) -> Result<(), DbError> {
        let columns = self
            .explorer
            .available_columns()
            .ok_or_else(|| DbError::Validation("No table selected".to_string()))?;

        for meta in columns {
            println!("{}  {}", meta.name, meta.type_name);
        }

        Ok(())
    }

    fn select_columns(&mut self, input: &str) -> Result<(), DbError> {
        let selected: Vec<String> = input
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        self.explorer.select_columns(selected)?;
        println!("Columns selected.");

        Ok(())
    }

    fn run_query(&mut self, input: &str) -> Result<(), DbError> {
        let filters = parse_filters(input)?;
        let outcome = self.explorer.run_query(&filters)?;
        self.print_outcome(&outcome);

        Ok(())
    }

    fn run_raw(&mut self, sql: &str) -> Result<(), DbError> {
        if sql.is_empty() {
            return Err(DbError::Validation("Usage: \\sql <statement>".to_string()));
        }

        let outcome = self.explorer.run_raw_sql(sql.trim_end_matches(';'))?;
        self.print_outcome(&outcome);

        Ok(())
    }

    fn insert(&mut self, input: &str) -> Result<(), DbError> {
        let form_columns = self
            .explorer
            .insert_form_columns()
            .ok_or_else(|| DbError::Validation("No table selected".to_string()))?;

        let pairs = parse_pairs(input)?;

        for (key, _) in &pairs {
            if !form_columns.iter().any(|c| c == key) {
                return Err(DbError::Validation(format!(
                    "The insert form only binds: {}",
                    form_columns.join(", ")
                )));
            }
        }

        // One field per form column, blank where the user gave nothing.
        let fields: Vec<(String, String)> = form_columns
            .into_iter()
            .map(|column| {
                let value = pairs
                    .iter()
                    .find(|(key, _)| *key == column)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default();
                (column, value)
            })
            .collect();

        let affected = self.explorer.insert_row(&fields)?;
        println!("Saved ({affected} row). View reloaded.");

        Ok(())
    }

    fn export_last(&mut self, input: &str) -> Result<(), DbError> {
        let (format_name, path) = input
            .split_once(char::is_whitespace)
            .ok_or_else(|| DbError::Validation("Usage: \\export csv|xlsx <path>".to_string()))?;

        let format = match format_name {
            "csv" => ExportFormat::Csv,
            "xlsx" => ExportFormat::Xlsx,
            other => {
                return Err(DbError::Validation(format!("Unknown format: {other}")));
            }
        };

        let outcome = self
            .explorer
            .last_outcome()
            .ok_or_else(|| DbError::Validation("Nothing to export; run a query first".to_string()))?
            .clone();

        let path = Path::new(path.trim());
        let mut file = File::create(path)?;

        export(&outcome.result, format, &mut file)
            .map_err(|e| DbError::Io(std::io::Error::other(e.to_string())))?;

        println!("Exported {} rows to {}", outcome.row_count(), path.display());

        Ok(())
    }

    fn show_size(&mut self) -> Result<(), DbError> {
        let bytes = self.explorer.table_disk_size()?;
        println!("{}", render::human_size(bytes));

        Ok(())
    }

    fn show_stats(&self) {
        let session = self.explorer.session();

        println!("Queries this session: {}", session.queries_run());

        if session.visited_tables().is_empty() {
            println!("No tables visited yet.");
        } else {
            println!("Tables visited: {}", session.visited_tables().join(", "));
        }

        if let Some(sql) = self.explorer.last_sql() {
            println!("Last query: {sql}");
        }
    }

    fn print_outcome(&self, outcome: &QueryOutcome) {
        if outcome.result.rows.is_empty() {
            println!("Zero rows.");
        } else {
            println!("{}", render::result_table(&outcome.result));
        }

        println!(
            "{} row(s) in {:.4}s  [{}]",
            outcome.row_count(),
            outcome.elapsed.as_secs_f64(),
            outcome.sql
        );
    }
}

fn parse_filters(input: &str) -> Result<Vec<EqFilter>, DbError> {
    Ok(parse_pairs(input)?
        .into_iter()
        .map(|(column, raw)| EqFilter::new(column, Value::parse_input(&raw)))
        .collect())
}

/// Parse `key=value` pairs separated by whitespace.
fn parse_pairs(input: &str) -> Result<Vec<(String, String)>, DbError> {
    input
        .split_whitespace()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| {
                    DbError::Validation(format!("Expected key=value, got: {pair}"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_filters, parse_pairs};
    use painel_core::Value;

    #[test]
    fn pairs_split_on_first_equals() {
        let pairs = parse_pairs("produto=Mouse valor=80").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("produto".to_string(), "Mouse".to_string()));

        let with_equals = parse_pairs("obs=a=b").unwrap();
        assert_eq!(with_equals[0].1, "a=b");
    }

    #[test]
    fn bare_words_are_rejected() {
        assert!(parse_pairs("produto").is_err());
    }

    #[test]
    fn filters_coerce_values() {
        let filters = parse_filters("valor=80 produto=Mouse").unwrap();
        assert_eq!(filters[0].value, Value::Int(80));
        assert_eq!(filters[1].value, Value::Text("Mouse".to_string()));
    }

    #[test]
    fn empty_input_means_no_filters() {
        assert!(parse_filters("").unwrap().is_empty());
    }
}
