/// Guard for the raw-SQL batch path: accept exactly one read statement.
///
/// The scan is comment- and string-aware, so keywords inside literals or
/// comments cannot fool it, and `SELECT 1; DROP TABLE x` is rejected as
/// two statements.
pub fn is_read_only_query(sql: &str) -> bool {
    let scan = scan_statement(sql);

    if scan.multiple_statements {
        return false;
    }

    let Some(keyword) = first_keyword(&scan.stripped) else {
        return false;
    };

    matches!(
        keyword.as_str(),
        "SELECT" | "WITH" | "SHOW" | "EXPLAIN" | "TABLE" | "VALUES"
    )
}

struct ScanOutcome {
    stripped: String,
    multiple_statements: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Plain,
    LineComment,
    BlockComment,
    SingleQuote,
    DoubleQuote,
}

/// One pass over the text: drop comments, track quoting, and flag any
/// non-whitespace content after a statement-terminating semicolon.
fn scan_statement(sql: &str) -> ScanOutcome {
    let mut stripped = String::with_capacity(sql.len());
    let mut mode = Mode::Plain;
    let mut after_semicolon = false;
    let mut multiple = false;

    let mut chars = sql.chars().peekable();

    while let Some(current) = chars.next() {
        let next = chars.peek().copied();

        match mode {
            Mode::Plain => {
                if current == '-' && next == Some('-') {
                    chars.next();
                    mode = Mode::LineComment;
                    continue;
                }

                if current == '/' && next == Some('*') {
                    chars.next();
                    mode = Mode::BlockComment;
                    continue;
                }

                if current == ';' {
                    after_semicolon = true;
                } else if after_semicolon && !current.is_whitespace() {
                    multiple = true;
                }

                if current == '\'' {
                    mode = Mode::SingleQuote;
                } else if current == '"' {
                    mode = Mode::DoubleQuote;
                }

                stripped.push(current);
            }

            Mode::LineComment => {
                if current == '\n' {
                    stripped.push('\n');
                    mode = Mode::Plain;
                }
            }

            Mode::BlockComment => {
                if current == '*' && next == Some('/') {
                    chars.next();
                    mode = Mode::Plain;
                }
            }

            Mode::SingleQuote => {
                stripped.push(current);

                if current == '\'' {
                    if next == Some('\'') {
                        stripped.push('\'');
                        chars.next();
                    } else {
                        mode = Mode::Plain;
                    }
                }
            }

            Mode::DoubleQuote => {
                stripped.push(current);

                if current == '"' {
                    if next == Some('"') {
                        stripped.push('"');
                        chars.next();
                    } else {
                        mode = Mode::Plain;
                    }
                }
            }
        }
    }

    ScanOutcome {
        stripped,
        multiple_statements: multiple,
    }
}

fn first_keyword(sql: &str) -> Option<String> {
    sql.split_whitespace()
        .map(|part| part.trim_start_matches(|c: char| !c.is_ascii_alphabetic()))
        .find(|part| !part.is_empty())
        .map(|part| {
            part.chars()
                .take_while(|ch| ch.is_ascii_alphabetic())
                .collect::<String>()
                .to_ascii_uppercase()
        })
        .filter(|word| !word.is_empty())
}
