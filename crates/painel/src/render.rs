use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use painel_core::{QueryResult, truncate_safe};

const CELL_PREVIEW_LEN: usize = 80;

pub fn result_table(result: &QueryResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(result.column_names());

    for row in &result.rows {
        let cells: Vec<Cell> = row
            .iter()
            .map(|value| Cell::new(truncate_safe(&value.as_display_string(), CELL_PREVIEW_LEN)))
            .collect();
        table.add_row(cells);
    }

    table
}

pub fn human_size(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit = 0;

    while size.abs() >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
