//! Rendering typed tables for the CLI.
//!
//! Transport-agnostic: returns strings so the binary decides where they
//! go, and tests can assert on the exact rendering.

use crate::table::TypedTable;
use serde_json::json;

/// Renders a table as aligned plain text with a header row.
pub fn render_text(table: &TypedTable) -> String {
    let headers: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_display_string()).collect())
        .collect();

    // Column widths from headers and cells.
    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut out = String::new();
    render_row(&mut out, &headers, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    render_row(&mut out, &separator, &widths);
    for row in &rows {
        render_row(&mut out, row, &widths);
    }
    out.push_str(&format!(
        "({} row{})\n",
        table.row_count(),
        if table.row_count() == 1 { "" } else { "s" }
    ));
    out
}

fn render_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

/// Renders a table as a JSON object with column metadata and rows.
pub fn render_json(table: &TypedTable) -> String {
    let value = json!({
        "columns": table.columns,
        "rows": table.rows,
        "row_count": table.row_count(),
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}
