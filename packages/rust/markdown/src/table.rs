//! Table -> Markdown pipe table.

use wordbook_docx::Table;

/// Render a table. The first row is the header; rows are padded or cut to
/// the header's width.
pub fn render_table(table: &Table) -> String {
    let Some(header) = table.rows.first() else {
        return String::new();
    };
    let col_count = header.len();

    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    lines.push(row_line(header.iter().map(|c| cell_text(c))));
    lines.push(row_line((0..col_count).map(|_| "---".to_string())));

    for row in &table.rows[1..] {
        lines.push(row_line((0..col_count).map(|i| {
            row.get(i).map(|c| cell_text(c)).unwrap_or_default()
        })));
    }

    let mut md = lines.join("\n");
    md.push_str("\n\n");
    md
}

fn row_line(cells: impl Iterator<Item = String>) -> String {
    format!("| {} |", cells.collect::<Vec<_>>().join(" | "))
}

fn cell_text(cell: &str) -> String {
    cell.trim().replace('\n', "<br>")
}
