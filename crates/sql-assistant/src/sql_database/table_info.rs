//! Schema text for the prompts: DDL plus a few sample rows per table.

use rusqlite::{Connection, Result};
use tracing::debug;

use super::result_format::render_plain;

/// Sample rows appended below each table's DDL.
pub const SAMPLE_ROWS_IN_TABLE_INFO: usize = 3;

/// User tables in name order, SQLite internals excluded.
pub fn list_tables(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT name, sql FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;
    let tables = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?.unwrap_or_default()))
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(tables)
}

/// Render every table (or only `include_tables`) as DDL followed by a
/// commented sample-row block. Tables are separated by a blank line.
pub fn render_table_info(conn: &Connection, include_tables: Option<&[String]>) -> Result<String> {
    let mut sections = Vec::new();

    for (name, ddl) in list_tables(conn)? {
        if let Some(allowed) = include_tables {
            if !allowed.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
                continue;
            }
        }

        let sample = sample_rows(conn, &name)?;
        sections.push(format!("{}\n\n/*\n{}\n*/", ddl.trim_end(), sample));
    }

    debug!("Rendered table info for {} table(s)", sections.len());
    Ok(sections.join("\n\n"))
}

fn sample_rows(conn: &Connection, table: &str) -> Result<String> {
    let query = format!("SELECT * FROM {} LIMIT {}", quote_identifier(table), SAMPLE_ROWS_IN_TABLE_INFO);
    let mut stmt = conn.prepare(&query)?;
    let column_count = stmt.column_count();
    let header = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>()
        .join("\t");

    let mut lines = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(column_count);
        for i in 0..column_count {
            cells.push(render_plain(row.get_ref(i)?));
        }
        lines.push(cells.join("\t"));
    }

    let mut block = format!("{} rows from {} table:\n{}", SAMPLE_ROWS_IN_TABLE_INFO, table, header);
    if !lines.is_empty() {
        block.push('\n');
        block.push_str(&lines.join("\n"));
    }
    Ok(block)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
