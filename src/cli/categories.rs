use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::Result;
use crate::settings::get_data_dir;

pub struct CategoryCount {
    pub category: String,
    pub mappings: i64,
}

pub fn run() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("tally.db"))?;
    let counts = category_counts(&conn)?;

    if counts.is_empty() {
        println!("No categories learned yet. Import a statement first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Mapped descriptions"]);
    for row in counts {
        table.add_row(vec![Cell::new(row.category), Cell::new(row.mappings)]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn category_counts(conn: &Connection) -> Result<Vec<CategoryCount>> {
    let mut stmt = conn.prepare(
        "SELECT category, count(*) FROM category_map GROUP BY category ORDER BY category",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CategoryCount {
                category: row.get(0)?,
                mappings: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
