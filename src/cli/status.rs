use crate::db::get_connection;
use crate::error::Result;
use crate::settings::get_data_dir;

pub fn run() -> Result<()> {
    let db_path = get_data_dir().join("tally.db");
    if !db_path.exists() {
        println!("No database found at {}. Run `tally init` first.", db_path.display());
        return Ok(());
    }
    let conn = get_connection(&db_path)?;

    println!("Database: {}", db_path.display());
    for table in ["money_in", "money_out", "category_map"] {
        let count: i64 =
            conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?;
        println!("  {table}: {count} rows");
    }
    Ok(())
}
