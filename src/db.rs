use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS money_in (
    id TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    type TEXT NOT NULL,
    raw_description TEXT NOT NULL,
    processed_description TEXT NOT NULL,
    category TEXT NOT NULL,
    amount REAL NOT NULL,
    balance REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS money_out (
    id TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    type TEXT NOT NULL,
    raw_description TEXT NOT NULL,
    processed_description TEXT NOT NULL,
    category TEXT NOT NULL,
    amount REAL NOT NULL,
    balance REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS category_map (
    description TEXT PRIMARY KEY,
    category TEXT NOT NULL
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
