use colored::Colorize;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn run(data_dir: Option<String>, statement_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if let Some(dir) = statement_dir {
        settings.statement_dir = dir;
    }

    std::fs::create_dir_all(&settings.data_dir)?;
    let db_path = std::path::Path::new(&settings.data_dir).join("tally.db");
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("{}", format!("Initialized database at {}", db_path.display()).green());
    Ok(())
}
