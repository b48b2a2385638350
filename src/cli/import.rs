use std::path::PathBuf;

use colored::Colorize;

use crate::catalog::CategoryCatalog;
use crate::db::get_connection;
use crate::error::Result;
use crate::importer::import_file;
use crate::resolver::{CategoryResolver, TermPrompter};
use crate::settings::{get_data_dir, load_settings};

pub fn run(file: &str) -> Result<()> {
    let file_path = PathBuf::from(file);
    let settings = load_settings();
    let conn = get_connection(&get_data_dir().join("tally.db"))?;

    let mut catalog = CategoryCatalog::new();
    let mut resolver = CategoryResolver::new(TermPrompter, &settings);

    let outcome = import_file(&conn, &mut catalog, &mut resolver, &file_path)?;

    println!(
        "{} rows parsed, {} skipped",
        outcome.parsed, outcome.skipped
    );
    let inserted = outcome.inserted_in + outcome.inserted_out;
    if inserted == 0 && outcome.parsed > 0 {
        println!("{}", "Nothing new to insert (statement already imported).".yellow());
    } else {
        println!(
            "{}",
            format!(
                "Inserted {} inbound and {} outbound transactions",
                outcome.inserted_in, outcome.inserted_out
            )
            .green()
        );
    }
    Ok(())
}
