mod catalog;
mod cleaner;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod models;
mod report;
mod resolver;
mod settings;
mod store;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            data_dir,
            statement_dir,
        } => cli::init::run(data_dir, statement_dir),
        Commands::Import { file } => cli::import::run(&file),
        Commands::Categories => cli::categories::run(),
        Commands::Report {
            year,
            from_date,
            to_date,
            detail,
        } => cli::report::run(year, from_date, to_date, detail),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
