pub mod categories;
pub mod import;
pub mod init;
pub mod report;
pub mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tally", about = "Bank-statement categorizer and category/month report CLI.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up tally: choose a data directory and initialize the database.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Folder your bank statements are exported to
        #[arg(long = "statement-dir")]
        statement_dir: Option<String>,
    },
    /// Import a bank statement CSV, categorizing new descriptions interactively.
    Import {
        /// Path to the statement file
        file: String,
    },
    /// List known categories and how many descriptions map to each.
    Categories,
    /// Build the category/month report for a date range.
    Report {
        /// Report a whole calendar year
        #[arg(long, conflicts_with_all = ["from_date", "to_date"])]
        year: Option<i32>,
        /// Start date (YYYY-MM-DD), requires --to
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date (YYYY-MM-DD), requires --from
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Also print the per-month transaction tables for each category
        #[arg(long)]
        detail: bool,
    },
    /// Show database location and row counts.
    Status,
}
