use std::path::Path;

use chrono::NaiveDate;
use colored::Colorize;
use rusqlite::Connection;

use crate::catalog::CategoryCatalog;
use crate::cleaner::clean_description;
use crate::error::{Result, TallyError};
use crate::models::{transaction_id, Direction, Transaction};
use crate::resolver::{CategoryResolver, Prompter};
use crate::store::insert_transactions;

/// Exact header the bank's current-account CSV export carries. Anything
/// else means the file is not in the format this importer understands.
pub const EXPECTED_HEADER: &[&str] = &["Date", "Type", "Description", "Paid out", "Paid in", "Balance"];

/// One statement line after field-level parsing, before category
/// resolution and id assignment.
#[derive(Debug, Clone)]
pub struct StatementRow {
    pub date: String,
    pub transaction_type: String,
    pub raw_description: String,
    pub paid_out: f64,
    pub paid_in: f64,
    pub balance: f64,
}

pub struct ImportOutcome {
    pub parsed: usize,
    pub skipped: usize,
    pub inserted_in: usize,
    pub inserted_out: usize,
}

/// Strip currency symbols, thousands separators and stray quotes. A blank
/// field is exactly 0, not an error; anything else non-numeric (or a
/// negative amount) is a field error that invalidates the row.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('£', "").replace('$', "");
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    s.parse::<f64>().ok().filter(|v| *v >= 0.0)
}

/// Statement dates are dd/mm/yyyy; everything downstream is ISO-8601.
pub fn parse_date_dmy(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Parse a statement file. The header row must match `EXPECTED_HEADER`
/// exactly or the whole file is rejected with zero rows imported; a data
/// row that fails to parse is logged and dropped, and processing continues.
/// Returns the parsed rows and how many were dropped.
pub fn read_statement(file_path: &Path) -> Result<(Vec<StatementRow>, usize)> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut records = rdr.records();
    let header = match records.next() {
        Some(record) => record?,
        None => {
            return Err(TallyError::BadHeader {
                expected: EXPECTED_HEADER.join(","),
                got: String::new(),
            })
        }
    };
    let got: Vec<&str> = header.iter().map(|f| f.trim()).collect();
    if got != EXPECTED_HEADER {
        return Err(TallyError::BadHeader {
            expected: EXPECTED_HEADER.join(","),
            got: got.join(","),
        });
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in records.enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                eprintln!("{}", format!("Skipping row {}: {e}", line + 2).red());
                skipped += 1;
                continue;
            }
        };
        match parse_row(&record) {
            Some(row) => rows.push(row),
            None => {
                eprintln!(
                    "{}",
                    format!("Skipping row {}: malformed fields", line + 2).red()
                );
                skipped += 1;
            }
        }
    }
    Ok((rows, skipped))
}

fn parse_row(record: &csv::StringRecord) -> Option<StatementRow> {
    if record.len() < 6 {
        return None;
    }
    let date = parse_date_dmy(&record[0])?;
    let transaction_type = record[1].trim().to_string();
    let raw_description = record[2].trim().to_string();
    if raw_description.is_empty() {
        return None;
    }
    let paid_out = parse_amount(&record[3])?;
    let paid_in = parse_amount(&record[4])?;
    let balance: f64 = {
        let s = record[5].replace(',', "").replace('"', "").replace('£', "");
        s.trim().parse().ok()?
    };
    // Exactly one side must be positive; both-zero and both-positive rows
    // are data-quality defects and are rejected rather than routed.
    if (paid_in > 0.0) == (paid_out > 0.0) {
        return None;
    }
    Some(StatementRow {
        date,
        transaction_type,
        raw_description,
        paid_out,
        paid_in,
        balance,
    })
}

/// Full import pipeline for one file: parse, resolve a category per row
/// (interactive only for descriptions never seen before), then hand the
/// batch to both store gateways. Dedup happens at the gateway, keyed by
/// the deterministic id — re-importing a file inserts nothing new.
pub fn import_file<P: Prompter>(
    conn: &Connection,
    catalog: &mut CategoryCatalog,
    resolver: &mut CategoryResolver<P>,
    file_path: &Path,
) -> Result<ImportOutcome> {
    let (rows, skipped) = read_statement(file_path)?;

    let mut transactions = Vec::with_capacity(rows.len());
    for row in &rows {
        let direction = if row.paid_in > 0.0 {
            Direction::Inbound
        } else {
            Direction::Outbound
        };
        let processed = clean_description(&row.raw_description);
        let category = resolver.resolve(conn, catalog, &processed, direction)?;
        transactions.push(Transaction {
            id: transaction_id(
                &row.date,
                &row.transaction_type,
                &row.raw_description,
                row.paid_out,
                row.paid_in,
                row.balance,
            ),
            date: row.date.clone(),
            transaction_type: row.transaction_type.clone(),
            raw_description: row.raw_description.clone(),
            processed_description: processed,
            category,
            paid_in: row.paid_in,
            paid_out: row.paid_out,
            balance: row.balance,
        });
    }

    let inserted_in = insert_transactions(conn, Direction::Inbound, &transactions)?;
    let inserted_out = insert_transactions(conn, Direction::Outbound, &transactions)?;

    Ok(ImportOutcome {
        parsed: transactions.len(),
        skipped,
        inserted_in,
        inserted_out,
    })
}
