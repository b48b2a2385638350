use chrono::{Datelike, NaiveDate};
use comfy_table::{Cell, Table};

use crate::catalog::CategoryCatalog;
use crate::db::get_connection;
use crate::error::{Result, TallyError};
use crate::fmt::money;
use crate::report::{build_report, MonthCell, Report};
use crate::settings::get_data_dir;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn date_range(
    year: Option<i32>,
    from_date: Option<&str>,
    to_date: Option<&str>,
) -> Result<(String, String)> {
    match (from_date, to_date) {
        (Some(from), Some(to)) => {
            // Dates feed straight into a BETWEEN on ISO strings, so
            // anything that isn't a real YYYY-MM-DD date must be refused.
            for d in [from, to] {
                NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| {
                    TallyError::Other(format!("Invalid date `{d}` (expected YYYY-MM-DD)"))
                })?;
            }
            return Ok((from.to_string(), to.to_string()));
        }
        (Some(_), None) => {
            return Err(TallyError::Other(
                "--from requires --to (both date boundaries must be specified)".to_string(),
            ))
        }
        (None, Some(_)) => {
            return Err(TallyError::Other(
                "--to requires --from (both date boundaries must be specified)".to_string(),
            ))
        }
        (None, None) => {}
    }
    let year = year.unwrap_or_else(|| chrono::Local::now().year());
    Ok((format!("{year}-01-01"), format!("{year}-12-31")))
}

pub fn run(
    year: Option<i32>,
    from_date: Option<String>,
    to_date: Option<String>,
    detail: bool,
) -> Result<()> {
    let (start, end) = date_range(year, from_date.as_deref(), to_date.as_deref())?;
    let conn = get_connection(&get_data_dir().join("tally.db"))?;
    let mut catalog = CategoryCatalog::new();
    let report = build_report(&conn, &mut catalog, &start, &end)?;

    if report.categories.is_empty() {
        println!("No categories known yet. Import a statement first.");
        return Ok(());
    }

    println!(
        "Report {} to {}\n{}",
        report.start_date,
        report.end_date,
        render(&report)
    );
    if detail {
        print_detail(&report);
    }
    Ok(())
}

fn print_detail(report: &Report) {
    for agg in &report.categories {
        for month_table in &agg.tables {
            let mut table = Table::new();
            table.set_header(vec!["Date", "Type", "Description", "Amount"]);
            for txn in &month_table.rows {
                let amount = month_table.direction.amount(txn);
                table.add_row(vec![
                    Cell::new(&txn.date),
                    Cell::new(&txn.transaction_type),
                    Cell::new(&txn.raw_description),
                    Cell::new(money(amount)),
                ]);
            }
            println!(
                "\n{} — {} {} ({} = {})\n{table}",
                agg.category,
                MONTH_NAMES[(month_table.month - 1) as usize],
                month_table.direction.label(),
                month_table.sum.label,
                money(month_table.sum.value),
            );
        }
    }
}

fn cell_text(cell: &MonthCell) -> String {
    match cell {
        MonthCell::Empty => String::new(),
        MonthCell::Net { value, .. } => money(*value),
    }
}

pub fn render(report: &Report) -> Table {
    let mut table = Table::new();
    let mut header = vec!["Category".to_string()];
    header.extend(MONTH_NAMES.iter().map(|m| m.to_string()));
    header.push("Total".to_string());
    table.set_header(header);

    for agg in &report.categories {
        let mut row = vec![Cell::new(&agg.category)];
        for cell in &agg.yearly.cells {
            row.push(Cell::new(cell_text(cell)));
        }
        row.push(Cell::new(cell_text(&agg.yearly.total)));
        table.add_row(row);
    }

    let mut grand = vec![Cell::new("TOTAL")];
    for cell in &report.grand_total.cells {
        grand.push(Cell::new(cell_text(cell)));
    }
    grand.push(Cell::new(cell_text(&report.grand_total.total)));
    table.add_row(grand);

    table
}
