use std::collections::BTreeMap;

use rusqlite::Connection;

use crate::catalog::CategoryCatalog;
use crate::error::{Result, TallyError};
use crate::models::{Direction, Transaction};
use crate::store::extract_by_month;

/// Opaque formula operand for one emitted month table: a symbolic label the
/// spreadsheet writer can turn into a cell reference, plus the computed
/// value for writers that want a literal instead.
#[derive(Debug, Clone, PartialEq)]
pub struct SumRef {
    pub label: String,
    pub value: f64,
}

impl SumRef {
    fn new(category: &str, direction: Direction, month: u32, value: f64) -> Self {
        let slug: String = category
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        Self {
            label: format!("{}_{}_m{}", direction.label(), slug, month),
            value,
        }
    }
}

/// One per-month transaction table for a single category and direction,
/// carrying its own column sum.
#[derive(Debug, Clone)]
pub struct MonthTable {
    pub month: u32,
    pub direction: Direction,
    pub rows: Vec<Transaction>,
    pub sum: SumRef,
}

/// One cell of a yearly summary row.
#[derive(Debug, Clone, PartialEq)]
pub enum MonthCell {
    Empty,
    Net { value: f64, formula: String },
}

impl MonthCell {
    pub fn value(&self) -> f64 {
        match self {
            Self::Empty => 0.0,
            Self::Net { value, .. } => *value,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Twelve monthly cells plus a year total.
#[derive(Debug, Clone)]
pub struct AggregateRow {
    pub cells: [MonthCell; 12],
    pub total: MonthCell,
}

#[derive(Debug)]
pub struct CategoryAggregate {
    pub category: String,
    /// Emitted in ascending month order, inbound table before outbound
    /// within a month.
    pub tables: Vec<MonthTable>,
    pub inbound_sums: BTreeMap<u32, SumRef>,
    pub outbound_sums: BTreeMap<u32, SumRef>,
    pub yearly: AggregateRow,
}

#[derive(Debug)]
pub struct Report {
    pub start_date: String,
    pub end_date: String,
    pub categories: Vec<CategoryAggregate>,
    pub grand_total: AggregateRow,
}

/// Build the month-by-category aggregation for a date range. Every category
/// the catalog knows appears, even with no transactions in range (all-empty
/// row); month tables are sparse — only months with data are emitted.
pub fn build_report(
    conn: &Connection,
    catalog: &mut CategoryCatalog,
    start_date: &str,
    end_date: &str,
) -> Result<Report> {
    catalog.refresh(conn)?;
    let category_names: Vec<String> = catalog.options().to_vec();

    let mut categories = Vec::with_capacity(category_names.len());
    for name in &category_names {
        categories.push(aggregate_category(conn, catalog, name, start_date, end_date)?);
    }

    let grand_total = grand_total_row(&categories);
    Ok(Report {
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        categories,
        grand_total,
    })
}

fn aggregate_category(
    conn: &Connection,
    catalog: &mut CategoryCatalog,
    category: &str,
    start_date: &str,
    end_date: &str,
) -> Result<CategoryAggregate> {
    // Every name here came from the catalog, so a `None` from the gateway
    // is a storage failure, not an unknown category. Zero matching rows is
    // `Some(empty)`; a failed read must abort the whole report rather than
    // render as a silently empty row.
    let inbound = extract_by_month(conn, catalog, Direction::Inbound, start_date, end_date, category)
        .ok_or_else(|| TallyError::StorageRead(category.to_string()))?;
    let outbound =
        extract_by_month(conn, catalog, Direction::Outbound, start_date, end_date, category)
            .ok_or_else(|| TallyError::StorageRead(category.to_string()))?;

    // Active months are the union of the two bucket key-sets; BTreeMap keys
    // keep the ascending order the summary row depends on.
    let mut active_months: Vec<u32> = inbound.keys().chain(outbound.keys()).copied().collect();
    active_months.sort_unstable();
    active_months.dedup();

    let mut tables = Vec::new();
    let mut inbound_sums = BTreeMap::new();
    let mut outbound_sums = BTreeMap::new();
    for &month in &active_months {
        if let Some(rows) = inbound.get(&month) {
            let table = month_table(category, Direction::Inbound, month, rows.clone());
            inbound_sums.insert(month, table.sum.clone());
            tables.push(table);
        }
        if let Some(rows) = outbound.get(&month) {
            let table = month_table(category, Direction::Outbound, month, rows.clone());
            outbound_sums.insert(month, table.sum.clone());
            tables.push(table);
        }
    }

    let yearly = yearly_row(&inbound_sums, &outbound_sums);
    Ok(CategoryAggregate {
        category: category.to_string(),
        tables,
        inbound_sums,
        outbound_sums,
        yearly,
    })
}

fn month_table(
    category: &str,
    direction: Direction,
    month: u32,
    rows: Vec<Transaction>,
) -> MonthTable {
    let total: f64 = rows.iter().map(|t| direction.amount(t)).sum();
    MonthTable {
        month,
        direction,
        sum: SumRef::new(category, direction, month, total),
        rows,
    }
}

/// Per-month cell: empty when neither direction has data; the inbound sum
/// alone; the negated outbound sum alone; or inbound minus outbound. The
/// year total sums the non-empty months.
fn yearly_row(
    inbound_sums: &BTreeMap<u32, SumRef>,
    outbound_sums: &BTreeMap<u32, SumRef>,
) -> AggregateRow {
    let cells: [MonthCell; 12] = std::array::from_fn(|i| {
        let month = (i + 1) as u32;
        match (inbound_sums.get(&month), outbound_sums.get(&month)) {
            (None, None) => MonthCell::Empty,
            (Some(inb), None) => MonthCell::Net {
                value: inb.value,
                formula: format!("={}", inb.label),
            },
            (None, Some(out)) => MonthCell::Net {
                value: -out.value,
                formula: format!("=-{}", out.label),
            },
            (Some(inb), Some(out)) => MonthCell::Net {
                value: inb.value - out.value,
                formula: format!("={}-{}", inb.label, out.label),
            },
        }
    });

    let total = row_total(&cells);
    AggregateRow { cells, total }
}

/// Column-wise sum across category yearly rows, 13 columns; a column where
/// every category is empty stays empty.
fn grand_total_row(categories: &[CategoryAggregate]) -> AggregateRow {
    let cells: [MonthCell; 12] = std::array::from_fn(|i| {
        let contributing: Vec<&MonthCell> = categories
            .iter()
            .map(|c| &c.yearly.cells[i])
            .filter(|cell| !cell.is_empty())
            .collect();
        if contributing.is_empty() {
            return MonthCell::Empty;
        }
        let value = contributing.iter().map(|c| c.value()).sum();
        let formula = contributing
            .iter()
            .map(|c| match c {
                MonthCell::Net { formula, .. } => formula.trim_start_matches('=').to_string(),
                MonthCell::Empty => unreachable!(),
            })
            .collect::<Vec<_>>()
            .join("+");
        MonthCell::Net {
            value,
            formula: format!("=({formula})"),
        }
    });

    let total = row_total(&cells);
    AggregateRow { cells, total }
}

fn row_total(cells: &[MonthCell; 12]) -> MonthCell {
    let non_empty: Vec<&MonthCell> = cells.iter().filter(|c| !c.is_empty()).collect();
    if non_empty.is_empty() {
        return MonthCell::Empty;
    }
    let value = non_empty.iter().map(|c| c.value()).sum();
    let formula = non_empty
        .iter()
        .map(|c| match c {
            MonthCell::Net { formula, .. } => format!("({})", formula.trim_start_matches('=')),
            MonthCell::Empty => unreachable!(),
        })
        .collect::<Vec<_>>()
        .join("+");
    MonthCell::Net {
        value,
        formula: format!("={formula}"),
    }
}
