use std::collections::BTreeMap;

use colored::Colorize;
use rusqlite::Connection;

use crate::catalog::CategoryCatalog;
use crate::error::Result;
use crate::models::{Direction, Transaction};

/// Idempotent batch insert for one direction. Records on the other side of
/// the ledger are silently skipped: the importer feeds the same batch to
/// both directions. Returns how many rows were actually inserted; a re-run
/// of an already-imported batch inserts zero.
pub fn insert_transactions(
    conn: &Connection,
    direction: Direction,
    transactions: &[Transaction],
) -> Result<usize> {
    let sql = format!(
        "INSERT OR IGNORE INTO {} (id, date, type, raw_description, processed_description, category, amount, balance) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        direction.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut inserted = 0usize;
    for txn in transactions.iter().filter(|t| direction.matches(t)) {
        inserted += stmt.execute(rusqlite::params![
            txn.id,
            txn.date,
            txn.transaction_type,
            txn.raw_description,
            txn.processed_description,
            txn.category,
            direction.amount(txn),
            txn.balance,
        ])?;
    }
    Ok(inserted)
}

/// Range + category read, ascending by date. Returns `None` when the
/// category is not in the catalog (no query is run) or when the query
/// itself fails; `Some(vec![])` means zero matching rows. Callers treat
/// the two differently.
pub fn extract_transactions(
    conn: &Connection,
    catalog: &mut CategoryCatalog,
    direction: Direction,
    start_date: &str,
    end_date: &str,
    category: &str,
) -> Option<Vec<Transaction>> {
    match catalog.contains(conn, category) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            eprintln!("{}", format!("Storage error: {e}").red());
            return None;
        }
    }
    match query_range(conn, direction, start_date, end_date, category) {
        Ok(rows) => Some(rows),
        Err(e) => {
            eprintln!("{}", format!("Storage error: {e}").red());
            None
        }
    }
}

/// Month-bucketed variant of `extract_transactions`. Bucket keys are
/// calendar month numbers (1-12) taken from the ISO date; ordering inside
/// a bucket is the query's ascending date order.
pub fn extract_by_month(
    conn: &Connection,
    catalog: &mut CategoryCatalog,
    direction: Direction,
    start_date: &str,
    end_date: &str,
    category: &str,
) -> Option<BTreeMap<u32, Vec<Transaction>>> {
    let rows = extract_transactions(conn, catalog, direction, start_date, end_date, category)?;
    let mut buckets: BTreeMap<u32, Vec<Transaction>> = BTreeMap::new();
    for txn in rows {
        let Some(month) = month_of(&txn.date) else {
            eprintln!("{}", format!("Skipping row with bad date: {}", txn.date).red());
            continue;
        };
        buckets.entry(month).or_default().push(txn);
    }
    Some(buckets)
}

fn month_of(iso_date: &str) -> Option<u32> {
    iso_date.get(5..7)?.parse().ok().filter(|m| (1..=12).contains(m))
}

fn query_range(
    conn: &Connection,
    direction: Direction,
    start_date: &str,
    end_date: &str,
    category: &str,
) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT id, date, type, raw_description, processed_description, category, amount, balance \
         FROM {} WHERE date BETWEEN ?1 AND ?2 AND category = ?3 ORDER BY date ASC",
        direction.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params![start_date, end_date, category], |row| {
            let amount: f64 = row.get(6)?;
            Ok(Transaction {
                id: row.get(0)?,
                date: row.get(1)?,
                transaction_type: row.get(2)?,
                raw_description: row.get(3)?,
                processed_description: row.get(4)?,
                category: row.get(5)?,
                paid_in: if direction == Direction::Inbound { amount } else { 0.0 },
                paid_out: if direction == Direction::Outbound { amount } else { 0.0 },
                balance: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::models::transaction_id;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn txn(date: &str, raw: &str, paid_in: f64, paid_out: f64, category: &str) -> Transaction {
        Transaction {
            id: transaction_id(date, "VIS", raw, paid_out, paid_in, 100.0),
            date: date.to_string(),
            transaction_type: "VIS".to_string(),
            raw_description: raw.to_string(),
            processed_description: raw.to_string(),
            category: category.to_string(),
            paid_in,
            paid_out,
            balance: 100.0,
        }
    }

    fn learn(conn: &Connection, description: &str, category: &str) {
        conn.execute(
            "INSERT OR IGNORE INTO category_map (description, category) VALUES (?1, ?2)",
            rusqlite::params![description, category],
        )
        .unwrap();
    }

    #[test]
    fn test_insert_routes_by_direction() {
        let (_dir, conn) = test_db();
        let batch = vec![
            txn("2023-01-06", "APPLE", 0.0, 1.49, "Subscriptions"),
            txn("2023-01-10", "SALARY", 2500.0, 0.0, "Income"),
        ];
        let n_out = insert_transactions(&conn, Direction::Outbound, &batch).unwrap();
        let n_in = insert_transactions(&conn, Direction::Inbound, &batch).unwrap();
        assert_eq!(n_out, 1);
        assert_eq!(n_in, 1);

        let out_count: i64 =
            conn.query_row("SELECT count(*) FROM money_out", [], |r| r.get(0)).unwrap();
        let in_count: i64 =
            conn.query_row("SELECT count(*) FROM money_in", [], |r| r.get(0)).unwrap();
        assert_eq!(out_count, 1);
        assert_eq!(in_count, 1);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let (_dir, conn) = test_db();
        let batch = vec![txn("2023-01-06", "APPLE", 0.0, 1.49, "Subscriptions")];
        assert_eq!(insert_transactions(&conn, Direction::Outbound, &batch).unwrap(), 1);
        assert_eq!(insert_transactions(&conn, Direction::Outbound, &batch).unwrap(), 0);
        let count: i64 =
            conn.query_row("SELECT count(*) FROM money_out", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_extract_filters_by_range_and_category() {
        let (_dir, conn) = test_db();
        learn(&conn, "APPLE", "Subscriptions");
        learn(&conn, "TESCO", "Groceries");
        let batch = vec![
            txn("2023-01-06", "APPLE", 0.0, 1.49, "Subscriptions"),
            txn("2023-02-14", "APPLE", 0.0, 2.99, "Subscriptions"),
            txn("2023-01-20", "TESCO", 0.0, 54.10, "Groceries"),
            txn("2023-06-01", "APPLE", 0.0, 0.99, "Subscriptions"),
        ];
        insert_transactions(&conn, Direction::Outbound, &batch).unwrap();

        let mut catalog = CategoryCatalog::new();
        let rows = extract_transactions(
            &conn,
            &mut catalog,
            Direction::Outbound,
            "2023-01-01",
            "2023-03-31",
            "Subscriptions",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        // Ascending by date.
        assert_eq!(rows[0].date, "2023-01-06");
        assert_eq!(rows[1].date, "2023-02-14");
        assert_eq!(rows[0].paid_out, 1.49);
        assert_eq!(rows[0].paid_in, 0.0);
    }

    #[test]
    fn test_unknown_category_returns_none() {
        let (_dir, conn) = test_db();
        learn(&conn, "APPLE", "Subscriptions");
        let mut catalog = CategoryCatalog::new();
        let result = extract_transactions(
            &conn,
            &mut catalog,
            Direction::Outbound,
            "2023-01-01",
            "2023-12-31",
            "Unknown",
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_known_category_with_no_rows_is_some_empty() {
        let (_dir, conn) = test_db();
        learn(&conn, "APPLE", "Subscriptions");
        let mut catalog = CategoryCatalog::new();
        let result = extract_transactions(
            &conn,
            &mut catalog,
            Direction::Outbound,
            "2023-01-01",
            "2023-12-31",
            "Subscriptions",
        );
        assert_eq!(result.unwrap().len(), 0);
    }

    #[test]
    fn test_extract_by_month_buckets() {
        let (_dir, conn) = test_db();
        learn(&conn, "APPLE", "Subscriptions");
        let batch = vec![
            txn("2023-01-06", "APPLE", 0.0, 1.49, "Subscriptions"),
            txn("2023-01-20", "APPLE B", 0.0, 2.99, "Subscriptions"),
            txn("2023-03-14", "APPLE C", 0.0, 0.99, "Subscriptions"),
        ];
        insert_transactions(&conn, Direction::Outbound, &batch).unwrap();

        let mut catalog = CategoryCatalog::new();
        let buckets = extract_by_month(
            &conn,
            &mut catalog,
            Direction::Outbound,
            "2023-01-01",
            "2023-12-31",
            "Subscriptions",
        )
        .unwrap();
        assert_eq!(buckets.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(buckets[&1].len(), 2);
        assert_eq!(buckets[&1][0].date, "2023-01-06");
        assert_eq!(buckets[&3].len(), 1);
    }

    #[test]
    fn test_inbound_rows_invisible_to_outbound_gateway() {
        let (_dir, conn) = test_db();
        learn(&conn, "SALARY", "Income");
        let batch = vec![txn("2023-01-25", "SALARY", 2500.0, 0.0, "Income")];
        insert_transactions(&conn, Direction::Inbound, &batch).unwrap();
        insert_transactions(&conn, Direction::Outbound, &batch).unwrap();

        let mut catalog = CategoryCatalog::new();
        let out = extract_transactions(
            &conn,
            &mut catalog,
            Direction::Outbound,
            "2023-01-01",
            "2023-12-31",
            "Income",
        )
        .unwrap();
        assert!(out.is_empty());
        let inb = extract_transactions(
            &conn,
            &mut catalog,
            Direction::Inbound,
            "2023-01-01",
            "2023-12-31",
            "Income",
        )
        .unwrap();
        assert_eq!(inb.len(), 1);
        assert_eq!(inb[0].paid_in, 2500.0);
    }

    #[test]
    fn test_month_of() {
        assert_eq!(month_of("2023-01-06"), Some(1));
        assert_eq!(month_of("2023-12-31"), Some(12));
        assert_eq!(month_of("garbage"), None);
        assert_eq!(month_of("2023-13-01"), None);
    }
}
