use rusqlite::Connection;

use crate::error::Result;

/// In-memory cache of the distinct categories known to the mapping store.
/// Purely derived state: refreshed on demand, never persisted itself.
#[derive(Debug, Default)]
pub struct CategoryCatalog {
    options: Vec<String>,
}

impl CategoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-read the distinct category list and replace the option set.
    /// Must be called after any new category is learned and before the
    /// options are displayed or iterated.
    pub fn refresh(&mut self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare("SELECT DISTINCT category FROM category_map")?;
        let options: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.options = options;
        Ok(())
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Membership test. Refreshes first: callers must not assume repeated
    /// calls avoid re-querying storage.
    pub fn contains(&mut self, conn: &Connection, category: &str) -> Result<bool> {
        self.refresh(conn)?;
        Ok(self.options.iter().any(|c| c == category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn add_mapping(conn: &Connection, description: &str, category: &str) {
        conn.execute(
            "INSERT OR IGNORE INTO category_map (description, category) VALUES (?1, ?2)",
            rusqlite::params![description, category],
        )
        .unwrap();
    }

    #[test]
    fn test_refresh_dedupes_categories() {
        let (_dir, conn) = test_db();
        add_mapping(&conn, "TESCO", "Groceries");
        add_mapping(&conn, "SAINSBURYS", "Groceries");
        add_mapping(&conn, "NETFLIX", "Subscriptions");
        let mut catalog = CategoryCatalog::new();
        catalog.refresh(&conn).unwrap();
        assert_eq!(catalog.options().len(), 2);
        assert!(catalog.options().contains(&"Groceries".to_string()));
        assert!(catalog.options().contains(&"Subscriptions".to_string()));
    }

    #[test]
    fn test_contains_refreshes_first() {
        let (_dir, conn) = test_db();
        let mut catalog = CategoryCatalog::new();
        catalog.refresh(&conn).unwrap();
        assert!(catalog.is_empty());
        // Mapping added after the refresh is still visible through contains().
        add_mapping(&conn, "TESCO", "Groceries");
        assert!(catalog.contains(&conn, "Groceries").unwrap());
        assert!(!catalog.contains(&conn, "Unknown").unwrap());
    }

    #[test]
    fn test_empty_store_yields_empty_catalog() {
        let (_dir, conn) = test_db();
        let mut catalog = CategoryCatalog::new();
        catalog.refresh(&conn).unwrap();
        assert!(catalog.options().is_empty());
    }
}
