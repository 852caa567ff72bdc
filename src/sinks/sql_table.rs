use super::{DatasetSink, StagedOutput};
use crate::errors::{AppError, AppResult};
use crate::models::Dataset;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::info;

/// Replaces the contents of a SQLite table with the dataset.
///
/// The table is dropped and recreated inside one transaction. Staging runs
/// every statement but the commit, so a discarded or failed publish leaves
/// the previous contents in place.
pub struct SqliteTableSink {
    database: PathBuf,
    table: String,
}

impl SqliteTableSink {
    /// Fails with `InvalidInput` unless `table` is a plain SQL identifier.
    pub fn new(database: impl Into<PathBuf>, table: impl Into<String>) -> AppResult<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self {
            database: database.into(),
            table,
        })
    }

    pub fn database(&self) -> &Path {
        &self.database
    }

    fn open(&self) -> AppResult<Connection> {
        if let Some(parent) = self.database.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::SinkError(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Ok(Connection::open(&self.database)?)
    }
}

/// Accepts identifiers made of ASCII letters, digits and underscores that do
/// not start with a digit.
pub fn validate_table_name(table: &str) -> AppResult<()> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "Table name '{table}' must contain only letters, digits and underscores"
        )))
    }
}

impl DatasetSink for SqliteTableSink {
    fn name(&self) -> String {
        format!("table {} in {}", self.table, self.database.display())
    }

    fn stage(&self, dataset: &Dataset) -> AppResult<Box<dyn StagedOutput>> {
        let conn = self.open()?;

        // Left open until commit; closing the connection rolls it back
        conn.execute_batch(&format!(
            r#"
            BEGIN IMMEDIATE;
            DROP TABLE IF EXISTS "{table}";
            CREATE TABLE "{table}" (
                name   TEXT NOT NULL,
                height REAL NOT NULL,
                weight REAL NOT NULL
            );
            "#,
            table = self.table
        ))?;

        {
            let mut stmt = conn.prepare(&format!(
                r#"INSERT INTO "{}" (name, height, weight) VALUES (?1, ?2, ?3)"#,
                self.table
            ))?;
            for record in dataset {
                stmt.execute(params![record.name, record.height, record.weight])?;
            }
        }

        Ok(Box::new(StagedTable {
            conn,
            database: self.database.clone(),
            table: self.table.clone(),
            rows: dataset.len(),
        }))
    }
}

/// A table rebuilt inside an open transaction.
struct StagedTable {
    conn: Connection,
    database: PathBuf,
    table: String,
    rows: usize,
}

impl StagedOutput for StagedTable {
    fn commit(self: Box<Self>) -> AppResult<()> {
        self.conn.execute_batch("COMMIT")?;
        info!(
            database = %self.database.display(),
            table = %self.table,
            rows = self.rows,
            "Table replaced"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use tempfile::TempDir;

    fn row_count(db: &Path, table: &str) -> i64 {
        let conn = Connection::open(db).unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn publish_creates_table_with_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("etl.db");
        let sink = SqliteTableSink::new(&db, "etl_table").unwrap();

        sink.publish(&Dataset::from(vec![
            Record::new("Alice", 1.7272, 68.0388),
            Record::new("Bob", 1.8288, 81.64656),
        ]))
        .unwrap();

        assert_eq!(row_count(&db, "etl_table"), 2);
        let conn = Connection::open(&db).unwrap();
        let (name, height): (String, f64) = conn
            .query_row(
                "SELECT name, height FROM etl_table WHERE rowid = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(name, "Alice");
        assert!((height - 1.7272).abs() < 1e-9);
    }

    #[test]
    fn publish_replaces_instead_of_appending() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("etl.db");
        let sink = SqliteTableSink::new(&db, "people").unwrap();
        let dataset = Dataset::from(vec![Record::new("Alice", 1.0, 2.0)]);

        sink.publish(&dataset).unwrap();
        sink.publish(&dataset).unwrap();

        assert_eq!(row_count(&db, "people"), 1);
    }

    #[test]
    fn publish_empty_dataset_leaves_empty_table() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("nested/etl.db");
        let sink = SqliteTableSink::new(&db, "people").unwrap();

        sink.publish(&Dataset::new()).unwrap();

        assert_eq!(row_count(&db, "people"), 0);
    }

    #[test]
    fn discarded_stage_keeps_previous_table() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("etl.db");
        let sink = SqliteTableSink::new(&db, "people").unwrap();
        sink.publish(&Dataset::from(vec![Record::new("Alice", 1.0, 2.0)]))
            .unwrap();

        let staged = sink
            .stage(&Dataset::from(vec![
                Record::new("Bob", 1.0, 2.0),
                Record::new("Carol", 1.0, 2.0),
            ]))
            .unwrap();
        drop(staged);

        assert_eq!(row_count(&db, "people"), 1);
    }

    #[test]
    fn unopenable_database_is_sink_error() {
        let temp_dir = TempDir::new().unwrap();
        let sink = SqliteTableSink::new(temp_dir.path(), "people").unwrap();

        let result = sink.stage(&Dataset::new());

        assert!(matches!(result, Err(AppError::SinkError(_))));
    }

    #[test]
    fn table_name_validation() {
        assert!(validate_table_name("ETL_Table").is_ok());
        assert!(validate_table_name("_t1").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1table").is_err());
        assert!(validate_table_name("people; DROP TABLE x").is_err());
        assert!(validate_table_name("a\"b").is_err());
    }
}
