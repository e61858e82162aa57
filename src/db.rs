// Storage Port - SQLite bootstrap
// Two record tables plus the join table that carries actor <-> movie links.

use crate::error::{CatalogError, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Open (or create) a file database with WAL enabled and the schema in place.
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;

    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    setup_database(&conn)?;

    info!(path = %path.display(), "database opened");
    Ok(conn)
}

/// In-memory database with the schema in place (tests, scratch runs).
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Association rows follow their endpoints on delete
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Record tables
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS actors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            gender TEXT NOT NULL,
            date_of_birth TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            year INTEGER NOT NULL,
            genre TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Join table (filmography / cast)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS association (
            actor_id INTEGER NOT NULL REFERENCES actors(id) ON DELETE CASCADE,
            movie_id INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
            PRIMARY KEY (actor_id, movie_id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_association_movie ON association(movie_id)",
        [],
    )?;

    debug!("schema ready");
    Ok(())
}

/// Row count of one of the catalog tables.
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let sql = match table {
        "actors" => "SELECT COUNT(*) FROM actors",
        "movies" => "SELECT COUNT(*) FROM movies",
        "association" => "SELECT COUNT(*) FROM association",
        other => {
            return Err(CatalogError::InvalidValue {
                field: "table".to_string(),
                message: format!("Unknown table: {}", other),
            });
        }
    };

    let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_is_idempotent() {
        let conn = open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        assert_eq!(count_rows(&conn, "actors").unwrap(), 0);
        assert_eq!(count_rows(&conn, "movies").unwrap(), 0);
        assert_eq!(count_rows(&conn, "association").unwrap(), 0);
    }

    #[test]
    fn test_count_rows_rejects_unknown_table() {
        let conn = open_in_memory().unwrap();
        let err = count_rows(&conn, "sqlite_master; DROP TABLE actors").unwrap_err();
        assert_eq!(err.kind(), "invalid_value");
        assert_eq!(err.to_string(), "Unknown table: sqlite_master; DROP TABLE actors");
    }

    #[test]
    fn test_names_are_unique() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO movies (name, year, genre) VALUES ('Inception', 2010, 'Sci-Fi')",
            [],
        )
        .unwrap();

        let second = conn.execute(
            "INSERT INTO movies (name, year, genre) VALUES ('Inception', 2011, 'Drama')",
            [],
        );
        assert!(second.is_err());
    }
}
