use std::path::{Path, PathBuf};

use rusqlite::Connection;
use st_core::SCHEDULE_COLUMNS;

use crate::error::{Result, StoreError};

/// Collection database names, most preferred first. Newer exports ship a
/// placeholder `collection.anki2` next to the real `collection.anki21`.
pub const COLLECTION_FILES: [&str; 2] = ["collection.anki21", "collection.anki2"];

/// zstd-compressed collection used by the newest export format.
const COMPRESSED_COLLECTION: &str = "collection.anki21b";

pub const NOTE_COLUMNS: [&str; 2] = ["id", "flds"];

pub fn find_collection(dir: &Path) -> Result<PathBuf> {
    for name in COLLECTION_FILES {
        let path = dir.join(name);
        if path.is_file() {
            return Ok(path);
        }
    }
    if dir.join(COMPRESSED_COLLECTION).is_file() {
        return Err(StoreError::InvalidData(format!(
            "{} only holds a compressed {COMPRESSED_COLLECTION}; re-export the deck with \
             legacy compatibility enabled",
            dir.display()
        )));
    }
    Err(StoreError::InvalidData(format!(
        "no collection database in {}",
        dir.display()
    )))
}

/// Column names of `table` in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Err(StoreError::InvalidData(format!("missing table '{table}'")));
    }
    Ok(columns)
}

fn require_columns(table: &str, columns: &[String], required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|r| !columns.iter().any(|c| c == r))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::InvalidData(format!(
            "table '{table}' lacks column(s): {}",
            missing.join(", ")
        )))
    }
}

/// Check that the collection has everything the transfer reads or writes.
/// Returns the card table's columns in declaration order.
pub fn validate(conn: &Connection) -> Result<Vec<String>> {
    let note_columns = table_columns(conn, "notes")?;
    require_columns("notes", &note_columns, &NOTE_COLUMNS)?;

    let card_columns = table_columns(conn, "cards")?;
    let mut required = vec!["nid"];
    required.extend(SCHEDULE_COLUMNS);
    require_columns("cards", &card_columns, &required)?;

    Ok(card_columns)
}

/// Quote an identifier for use in generated SQL (`type` is a keyword).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn conn_with(sql: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        conn
    }

    #[test]
    fn test_validate_returns_declared_order() {
        let conn = conn_with(
            "CREATE TABLE notes (id integer primary key, guid text, flds text);
             CREATE TABLE cards (id integer primary key, nid integer, type integer,
                 queue integer, due integer, ivl integer, factor integer, reps integer,
                 lapses integer, data text);",
        );
        let cols = validate(&conn).unwrap();
        assert_eq!(cols[0], "id");
        assert_eq!(cols[1], "nid");
        assert_eq!(cols.last().map(String::as_str), Some("data"));
    }

    #[test]
    fn test_validate_missing_column() {
        let conn = conn_with(
            "CREATE TABLE notes (id integer primary key, flds text);
             CREATE TABLE cards (id integer primary key, nid integer, due integer);",
        );
        let err = validate(&conn).unwrap_err().to_string();
        assert!(err.contains("table 'cards' lacks column(s)"), "{err}");
        assert!(err.contains("ivl"));
    }

    #[test]
    fn test_validate_missing_table() {
        let conn = conn_with("CREATE TABLE notes (id integer primary key, flds text);");
        let err = validate(&conn).unwrap_err().to_string();
        assert!(err.contains("missing table 'cards'"), "{err}");
    }

    #[test]
    fn test_find_collection_prefers_anki21() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("collection.anki2"), b"").unwrap();
        assert!(find_collection(dir.path()).unwrap().ends_with("collection.anki2"));
        std::fs::write(dir.path().join("collection.anki21"), b"").unwrap();
        assert!(find_collection(dir.path()).unwrap().ends_with("collection.anki21"));
    }

    #[test]
    fn test_find_collection_compressed_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("collection.anki21b"), b"").unwrap();
        let err = find_collection(dir.path()).unwrap_err().to_string();
        assert!(err.contains("legacy compatibility"), "{err}");
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("type"), "\"type\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
