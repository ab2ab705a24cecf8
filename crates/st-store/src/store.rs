use std::path::{Path, PathBuf};
use std::{env, fs};

use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use st_core::{Card, CardTable, DeckTables, FieldValue, Note, NoteId, NoteTable, Schedule};
use uuid::Uuid;

use crate::archive;
use crate::error::{Result, StoreError};
use crate::schema;

/// Scratch directory holding a private copy of a deck. Removed on drop.
struct WorkDir {
    path: PathBuf,
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            tracing::warn!("failed to clean up {}: {e}", self.path.display());
        }
    }
}

/// One opened deck: its collection database plus the files that go back
/// into the archive on commit.
pub struct DeckStore {
    // declared before `work_dir` so the database closes before cleanup
    conn: Connection,
    work_dir: WorkDir,
    entries: Vec<String>,
    card_columns: Vec<String>,
    origin: PathBuf,
}

impl DeckStore {
    /// Open an `.apkg` archive or an already unpacked deck directory.
    /// Either way the deck is copied into a fresh work directory under
    /// `work_root` (defaults to the temp dir) and the input is only read.
    pub fn open(path: &Path, work_root: Option<&Path>) -> Result<Self> {
        if !path.is_dir() && !path.is_file() {
            return Err(StoreError::InvalidData(format!(
                "no deck archive at {}",
                path.display()
            )));
        }

        let root = work_root
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);
        let dir = root.join(format!("st-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir)?;
        // owned from here on so a failed copy still cleans up
        let work_dir = WorkDir { path: dir };

        let entries = if path.is_dir() {
            let entries = archive::list_entries(path)?;
            archive::copy_files(path, &work_dir.path)?;
            tracing::info!(
                "copied unpacked deck {} into {}",
                path.display(),
                work_dir.path.display()
            );
            entries
        } else {
            let entries = archive::unpack(path, &work_dir.path)?;
            tracing::info!(
                "unpacked {} into {}",
                path.display(),
                work_dir.path.display()
            );
            entries
        };

        if !entries.iter().any(|e| e.as_str() == "media") {
            tracing::warn!("{} has no media manifest", path.display());
        }

        let collection = schema::find_collection(&work_dir.path)?;
        let conn = Connection::open(&collection)?;
        let card_columns = schema::validate(&conn)?;

        Ok(Self {
            conn,
            work_dir,
            entries,
            card_columns,
            origin: path.to_path_buf(),
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Where the deck was opened from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir.path
    }

    /// Card table columns in declaration order.
    pub fn card_columns(&self) -> &[String] {
        &self.card_columns
    }

    // --- Load ---

    pub fn notes(&self) -> Result<NoteTable> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, flds FROM notes ORDER BY rowid")?;
        let notes: NoteTable = stmt
            .query_map([], |row| {
                Ok(Note {
                    id: NoteId(row.get(0)?),
                    fields: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;
        tracing::debug!("loaded {} notes from {}", notes.len(), self.origin.display());
        Ok(notes)
    }

    pub fn cards(&self) -> Result<CardTable> {
        let mut stmt = self.conn.prepare("SELECT * FROM cards ORDER BY rowid")?;
        let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
        let width = names.len();

        let rows: Vec<Vec<Value>> = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<std::result::Result<_, _>>()?;

        let cards = rows
            .into_iter()
            .map(|row| card_from_row(&names, row))
            .collect::<Result<CardTable>>()?;
        tracing::debug!("loaded {} cards from {}", cards.len(), self.origin.display());
        Ok(cards)
    }

    pub fn tables(&self) -> Result<DeckTables> {
        Ok(DeckTables::new(self.notes()?, self.cards()?))
    }

    // --- Save ---

    /// Swap the card table's rows for `cards`. The table definition and
    /// indexes stay; values are written in declared column order.
    pub fn replace_cards(&self, cards: &CardTable) -> Result<()> {
        let column_list = self
            .card_columns
            .iter()
            .map(|c| schema::quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.card_columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("INSERT INTO cards ({column_list}) VALUES ({placeholders})");

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM cards", [])?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for card in cards {
                let values = row_from_card(&self.card_columns, card);
                stmt.execute(params_from_iter(values.iter()))?;
            }
        }
        tx.commit()?;

        tracing::info!(
            "replaced {} cards in {}",
            cards.len(),
            self.origin.display()
        );
        Ok(())
    }

    /// Write the deck back out as an archive at `output`.
    pub fn commit(&self, output: &Path, overwrite: bool) -> Result<()> {
        if output.exists() && !overwrite {
            return Err(StoreError::OutputExists(output.to_path_buf()));
        }
        // Non-fatal: collections in rollback-journal mode have no WAL.
        if self
            .conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            .is_ok()
        {
            tracing::debug!("checkpointed {}", self.origin.display());
        }
        archive::pack(&self.work_dir.path, &self.entries, output, overwrite)
    }
}

fn card_from_row(names: &[String], row: Vec<Value>) -> Result<Card> {
    let mut nid = None;
    let mut schedule = Schedule::default();
    let mut extra = Vec::with_capacity(names.len());

    for (name, value) in names.iter().zip(row) {
        if name == "nid" {
            nid = Some(NoteId(integer(name, value)?));
        } else if schedule.get(name).is_some() {
            schedule.set(name, integer(name, value)?);
        } else {
            extra.push((name.clone(), field_value(value)));
        }
    }

    let nid = nid.ok_or_else(|| StoreError::InvalidData("card row without nid".into()))?;
    Ok(Card {
        nid,
        schedule,
        extra,
    })
}

fn row_from_card(columns: &[String], card: &Card) -> Vec<Value> {
    columns
        .iter()
        .map(|col| {
            if col == "nid" {
                Value::Integer(card.nid.0)
            } else if let Some(v) = card.schedule.get(col) {
                Value::Integer(v)
            } else {
                card.extra_value(col)
                    .map(sql_value)
                    .unwrap_or(Value::Null)
            }
        })
        .collect()
}

/// Integer columns may hold whole-number REALs in decks rewritten by
/// dataframe tools; those are accepted, fractions are not.
fn integer(column: &str, value: Value) -> Result<i64> {
    match value {
        Value::Integer(v) => Ok(v),
        Value::Real(r) if r.fract() == 0.0 => Ok(r as i64),
        other => Err(StoreError::InvalidData(format!(
            "card column '{column}' holds non-integer value {other:?}"
        ))),
    }
}

fn field_value(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Integer(v) => FieldValue::Integer(v),
        Value::Real(r) => FieldValue::Real(r),
        Value::Text(s) => FieldValue::Text(s),
        Value::Blob(b) => FieldValue::Blob(b),
    }
}

fn sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(v) => Value::Integer(*v),
        FieldValue::Real(r) => Value::Real(*r),
        FieldValue::Text(s) => Value::Text(s.clone()),
        FieldValue::Blob(b) => Value::Blob(b.clone()),
    }
}
