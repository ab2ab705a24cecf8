use std::collections::HashSet;
use std::fmt;

/// Separator between the fields packed into a note's `flds` column.
pub const FIELD_SEPARATOR: char = '\x1f';

/// Queue value of a suspended card.
pub const QUEUE_SUSPENDED: i64 = -1;

/// Card columns that make up the scheduling state, in transfer order.
pub const SCHEDULE_COLUMNS: [&str; 7] = ["due", "ivl", "factor", "lapses", "type", "queue", "reps"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    /// All fields packed into one string, split by [`FIELD_SEPARATOR`].
    pub fields: String,
}

impl Note {
    pub fn new(id: i64, fields: &str) -> Self {
        Self {
            id: NoteId(id),
            fields: fields.to_string(),
        }
    }

    /// The first packed field, used to derive the note's identity.
    pub fn identity_field(&self) -> &str {
        self.fields
            .split(FIELD_SEPARATOR)
            .next()
            .unwrap_or_default()
    }
}

pub type NoteTable = Vec<Note>;

/// A cell from a card column the engine does not interpret.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// The scheduling state of one card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    pub due: i64,
    pub ivl: i64,
    pub factor: i64,
    pub lapses: i64,
    /// The `type` column.
    pub card_type: i64,
    pub queue: i64,
    pub reps: i64,
}

impl Schedule {
    /// Look up a field by its card column name.
    pub fn get(&self, column: &str) -> Option<i64> {
        match column {
            "due" => Some(self.due),
            "ivl" => Some(self.ivl),
            "factor" => Some(self.factor),
            "lapses" => Some(self.lapses),
            "type" => Some(self.card_type),
            "queue" => Some(self.queue),
            "reps" => Some(self.reps),
            _ => None,
        }
    }

    /// Set a field by its card column name. Returns false for columns
    /// outside the scheduling set.
    pub fn set(&mut self, column: &str, value: i64) -> bool {
        let slot = match column {
            "due" => &mut self.due,
            "ivl" => &mut self.ivl,
            "factor" => &mut self.factor,
            "lapses" => &mut self.lapses,
            "type" => &mut self.card_type,
            "queue" => &mut self.queue,
            "reps" => &mut self.reps,
            _ => return false,
        };
        *slot = value;
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub nid: NoteId,
    pub schedule: Schedule,
    /// Every other column, in the table's column order.
    pub extra: Vec<(String, FieldValue)>,
}

impl Card {
    pub fn new(nid: i64, schedule: Schedule) -> Self {
        Self {
            nid: NoteId(nid),
            schedule,
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, column: &str, value: FieldValue) -> Self {
        self.extra.push((column.to_string(), value));
        self
    }

    pub fn extra_value(&self, column: &str) -> Option<&FieldValue> {
        self.extra
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

pub type CardTable = Vec<Card>;

/// The two tables of one deck as loaded from its archive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeckTables {
    pub notes: NoteTable,
    pub cards: CardTable,
}

impl DeckTables {
    pub fn new(notes: NoteTable, cards: CardTable) -> Self {
        Self { notes, cards }
    }

    /// Notes owning at least one card that has been studied (`ivl > 0`),
    /// in note table order.
    pub fn studied_notes(&self) -> NoteTable {
        let studied: HashSet<NoteId> = self
            .cards
            .iter()
            .filter(|c| c.schedule.ivl > 0)
            .map(|c| c.nid)
            .collect();
        self.notes
            .iter()
            .filter(|n| studied.contains(&n.id))
            .cloned()
            .collect()
    }
}
