//! Scheduling transfer engine for spaced-repetition decks.
//!
//! Matches the notes of two independently maintained decks through an
//! identity derived from card content (normalized, disambiguated first
//! field), then copies per-card scheduling state from the source deck onto
//! the matched destination cards.
//!
//! Zero I/O: deck tables come in as plain data and leave as plain data.
//! Reading and writing archives is the store's job.

pub mod deck;
pub mod disambiguate;
pub mod error;
pub mod identity;
pub mod merge;
pub mod normalize;
pub mod policy;
pub mod reconcile;
pub mod report;
pub mod transfer;

pub use deck::{
    Card, CardTable, DeckTables, FIELD_SEPARATOR, FieldValue, Note, NoteId, NoteTable,
    QUEUE_SUSPENDED, SCHEDULE_COLUMNS, Schedule,
};
pub use disambiguate::Disambiguator;
pub use error::{DeckRole, Result, TransferError};
pub use identity::{IdentityMap, build_identities, duplicate_identities, validate_unique};
pub use merge::merge_schedules;
pub use normalize::{NormalizerChain, Rule};
pub use policy::{MissingMatchPolicy, require_policy};
pub use reconcile::{Alignment, Reconciliation, reconcile};
pub use report::{NullReporter, ReconcileReport, Reporter};
pub use transfer::{TransferOptions, TransferOutcome, run_transfer};
