use std::fmt;

use crate::deck::NoteId;

/// Which side of the transfer a deck plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeckRole {
    Source,
    Destination,
}

impl fmt::Display for DeckRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckRole::Source => write!(f, "source"),
            DeckRole::Destination => write!(f, "destination"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TransferError {
    /// The normalized identity field does not uniquely determine a note.
    /// Every occurrence of every non-unique identity, in deck order.
    DuplicateIdentity {
        deck: DeckRole,
        identities: Vec<String>,
    },
    /// Source notes without a match exist and no policy was chosen.
    MissingPolicy { unmatched: usize },
    /// An aligned note has no card row.
    MissingCard { deck: DeckRole, note: NoteId },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::DuplicateIdentity { deck, identities } => write!(
                f,
                "normalized identifier field in {deck} deck does not uniquely determine a card; \
                 select a different field or enable disambiguation. Duplicate ids are: {identities:?}"
            ),
            TransferError::MissingPolicy { unmatched } => write!(
                f,
                "{unmatched} source card(s) have no match in the destination deck, so a \
                 missing-match policy must be chosen.\n\
                 suspend: transfer what matches and suspend the transferred cards in the source \
                 deck, so the source deck can still be used to study only the cards that could \
                 not be transferred.\n\
                 ignore: transfer what matches and leave the source deck untouched; the \
                 untransferred material can then only be studied by going back to the source \
                 deck entirely."
            ),
            TransferError::MissingCard { deck, note } => write!(
                f,
                "note {note} in the {deck} deck has no card; every matched note needs exactly one card"
            ),
        }
    }
}

impl std::error::Error for TransferError {}

pub type Result<T> = std::result::Result<T, TransferError>;
