//! Scheduling merge: copy the scheduling fields of aligned source cards onto
//! their destination cards.
//!
//! Cards are matched through their note ids, never by row position. Only the
//! fields in [`SCHEDULE_COLUMNS`](crate::deck::SCHEDULE_COLUMNS) move; `nid`,
//! card ids and every other column of the destination stay as they were.

use std::collections::{HashMap, HashSet};

use crate::deck::{CardTable, NoteId, Schedule};
use crate::error::{DeckRole, Result, TransferError};
use crate::reconcile::Alignment;

/// Return a copy of `destination` with scheduling state taken from `source`
/// for every aligned pair.
///
/// When several source cards share a note the first in row order supplies
/// the schedule. When several destination cards share a note they all
/// receive it.
pub fn merge_schedules(
    alignment: &Alignment,
    source: &CardTable,
    destination: &CardTable,
) -> Result<CardTable> {
    let mut source_schedules: HashMap<NoteId, Schedule> = HashMap::new();
    for card in source {
        source_schedules.entry(card.nid).or_insert(card.schedule);
    }

    let mut incoming: HashMap<NoteId, Schedule> = HashMap::with_capacity(alignment.len());
    for &(src, dst) in alignment.pairs() {
        let schedule = source_schedules
            .get(&src)
            .copied()
            .ok_or(TransferError::MissingCard {
                deck: DeckRole::Source,
                note: src,
            })?;
        incoming.insert(dst, schedule);
    }

    let dest_notes: HashSet<NoteId> = destination.iter().map(|c| c.nid).collect();
    for &(_, dst) in alignment.pairs() {
        if !dest_notes.contains(&dst) {
            return Err(TransferError::MissingCard {
                deck: DeckRole::Destination,
                note: dst,
            });
        }
    }

    Ok(destination
        .iter()
        .map(|card| {
            let mut card = card.clone();
            if let Some(schedule) = incoming.get(&card.nid) {
                card.schedule = *schedule;
            }
            card
        })
        .collect())
}
