use std::collections::HashSet;

use crate::deck::NoteId;
use crate::identity::IdentityMap;
use crate::report::ReconcileReport;

/// Matched `(source note, destination note)` pairs, in source deck order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    pairs: Vec<(NoteId, NoteId)>,
}

impl Alignment {
    pub fn from_pairs(pairs: Vec<(NoteId, NoteId)>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(NoteId, NoteId)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn source_notes(&self) -> HashSet<NoteId> {
        self.pairs.iter().map(|(src, _)| *src).collect()
    }
}

/// The join of two decks' identities plus what fell out on either side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub alignment: Alignment,
    /// Source identities with no destination counterpart, in source order.
    pub source_only: Vec<String>,
    /// Destination identities with no source counterpart, in destination order.
    pub destination_only: Vec<String>,
    pub source_total: usize,
    pub destination_total: usize,
}

impl Reconciliation {
    pub fn report(&self) -> ReconcileReport {
        ReconcileReport {
            source_cards: self.source_total,
            destination_cards: self.destination_total,
            matched: self.alignment.len(),
            source_only: self.source_only.clone(),
            destination_only: self.destination_only.clone(),
        }
    }

    pub fn has_unmatched_source(&self) -> bool {
        !self.source_only.is_empty()
    }
}

/// Inner-join the two identity maps on identity value.
///
/// Both maps are already one-to-one, so each identity yields at most one
/// pair; that is relied on here, not checked again.
pub fn reconcile(source: &IdentityMap, destination: &IdentityMap) -> Reconciliation {
    let dest_index = destination.by_identity();
    let source_idents: HashSet<&str> = source.identities().collect();

    let mut pairs = Vec::new();
    let mut source_only = Vec::new();
    for (note, ident) in source.iter() {
        match dest_index.get(ident) {
            Some(dest_note) => pairs.push((note, *dest_note)),
            None => source_only.push(ident.to_string()),
        }
    }

    let destination_only = destination
        .identities()
        .filter(|ident| !source_idents.contains(ident))
        .map(str::to_string)
        .collect();

    Reconciliation {
        alignment: Alignment::from_pairs(pairs),
        source_only,
        destination_only,
        source_total: source.len(),
        destination_total: destination.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeckRole;

    fn map(deck: DeckRole, base: i64, idents: &[&str]) -> IdentityMap {
        IdentityMap::from_entries(
            deck,
            idents
                .iter()
                .enumerate()
                .map(|(i, s)| (NoteId(base + i as i64), s.to_string()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_join_and_surplus() {
        let src = map(DeckRole::Source, 1, &["猫", "犬", "鳥"]);
        let dst = map(DeckRole::Destination, 10, &["犬", "猫"]);
        let rec = reconcile(&src, &dst);

        assert_eq!(
            rec.alignment.pairs(),
            &[(NoteId(1), NoteId(11)), (NoteId(2), NoteId(10))]
        );
        assert_eq!(rec.source_only, vec!["鳥"]);
        assert!(rec.destination_only.is_empty());
        assert!(rec.has_unmatched_source());
    }

    #[test]
    fn test_destination_surplus_in_deck_order() {
        let src = map(DeckRole::Source, 1, &["b"]);
        let dst = map(DeckRole::Destination, 10, &["z", "b", "a"]);
        let rec = reconcile(&src, &dst);
        assert_eq!(rec.destination_only, vec!["z", "a"]);
        assert!(!rec.has_unmatched_source());
    }

    #[test]
    fn test_report_counts() {
        let src = map(DeckRole::Source, 1, &["a", "b", "c"]);
        let dst = map(DeckRole::Destination, 10, &["a", "d"]);
        let report = reconcile(&src, &dst).report();
        assert_eq!(report.source_cards, 3);
        assert_eq!(report.destination_cards, 2);
        assert_eq!(report.matched, 1);
        assert_eq!(report.source_only, vec!["b", "c"]);
        assert_eq!(report.destination_only, vec!["d"]);
    }

    #[test]
    fn test_disjoint_decks() {
        let src = map(DeckRole::Source, 1, &["a"]);
        let dst = map(DeckRole::Destination, 10, &["b"]);
        let rec = reconcile(&src, &dst);
        assert!(rec.alignment.is_empty());
        assert_eq!(rec.source_only, vec!["a"]);
        assert_eq!(rec.destination_only, vec!["b"]);
    }

    #[test]
    fn test_alignment_note_sets() {
        let a = Alignment::from_pairs(vec![(NoteId(1), NoteId(5)), (NoteId(2), NoteId(6))]);
        assert!(a.source_notes().contains(&NoteId(2)));
        assert!(!a.source_notes().contains(&NoteId(5)));
        assert_eq!(a.pairs()[1], (NoteId(2), NoteId(6)));
    }
}
