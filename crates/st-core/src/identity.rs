use std::collections::{HashMap, HashSet};

use crate::deck::{Note, NoteId};
use crate::disambiguate::Disambiguator;
use crate::error::{DeckRole, Result, TransferError};
use crate::normalize::NormalizerChain;

/// Note id → identity for one deck, in note table order.
///
/// Only produced through [`build_identities`] or [`IdentityMap::from_entries`],
/// both of which reject repeated identities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityMap {
    entries: Vec<(NoteId, String)>,
}

impl IdentityMap {
    /// Wrap already-computed identities, enforcing uniqueness.
    pub fn from_entries(deck: DeckRole, entries: Vec<(NoteId, String)>) -> Result<Self> {
        validate_unique(deck, &entries)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NoteId, &str)> {
        self.entries.iter().map(|(id, ident)| (*id, ident.as_str()))
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, ident)| ident.as_str())
    }

    /// Reverse index, identity → note id.
    pub fn by_identity(&self) -> HashMap<&str, NoteId> {
        self.entries
            .iter()
            .map(|(id, ident)| (ident.as_str(), *id))
            .collect()
    }
}

/// Derive the identity of every note: first field, normalizer chain, then a
/// fresh disambiguator (when the chain asks for one), then the uniqueness
/// check.
pub fn build_identities(
    deck: DeckRole,
    notes: &[Note],
    chain: &NormalizerChain,
) -> Result<IdentityMap> {
    let mut disambiguator = chain.disambiguate.then(Disambiguator::new);

    let entries = notes
        .iter()
        .map(|note| {
            let normalized = chain.normalize(note.identity_field());
            let identity = match disambiguator.as_mut() {
                Some(d) => d.process(&normalized),
                None => normalized,
            };
            (note.id, identity)
        })
        .collect();

    IdentityMap::from_entries(deck, entries)
}

/// Every occurrence of every identity that appears more than once, in order.
pub fn duplicate_identities<'a>(identities: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let all: Vec<&str> = identities.into_iter().collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for ident in all.iter().copied() {
        *counts.entry(ident).or_default() += 1;
    }
    all.into_iter()
        .filter(|ident| counts[ident] > 1)
        .map(str::to_string)
        .collect()
}

/// Fail with [`TransferError::DuplicateIdentity`] unless identities and
/// note ids are in one-to-one correspondence.
pub fn validate_unique(deck: DeckRole, entries: &[(NoteId, String)]) -> Result<()> {
    let distinct: HashSet<&str> = entries.iter().map(|(_, ident)| ident.as_str()).collect();
    if distinct.len() == entries.len() {
        return Ok(());
    }
    Err(TransferError::DuplicateIdentity {
        deck,
        identities: duplicate_identities(entries.iter().map(|(_, ident)| ident.as_str())),
    })
}
