//! The full transfer pipeline over two in-memory decks.
//!
//! identities (×2) → reconcile → report → policy check → merge → policy.
//! Every failure surfaces before anything is returned for writing, so a
//! caller that commits only on `Ok` never persists a partial result.

use crate::deck::{CardTable, DeckTables, Note};
use crate::error::{DeckRole, Result};
use crate::identity::build_identities;
use crate::merge::merge_schedules;
use crate::normalize::NormalizerChain;
use crate::policy::{MissingMatchPolicy, require_policy};
use crate::reconcile::reconcile;
use crate::report::{ReconcileReport, Reporter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferOptions {
    pub source_chain: NormalizerChain,
    pub destination_chain: NormalizerChain,
    pub policy: Option<MissingMatchPolicy>,
    /// Only match source notes that own a studied card (`ivl > 0`).
    pub studied_only: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            source_chain: NormalizerChain::legacy_source(),
            destination_chain: NormalizerChain::verbatim(),
            policy: None,
            studied_only: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransferOutcome {
    pub report: ReconcileReport,
    pub policy: Option<MissingMatchPolicy>,
    /// Replacement card table for the destination deck.
    pub destination_cards: CardTable,
    /// Replacement card table for the source deck, when the policy rewrote it.
    pub source_cards: Option<CardTable>,
    /// Source cards moved to the suspended queue.
    pub suspended: usize,
}

pub fn run_transfer(
    source: &DeckTables,
    destination: &DeckTables,
    options: &TransferOptions,
    reporter: &mut dyn Reporter,
) -> Result<TransferOutcome> {
    let studied: Vec<Note>;
    let source_notes: &[Note] = if options.studied_only {
        studied = source.studied_notes();
        &studied
    } else {
        &source.notes
    };

    let source_ids = build_identities(DeckRole::Source, source_notes, &options.source_chain)?;
    let destination_ids = build_identities(
        DeckRole::Destination,
        &destination.notes,
        &options.destination_chain,
    )?;

    let reconciliation = reconcile(&source_ids, &destination_ids);
    let report = reconciliation.report();
    reporter.reconciled(&report);

    let policy = require_policy(&reconciliation, options.policy)?;
    let alignment = &reconciliation.alignment;

    let destination_cards = merge_schedules(alignment, &source.cards, &destination.cards)?;

    let source_cards = policy.and_then(|p| p.apply(alignment, &source.cards));
    let suspended = match &source_cards {
        Some(_) => {
            let transferred = alignment.source_notes();
            source
                .cards
                .iter()
                .filter(|c| transferred.contains(&c.nid))
                .count()
        }
        None => 0,
    };
    if let Some(p) = policy {
        reporter.policy_applied(p);
    }

    Ok(TransferOutcome {
        report,
        policy,
        destination_cards,
        source_cards,
        suspended,
    })
}
