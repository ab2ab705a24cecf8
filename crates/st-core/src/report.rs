use serde::Serialize;

use crate::policy::MissingMatchPolicy;

/// What reconciliation found, for whoever talks to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub source_cards: usize,
    pub destination_cards: usize,
    pub matched: usize,
    pub source_only: Vec<String>,
    pub destination_only: Vec<String>,
}

/// Receives progress from the transfer pipeline.
///
/// `reconciled` fires before the missing-match policy is checked, so the
/// user sees the surplus lists even when the run then aborts.
pub trait Reporter {
    fn reconciled(&mut self, report: &ReconcileReport);

    fn policy_applied(&mut self, _policy: MissingMatchPolicy) {}
}

/// Discards everything.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn reconciled(&mut self, _report: &ReconcileReport) {}
}
