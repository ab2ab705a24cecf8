use std::fmt;
use std::io::{self, Write};

use serde::Serialize;
use st_core::{MissingMatchPolicy, ReconcileReport, Reporter, TransferOutcome};

/// Prose progress for a person at a terminal.
///
/// The first write error is kept and surfaced by [`ConsoleReporter::finish`];
/// later lines are dropped once the writer has failed.
pub struct ConsoleReporter<W: Write> {
    out: W,
    error: Option<io::Error>,
    unmatched_source: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            error: None,
            unmatched_source: false,
        }
    }

    /// Write one line of prose.
    pub fn line(&mut self, text: fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self
            .out
            .write_fmt(text)
            .and_then(|()| self.out.write_all(b"\n"))
        {
            self.error = Some(e);
        }
    }

    /// Flush and hand back the writer, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

fn surplus_line(count: usize, holder: &str, other: &str) -> String {
    if count == 1 {
        format!("There is 1 card in the {holder} deck that has no equivalent in the {other} deck:")
    } else {
        format!(
            "There are {count} cards in the {holder} deck that have no equivalent in the {other} deck:"
        )
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn reconciled(&mut self, report: &ReconcileReport) {
        self.line(format_args!(
            "Source deck contains {} cards.",
            report.source_cards
        ));
        self.line(format_args!(
            "Destination deck contains {} cards.",
            report.destination_cards
        ));
        self.line(format_args!(
            "{} (on each deck) of these cards have been matched to transfer scheduling data.",
            report.matched
        ));
        self.line(format_args!(""));

        if !report.destination_only.is_empty() {
            self.line(format_args!(
                "{}",
                surplus_line(report.destination_only.len(), "destination", "source")
            ));
            for ident in &report.destination_only {
                self.line(format_args!("  {ident}"));
            }
            self.line(format_args!(
                "This only means the destination deck has material that isn't in the source deck, \
                 which isn't necessarily a concern."
            ));
            self.line(format_args!(""));
        }

        self.unmatched_source = !report.source_only.is_empty();
        if self.unmatched_source {
            self.line(format_args!(
                "{}",
                surplus_line(report.source_only.len(), "source", "destination")
            ));
            for ident in &report.source_only {
                self.line(format_args!("  {ident}"));
            }
            self.line(format_args!(""));
        }
    }

    fn policy_applied(&mut self, policy: MissingMatchPolicy) {
        if !self.unmatched_source {
            return;
        }
        let msg = match policy {
            MissingMatchPolicy::Suspend => {
                "The '--missing' argument has been set to suspend, so cards in the source deck \
                 that have their scheduling data transferred onto the destination deck will be \
                 suspended in the source deck."
            }
            MissingMatchPolicy::Ignore => {
                "The '--missing' argument has been set to ignore, so we will transfer the \
                 scheduling data we can and leave the source deck otherwise untouched."
            }
        };
        self.line(format_args!("{msg}"));
        self.line(format_args!(""));
    }
}

/// Machine-readable result of a run, printed with `--json`.
#[derive(Serialize)]
pub struct Summary<'a> {
    #[serde(flatten)]
    pub report: &'a ReconcileReport,
    pub policy: Option<MissingMatchPolicy>,
    pub suspended: usize,
    pub dry_run: bool,
    pub destination_output: Option<String>,
    pub source_output: Option<String>,
}

impl<'a> Summary<'a> {
    pub fn new(outcome: &'a TransferOutcome, dry_run: bool) -> Self {
        Self {
            report: &outcome.report,
            policy: outcome.policy,
            suspended: outcome.suspended,
            dry_run,
            destination_output: None,
            source_output: None,
        }
    }
}
