use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::deck::{CardTable, QUEUE_SUSPENDED};
use crate::error::{Result, TransferError};
use crate::reconcile::{Alignment, Reconciliation};

/// What to do about the source deck when some of its cards found no match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingMatchPolicy {
    /// Leave the source deck untouched.
    Ignore,
    /// Suspend the source cards whose scheduling was transferred, so the
    /// source deck keeps only the untransferred remainder in study.
    Suspend,
}

impl MissingMatchPolicy {
    /// The rewritten source card table, or `None` when the source deck is
    /// left alone.
    pub fn apply(self, alignment: &Alignment, source_cards: &CardTable) -> Option<CardTable> {
        match self {
            MissingMatchPolicy::Ignore => None,
            MissingMatchPolicy::Suspend => Some(suspend_transferred(alignment, source_cards)),
        }
    }
}

impl fmt::Display for MissingMatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingMatchPolicy::Ignore => write!(f, "ignore"),
            MissingMatchPolicy::Suspend => write!(f, "suspend"),
        }
    }
}

impl FromStr for MissingMatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(MissingMatchPolicy::Ignore),
            "suspend" => Ok(MissingMatchPolicy::Suspend),
            other => Err(format!(
                "unknown missing-match policy '{other}' (expected 'suspend' or 'ignore')"
            )),
        }
    }
}

/// A policy is only required once reconciliation has left source cards
/// unmatched. Without unmatched cards the selection passes through as is.
pub fn require_policy(
    reconciliation: &Reconciliation,
    policy: Option<MissingMatchPolicy>,
) -> Result<Option<MissingMatchPolicy>> {
    if reconciliation.has_unmatched_source() && policy.is_none() {
        return Err(TransferError::MissingPolicy {
            unmatched: reconciliation.source_only.len(),
        });
    }
    Ok(policy)
}

fn suspend_transferred(alignment: &Alignment, cards: &CardTable) -> CardTable {
    let transferred = alignment.source_notes();
    cards
        .iter()
        .map(|card| {
            let mut card = card.clone();
            if transferred.contains(&card.nid) {
                card.schedule.queue = QUEUE_SUSPENDED;
            }
            card
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Card, NoteId, Schedule};
    use proptest::prelude::*;

    fn cards(nids: &[i64]) -> CardTable {
        nids.iter()
            .map(|n| {
                Card::new(
                    *n,
                    Schedule {
                        queue: 2,
                        ivl: *n,
                        ..Schedule::default()
                    },
                )
            })
            .collect()
    }

    fn reconciliation(source_only: &[&str]) -> Reconciliation {
        Reconciliation {
            alignment: Alignment::default(),
            source_only: source_only.iter().map(|s| s.to_string()).collect(),
            destination_only: vec![],
            source_total: source_only.len(),
            destination_total: 0,
        }
    }

    #[test]
    fn test_ignore_leaves_source_alone() {
        let alignment = Alignment::from_pairs(vec![(NoteId(1), NoteId(9))]);
        assert!(
            MissingMatchPolicy::Ignore
                .apply(&alignment, &cards(&[1, 2]))
                .is_none()
        );
    }

    #[test]
    fn test_suspend_only_transferred() {
        let alignment = Alignment::from_pairs(vec![(NoteId(1), NoteId(9)), (NoteId(3), NoteId(8))]);
        let before = cards(&[1, 2, 3]);
        let after = MissingMatchPolicy::Suspend
            .apply(&alignment, &before)
            .unwrap();
        let queues: Vec<i64> = after.iter().map(|c| c.schedule.queue).collect();
        assert_eq!(queues, vec![-1, 2, -1]);
        assert_eq!(after[1], before[1]);
        assert_eq!(after[0].schedule.ivl, before[0].schedule.ivl);
    }

    #[test]
    fn test_require_policy() {
        let unmatched = reconciliation(&["鳥"]);
        assert_eq!(
            require_policy(&unmatched, None),
            Err(TransferError::MissingPolicy { unmatched: 1 })
        );
        assert_eq!(
            require_policy(&unmatched, Some(MissingMatchPolicy::Ignore)),
            Ok(Some(MissingMatchPolicy::Ignore))
        );

        let complete = reconciliation(&[]);
        assert_eq!(require_policy(&complete, None), Ok(None));
        assert_eq!(
            require_policy(&complete, Some(MissingMatchPolicy::Suspend)),
            Ok(Some(MissingMatchPolicy::Suspend))
        );
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("suspend".parse::<MissingMatchPolicy>(), Ok(MissingMatchPolicy::Suspend));
        assert_eq!("ignore".parse::<MissingMatchPolicy>(), Ok(MissingMatchPolicy::Ignore));
        assert!("delete".parse::<MissingMatchPolicy>().is_err());
        assert_eq!(MissingMatchPolicy::Suspend.to_string(), "suspend");
    }

    proptest! {
        #[test]
        fn prop_suspend_scope(
            queues in prop::collection::vec(-3i64..4, 1..25),
            picks in prop::collection::vec(any::<bool>(), 25),
        ) {
            let before: CardTable = queues
                .iter()
                .enumerate()
                .map(|(i, q)| Card::new(i as i64, Schedule { queue: *q, ..Schedule::default() }))
                .collect();
            let pairs = (0..before.len())
                .filter(|i| picks[*i])
                .map(|i| (NoteId(i as i64), NoteId(500 + i as i64)))
                .collect();
            let alignment = Alignment::from_pairs(pairs);

            let after = MissingMatchPolicy::Suspend.apply(&alignment, &before).unwrap();
            for (i, (b, a)) in before.iter().zip(&after).enumerate() {
                if picks[i] {
                    prop_assert_eq!(a.schedule.queue, QUEUE_SUSPENDED);
                    let mut expected = b.clone();
                    expected.schedule.queue = QUEUE_SUSPENDED;
                    prop_assert_eq!(a, &expected);
                } else {
                    prop_assert_eq!(a, b);
                }
            }
        }
    }
}
