//! Majority voting over replica outputs.
//!
//! At every position the value with the highest occurrence count wins. When
//! several values share the top count there is no majority and the configured
//! [`TieBreak`] decides; that is always recorded as [`Event::VoteTie`]. With
//! three replicas this reduces to: two agree → their value; all differ → the
//! first replica.

use crate::error::{RedundError, Result};
use crate::events::{Event, EventSink, Position};
use crate::replicate::ReplicaSet;

/// Resolve a position without a majority.
///
/// `votes` holds one value per replica; `tied` lists, for every value sharing
/// the top count, the earliest replica slot that produced it (ascending).
/// Returns the slot whose value wins. An out-of-range slot falls back to `tied[0]`.
pub trait TieBreak<T> {
    fn resolve_tie(&self, votes: &[T], tied: &[usize]) -> usize;
}

/// Always the first replica, tied or not.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstReplica;

impl<T> TieBreak<T> for FirstReplica {
    fn resolve_tie(&self, _votes: &[T], _tied: &[usize]) -> usize {
        0
    }
}

/// The earliest replica among the tied values.
#[derive(Debug, Default, Clone, Copy)]
pub struct EarliestTied;

impl<T> TieBreak<T> for EarliestTied {
    fn resolve_tie(&self, _votes: &[T], tied: &[usize]) -> usize {
        tied.first().copied().unwrap_or(0)
    }
}

/// Config-selectable tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreakPolicy {
    FirstReplica,
    #[default]
    EarliestTied,
}

impl<T> TieBreak<T> for TieBreakPolicy {
    fn resolve_tie(&self, votes: &[T], tied: &[usize]) -> usize {
        match self {
            TieBreakPolicy::FirstReplica => FirstReplica.resolve_tie(votes, tied),
            TieBreakPolicy::EarliestTied => EarliestTied.resolve_tie(votes, tied),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Voter<B = TieBreakPolicy> {
    tie_break: B,
}

impl Voter {
    pub fn new(policy: TieBreakPolicy) -> Self {
        Self { tie_break: policy }
    }
}

impl Default for Voter {
    fn default() -> Self {
        Self::new(TieBreakPolicy::default())
    }
}

impl<B> Voter<B> {
    pub fn with_tie_break(tie_break: B) -> Self {
        Self { tie_break }
    }

    /// Vote over whole decisions.
    pub fn vote_value<T>(&self, votes: &[T], sink: &dyn EventSink) -> Result<T>
    where
        T: PartialEq + Clone,
        B: TieBreak<T>,
    {
        let labels: Vec<usize> = (0..votes.len()).collect();
        self.vote_value_labeled(votes, &labels, sink)
    }

    /// Element-wise vote over zone/fan grids of identical shape.
    pub fn vote_grid<T>(
        &self,
        replicas: &[Vec<Vec<T>>],
        sink: &dyn EventSink,
    ) -> Result<Vec<Vec<T>>>
    where
        T: PartialEq + Clone,
        B: TieBreak<T>,
    {
        let labels: Vec<usize> = (0..replicas.len()).collect();
        self.vote_grid_labeled(replicas, &labels, sink)
    }

    /// [`Voter::vote_value`] over a replica set; events name real replica indices.
    pub fn vote_replicas<T>(&self, set: &ReplicaSet<T>, sink: &dyn EventSink) -> Result<T>
    where
        T: PartialEq + Clone,
        B: TieBreak<T>,
    {
        let votes: Vec<T> = set.outputs().cloned().collect();
        self.vote_value_labeled(&votes, &set.indices(), sink)
    }

    /// [`Voter::vote_grid`] over a replica set; events name real replica indices.
    pub fn vote_replicas_grid<T>(
        &self,
        set: &ReplicaSet<Vec<Vec<T>>>,
        sink: &dyn EventSink,
    ) -> Result<Vec<Vec<T>>>
    where
        T: PartialEq + Clone,
        B: TieBreak<T>,
    {
        let grids: Vec<Vec<Vec<T>>> = set.outputs().cloned().collect();
        self.vote_grid_labeled(&grids, &set.indices(), sink)
    }

    fn vote_value_labeled<T>(
        &self,
        votes: &[T],
        labels: &[usize],
        sink: &dyn EventSink,
    ) -> Result<T>
    where
        T: PartialEq + Clone,
        B: TieBreak<T>,
    {
        if votes.is_empty() {
            return Err(RedundError::NoReplicas);
        }
        Ok(self.decide_position(votes, labels, Position::Whole, sink))
    }

    fn vote_grid_labeled<T>(
        &self,
        replicas: &[Vec<Vec<T>>],
        labels: &[usize],
        sink: &dyn EventSink,
    ) -> Result<Vec<Vec<T>>>
    where
        T: PartialEq + Clone,
        B: TieBreak<T>,
    {
        let Some(first) = replicas.first() else {
            return Err(RedundError::NoReplicas);
        };
        check_shape(replicas, labels)?;

        let mut voted = Vec::with_capacity(first.len());
        for (zone, fans) in first.iter().enumerate() {
            let mut row = Vec::with_capacity(fans.len());
            for fan in 0..fans.len() {
                let votes: Vec<T> = replicas.iter().map(|r| r[zone][fan].clone()).collect();
                let position = Position::Cell { zone, fan };
                row.push(self.decide_position(&votes, labels, position, sink));
            }
            voted.push(row);
        }
        Ok(voted)
    }

    fn decide_position<T>(
        &self,
        votes: &[T],
        labels: &[usize],
        position: Position,
        sink: &dyn EventSink,
    ) -> T
    where
        T: PartialEq + Clone,
        B: TieBreak<T>,
    {
        let label = |slot: usize| labels.get(slot).copied().unwrap_or(slot);
        let groups = tally(votes);
        let top = groups.iter().map(|g| g.count).max().unwrap_or(0);
        let tied: Vec<usize> = groups
            .iter()
            .filter(|g| g.count == top)
            .map(|g| g.first)
            .collect();

        let winner = if tied.len() == 1 {
            tied[0]
        } else {
            let pick = self.tie_break.resolve_tie(votes, &tied);
            let pick = if pick < votes.len() { pick } else { tied[0] };
            sink.record(Event::VoteTie {
                position,
                tied: tied.iter().map(|&s| label(s)).collect(),
                chosen: label(pick),
            });
            pick
        };

        if tied.len() == 1 && top < votes.len() {
            let dissenters = votes
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != votes[winner])
                .map(|(slot, _)| label(slot))
                .collect();
            sink.record(Event::VoteOutvoted {
                position,
                dissenters,
            });
        }
        votes[winner].clone()
    }
}

struct Group {
    first: usize,
    count: usize,
}

/// Distinct values in order of first appearance with their counts.
fn tally<T: PartialEq>(votes: &[T]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for (slot, v) in votes.iter().enumerate() {
        match groups.iter_mut().find(|g| votes[g.first] == *v) {
            Some(g) => g.count += 1,
            None => groups.push(Group {
                first: slot,
                count: 1,
            }),
        }
    }
    groups
}

fn check_shape<T>(replicas: &[Vec<Vec<T>>], labels: &[usize]) -> Result<()> {
    let Some(first) = replicas.first() else {
        return Ok(());
    };
    for (slot, r) in replicas.iter().enumerate().skip(1) {
        let replica = labels.get(slot).copied().unwrap_or(slot);
        if r.len() != first.len() {
            return Err(RedundError::shape(format!(
                "replica {replica} has {} zones, expected {}",
                r.len(),
                first.len()
            )));
        }
        for (zone, (a, b)) in first.iter().zip(r).enumerate() {
            if a.len() != b.len() {
                return Err(RedundError::shape(format!(
                    "replica {replica} zone {zone} has {} fans, expected {}",
                    b.len(),
                    a.len()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use rstest::rstest;

    fn voter() -> Voter {
        Voter::default()
    }

    #[rstest]
    #[case(&[7, 7, 7], 7)]
    #[case(&[7, 9, 7], 7)]
    #[case(&[9, 7, 7], 7)]
    #[case(&[1, 2, 3], 1)]
    #[case(&[5], 5)]
    fn three_replica_rules(#[case] votes: &[i32], #[case] expected: i32) {
        let got = voter().vote_value(votes, &MemorySink::new()).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn all_differ_is_flagged() {
        let sink = MemorySink::new();
        voter().vote_value(&[1, 2, 3], &sink).unwrap();
        assert_eq!(
            sink.events(),
            vec![Event::VoteTie {
                position: Position::Whole,
                tied: vec![0, 1, 2],
                chosen: 0
            }]
        );
    }

    #[test]
    fn policies_differ_when_first_replica_is_not_tied() {
        // a b b c c: b and c tie at two votes, a has one.
        let votes = ["a", "b", "b", "c", "c"];
        let sink = MemorySink::new();
        let earliest = Voter::new(TieBreakPolicy::EarliestTied)
            .vote_value(&votes, &sink)
            .unwrap();
        let first = Voter::new(TieBreakPolicy::FirstReplica)
            .vote_value(&votes, &sink)
            .unwrap();
        assert_eq!(earliest, "b");
        assert_eq!(first, "a");
    }

    #[test]
    fn plurality_records_dissenters() {
        let sink = MemorySink::new();
        let got = voter().vote_value(&[4, 4, 9], &sink).unwrap();
        assert_eq!(got, 4);
        assert_eq!(
            sink.events(),
            vec![Event::VoteOutvoted {
                position: Position::Whole,
                dissenters: vec![2]
            }]
        );
    }

    #[test]
    fn grid_votes_per_cell() {
        let a = vec![vec![20.0, 10.0], vec![20.0, 20.0]];
        let b = vec![vec![20.0, 99.0], vec![20.0, 20.0]];
        let c = vec![vec![0.0, 10.0], vec![20.0, 20.0]];
        let sink = MemorySink::new();
        let voted = voter().vote_grid(&[a.clone(), b, c], &sink).unwrap();
        assert_eq!(voted, a);
        assert_eq!(sink.count("vote_outvoted"), 2);
        assert_eq!(sink.count("vote_tie"), 0);
    }

    #[test]
    fn grid_shape_mismatch_is_error() {
        let a = vec![vec![1.0, 2.0]];
        let b = vec![vec![1.0]];
        let err = voter()
            .vote_grid(&[a.clone(), b, a], &MemorySink::new())
            .unwrap_err();
        assert!(matches!(err, RedundError::ShapeMismatch { .. }));
    }

    #[test]
    fn empty_is_no_replicas() {
        let empty: &[Vec<Vec<f64>>] = &[];
        assert_eq!(
            voter().vote_grid(empty, &MemorySink::new()),
            Err(RedundError::NoReplicas)
        );
    }

    #[test]
    fn custom_tie_break_is_honoured() {
        struct Highest;
        impl TieBreak<i32> for Highest {
            fn resolve_tie(&self, votes: &[i32], tied: &[usize]) -> usize {
                tied.iter().copied().max_by_key(|&s| votes[s]).unwrap_or(0)
            }
        }
        let got = Voter::with_tie_break(Highest)
            .vote_value(&[1, 3, 2], &MemorySink::new())
            .unwrap();
        assert_eq!(got, 3);
    }
}
