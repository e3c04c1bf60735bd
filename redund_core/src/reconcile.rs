//! Bounded-retry comparison of two independently written versions.
//!
//! Not a vote: with two candidates there is no majority. Both versions run
//! on the same input; if their outputs differ both are re-run, up to
//! `max_attempts` comparisons in total. Agreement yields the shared output;
//! exhausting the budget yields [`RedundError::PersistentMismatch`], which
//! the caller reports before moving on.

use std::fmt::Debug;

use redund_traits::DecisionFunction;

use crate::error::{RedundError, Result};
use crate::events::{Event, EventSink};
use crate::replica_error::map_replica_error;

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<O> {
    pub output: O,
    /// Comparisons made, 1 when the first attempt agreed.
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciler {
    max_attempts: u32,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

impl Reconciler {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// A budget of 0 is treated as 1.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn reconcile<I, O, P, S>(
        &self,
        primary: &P,
        secondary: &S,
        input: &I,
        sink: &dyn EventSink,
    ) -> Result<Reconciled<O>>
    where
        I: ?Sized,
        O: PartialEq + Debug,
        P: DecisionFunction<I, Output = O> + ?Sized,
        S: DecisionFunction<I, Output = O> + ?Sized,
    {
        let mut last = (String::new(), String::new());
        for attempt in 1..=self.max_attempts {
            match (run(primary, 0, input)?, run(secondary, 1, input)?) {
                (Ok(output), Ok(other)) if output == other => {
                    sink.record(Event::Reconciled { attempts: attempt });
                    return Ok(Reconciled {
                        output,
                        attempts: attempt,
                    });
                }
                (a, b) => last = (render(&a), render(&b)),
            }
            sink.record(Event::VersionMismatch {
                attempt,
                primary: last.0.clone(),
                secondary: last.1.clone(),
            });
        }
        Err(RedundError::PersistentMismatch {
            attempts: self.max_attempts,
            primary: last.0,
            secondary: last.1,
        })
    }
}

/// Outer error: fatal, abort. Inner error: this version failed, counts as a mismatch.
fn run<I, O, D>(version: &D, slot: usize, input: &I) -> Result<Result<O>>
where
    I: ?Sized,
    D: DecisionFunction<I, Output = O> + ?Sized,
{
    match version.decide(input) {
        Ok(o) => Ok(Ok(o)),
        Err(e) => {
            let err = map_replica_error(slot, e);
            if err.is_fatal() {
                Err(err)
            } else {
                Ok(Err(err))
            }
        }
    }
}

fn render<O: Debug>(r: &Result<O>) -> String {
    match r {
        Ok(o) => format!("{o:?}"),
        Err(e) => format!("<{e}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use redund_traits::FnDecision;
    use std::cell::Cell;

    #[test]
    fn agreeing_versions_reconcile_first_time() {
        let a = FnDecision::new("a", |x: &u32| Ok(vec![*x]));
        let b = FnDecision::new("b", |x: &u32| Ok(vec![*x]));
        let sink = MemorySink::new();
        let r = Reconciler::default().reconcile(&a, &b, &5, &sink).unwrap();
        assert_eq!(r, Reconciled { output: vec![5], attempts: 1 });
        assert_eq!(sink.count("version_mismatch"), 0);
    }

    #[test]
    fn transient_disagreement_recovers() {
        let calls = Cell::new(0u32);
        let flaky = FnDecision::new("flaky", |x: &u32| {
            calls.set(calls.get() + 1);
            Ok(if calls.get() == 1 { x + 1 } else { *x })
        });
        let steady = FnDecision::new("steady", |x: &u32| Ok(*x));
        let sink = MemorySink::new();
        let r = Reconciler::default()
            .reconcile(&flaky, &steady, &9, &sink)
            .unwrap();
        assert_eq!(r.attempts, 2);
        assert_eq!(sink.count("version_mismatch"), 1);
    }

    #[test]
    fn persistent_disagreement_is_reported() {
        let a = FnDecision::new("a", |_: &u32| Ok(1));
        let b = FnDecision::new("b", |_: &u32| Ok(2));
        let sink = MemorySink::new();
        let err = Reconciler::default().reconcile(&a, &b, &0, &sink).unwrap_err();
        assert_eq!(
            err,
            RedundError::PersistentMismatch {
                attempts: 3,
                primary: "1".into(),
                secondary: "2".into(),
            }
        );
        assert_eq!(sink.count("version_mismatch"), 3);
    }

    #[test]
    fn zero_budget_still_compares_once() {
        assert_eq!(Reconciler::new(0).max_attempts(), 1);
    }
}
