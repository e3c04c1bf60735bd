//! Run several decision functions on the same input.
//!
//! Variants are supplied independently (N-version) or as repeated handles to
//! one implementation (TMR re-execution). Each invocation gets the same
//! read-only input and returns a freshly owned output.

use std::sync::Arc;

use redund_traits::DecisionFunction;

use crate::error::{RedundError, Result};
use crate::events::{Event, EventSink};
use crate::replica_error::map_replica_error;

/// Output of one surviving replica.
#[derive(Debug, Clone, PartialEq)]
pub struct Replica<O> {
    pub index: usize,
    pub name: String,
    pub output: O,
}

/// Outputs of the replicas that produced one, in replica order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaSet<O> {
    replicas: Vec<Replica<O>>,
    failed: Vec<usize>,
}

impl<O> ReplicaSet<O> {
    pub fn replicas(&self) -> &[Replica<O>] {
        &self.replicas
    }

    pub fn outputs(&self) -> impl Iterator<Item = &O> {
        self.replicas.iter().map(|r| &r.output)
    }

    /// Replica indices, aligned with [`ReplicaSet::outputs`].
    pub fn indices(&self) -> Vec<usize> {
        self.replicas.iter().map(|r| r.index).collect()
    }

    /// Indices of replicas that failed with a non-fatal error.
    pub fn failed(&self) -> &[usize] {
        &self.failed
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }
}

impl<O> FromIterator<O> for ReplicaSet<O> {
    fn from_iter<T: IntoIterator<Item = O>>(iter: T) -> Self {
        let replicas = iter
            .into_iter()
            .enumerate()
            .map(|(index, output)| Replica {
                index,
                name: format!("replica-{index}"),
                output,
            })
            .collect();
        Self {
            replicas,
            failed: Vec::new(),
        }
    }
}

pub struct Replicator<'a, I: ?Sized, O> {
    variants: Vec<Box<dyn DecisionFunction<I, Output = O> + 'a>>,
}

impl<'a, I: ?Sized, O> Default for Replicator<'a, I, O> {
    fn default() -> Self {
        Self {
            variants: Vec::new(),
        }
    }
}

impl<'a, I: ?Sized, O> Replicator<'a, I, O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one independently supplied variant.
    pub fn with_variant(mut self, variant: impl DecisionFunction<I, Output = O> + 'a) -> Self {
        self.variants.push(Box::new(variant));
        self
    }

    /// `n` re-executions of one implementation.
    pub fn repeat<D>(decision: D, n: usize) -> Self
    where
        D: DecisionFunction<I, Output = O> + 'a,
    {
        let shared = Arc::new(decision);
        let mut this = Self::new();
        for _ in 0..n {
            this.variants.push(Box::new(Arc::clone(&shared)));
        }
        this
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Invoke every variant in order.
    ///
    /// Fatal errors (range or shape violations) abort immediately. Any other
    /// failure is recorded and that replica is left out of the set.
    pub fn replicate(&self, input: &I, sink: &dyn EventSink) -> Result<ReplicaSet<O>> {
        let mut replicas = Vec::with_capacity(self.variants.len());
        let mut failed = Vec::new();
        for (index, variant) in self.variants.iter().enumerate() {
            match variant.decide(input) {
                Ok(output) => replicas.push(Replica {
                    index,
                    name: variant.name().to_string(),
                    output,
                }),
                Err(e) => {
                    let err = map_replica_error(index, e);
                    if err.is_fatal() {
                        return Err(err);
                    }
                    sink.record(Event::ReplicaFailed {
                        replica: index,
                        name: variant.name().to_string(),
                        message: err.to_string(),
                    });
                    failed.push(index);
                }
            }
        }
        if replicas.is_empty() {
            return Err(RedundError::NoReplicas);
        }
        Ok(ReplicaSet { replicas, failed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use redund_traits::FnDecision;

    #[test]
    fn repeat_runs_same_function_n_times() {
        let square = FnDecision::new("square", |x: &i64| Ok(x * x));
        let set = Replicator::repeat(square, 3)
            .replicate(&4, &MemorySink::new())
            .unwrap();
        assert_eq!(set.outputs().copied().collect::<Vec<_>>(), vec![16, 16, 16]);
        assert_eq!(set.indices(), vec![0, 1, 2]);
        assert!(set.replicas().iter().all(|r| r.name == "square"));
    }

    #[test]
    fn failed_replica_is_excluded_and_reported() {
        let sink = MemorySink::new();
        let set = Replicator::new()
            .with_variant(FnDecision::new("ok", |x: &i64| Ok(*x)))
            .with_variant(FnDecision::new("crash", |_: &i64| -> std::result::Result<i64, _> {
                Err("crashed".into())
            }))
            .with_variant(FnDecision::new("ok2", |x: &i64| Ok(*x)))
            .replicate(&7, &sink)
            .unwrap();
        assert_eq!(set.indices(), vec![0, 2]);
        assert_eq!(set.failed(), &[1]);
        assert_eq!(sink.count("replica_failed"), 1);
    }

    #[test]
    fn all_failed_is_no_replicas() {
        let r: Replicator<'_, i64, i64> = Replicator::new().with_variant(FnDecision::new(
            "crash",
            |_: &i64| -> std::result::Result<i64, _> { Err("crashed".into()) },
        ));
        assert_eq!(r.replicate(&1, &MemorySink::new()), Err(RedundError::NoReplicas));
    }
}
