//! Fault injection for redundancy experiments.
//!
//! [`FaultyReplica`] wraps any decision function and corrupts its output,
//! or fails the call, on a chosen schedule. Used to show that voting masks
//! a single faulty replica and that the N-version comparator recovers from
//! transient disagreement.
pub mod error;
pub mod fault;

pub use error::SimError;
pub use fault::{Fault, FaultyReplica, Perturb, Schedule};
