#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Fault-tolerant sensor aggregation and redundancy voting.
//!
//! Decision functions never see hardware: they take plain numeric readings
//! and return fresh decisions, reporting anything noteworthy through an
//! [`events::EventSink`].
//!
//! ## Architecture
//!
//! - **Filtering**: leave-one-out and median-deviation outlier rules (`filter`)
//! - **Aggregation**: window screen, filter, robust mean (`aggregate`)
//! - **Validation**: hard physical bounds as typed errors (`validate`)
//! - **Decisions**: tyre pressure warnings (`pressure`), zone fan duties (`climate`)
//! - **Redundancy**: replicate a decision (`replicate`), majority vote (`vote`),
//!   bounded-retry comparison of two versions (`reconcile`)
//!
//! Runtime parameters live in `config`; `conversions` builds them from the
//! TOML schema in `redund_config`.

pub mod aggregate;
pub mod climate;
pub mod config;
pub mod conversions;
pub mod error;
pub mod events;
pub mod filter;
pub mod pressure;
pub mod reconcile;
pub mod replica_error;
pub mod replicate;
pub mod stats;
pub mod validate;
pub mod vote;

pub use aggregate::{Aggregate, Aggregator, MeanOver, NoDataReason, ReadingWindow};
pub use climate::{ClimateCase, ClimateController, Zone, adjust_zone, decide_climate};
pub use config::{ClimateParams, PressureParams, ReconcileCfg, VotingCfg};
pub use error::{Quantity, RangeViolation, RedundError, Result};
pub use events::{Event, EventSink, MemorySink, NullSink, Position, TracingSink};
pub use filter::{OutlierFilter, OutlierPolicy};
pub use pressure::{NonZeroMeanPressure, PressureCase, ScreenedPressure, decide_pressure};
pub use reconcile::{Reconciled, Reconciler};
pub use replicate::{Replica, ReplicaSet, Replicator};
pub use validate::{Bounds, validate, validate_all};
pub use vote::{EarliestTied, FirstReplica, TieBreak, TieBreakPolicy, Voter};

pub use redund_traits::{DecisionFunction, FnDecision};
