//! Maps `Box<dyn Error>` from the decision-function boundary to typed `RedundError`.
//!
//! The trait in `redund_traits` uses `Box<dyn Error + Send + Sync>` so any
//! implementation can plug in; this module recovers the typed errors the
//! core's own decision functions raise and wraps everything else as a
//! replica fault.

use crate::error::{RangeViolation, RedundError};

/// Map a trait-boundary error from replica `replica` to a typed `RedundError`.
pub fn map_replica_error(
    replica: usize,
    e: Box<dyn std::error::Error + Send + Sync>,
) -> RedundError {
    let e = match e.downcast::<RedundError>() {
        Ok(typed) => return *typed,
        Err(other) => other,
    };
    match e.downcast::<RangeViolation>() {
        Ok(rv) => RedundError::RangeViolation(*rv),
        Err(other) => RedundError::ReplicaFault {
            replica,
            message: other.to_string(),
        },
    }
}
