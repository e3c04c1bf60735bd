use thiserror::Error;

/// Physical quantity a bound applies to; only used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Temperature,
    FanDuty,
    Tolerance,
    Pressure,
}

impl Quantity {
    pub fn as_str(self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::FanDuty => "fan duty",
            Quantity::Tolerance => "tolerance",
            Quantity::Pressure => "pressure",
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value outside its declared physical bounds (inclusive).
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{quantity} {value} out of range [{lower}, {upper}]")]
pub struct RangeViolation {
    pub quantity: Quantity,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RedundError {
    #[error(transparent)]
    RangeViolation(#[from] RangeViolation),
    #[error("shape mismatch: {detail}")]
    ShapeMismatch { detail: String },
    #[error(
        "persistent mismatch after {attempts} attempts (primary: {primary}, secondary: {secondary})"
    )]
    PersistentMismatch {
        attempts: u32,
        primary: String,
        secondary: String,
    },
    #[error("no replica produced an output")]
    NoReplicas,
    #[error("replica {replica} failed: {message}")]
    ReplicaFault { replica: usize, message: String },
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

impl RedundError {
    pub(crate) fn shape(detail: impl Into<String>) -> Self {
        RedundError::ShapeMismatch {
            detail: detail.into(),
        }
    }

    /// Errors that abort the whole case rather than a single replica.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RedundError::RangeViolation(_)
                | RedundError::ShapeMismatch { .. }
                | RedundError::InvalidConfig(_)
        )
    }
}

pub type Result<T, E = RedundError> = std::result::Result<T, E>;
