//! Violation taxonomy.
//!
//! Every `Violation` is fatal. `Display` yields the reason text used in the
//! abort diagnostic; `kind()` gives the coarse class.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse violation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Effective write or scan size exceeds declared capacity.
    CapacityViolation,
    /// Caller-declared bound is larger than the true capacity.
    SentinelMisuse,
    /// A non-buffer argument invariant is broken.
    ArgumentPolicyViolation,
}

impl ViolationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CapacityViolation => "capacity_violation",
            Self::SentinelMisuse => "sentinel_misuse",
            Self::ArgumentPolicyViolation => "argument_policy_violation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("prevented write past end of buffer ({required} bytes into {capacity})")]
    DestinationOverflow { required: usize, capacity: usize },

    #[error("prevented read past end of source buffer (no NUL within {capacity} bytes)")]
    UnterminatedSource { capacity: usize },

    #[error("prevented read past end of destination buffer (no NUL within {capacity} bytes)")]
    UnterminatedDestination { capacity: usize },

    #[error("prevented read past end of buffer ({required} bytes from {capacity})")]
    ReadOverrun { required: usize, capacity: usize },

    #[error("formatted output needs {required} bytes but buffer holds {capacity}")]
    FormatOverflow { required: usize, capacity: usize },

    #[error("size argument {bound} exceeds destination capacity {capacity}")]
    BoundExceedsCapacity { bound: usize, capacity: usize },

    #[error("file descriptor {fd} < 0")]
    NegativeDescriptor { fd: i32 },

    #[error("file descriptor {fd} >= FD_SETSIZE {limit}")]
    DescriptorOutOfRange { fd: i32, limit: usize },

    #[error("fd_set storage of {capacity} bytes is smaller than {required}")]
    DescriptorSetTooSmall { capacity: usize, required: usize },

    #[error("{count} pollfd entries exceed array of {capacity}")]
    PollArrayOverflow { count: u64, capacity: usize },

    #[error("called with invalid mask {mask:#o}")]
    InvalidUmask { mask: u32 },

    #[error("called with O_CREAT or O_TMPFILE but missing mode (flags {flags:#x})")]
    MissingCreateMode { flags: i32 },
}

impl Violation {
    #[must_use]
    pub const fn kind(&self) -> ViolationKind {
        match self {
            Self::DestinationOverflow { .. }
            | Self::UnterminatedSource { .. }
            | Self::UnterminatedDestination { .. }
            | Self::ReadOverrun { .. }
            | Self::FormatOverflow { .. }
            | Self::NegativeDescriptor { .. }
            | Self::DescriptorOutOfRange { .. }
            | Self::DescriptorSetTooSmall { .. }
            | Self::PollArrayOverflow { .. } => ViolationKind::CapacityViolation,
            Self::BoundExceedsCapacity { .. } => ViolationKind::SentinelMisuse,
            Self::InvalidUmask { .. } | Self::MissingCreateMode { .. } => {
                ViolationKind::ArgumentPolicyViolation
            }
        }
    }

    /// Bytes (or elements) the call needed, when the violation is size-based.
    #[must_use]
    pub const fn required(&self) -> Option<u64> {
        match *self {
            Self::DestinationOverflow { required, .. }
            | Self::ReadOverrun { required, .. }
            | Self::FormatOverflow { required, .. }
            | Self::DescriptorSetTooSmall { required, .. } => Some(required as u64),
            Self::BoundExceedsCapacity { bound, .. } => Some(bound as u64),
            Self::PollArrayOverflow { count, .. } => Some(count),
            _ => None,
        }
    }

    /// Declared capacity the call was checked against, when size-based.
    #[must_use]
    pub const fn capacity(&self) -> Option<u64> {
        match *self {
            Self::DestinationOverflow { capacity, .. }
            | Self::UnterminatedSource { capacity }
            | Self::UnterminatedDestination { capacity }
            | Self::ReadOverrun { capacity, .. }
            | Self::FormatOverflow { capacity, .. }
            | Self::BoundExceedsCapacity { capacity, .. }
            | Self::DescriptorSetTooSmall { capacity, .. }
            | Self::PollArrayOverflow { capacity, .. } => Some(capacity as u64),
            _ => None,
        }
    }
}
