//! Operation requests: the runtime facts a checked call hands to `decide`.
//!
//! Requests never hold pointers. Bounded scans run first (see
//! [`crate::scan`]) and their outcome is recorded as an [`Extent`], which
//! keeps the decision a pure function of plain values.

use crate::capacity::Capacity;
use crate::primitive::{Family, Primitive};

/// Result of scanning a C string for its terminator.
///
/// `Unterminated(n)` means no NUL was seen in the first `n` bytes; scans are
/// bounded by a declared capacity, so `n` is the bound that was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extent {
    /// NUL found at this index.
    Terminated(usize),
    /// No NUL within this many scanned bytes.
    Unterminated(usize),
}

impl Extent {
    /// Length before the NUL, or the number of bytes scanned.
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Terminated(n) | Self::Unterminated(n) => n,
        }
    }

    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, Self::Terminated(_))
    }
}

/// Per-family runtime facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// strncpy/stpncpy: always writes exactly `count` bytes.
    FixedCountCopy {
        count: usize,
        /// Source scanned up to `min(count, source_capacity)`.
        source: Extent,
        source_capacity: Capacity,
    },
    /// strcpy/stpcpy: writes `source_len + 1`.
    UnboundedCopy {
        /// Source scanned up to the tighter of both capacities.
        source: Extent,
        source_capacity: Capacity,
    },
    /// strcat/strncat.
    Concat {
        /// Destination scanned for its current terminator within capacity.
        existing: Extent,
        /// Source scanned up to the space left after `existing`.
        source: Extent,
        source_capacity: Capacity,
        /// strncat count; `None` for strcat.
        limit: Option<usize>,
    },
    /// strlcpy/strlcat.
    BoundedLibraryCopy {
        size: usize,
        /// strlcat's destination string within `size`; empty for strlcpy.
        existing: Extent,
        source_len: usize,
    },
    /// sprintf/vsprintf: `produced` excludes the terminator.
    Format { produced: usize },
    /// snprintf/vsnprintf.
    BoundedFormat {
        size: usize,
        produced: usize,
        /// Null destination with size 0.
        measure_only: bool,
    },
    /// memcpy/memmove/mempcpy/memset/bzero.
    RawMemory {
        len: usize,
        /// Capacity of the source for copies, `Unknown` for fills.
        source_capacity: Capacity,
    },
    /// memchr/memrchr over an explicit count.
    MemorySearch { count: usize },
    /// strchr/strrchr/strlen: how far the scan got inside the buffer.
    StringScan { scanned: Extent },
    /// FD_ISSET/FD_SET/FD_CLR.
    DescriptorSet { fd: i32 },
    /// read/write/pread/pwrite/readlink/recv/send and friends.
    SizedIo { len: usize },
    /// fread/fwrite.
    ElementIo { size: usize, count: usize },
    /// getcwd.
    PathQuery { size: usize },
    /// poll/ppoll.
    PollArray { count: u64, element_size: usize },
    Umask { mask: u32 },
    Open { flags: i32, mode_supplied: bool },
}

impl Operation {
    /// Family this operation's rule belongs to.
    #[must_use]
    pub const fn family(&self) -> Family {
        match self {
            Self::FixedCountCopy { .. } => Family::FixedCountCopy,
            Self::UnboundedCopy { .. } => Family::UnboundedCopy,
            Self::Concat { .. } => Family::Concatenation,
            Self::BoundedLibraryCopy { .. } => Family::BoundedLibraryCopy,
            Self::Format { .. } => Family::FormattedOutput,
            Self::BoundedFormat { .. } => Family::BoundedFormattedOutput,
            Self::RawMemory { .. } => Family::RawMemory,
            Self::MemorySearch { .. } | Self::StringScan { .. } => Family::IndexedSearch,
            Self::DescriptorSet { .. } => Family::DescriptorSet,
            Self::SizedIo { .. } | Self::ElementIo { .. } => Family::SizedIo,
            Self::PathQuery { .. } => Family::PathQuery,
            Self::PollArray { .. } => Family::PollArray,
            Self::Umask { .. } | Self::Open { .. } => Family::ArgumentPolicy,
        }
    }
}

/// One checked call: which primitive, with which runtime facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub primitive: Primitive,
    pub op: Operation,
}

impl Request {
    #[must_use]
    pub fn new(primitive: Primitive, op: Operation) -> Self {
        debug_assert_eq!(
            primitive.family(),
            op.family(),
            "{} checked under the wrong rule",
            primitive.symbol()
        );
        Self { primitive, op }
    }
}
