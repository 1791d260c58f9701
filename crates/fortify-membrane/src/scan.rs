//! Bounded terminator scans and the request builders built on them.
//!
//! The string entry points and the fixture runner both describe a call
//! through these builders, so the bytes a check inspects are chosen in one
//! place. Each builder returns the scanned facts, which convert into the
//! [`Operation`] handed to `decide`. Raw memory and byte slices plug in
//! through [`ScanSource`].

use crate::capacity::Capacity;
use crate::request::{Extent, Operation};

/// Bytes that can be scanned for a C string terminator.
pub trait ScanSource {
    /// Read at most `bound` bytes, stopping at the first NUL or `stop` byte.
    ///
    /// `Terminated(i)` is the index of the byte that stopped the scan.
    fn scan_until(&self, bound: Capacity, stop: Option<u8>) -> Extent;

    fn scan(&self, bound: Capacity) -> Extent {
        self.scan_until(bound, None)
    }
}

/// A slice is its own outer bound: an unknown capacity scans all of it.
impl ScanSource for [u8] {
    fn scan_until(&self, bound: Capacity, stop: Option<u8>) -> Extent {
        let limit = bound.known().map_or(self.len(), |n| n.min(self.len()));
        match self[..limit]
            .iter()
            .position(|&b| b == 0 || Some(b) == stop)
        {
            Some(at) => Extent::Terminated(at),
            None => Extent::Unterminated(limit),
        }
    }
}

/// What strncpy/stpncpy will read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCountScan {
    pub count: usize,
    pub source: Extent,
    pub source_capacity: Capacity,
}

impl From<FixedCountScan> for Operation {
    fn from(s: FixedCountScan) -> Self {
        Self::FixedCountCopy {
            count: s.count,
            source: s.source,
            source_capacity: s.source_capacity,
        }
    }
}

/// What strcpy/stpcpy will read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyScan {
    pub source: Extent,
    pub source_capacity: Capacity,
}

impl From<CopyScan> for Operation {
    fn from(s: CopyScan) -> Self {
        Self::UnboundedCopy {
            source: s.source,
            source_capacity: s.source_capacity,
        }
    }
}

/// Where strcat/strncat will append, and how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcatScan {
    pub existing: Extent,
    pub source: Extent,
    pub limit: Option<usize>,
}

impl From<ConcatScan> for Operation {
    fn from(s: ConcatScan) -> Self {
        Self::Concat {
            existing: s.existing,
            source: s.source,
            source_capacity: Capacity::Unknown,
            limit: s.limit,
        }
    }
}

/// What strlcpy/strlcat found before copying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryCopyScan {
    pub size: usize,
    pub existing: Extent,
    pub source_len: usize,
}

impl From<LibraryCopyScan> for Operation {
    fn from(s: LibraryCopyScan) -> Self {
        Self::BoundedLibraryCopy {
            size: s.size,
            existing: s.existing,
            source_len: s.source_len,
        }
    }
}

/// strncpy/stpncpy. At most `count` source bytes are read, and never more
/// than the source's own capacity.
pub fn fixed_count_copy<S: ScanSource + ?Sized>(
    count: usize,
    src: &S,
    source_capacity: Capacity,
) -> FixedCountScan {
    FixedCountScan {
        count,
        source: src.scan(Capacity::Known(count).min(source_capacity)),
        source_capacity,
    }
}

/// strcpy/stpcpy. The scan stops at the tighter of both capacities.
pub fn unbounded_copy<S: ScanSource + ?Sized>(
    dest: Capacity,
    src: &S,
    source_capacity: Capacity,
) -> CopyScan {
    CopyScan {
        source: src.scan(dest.min(source_capacity)),
        source_capacity,
    }
}

/// strcat (`limit` is `None`) and strncat.
///
/// The source is read only as far as bytes could still land in the
/// destination. A zero `limit` reads nothing at all.
pub fn concat<D, S>(dest: Capacity, dst: &D, src: &S, limit: Option<usize>) -> ConcatScan
where
    D: ScanSource + ?Sized,
    S: ScanSource + ?Sized,
{
    if limit == Some(0) {
        return ConcatScan {
            existing: Extent::Terminated(0),
            source: Extent::Terminated(0),
            limit,
        };
    }
    let existing = dst.scan(dest);
    let mut room = dest.remaining_after(existing.len());
    if let Some(n) = limit {
        room = room.min(Capacity::Known(n));
    }
    let source = if existing.is_terminated() {
        src.scan(room)
    } else {
        Extent::Unterminated(0)
    };
    ConcatScan {
        existing,
        source,
        limit,
    }
}

/// strlcpy. The whole source is measured; its length is the return value.
pub fn strlcpy<S: ScanSource + ?Sized>(size: usize, src: &S) -> LibraryCopyScan {
    LibraryCopyScan {
        size,
        existing: Extent::Terminated(0),
        source_len: src.scan(Capacity::Unknown).len(),
    }
}

/// strlcat. At most `size` destination bytes are inspected, and never more
/// than its capacity.
pub fn strlcat<D, S>(dest: Capacity, size: usize, dst: &D, src: &S) -> LibraryCopyScan
where
    D: ScanSource + ?Sized,
    S: ScanSource + ?Sized,
{
    LibraryCopyScan {
        size,
        existing: dst.scan(Capacity::from_raw(size).min(dest)),
        source_len: src.scan(Capacity::Unknown).len(),
    }
}
