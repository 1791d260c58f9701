//! The checked-call decision function.
//!
//! One closed match over [`Operation`] holds every abort rule. The function
//! is pure: same descriptor and request, same decision.

use std::mem;

use crate::capacity::{BufferDescriptor, Capacity};
use crate::request::{Extent, Operation, Request};
use crate::violation::Violation;

/// Highest descriptor an `fd_set` can represent, exclusive.
pub const FD_SETSIZE: usize = 1024;

/// Outcome of a checked call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort(Violation),
}

impl Decision {
    #[must_use]
    pub const fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }

    #[must_use]
    pub const fn violation(&self) -> Option<Violation> {
        match *self {
            Self::Proceed => None,
            Self::Abort(v) => Some(v),
        }
    }
}

impl From<Result<(), Violation>> for Decision {
    fn from(result: Result<(), Violation>) -> Self {
        match result {
            Ok(()) => Self::Proceed,
            Err(v) => Self::Abort(v),
        }
    }
}

/// Decide whether `request` may run against `dest`.
#[must_use]
pub fn decide(dest: BufferDescriptor, request: Request) -> Decision {
    check(dest.capacity, request).into()
}

fn check(cap: Capacity, request: Request) -> Result<(), Violation> {
    match request.op {
        Operation::FixedCountCopy {
            count,
            source,
            source_capacity,
        } => fixed_count_copy(cap, count, source, source_capacity),
        Operation::UnboundedCopy {
            source,
            source_capacity,
        } => unbounded_copy(cap, source, source_capacity),
        Operation::Concat {
            existing,
            source,
            source_capacity,
            limit,
        } => concat(cap, existing, source, source_capacity, limit),
        Operation::BoundedLibraryCopy {
            size,
            existing,
            source_len,
        } => {
            // Without a terminator inside `size` strlcat has no end to append at.
            let unbounded_len = match existing {
                Extent::Terminated(used) => used.saturating_add(source_len).saturating_add(1),
                Extent::Unterminated(_) => usize::MAX,
            };
            bounded_size(cap, size, unbounded_len, overflow)
        }
        Operation::Format { produced } => ensure_write(
            cap,
            produced.saturating_add(1),
            |required, capacity| Violation::FormatOverflow { required, capacity },
        ),
        Operation::BoundedFormat {
            size,
            produced,
            measure_only,
        } => {
            if measure_only {
                return Ok(());
            }
            bounded_size(cap, size, produced.saturating_add(1), |required, capacity| {
                Violation::FormatOverflow { required, capacity }
            })
        }
        Operation::RawMemory {
            len,
            source_capacity,
        } => {
            ensure_write(cap, len, overflow)?;
            ensure_write(source_capacity, len, read_overrun)
        }
        Operation::MemorySearch { count } => ensure_write(cap, count, read_overrun),
        Operation::StringScan { scanned } => string_scan(cap, scanned),
        Operation::DescriptorSet { fd } => descriptor_set(cap, fd),
        Operation::SizedIo { len } => sized_io(cap, request, len),
        // An overflowing product is left to fread/fwrite, which fail the call.
        Operation::ElementIo { size, count } => match size.checked_mul(count) {
            Some(total) => sized_io(cap, request, total),
            None => Ok(()),
        },
        Operation::PathQuery { size } => ensure_write(cap, size, overflow),
        Operation::PollArray {
            count,
            element_size,
        } => match cap.elements(element_size) {
            Capacity::Known(slots) if count > slots as u64 => Err(Violation::PollArrayOverflow {
                count,
                capacity: slots,
            }),
            _ => Ok(()),
        },
        Operation::Umask { mask } => {
            if mask & !0o777 != 0 {
                Err(Violation::InvalidUmask { mask })
            } else {
                Ok(())
            }
        }
        Operation::Open {
            flags,
            mode_supplied,
        } => {
            if needs_mode(flags) && !mode_supplied {
                Err(Violation::MissingCreateMode { flags })
            } else {
                Ok(())
            }
        }
    }
}

fn overflow(required: usize, capacity: usize) -> Violation {
    Violation::DestinationOverflow { required, capacity }
}

fn read_overrun(required: usize, capacity: usize) -> Violation {
    Violation::ReadOverrun { required, capacity }
}

fn ensure_write(
    cap: Capacity,
    required: usize,
    violation: fn(usize, usize) -> Violation,
) -> Result<(), Violation> {
    match cap {
        Capacity::Known(capacity) if required > capacity => Err(violation(required, capacity)),
        _ => Ok(()),
    }
}

/// Rule for caller-supplied size arguments.
///
/// A size of `SIZE_MAX` places no limit, so the unbounded write size is
/// checked instead; any other size must not exceed the true capacity.
fn bounded_size(
    cap: Capacity,
    size: usize,
    unbounded_len: usize,
    violation: fn(usize, usize) -> Violation,
) -> Result<(), Violation> {
    let Capacity::Known(capacity) = cap else {
        return Ok(());
    };
    if size == usize::MAX {
        return ensure_write(cap, unbounded_len, violation);
    }
    if size > capacity {
        return Err(Violation::BoundExceedsCapacity {
            bound: size,
            capacity,
        });
    }
    Ok(())
}

fn fixed_count_copy(
    cap: Capacity,
    count: usize,
    source: Extent,
    source_capacity: Capacity,
) -> Result<(), Violation> {
    ensure_write(cap, count, overflow)?;
    // Reading stops at the source NUL, so only a count beyond the source's
    // own storage can over-read, and only when no NUL lies inside it.
    if let Capacity::Known(src_cap) = source_capacity {
        if count > src_cap && !source.is_terminated() && source.len() >= src_cap {
            return Err(Violation::UnterminatedSource { capacity: src_cap });
        }
    }
    Ok(())
}

fn unbounded_copy(
    cap: Capacity,
    source: Extent,
    source_capacity: Capacity,
) -> Result<(), Violation> {
    match source {
        Extent::Terminated(len) => ensure_write(cap, len.saturating_add(1), overflow),
        Extent::Unterminated(scanned) => {
            if let Capacity::Known(src_cap) = source_capacity {
                if scanned >= src_cap {
                    return Err(Violation::UnterminatedSource { capacity: src_cap });
                }
            }
            // The scan stopped at the destination bound: the string is at
            // least `scanned` bytes and still needs its terminator.
            ensure_write(cap, scanned.saturating_add(1), overflow)
        }
    }
}

fn concat(
    cap: Capacity,
    existing: Extent,
    source: Extent,
    source_capacity: Capacity,
    limit: Option<usize>,
) -> Result<(), Violation> {
    if limit == Some(0) {
        return Ok(());
    }
    let used = match (existing, cap) {
        (Extent::Terminated(len), _) => len,
        (Extent::Unterminated(_), Capacity::Known(capacity)) => {
            return Err(Violation::UnterminatedDestination { capacity });
        }
        (Extent::Unterminated(scanned), Capacity::Unknown) => scanned,
    };

    let appended = match (source, limit) {
        (Extent::Terminated(len), Some(n)) => len.min(n),
        (Extent::Terminated(len), None) => len,
        (Extent::Unterminated(scanned), Some(n)) if n <= scanned => n,
        (Extent::Unterminated(scanned), _) => {
            if let Capacity::Known(src_cap) = source_capacity {
                if scanned >= src_cap {
                    return Err(Violation::UnterminatedSource { capacity: src_cap });
                }
            }
            scanned
        }
    };

    let required = used.saturating_add(appended).saturating_add(1);
    ensure_write(cap, required, overflow)
}

fn string_scan(cap: Capacity, scanned: Extent) -> Result<(), Violation> {
    match (scanned, cap) {
        (Extent::Unterminated(n), Capacity::Known(capacity)) if n >= capacity => {
            Err(Violation::ReadOverrun {
                required: n.saturating_add(1),
                capacity,
            })
        }
        _ => Ok(()),
    }
}

fn descriptor_set(cap: Capacity, fd: i32) -> Result<(), Violation> {
    if fd < 0 {
        return Err(Violation::NegativeDescriptor { fd });
    }
    if fd as usize >= FD_SETSIZE {
        return Err(Violation::DescriptorOutOfRange {
            fd,
            limit: FD_SETSIZE,
        });
    }
    let required = mem::size_of::<libc::fd_set>();
    match cap {
        Capacity::Known(capacity) if capacity < required => {
            Err(Violation::DescriptorSetTooSmall { capacity, required })
        }
        _ => Ok(()),
    }
}

fn sized_io(cap: Capacity, request: Request, len: usize) -> Result<(), Violation> {
    if request.primitive.reads_buffer() {
        ensure_write(cap, len, read_overrun)
    } else {
        ensure_write(cap, len, overflow)
    }
}

/// True when `open` flags require a mode argument.
#[must_use]
pub const fn needs_mode(flags: i32) -> bool {
    (flags & libc::O_CREAT) == libc::O_CREAT || (flags & libc::O_TMPFILE) == libc::O_TMPFILE
}
