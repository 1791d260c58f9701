//! Declared capacity of a buffer at the call site.
//!
//! A capacity is either `Known(n)` bytes or `Unknown`. Zero is a real
//! capacity; only `Unknown` disables buffer checks. At the C boundary the
//! distinguished value `usize::MAX` (what `__builtin_object_size` reports for
//! storage it cannot see) maps to `Unknown`.

use std::mem;

/// Raw capacity value meaning "size not known at the call site".
pub const UNKNOWN_CAPACITY: usize = usize::MAX;

/// Declared capacity in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capacity {
    /// Storage is known to hold exactly this many bytes.
    Known(usize),
    /// Storage bound is not visible; checks degrade to pass-through.
    Unknown,
}

impl Capacity {
    /// Decode a raw ABI capacity argument.
    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        if raw == UNKNOWN_CAPACITY {
            Self::Unknown
        } else {
            Self::Known(raw)
        }
    }

    /// Encode back into the raw ABI form.
    #[must_use]
    pub const fn to_raw(self) -> usize {
        match self {
            Self::Known(n) => n,
            Self::Unknown => UNKNOWN_CAPACITY,
        }
    }

    #[must_use]
    pub const fn known(self) -> Option<usize> {
        match self {
            Self::Known(n) => Some(n),
            Self::Unknown => None,
        }
    }

    /// Capacity left after `used` bytes are occupied. Never underflows.
    #[must_use]
    pub const fn remaining_after(self, used: usize) -> Self {
        match self {
            Self::Known(n) => Self::Known(n.saturating_sub(used)),
            Self::Unknown => Self::Unknown,
        }
    }

    /// Number of whole `elem_size`-byte elements the storage holds.
    #[must_use]
    pub const fn elements(self, elem_size: usize) -> Self {
        match self {
            Self::Known(n) if elem_size == 0 => Self::Known(n),
            Self::Known(n) => Self::Known(n / elem_size),
            Self::Unknown => Self::Unknown,
        }
    }

    /// Tighter of two capacities; unknown loses to any known bound.
    #[must_use]
    pub const fn min(self, other: Self) -> Self {
        match (self, other) {
            (Self::Known(a), Self::Known(b)) => Self::Known(if a < b { a } else { b }),
            (Self::Known(a), Self::Unknown) | (Self::Unknown, Self::Known(a)) => Self::Known(a),
            (Self::Unknown, Self::Unknown) => Self::Unknown,
        }
    }
}

/// Storage whose size is visible from its type or its slice metadata.
///
/// This is the call-site half of the resolver: arrays and slices report
/// their exact byte size, raw pointers report `Unknown`.
pub trait DeclaredCapacity {
    fn declared_capacity(&self) -> Capacity;
}

impl<T, const N: usize> DeclaredCapacity for [T; N] {
    fn declared_capacity(&self) -> Capacity {
        Capacity::Known(mem::size_of::<[T; N]>())
    }
}

impl<T> DeclaredCapacity for [T] {
    fn declared_capacity(&self) -> Capacity {
        Capacity::Known(mem::size_of_val(self))
    }
}

impl<T: ?Sized + DeclaredCapacity> DeclaredCapacity for &T {
    fn declared_capacity(&self) -> Capacity {
        (**self).declared_capacity()
    }
}

impl<T: ?Sized + DeclaredCapacity> DeclaredCapacity for &mut T {
    fn declared_capacity(&self) -> Capacity {
        (**self).declared_capacity()
    }
}

impl<T> DeclaredCapacity for *const T {
    fn declared_capacity(&self) -> Capacity {
        Capacity::Unknown
    }
}

impl<T> DeclaredCapacity for *mut T {
    fn declared_capacity(&self) -> Capacity {
        Capacity::Unknown
    }
}

/// Resolve the declared capacity of an expression at the call site.
///
/// ```
/// use fortify_membrane::{object_size, Capacity};
///
/// let buf = [0u8; 10];
/// assert_eq!(object_size!(buf), Capacity::Known(10));
/// assert_eq!(object_size!(buf[4..]), Capacity::Known(6));
/// let raw = buf.as_ptr();
/// assert_eq!(object_size!(raw), Capacity::Unknown);
/// ```
#[macro_export]
macro_rules! object_size {
    ($place:expr) => {
        $crate::capacity::DeclaredCapacity::declared_capacity(&$place)
    };
}

/// Destination storage as seen by one checked call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDescriptor {
    /// Base address; decisions never read it.
    pub addr: usize,
    pub capacity: Capacity,
}

impl BufferDescriptor {
    #[must_use]
    pub const fn new(addr: usize, capacity: Capacity) -> Self {
        Self { addr, capacity }
    }

    /// Descriptor for a raw pointer plus a raw ABI capacity argument.
    #[must_use]
    pub fn from_raw<T>(ptr: *const T, raw_capacity: usize) -> Self {
        Self::new(ptr as usize, Capacity::from_raw(raw_capacity))
    }

    /// Descriptor for storage with no known capacity.
    #[must_use]
    pub const fn unbounded(addr: usize) -> Self {
        Self::new(addr, Capacity::Unknown)
    }
}
