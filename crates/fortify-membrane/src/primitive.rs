//! Intercepted primitives and the family each one is checked under.

use serde::{Deserialize, Serialize};

/// Rule family; one decision rule per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    FixedCountCopy,
    UnboundedCopy,
    Concatenation,
    BoundedLibraryCopy,
    FormattedOutput,
    BoundedFormattedOutput,
    RawMemory,
    IndexedSearch,
    DescriptorSet,
    SizedIo,
    PathQuery,
    PollArray,
    ArgumentPolicy,
}

impl Family {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FixedCountCopy => "fixed_count_copy",
            Self::UnboundedCopy => "unbounded_copy",
            Self::Concatenation => "concatenation",
            Self::BoundedLibraryCopy => "bounded_library_copy",
            Self::FormattedOutput => "formatted_output",
            Self::BoundedFormattedOutput => "bounded_formatted_output",
            Self::RawMemory => "raw_memory",
            Self::IndexedSearch => "indexed_search",
            Self::DescriptorSet => "descriptor_set",
            Self::SizedIo => "sized_io",
            Self::PathQuery => "path_query",
            Self::PollArray => "poll_array",
            Self::ArgumentPolicy => "argument_policy",
        }
    }
}

/// Every primitive with a checked entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Strncpy,
    Stpncpy,
    Strcpy,
    Stpcpy,
    Strcat,
    Strncat,
    Strlcpy,
    Strlcat,
    Sprintf,
    Vsprintf,
    Snprintf,
    Vsnprintf,
    Memcpy,
    Memmove,
    Mempcpy,
    Memset,
    Bzero,
    Strchr,
    Strrchr,
    Strlen,
    Memchr,
    Memrchr,
    FdIsset,
    FdSet,
    FdClr,
    Read,
    Write,
    Pread,
    Pwrite,
    Pread64,
    Pwrite64,
    Fread,
    Fwrite,
    Readlink,
    Readlinkat,
    Recv,
    Recvfrom,
    Send,
    Sendto,
    Getcwd,
    Poll,
    Ppoll,
    Umask,
    Open,
    Openat,
}

impl Primitive {
    pub const ALL: [Self; 45] = [
        Self::Strncpy,
        Self::Stpncpy,
        Self::Strcpy,
        Self::Stpcpy,
        Self::Strcat,
        Self::Strncat,
        Self::Strlcpy,
        Self::Strlcat,
        Self::Sprintf,
        Self::Vsprintf,
        Self::Snprintf,
        Self::Vsnprintf,
        Self::Memcpy,
        Self::Memmove,
        Self::Mempcpy,
        Self::Memset,
        Self::Bzero,
        Self::Strchr,
        Self::Strrchr,
        Self::Strlen,
        Self::Memchr,
        Self::Memrchr,
        Self::FdIsset,
        Self::FdSet,
        Self::FdClr,
        Self::Read,
        Self::Write,
        Self::Pread,
        Self::Pwrite,
        Self::Pread64,
        Self::Pwrite64,
        Self::Fread,
        Self::Fwrite,
        Self::Readlink,
        Self::Readlinkat,
        Self::Recv,
        Self::Recvfrom,
        Self::Send,
        Self::Sendto,
        Self::Getcwd,
        Self::Poll,
        Self::Ppoll,
        Self::Umask,
        Self::Open,
        Self::Openat,
    ];

    /// C symbol name, as it appears in diagnostics.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Strncpy => "strncpy",
            Self::Stpncpy => "stpncpy",
            Self::Strcpy => "strcpy",
            Self::Stpcpy => "stpcpy",
            Self::Strcat => "strcat",
            Self::Strncat => "strncat",
            Self::Strlcpy => "strlcpy",
            Self::Strlcat => "strlcat",
            Self::Sprintf => "sprintf",
            Self::Vsprintf => "vsprintf",
            Self::Snprintf => "snprintf",
            Self::Vsnprintf => "vsnprintf",
            Self::Memcpy => "memcpy",
            Self::Memmove => "memmove",
            Self::Mempcpy => "mempcpy",
            Self::Memset => "memset",
            Self::Bzero => "bzero",
            Self::Strchr => "strchr",
            Self::Strrchr => "strrchr",
            Self::Strlen => "strlen",
            Self::Memchr => "memchr",
            Self::Memrchr => "memrchr",
            Self::FdIsset => "FD_ISSET",
            Self::FdSet => "FD_SET",
            Self::FdClr => "FD_CLR",
            Self::Read => "read",
            Self::Write => "write",
            Self::Pread => "pread",
            Self::Pwrite => "pwrite",
            Self::Pread64 => "pread64",
            Self::Pwrite64 => "pwrite64",
            Self::Fread => "fread",
            Self::Fwrite => "fwrite",
            Self::Readlink => "readlink",
            Self::Readlinkat => "readlinkat",
            Self::Recv => "recv",
            Self::Recvfrom => "recvfrom",
            Self::Send => "send",
            Self::Sendto => "sendto",
            Self::Getcwd => "getcwd",
            Self::Poll => "poll",
            Self::Ppoll => "ppoll",
            Self::Umask => "umask",
            Self::Open => "open",
            Self::Openat => "openat",
        }
    }

    #[must_use]
    pub const fn family(self) -> Family {
        match self {
            Self::Strncpy | Self::Stpncpy => Family::FixedCountCopy,
            Self::Strcpy | Self::Stpcpy => Family::UnboundedCopy,
            Self::Strcat | Self::Strncat => Family::Concatenation,
            Self::Strlcpy | Self::Strlcat => Family::BoundedLibraryCopy,
            Self::Sprintf | Self::Vsprintf => Family::FormattedOutput,
            Self::Snprintf | Self::Vsnprintf => Family::BoundedFormattedOutput,
            Self::Memcpy | Self::Memmove | Self::Mempcpy | Self::Memset | Self::Bzero => {
                Family::RawMemory
            }
            Self::Strchr | Self::Strrchr | Self::Strlen | Self::Memchr | Self::Memrchr => {
                Family::IndexedSearch
            }
            Self::FdIsset | Self::FdSet | Self::FdClr => Family::DescriptorSet,
            Self::Read
            | Self::Write
            | Self::Pread
            | Self::Pwrite
            | Self::Pread64
            | Self::Pwrite64
            | Self::Fread
            | Self::Fwrite
            | Self::Readlink
            | Self::Readlinkat
            | Self::Recv
            | Self::Recvfrom
            | Self::Send
            | Self::Sendto => Family::SizedIo,
            Self::Getcwd => Family::PathQuery,
            Self::Poll | Self::Ppoll => Family::PollArray,
            Self::Umask | Self::Open | Self::Openat => Family::ArgumentPolicy,
        }
    }

    /// Sized I/O that reads the caller's buffer instead of filling it.
    #[must_use]
    pub const fn reads_buffer(self) -> bool {
        matches!(
            self,
            Self::Write | Self::Pwrite | Self::Pwrite64 | Self::Fwrite | Self::Send | Self::Sendto
        )
    }

    /// Look a primitive up by its C symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.symbol() == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip_and_are_unique() {
        for primitive in Primitive::ALL {
            assert_eq!(Primitive::from_symbol(primitive.symbol()), Some(primitive));
        }
        let mut symbols: Vec<_> = Primitive::ALL.iter().map(|p| p.symbol()).collect();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), Primitive::ALL.len());
    }

    #[test]
    fn unknown_symbol_is_none() {
        assert_eq!(Primitive::from_symbol("gets"), None);
    }

    #[test]
    fn variadic_and_va_list_forms_share_a_family() {
        assert_eq!(Primitive::Sprintf.family(), Primitive::Vsprintf.family());
        assert_eq!(Primitive::Snprintf.family(), Primitive::Vsnprintf.family());
        assert_ne!(Primitive::Sprintf.family(), Primitive::Snprintf.family());
    }
}
