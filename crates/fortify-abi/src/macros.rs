//! Call-site wrappers that resolve the destination capacity themselves.
//!
//! The destination must be an array or slice place of bytes; its length is
//! the declared capacity. Arguments may themselves come from other macro
//! expansions, since capacity is taken from the evaluated place.

/// `sprintf` into a byte array or slice; aborts if the output plus its
/// terminator does not fit.
///
/// ```
/// use fortify_abi::fortify_sprintf;
///
/// let mut buf = [0u8; 16];
/// let n = fortify_sprintf!(buf, "{}-{}", "ab", 7);
/// assert_eq!(n, 4);
/// assert_eq!(&buf[..5], b"ab-7\0");
/// ```
#[macro_export]
macro_rules! fortify_sprintf {
    ($dst:expr, $($arg:tt)+) => {
        $crate::stdio_abi::sprintf_into(&mut $dst[..], ::core::format_args!($($arg)+))
    };
}

/// `snprintf` into a byte array or slice with an explicit size bound;
/// aborts if `size` exceeds the destination.
///
/// ```
/// use fortify_abi::fortify_snprintf;
///
/// let mut buf = [0u8; 8];
/// let n = fortify_snprintf!(buf, 4, "{}", "abcdef");
/// assert_eq!(n, 6);
/// assert_eq!(&buf[..4], b"abc\0");
/// ```
#[macro_export]
macro_rules! fortify_snprintf {
    ($dst:expr, $size:expr, $($arg:tt)+) => {
        $crate::stdio_abi::snprintf_into(&mut $dst[..], $size, ::core::format_args!($($arg)+))
    };
}
