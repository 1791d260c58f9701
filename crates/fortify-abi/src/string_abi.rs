//! Checked `<string.h>` entry points.
//!
//! Each `__*_chk` function takes the usual arguments plus the declared
//! capacity of the destination (and, for the `*_chk2` forms, of the source).
//! It scans only as far as those capacities allow, asks the membrane for a
//! decision, and then performs exactly what the unchecked primitive would.

use std::ffi::{c_char, c_int, c_void};
use std::ptr;

use fortify_membrane::scan::{self, ScanSource};
use fortify_membrane::{BufferDescriptor, Capacity, Extent, Operation, Primitive};

use crate::runtime_policy::enforce;

/// A C string read in place.
#[derive(Clone, Copy)]
pub(crate) struct RawCStr(*const c_char);

impl RawCStr {
    /// # Safety
    ///
    /// `ptr` must be readable up to the byte that stops a scan or up to the
    /// scan's bound, whichever comes first. With an unknown bound the string
    /// must be NUL-terminated.
    pub(crate) unsafe fn new(ptr: *const c_char) -> Self {
        Self(ptr)
    }

    fn stops_at(self, i: usize, stop: Option<u8>) -> bool {
        // SAFETY: scans only ask for indices `new`'s contract covers.
        let byte = unsafe { *self.0.add(i) } as u8;
        byte == 0 || Some(byte) == stop
    }
}

impl ScanSource for RawCStr {
    fn scan_until(&self, bound: Capacity, stop: Option<u8>) -> Extent {
        match bound {
            Capacity::Known(limit) => match (0..limit).find(|&i| self.stops_at(i, stop)) {
                Some(at) => Extent::Terminated(at),
                None => Extent::Unterminated(limit),
            },
            Capacity::Unknown => {
                let mut i = 0usize;
                while !self.stops_at(i, stop) {
                    i += 1;
                }
                Extent::Terminated(i)
            }
        }
    }
}

/// Copy `len` bytes then a NUL; returns a pointer to the NUL.
///
/// # Safety
///
/// `dst` must be writable for `len + 1` bytes, `src` readable for `len`.
#[inline]
unsafe fn copy_terminated(dst: *mut c_char, src: *const c_char, len: usize) -> *mut c_char {
    // SAFETY: caller guarantees both regions; strcpy-family overlap is UB anyway.
    unsafe {
        ptr::copy_nonoverlapping(src, dst, len);
        *dst.add(len) = 0;
        dst.add(len)
    }
}

// ---------------------------------------------------------------------------
// strcpy / stpcpy
// ---------------------------------------------------------------------------

unsafe fn unbounded_copy(
    primitive: Primitive,
    dst: *mut c_char,
    src: *const c_char,
    dst_len: usize,
    src_len: usize,
) -> *mut c_char {
    let dest = BufferDescriptor::from_raw(dst, dst_len);
    // SAFETY: the scan never exceeds either declared capacity.
    let src_str = unsafe { RawCStr::new(src) };
    let found = scan::unbounded_copy(dest.capacity, &src_str, Capacity::from_raw(src_len));
    enforce(primitive, dest, found.into());
    // Proceeding implies the terminator was found.
    // SAFETY: the decision admitted `len + 1` bytes into `dst`.
    unsafe { copy_terminated(dst, src, found.source.len()) }
}

/// Checked `strcpy`.
///
/// # Safety
///
/// `src` must be a valid C string; `dst` must be writable for `dst_len`
/// bytes (or for the copy when `dst_len` is unknown).
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __strcpy_chk(
    dst: *mut c_char,
    src: *const c_char,
    dst_len: usize,
) -> *mut c_char {
    // SAFETY: forwarded contract.
    unsafe { __strcpy_chk2(dst, src, dst_len, usize::MAX) }
}

/// Checked `strcpy` with a declared source capacity.
///
/// # Safety
///
/// As [`__strcpy_chk`]; `src` must be readable for `src_len` bytes or up to
/// its terminator.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __strcpy_chk2(
    dst: *mut c_char,
    src: *const c_char,
    dst_len: usize,
    src_len: usize,
) -> *mut c_char {
    // SAFETY: forwarded contract.
    unsafe { unbounded_copy(Primitive::Strcpy, dst, src, dst_len, src_len) };
    dst
}

/// Checked `stpcpy`; returns a pointer to the copied terminator.
///
/// # Safety
///
/// As [`__strcpy_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __stpcpy_chk(
    dst: *mut c_char,
    src: *const c_char,
    dst_len: usize,
) -> *mut c_char {
    // SAFETY: forwarded contract.
    unsafe { __stpcpy_chk2(dst, src, dst_len, usize::MAX) }
}

/// Checked `stpcpy` with a declared source capacity.
///
/// # Safety
///
/// As [`__strcpy_chk2`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __stpcpy_chk2(
    dst: *mut c_char,
    src: *const c_char,
    dst_len: usize,
    src_len: usize,
) -> *mut c_char {
    // SAFETY: forwarded contract.
    unsafe { unbounded_copy(Primitive::Stpcpy, dst, src, dst_len, src_len) }
}

// ---------------------------------------------------------------------------
// strncpy / stpncpy
// ---------------------------------------------------------------------------

/// Returns the number of source bytes copied before padding.
unsafe fn fixed_count_copy(
    primitive: Primitive,
    dst: *mut c_char,
    src: *const c_char,
    n: usize,
    dst_len: usize,
    src_len: usize,
) -> Extent {
    let dest = BufferDescriptor::from_raw(dst, dst_len);
    // SAFETY: strncpy reads at most `n` bytes; never past the source capacity.
    let src_str = unsafe { RawCStr::new(src) };
    let found = scan::fixed_count_copy(n, &src_str, Capacity::from_raw(src_len));
    enforce(primitive, dest, found.into());
    let source = found.source;
    let copied = source.len();
    // SAFETY: the decision admitted `n` bytes into `dst`; `copied <= n`.
    unsafe {
        ptr::copy_nonoverlapping(src, dst, copied);
        ptr::write_bytes(dst.add(copied), 0, n - copied);
    }
    source
}

/// Checked `strncpy`.
///
/// # Safety
///
/// `dst` must be writable for `n` bytes; `src` readable up to `n` bytes or
/// its terminator.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __strncpy_chk(
    dst: *mut c_char,
    src: *const c_char,
    n: usize,
    dst_len: usize,
) -> *mut c_char {
    // SAFETY: forwarded contract.
    unsafe { __strncpy_chk2(dst, src, n, dst_len, usize::MAX) }
}

/// Checked `strncpy` with a declared source capacity.
///
/// # Safety
///
/// As [`__strncpy_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __strncpy_chk2(
    dst: *mut c_char,
    src: *const c_char,
    n: usize,
    dst_len: usize,
    src_len: usize,
) -> *mut c_char {
    // SAFETY: forwarded contract.
    unsafe { fixed_count_copy(Primitive::Strncpy, dst, src, n, dst_len, src_len) };
    dst
}

/// Checked `stpncpy`; returns a pointer to the first padding NUL, or
/// `dst + n` when the source filled the buffer.
///
/// # Safety
///
/// As [`__strncpy_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __stpncpy_chk(
    dst: *mut c_char,
    src: *const c_char,
    n: usize,
    dst_len: usize,
) -> *mut c_char {
    // SAFETY: forwarded contract.
    unsafe { __stpncpy_chk2(dst, src, n, dst_len, usize::MAX) }
}

/// Checked `stpncpy` with a declared source capacity.
///
/// # Safety
///
/// As [`__strncpy_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __stpncpy_chk2(
    dst: *mut c_char,
    src: *const c_char,
    n: usize,
    dst_len: usize,
    src_len: usize,
) -> *mut c_char {
    // SAFETY: forwarded contract.
    let source = unsafe { fixed_count_copy(Primitive::Stpncpy, dst, src, n, dst_len, src_len) };
    // SAFETY: both offsets are within the `n` bytes just written.
    unsafe { dst.add(if source.is_terminated() { source.len() } else { n }) }
}

// ---------------------------------------------------------------------------
// strcat / strncat
// ---------------------------------------------------------------------------

unsafe fn concat(
    primitive: Primitive,
    dst: *mut c_char,
    src: *const c_char,
    limit: Option<usize>,
    dst_buf_size: usize,
) -> *mut c_char {
    let dest = BufferDescriptor::from_raw(dst, dst_buf_size);
    if limit == Some(0) {
        return dst;
    }
    // SAFETY: the destination scan is bounded by its capacity when known;
    // the source is read no further than strcat/strncat would append.
    let (dst_str, src_str) = unsafe { (RawCStr::new(dst), RawCStr::new(src)) };
    let found = scan::concat(dest.capacity, &dst_str, &src_str, limit);
    enforce(primitive, dest, found.into());
    let (existing, source) = (found.existing, found.source);
    // SAFETY: the decision admitted `existing + appended + 1` bytes.
    unsafe { copy_terminated(dst.add(existing.len()), src, source.len()) };
    dst
}

/// Checked `strcat`.
///
/// # Safety
///
/// `dst` must hold a C string inside `dst_buf_size` bytes; `src` must be a
/// valid C string.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __strcat_chk(
    dst: *mut c_char,
    src: *const c_char,
    dst_buf_size: usize,
) -> *mut c_char {
    // SAFETY: forwarded contract.
    unsafe { concat(Primitive::Strcat, dst, src, None, dst_buf_size) }
}

/// Checked `strncat`; appends at most `n` bytes plus a terminator.
///
/// # Safety
///
/// As [`__strcat_chk`]; `src` needs only `n` readable bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __strncat_chk(
    dst: *mut c_char,
    src: *const c_char,
    n: usize,
    dst_buf_size: usize,
) -> *mut c_char {
    // SAFETY: forwarded contract.
    unsafe { concat(Primitive::Strncat, dst, src, Some(n), dst_buf_size) }
}

// ---------------------------------------------------------------------------
// strlcpy / strlcat
// ---------------------------------------------------------------------------

/// Checked `strlcpy`; returns `strlen(src)`.
///
/// # Safety
///
/// `src` must be a valid C string; `dst` writable for `size` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __strlcpy_chk(
    dst: *mut c_char,
    src: *const c_char,
    size: usize,
    dst_len: usize,
) -> usize {
    // SAFETY: strlcpy always measures the whole source.
    let found = scan::strlcpy(size, &unsafe { RawCStr::new(src) });
    enforce(Primitive::Strlcpy, BufferDescriptor::from_raw(dst, dst_len), found.into());
    let src_len = found.source_len;
    if size > 0 {
        // SAFETY: at most `size - 1` bytes plus NUL, admitted above.
        unsafe { copy_terminated(dst, src, src_len.min(size - 1)) };
    }
    src_len
}

/// Checked `strlcat`; returns the length of the string it tried to build.
///
/// # Safety
///
/// As [`__strlcpy_chk`]; `dst` must be a C string within `size` bytes or
/// `size` must be the unscanned part.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __strlcat_chk(
    dst: *mut c_char,
    src: *const c_char,
    size: usize,
    dst_len: usize,
) -> usize {
    let dest = BufferDescriptor::from_raw(dst, dst_len);
    // SAFETY: strlcat inspects at most `size` bytes of dst, never past
    // capacity, and always measures the whole source.
    let (dst_str, src_str) = unsafe { (RawCStr::new(dst), RawCStr::new(src)) };
    let found = scan::strlcat(dest.capacity, size, &dst_str, &src_str);
    enforce(Primitive::Strlcat, dest, found.into());
    let (existing, src_len) = (found.existing, found.source_len);
    let used = existing.len();
    if !existing.is_terminated() || used >= size {
        return size.saturating_add(src_len);
    }
    let room = size - used - 1;
    // SAFETY: the copy stays inside the first `size` bytes, admitted above.
    unsafe { copy_terminated(dst.add(used), src, src_len.min(room)) };
    used + src_len
}

// ---------------------------------------------------------------------------
// strchr / strrchr / strlen / memchr / memrchr
// ---------------------------------------------------------------------------

/// Checked `strchr`.
///
/// # Safety
///
/// `s` must be readable up to its terminator or `s_len` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __strchr_chk(s: *const c_char, c: c_int, s_len: usize) -> *mut c_char {
    let dest = BufferDescriptor::from_raw(s, s_len);
    let needle = c as u8;
    // SAFETY: bounded by the declared capacity when known.
    let s_str = unsafe { RawCStr::new(s) };
    let scanned = s_str.scan_until(dest.capacity, Some(needle));
    enforce(Primitive::Strchr, dest, Operation::StringScan { scanned });
    let Extent::Terminated(at) = scanned else {
        return ptr::null_mut();
    };
    // SAFETY: `at` is inside the scanned range.
    let hit = unsafe { s.add(at) };
    // SAFETY: same byte the scan stopped on.
    if unsafe { *hit } as u8 == needle {
        hit.cast_mut()
    } else {
        ptr::null_mut()
    }
}

/// Checked `strrchr`.
///
/// # Safety
///
/// As [`__strchr_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __strrchr_chk(s: *const c_char, c: c_int, s_len: usize) -> *mut c_char {
    let dest = BufferDescriptor::from_raw(s, s_len);
    // SAFETY: bounded by the declared capacity when known.
    let scanned = unsafe { RawCStr::new(s) }.scan(dest.capacity);
    enforce(Primitive::Strrchr, dest, Operation::StringScan { scanned });
    let needle = c as u8;
    let len = scanned.len();
    if needle == 0 {
        // SAFETY: `len` indexes the terminator.
        return unsafe { s.add(len).cast_mut() };
    }
    let mut i = len;
    while i > 0 {
        i -= 1;
        // SAFETY: `i < len`, inside the scanned string.
        if unsafe { *s.add(i) } as u8 == needle {
            // SAFETY: same index.
            return unsafe { s.add(i).cast_mut() };
        }
    }
    ptr::null_mut()
}

/// Checked `strlen`.
///
/// # Safety
///
/// As [`__strchr_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __strlen_chk(s: *const c_char, s_len: usize) -> usize {
    let dest = BufferDescriptor::from_raw(s, s_len);
    // SAFETY: bounded by the declared capacity when known.
    let scanned = unsafe { RawCStr::new(s) }.scan(dest.capacity);
    enforce(Primitive::Strlen, dest, Operation::StringScan { scanned });
    scanned.len()
}

/// Checked `memchr`.
///
/// # Safety
///
/// `s` must be readable for `n` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __memchr_chk(
    s: *const c_void,
    c: c_int,
    n: usize,
    s_len: usize,
) -> *mut c_void {
    enforce(
        Primitive::Memchr,
        BufferDescriptor::from_raw(s, s_len),
        Operation::MemorySearch { count: n },
    );
    // SAFETY: `n` bytes admitted above.
    let bytes = unsafe { std::slice::from_raw_parts(s.cast::<u8>(), n) };
    match bytes.iter().position(|&b| b == c as u8) {
        // SAFETY: index is inside `bytes`.
        Some(i) => unsafe { s.cast::<u8>().add(i).cast_mut().cast() },
        None => ptr::null_mut(),
    }
}

/// Checked `memrchr`.
///
/// # Safety
///
/// As [`__memchr_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __memrchr_chk(
    s: *const c_void,
    c: c_int,
    n: usize,
    s_len: usize,
) -> *mut c_void {
    enforce(
        Primitive::Memrchr,
        BufferDescriptor::from_raw(s, s_len),
        Operation::MemorySearch { count: n },
    );
    // SAFETY: `n` bytes admitted above.
    let bytes = unsafe { std::slice::from_raw_parts(s.cast::<u8>(), n) };
    match bytes.iter().rposition(|&b| b == c as u8) {
        // SAFETY: index is inside `bytes`.
        Some(i) => unsafe { s.cast::<u8>().add(i).cast_mut().cast() },
        None => ptr::null_mut(),
    }
}

// ---------------------------------------------------------------------------
// memcpy / memmove / mempcpy / memset / bzero
// ---------------------------------------------------------------------------

#[inline]
fn check_raw_memory(primitive: Primitive, dst: *const c_void, n: usize, dst_len: usize, src_len: usize) {
    enforce(
        primitive,
        BufferDescriptor::from_raw(dst, dst_len),
        Operation::RawMemory {
            len: n,
            source_capacity: Capacity::from_raw(src_len),
        },
    );
}

/// Checked `memcpy`.
///
/// # Safety
///
/// `dst` and `src` must be valid for `n` bytes and must not overlap.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __memcpy_chk(
    dst: *mut c_void,
    src: *const c_void,
    n: usize,
    dst_len: usize,
) -> *mut c_void {
    // SAFETY: forwarded contract.
    unsafe { __memcpy_chk2(dst, src, n, dst_len, usize::MAX) }
}

/// Checked `memcpy` with a declared source capacity.
///
/// # Safety
///
/// As [`__memcpy_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __memcpy_chk2(
    dst: *mut c_void,
    src: *const c_void,
    n: usize,
    dst_len: usize,
    src_len: usize,
) -> *mut c_void {
    check_raw_memory(Primitive::Memcpy, dst, n, dst_len, src_len);
    // SAFETY: both regions admitted for `n` bytes.
    unsafe { ptr::copy_nonoverlapping(src.cast::<u8>(), dst.cast::<u8>(), n) };
    dst
}

/// Checked `memmove`.
///
/// # Safety
///
/// `dst` and `src` must be valid for `n` bytes; they may overlap.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __memmove_chk(
    dst: *mut c_void,
    src: *const c_void,
    n: usize,
    dst_len: usize,
) -> *mut c_void {
    // SAFETY: forwarded contract.
    unsafe { __memmove_chk2(dst, src, n, dst_len, usize::MAX) }
}

/// Checked `memmove` with a declared source capacity.
///
/// # Safety
///
/// As [`__memmove_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __memmove_chk2(
    dst: *mut c_void,
    src: *const c_void,
    n: usize,
    dst_len: usize,
    src_len: usize,
) -> *mut c_void {
    check_raw_memory(Primitive::Memmove, dst, n, dst_len, src_len);
    // SAFETY: both regions admitted for `n` bytes; `copy` handles overlap.
    unsafe { ptr::copy(src.cast::<u8>(), dst.cast::<u8>(), n) };
    dst
}

/// Checked `mempcpy`; returns `dst + n`.
///
/// # Safety
///
/// As [`__memcpy_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __mempcpy_chk(
    dst: *mut c_void,
    src: *const c_void,
    n: usize,
    dst_len: usize,
) -> *mut c_void {
    // SAFETY: forwarded contract.
    unsafe { __mempcpy_chk2(dst, src, n, dst_len, usize::MAX) }
}

/// Checked `mempcpy` with a declared source capacity.
///
/// # Safety
///
/// As [`__memcpy_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __mempcpy_chk2(
    dst: *mut c_void,
    src: *const c_void,
    n: usize,
    dst_len: usize,
    src_len: usize,
) -> *mut c_void {
    check_raw_memory(Primitive::Mempcpy, dst, n, dst_len, src_len);
    // SAFETY: both regions admitted for `n` bytes.
    unsafe {
        ptr::copy_nonoverlapping(src.cast::<u8>(), dst.cast::<u8>(), n);
        dst.cast::<u8>().add(n).cast()
    }
}

/// Checked `memset`.
///
/// # Safety
///
/// `dst` must be writable for `n` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __memset_chk(
    dst: *mut c_void,
    c: c_int,
    n: usize,
    dst_len: usize,
) -> *mut c_void {
    check_raw_memory(Primitive::Memset, dst, n, dst_len, usize::MAX);
    // SAFETY: `n` bytes admitted above.
    unsafe { ptr::write_bytes(dst.cast::<u8>(), c as u8, n) };
    dst
}

/// Checked `bzero`.
///
/// # Safety
///
/// `dst` must be writable for `n` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __bzero_chk(dst: *mut c_void, n: usize, dst_len: usize) {
    check_raw_memory(Primitive::Bzero, dst, n, dst_len, usize::MAX);
    // SAFETY: `n` bytes admitted above.
    unsafe { ptr::write_bytes(dst.cast::<u8>(), 0, n) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_stops_at_bound_without_nul() {
        let buf = *b"abcdef";
        // SAFETY: bound equals the buffer length.
        let extent = unsafe { RawCStr::new(buf.as_ptr().cast()) }.scan(Capacity::Known(buf.len()));
        assert_eq!(extent, Extent::Unterminated(6));
    }

    #[test]
    fn scan_unbounded_finds_nul() {
        // SAFETY: static C string.
        let extent = unsafe { RawCStr::new(c"hello".as_ptr()) }.scan(Capacity::Unknown);
        assert_eq!(extent, Extent::Terminated(5));
    }

    #[test]
    fn raw_and_slice_scans_agree() {
        let cases: [(&[u8], Capacity, Option<u8>); 6] = [
            (b"abc\0def\0", Capacity::Known(8), None),
            (b"abcdefgh\0", Capacity::Known(4), None),
            (b"abcdefgh\0", Capacity::Unknown, None),
            (b"abcdefgh\0", Capacity::Known(8), Some(b'e')),
            (b"ab\0defgh\0", Capacity::Known(8), Some(b'e')),
            (b"\0", Capacity::Known(0), None),
        ];
        for (bytes, bound, stop) in cases {
            // SAFETY: every case is NUL-terminated and bounds stay inside it.
            let raw = unsafe { RawCStr::new(bytes.as_ptr().cast()) };
            assert_eq!(
                raw.scan_until(bound, stop),
                bytes.scan_until(bound, stop),
                "{bytes:?} {bound:?} {stop:?}"
            );
        }
    }

    #[test]
    fn concat_builds_same_request_from_memory_and_fixture_bytes() {
        let dst = *b"a\0AAAAAAAA";
        let src = *b"0123456789\0";
        let cap = Capacity::Known(dst.len());
        // SAFETY: both arrays are live and NUL-terminated inside their length.
        let (dst_str, src_str) =
            unsafe { (RawCStr::new(dst.as_ptr().cast()), RawCStr::new(src.as_ptr().cast())) };
        for limit in [None, Some(0), Some(5), Some(20)] {
            assert_eq!(
                scan::concat(cap, &dst_str, &src_str, limit),
                scan::concat(cap, &dst[..], &src[..], limit),
            );
        }
    }

    #[test]
    fn strlcat_reports_would_be_length_when_full() {
        let mut buf = *b"abc\0";
        // SAFETY: buffer and source are live; size matches the buffer.
        let n = unsafe { __strlcat_chk(buf.as_mut_ptr().cast(), c"xyz".as_ptr(), 4, 4) };
        assert_eq!(n, 6);
        assert_eq!(&buf, b"abc\0");
    }
}
