//! Checked formatted output and `fread`/`fwrite`.
//!
//! Formatting uses `core::fmt::Arguments` as its argument list, so these
//! entry points are Rust-ABI functions; the `fortify_sprintf!` and
//! `fortify_snprintf!` macros are the intended way to reach them. Output is
//! measured first, checked, then written.

use std::ffi::{c_char, c_int, c_void};
use std::fmt::{self, Write};

use fortify_membrane::{BufferDescriptor, Operation, Primitive, object_size};

use crate::runtime_policy::enforce;

/// Counts formatted bytes without storing them.
#[derive(Default)]
struct Measure {
    len: usize,
}

impl Write for Measure {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.len = self.len.saturating_add(s.len());
        Ok(())
    }
}

/// Writes into raw memory, dropping bytes past `limit`.
struct RawSink {
    dst: *mut u8,
    limit: usize,
    len: usize,
}

impl Write for RawSink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let n = s.len().min(self.limit - self.len);
        // SAFETY: `len + n <= limit`, and the caller admitted `limit` bytes.
        unsafe { std::ptr::copy_nonoverlapping(s.as_ptr(), self.dst.add(self.len), n) };
        self.len += n;
        Ok(())
    }
}

fn measure(args: fmt::Arguments<'_>) -> usize {
    let mut m = Measure::default();
    let _ = m.write_fmt(args);
    m.len
}

/// Write at most `limit` formatted bytes, then a NUL.
///
/// # Safety
///
/// `dst` must be writable for `limit + 1` bytes.
unsafe fn emit(dst: *mut c_char, limit: usize, args: fmt::Arguments<'_>) {
    let mut sink = RawSink {
        dst: dst.cast(),
        limit,
        len: 0,
    };
    let _ = sink.write_fmt(args);
    // SAFETY: `sink.len <= limit`.
    unsafe { *dst.add(sink.len) = 0 };
}

fn as_c_int(produced: usize) -> c_int {
    c_int::try_from(produced).unwrap_or(-1)
}

unsafe fn format_unbounded(
    primitive: Primitive,
    dst: *mut c_char,
    dst_len: usize,
    args: fmt::Arguments<'_>,
) -> c_int {
    let produced = measure(args);
    enforce(
        primitive,
        BufferDescriptor::from_raw(dst, dst_len),
        Operation::Format { produced },
    );
    // SAFETY: `produced + 1` bytes admitted above.
    unsafe { emit(dst, produced, args) };
    as_c_int(produced)
}

unsafe fn format_bounded(
    primitive: Primitive,
    dst: *mut c_char,
    size: usize,
    dst_len: usize,
    args: fmt::Arguments<'_>,
) -> c_int {
    let produced = measure(args);
    enforce(
        primitive,
        BufferDescriptor::from_raw(dst, dst_len),
        Operation::BoundedFormat {
            size,
            produced,
            measure_only: dst.is_null() && size == 0,
        },
    );
    if size > 0 {
        // SAFETY: `size` bytes admitted above; the NUL goes at most at `size - 1`.
        unsafe { emit(dst, produced.min(size - 1), args) };
    }
    as_c_int(produced)
}

/// Checked `sprintf`; returns the number of bytes written before the NUL.
///
/// # Safety
///
/// `dst` must be writable for `dst_len` bytes, or for the whole output when
/// `dst_len` is unknown.
pub unsafe fn __sprintf_chk(dst: *mut c_char, dst_len: usize, args: fmt::Arguments<'_>) -> c_int {
    // SAFETY: forwarded contract.
    unsafe { format_unbounded(Primitive::Sprintf, dst, dst_len, args) }
}

/// Checked `vsprintf`. `fmt::Arguments` plays the role of `va_list`.
///
/// # Safety
///
/// As [`__sprintf_chk`].
pub unsafe fn __vsprintf_chk(dst: *mut c_char, dst_len: usize, args: fmt::Arguments<'_>) -> c_int {
    // SAFETY: forwarded contract.
    unsafe { format_unbounded(Primitive::Vsprintf, dst, dst_len, args) }
}

/// Checked `snprintf`; returns the untruncated output length.
///
/// A null `dst` with `size == 0` only measures.
///
/// # Safety
///
/// `dst` must be writable for `size` bytes unless it is null with size 0.
pub unsafe fn __snprintf_chk(
    dst: *mut c_char,
    size: usize,
    dst_len: usize,
    args: fmt::Arguments<'_>,
) -> c_int {
    // SAFETY: forwarded contract.
    unsafe { format_bounded(Primitive::Snprintf, dst, size, dst_len, args) }
}

/// Checked `vsnprintf`.
///
/// # Safety
///
/// As [`__snprintf_chk`].
pub unsafe fn __vsnprintf_chk(
    dst: *mut c_char,
    size: usize,
    dst_len: usize,
    args: fmt::Arguments<'_>,
) -> c_int {
    // SAFETY: forwarded contract.
    unsafe { format_bounded(Primitive::Vsnprintf, dst, size, dst_len, args) }
}

/// Checked `sprintf` into a byte slice; the slice length is the capacity.
pub fn sprintf_into(dst: &mut [u8], args: fmt::Arguments<'_>) -> c_int {
    let capacity = object_size!(*dst);
    // SAFETY: `dst` is live and writable for exactly `capacity` bytes.
    unsafe { __sprintf_chk(dst.as_mut_ptr().cast(), capacity.to_raw(), args) }
}

/// Checked `snprintf` into a byte slice; `size` may not exceed its length.
pub fn snprintf_into(dst: &mut [u8], size: usize, args: fmt::Arguments<'_>) -> c_int {
    let capacity = object_size!(*dst);
    // SAFETY: `dst` is live and writable for exactly `capacity` bytes, and
    // the check rejects any `size` beyond that.
    unsafe { __snprintf_chk(dst.as_mut_ptr().cast(), size, capacity.to_raw(), args) }
}

/// Checked `fread`.
///
/// # Safety
///
/// `stream` must be a valid open `FILE`; `ptr` writable for `size * n`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __fread_chk(
    ptr: *mut c_void,
    ptr_len: usize,
    size: usize,
    n: usize,
    stream: *mut libc::FILE,
) -> usize {
    enforce(
        Primitive::Fread,
        BufferDescriptor::from_raw(ptr, ptr_len),
        Operation::ElementIo { size, count: n },
    );
    // SAFETY: buffer admitted for `size * n` bytes; stream validity is the caller's.
    unsafe { libc::fread(ptr, size, n, stream) }
}

/// Checked `fwrite`.
///
/// # Safety
///
/// `stream` must be a valid open `FILE`; `ptr` readable for `size * n`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __fwrite_chk(
    ptr: *const c_void,
    ptr_len: usize,
    size: usize,
    n: usize,
    stream: *mut libc::FILE,
) -> usize {
    enforce(
        Primitive::Fwrite,
        BufferDescriptor::from_raw(ptr, ptr_len),
        Operation::ElementIo { size, count: n },
    );
    // SAFETY: buffer admitted for `size * n` bytes; stream validity is the caller's.
    unsafe { libc::fwrite(ptr, size, n, stream) }
}
