//! Checked `<unistd.h>` and `<sys/stat.h>` entry points.
//!
//! Each wraps the libc call after checking the transfer size against the
//! caller's declared buffer. Return values and `errno` come straight from
//! libc.

use std::ffi::{c_char, c_int, c_void};

use fortify_membrane::{BufferDescriptor, Operation, Primitive};

use crate::runtime_policy::enforce;

#[inline]
fn check_sized_io(primitive: Primitive, buf: *const c_void, len: usize, buf_len: usize) {
    enforce(
        primitive,
        BufferDescriptor::from_raw(buf, buf_len),
        Operation::SizedIo { len },
    );
}

/// Checked `read`.
///
/// # Safety
///
/// `buf` must be writable for `nbytes` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __read_chk(
    fd: c_int,
    buf: *mut c_void,
    nbytes: usize,
    buf_len: usize,
) -> libc::ssize_t {
    check_sized_io(Primitive::Read, buf, nbytes, buf_len);
    // SAFETY: buffer admitted for `nbytes`.
    unsafe { libc::read(fd, buf, nbytes) }
}

/// Checked `write`.
///
/// # Safety
///
/// `buf` must be readable for `nbytes` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __write_chk(
    fd: c_int,
    buf: *const c_void,
    nbytes: usize,
    buf_len: usize,
) -> libc::ssize_t {
    check_sized_io(Primitive::Write, buf, nbytes, buf_len);
    // SAFETY: buffer admitted for `nbytes`.
    unsafe { libc::write(fd, buf, nbytes) }
}

/// Checked `pread`.
///
/// # Safety
///
/// `buf` must be writable for `nbytes` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __pread_chk(
    fd: c_int,
    buf: *mut c_void,
    nbytes: usize,
    offset: libc::off_t,
    buf_len: usize,
) -> libc::ssize_t {
    check_sized_io(Primitive::Pread, buf, nbytes, buf_len);
    // SAFETY: buffer admitted for `nbytes`.
    unsafe { libc::pread(fd, buf, nbytes, offset) }
}

/// Checked `pread64`.
///
/// # Safety
///
/// `buf` must be writable for `nbytes` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __pread64_chk(
    fd: c_int,
    buf: *mut c_void,
    nbytes: usize,
    offset: libc::off64_t,
    buf_len: usize,
) -> libc::ssize_t {
    check_sized_io(Primitive::Pread64, buf, nbytes, buf_len);
    // SAFETY: buffer admitted for `nbytes`.
    unsafe { libc::pread64(fd, buf, nbytes, offset) }
}

/// Checked `pwrite`.
///
/// # Safety
///
/// `buf` must be readable for `nbytes` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __pwrite_chk(
    fd: c_int,
    buf: *const c_void,
    nbytes: usize,
    offset: libc::off_t,
    buf_len: usize,
) -> libc::ssize_t {
    check_sized_io(Primitive::Pwrite, buf, nbytes, buf_len);
    // SAFETY: buffer admitted for `nbytes`.
    unsafe { libc::pwrite(fd, buf, nbytes, offset) }
}

/// Checked `pwrite64`.
///
/// # Safety
///
/// `buf` must be readable for `nbytes` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __pwrite64_chk(
    fd: c_int,
    buf: *const c_void,
    nbytes: usize,
    offset: libc::off64_t,
    buf_len: usize,
) -> libc::ssize_t {
    check_sized_io(Primitive::Pwrite64, buf, nbytes, buf_len);
    // SAFETY: buffer admitted for `nbytes`.
    unsafe { libc::pwrite64(fd, buf, nbytes, offset) }
}

/// Checked `readlink`.
///
/// # Safety
///
/// `path` must be a valid C string; `buf` writable for `len` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __readlink_chk(
    path: *const c_char,
    buf: *mut c_char,
    len: usize,
    buf_len: usize,
) -> libc::ssize_t {
    check_sized_io(Primitive::Readlink, buf.cast(), len, buf_len);
    // SAFETY: buffer admitted for `len`.
    unsafe { libc::readlink(path, buf, len) }
}

/// Checked `readlinkat`.
///
/// # Safety
///
/// As [`__readlink_chk`].
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __readlinkat_chk(
    dirfd: c_int,
    path: *const c_char,
    buf: *mut c_char,
    len: usize,
    buf_len: usize,
) -> libc::ssize_t {
    check_sized_io(Primitive::Readlinkat, buf.cast(), len, buf_len);
    // SAFETY: buffer admitted for `len`.
    unsafe { libc::readlinkat(dirfd, path, buf, len) }
}

/// Checked `getcwd`.
///
/// A null `buf` asks libc to allocate, so there is nothing to check.
///
/// # Safety
///
/// `buf` must be null or writable for `size` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __getcwd_chk(buf: *mut c_char, size: usize, buf_len: usize) -> *mut c_char {
    if !buf.is_null() {
        enforce(
            Primitive::Getcwd,
            BufferDescriptor::from_raw(buf, buf_len),
            Operation::PathQuery { size },
        );
    }
    // SAFETY: buffer admitted for `size`, or null for libc allocation.
    unsafe { libc::getcwd(buf, size) }
}

/// Checked `umask`: only permission bits may be set.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub extern "C" fn __umask_chk(mask: libc::mode_t) -> libc::mode_t {
    enforce(
        Primitive::Umask,
        BufferDescriptor::unbounded(0),
        Operation::Umask { mask: mask as u32 },
    );
    // SAFETY: umask has no memory-safety preconditions.
    unsafe { libc::umask(mask) }
}
