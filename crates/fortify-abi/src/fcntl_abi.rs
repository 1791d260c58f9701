//! Checked two-argument `open` forms.
//!
//! `__open_2` and `__openat_2` are what a fortified caller reaches when it
//! passed no mode. Flags that create a file need one, so they abort.

use std::ffi::{c_char, c_int};

use fortify_membrane::{BufferDescriptor, Operation, Primitive};

use crate::runtime_policy::enforce;

#[inline]
fn check_open_flags(primitive: Primitive, flags: c_int) {
    enforce(
        primitive,
        BufferDescriptor::unbounded(0),
        Operation::Open {
            flags,
            mode_supplied: false,
        },
    );
}

/// Checked `open(path, flags)` with no mode argument.
///
/// # Safety
///
/// `path` must be a valid C string.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __open_2(path: *const c_char, flags: c_int) -> c_int {
    check_open_flags(Primitive::Open, flags);
    // SAFETY: path validity is the caller's; flags need no mode.
    unsafe { libc::open(path, flags) }
}

/// Checked `openat(dirfd, path, flags)` with no mode argument.
///
/// # Safety
///
/// `path` must be a valid C string.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __openat_2(dirfd: c_int, path: *const c_char, flags: c_int) -> c_int {
    check_open_flags(Primitive::Openat, flags);
    // SAFETY: path validity is the caller's; flags need no mode.
    unsafe { libc::openat(dirfd, path, flags) }
}
