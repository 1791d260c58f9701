//! The single termination path.
//!
//! A violation is rendered into a stack buffer, written to stderr with one
//! `write(2)`, and the process aborts. Nothing here allocates, unwinds, or
//! returns.

use std::ffi::c_void;

use fortify_membrane::diagnostic::{self, StackFmt};
use fortify_membrane::{Primitive, Violation};

use crate::runtime_policy;

/// Upper bound on one diagnostic line; longer lines are truncated.
pub const DIAGNOSTIC_CAPACITY: usize = 512;

/// Write raw bytes to stderr, retrying on `EINTR` and short writes.
pub(crate) fn write_stderr(bytes: &[u8]) {
    let mut off = 0usize;
    while off < bytes.len() {
        let rest = &bytes[off..];
        // SAFETY: `rest` is a live slice; fd 2 may be closed, which just fails.
        let rc = unsafe {
            libc::write(
                libc::STDERR_FILENO,
                rest.as_ptr().cast::<c_void>(),
                rest.len(),
            )
        };
        if rc > 0 {
            off += rc as usize;
            continue;
        }
        // SAFETY: errno location is always valid for the calling thread.
        if rc < 0 && unsafe { *libc::__errno_location() } == libc::EINTR {
            continue;
        }
        return;
    }
}

/// Report `violation` for `primitive` and abort the process.
#[cold]
#[inline(never)]
pub fn fortify_fatal(primitive: Primitive, violation: &Violation) -> ! {
    let mut line = StackFmt::<DIAGNOSTIC_CAPACITY>::new();
    let format = runtime_policy::diagnostic_format();
    let _ = diagnostic::render(&mut line, format, primitive, violation);
    if line.is_full() {
        // Keep the line a line even when the reason was cut short.
        let mut bytes = [0u8; DIAGNOSTIC_CAPACITY];
        bytes.copy_from_slice(line.as_bytes());
        bytes[DIAGNOSTIC_CAPACITY - 1] = b'\n';
        write_stderr(&bytes);
    } else {
        write_stderr(line.as_bytes());
    }
    // SAFETY: abort has no preconditions and does not return.
    unsafe { libc::abort() }
}
