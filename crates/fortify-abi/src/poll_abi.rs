//! Checked I/O multiplexing entry points: `poll`, `ppoll`, and the
//! `fd_set` bit operations.

use std::ffi::c_int;
use std::mem;

use fortify_membrane::{BufferDescriptor, Operation, Primitive};

use crate::runtime_policy::enforce;

#[inline]
fn check_poll_array(primitive: Primitive, fds: *const libc::pollfd, nfds: libc::nfds_t, fds_len: usize) {
    enforce(
        primitive,
        BufferDescriptor::from_raw(fds, fds_len),
        Operation::PollArray {
            count: nfds as u64,
            element_size: mem::size_of::<libc::pollfd>(),
        },
    );
}

/// Checked `poll`. `fds_len` is the byte size of the `fds` array.
///
/// # Safety
///
/// `fds` must point to `nfds` valid `pollfd` entries.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __poll_chk(
    fds: *mut libc::pollfd,
    nfds: libc::nfds_t,
    timeout: c_int,
    fds_len: usize,
) -> c_int {
    check_poll_array(Primitive::Poll, fds, nfds, fds_len);
    // SAFETY: array admitted for `nfds` entries.
    unsafe { libc::poll(fds, nfds, timeout) }
}

/// Checked `ppoll`.
///
/// # Safety
///
/// As [`__poll_chk`]; `timeout` and `sigmask` may be null.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __ppoll_chk(
    fds: *mut libc::pollfd,
    nfds: libc::nfds_t,
    timeout: *const libc::timespec,
    sigmask: *const libc::sigset_t,
    fds_len: usize,
) -> c_int {
    check_poll_array(Primitive::Ppoll, fds, nfds, fds_len);
    // SAFETY: array admitted for `nfds` entries.
    unsafe { libc::ppoll(fds, nfds, timeout, sigmask) }
}

#[inline]
fn check_fd_set(primitive: Primitive, fd: c_int, set: *const libc::fd_set, set_size: usize) {
    enforce(
        primitive,
        BufferDescriptor::from_raw(set, set_size),
        Operation::DescriptorSet { fd },
    );
}

/// Checked `FD_ISSET`; returns 1 when `fd` is in the set.
///
/// # Safety
///
/// `set` must point to a readable `fd_set`.
#[allow(non_snake_case)]
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __FD_ISSET_chk(fd: c_int, set: *const libc::fd_set, set_size: usize) -> c_int {
    check_fd_set(Primitive::FdIsset, fd, set, set_size);
    // SAFETY: fd is in [0, FD_SETSIZE) and set is a whole fd_set.
    c_int::from(unsafe { libc::FD_ISSET(fd, set) })
}

/// Checked `FD_SET`.
///
/// # Safety
///
/// `set` must point to a writable `fd_set`.
#[allow(non_snake_case)]
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __FD_SET_chk(fd: c_int, set: *mut libc::fd_set, set_size: usize) {
    check_fd_set(Primitive::FdSet, fd, set, set_size);
    // SAFETY: fd is in [0, FD_SETSIZE) and set is a whole fd_set.
    unsafe { libc::FD_SET(fd, set) };
}

/// Checked `FD_CLR`.
///
/// # Safety
///
/// `set` must point to a writable `fd_set`.
#[allow(non_snake_case)]
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __FD_CLR_chk(fd: c_int, set: *mut libc::fd_set, set_size: usize) {
    check_fd_set(Primitive::FdClr, fd, set, set_size);
    // SAFETY: fd is in [0, FD_SETSIZE) and set is a whole fd_set.
    unsafe { libc::FD_CLR(fd, set) };
}
