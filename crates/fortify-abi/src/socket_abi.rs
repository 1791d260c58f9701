//! Checked socket transfer entry points.

use std::ffi::{c_int, c_void};

use fortify_membrane::{BufferDescriptor, Operation, Primitive};

use crate::runtime_policy::enforce;

#[inline]
fn check_transfer(primitive: Primitive, buf: *const c_void, len: usize, buf_len: usize) {
    enforce(
        primitive,
        BufferDescriptor::from_raw(buf, buf_len),
        Operation::SizedIo { len },
    );
}

/// Checked `recv`.
///
/// # Safety
///
/// `buf` must be writable for `len` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __recv_chk(
    fd: c_int,
    buf: *mut c_void,
    len: usize,
    buf_len: usize,
    flags: c_int,
) -> libc::ssize_t {
    check_transfer(Primitive::Recv, buf, len, buf_len);
    // SAFETY: buffer admitted for `len`.
    unsafe { libc::recv(fd, buf, len, flags) }
}

/// Checked `recvfrom`.
///
/// # Safety
///
/// `buf` must be writable for `len` bytes; `addr`/`addr_len` follow
/// `recvfrom(2)`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __recvfrom_chk(
    fd: c_int,
    buf: *mut c_void,
    len: usize,
    buf_len: usize,
    flags: c_int,
    addr: *mut libc::sockaddr,
    addr_len: *mut libc::socklen_t,
) -> libc::ssize_t {
    check_transfer(Primitive::Recvfrom, buf, len, buf_len);
    // SAFETY: buffer admitted for `len`; address pointers are the caller's.
    unsafe { libc::recvfrom(fd, buf, len, flags, addr, addr_len) }
}

/// Checked `send`.
///
/// # Safety
///
/// `buf` must be readable for `len` bytes.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __send_chk(
    fd: c_int,
    buf: *const c_void,
    len: usize,
    buf_len: usize,
    flags: c_int,
) -> libc::ssize_t {
    check_transfer(Primitive::Send, buf, len, buf_len);
    // SAFETY: buffer admitted for `len`.
    unsafe { libc::send(fd, buf, len, flags) }
}

/// Checked `sendto`.
///
/// # Safety
///
/// `buf` must be readable for `len` bytes; `addr` follows `sendto(2)`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __sendto_chk(
    fd: c_int,
    buf: *const c_void,
    len: usize,
    buf_len: usize,
    flags: c_int,
    addr: *const libc::sockaddr,
    addr_len: libc::socklen_t,
) -> libc::ssize_t {
    check_transfer(Primitive::Sendto, buf, len, buf_len);
    // SAFETY: buffer admitted for `len`; address is the caller's.
    unsafe { libc::sendto(fd, buf, len, flags, addr, addr_len) }
}
