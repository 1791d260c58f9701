#![cfg(target_os = "linux")]

//! Descriptor, socket, poll and path entry points.

mod common;

use std::ffi::c_char;
use std::hint::black_box;
use std::mem::{size_of, size_of_val};
use std::ptr;

use common::{assert_fortify, assert_survives};
use fortify_abi::fcntl_abi::{__open_2, __openat_2};
use fortify_abi::poll_abi::*;
use fortify_abi::socket_abi::*;
use fortify_abi::unistd_abi::*;

fn empty_fd_set() -> libc::fd_set {
    // SAFETY: fd_set is plain data; FD_ZERO then initialises it.
    let mut set: libc::fd_set = unsafe { std::mem::zeroed() };
    // SAFETY: set is a whole fd_set.
    unsafe { libc::FD_ZERO(&mut set) };
    set
}

// ---------------------------------------------------------------------------
// read / write family
// ---------------------------------------------------------------------------

#[test]
fn read_past_buffer_aborts() {
    assert_fortify("read", || {
        let mut buf = [0u8; 1];
        let n = black_box(size_of_val(&buf) + 1);
        // SAFETY: aborts before the syscall.
        unsafe { __read_chk(-1, buf.as_mut_ptr().cast(), n, buf.len()) };
    });
}

#[test]
fn write_past_buffer_aborts() {
    let outcome = assert_fortify("write", || {
        let buf = [0u8; 1];
        let n = black_box(size_of_val(&buf) + 1);
        // SAFETY: aborts before the syscall.
        unsafe { __write_chk(-1, buf.as_ptr().cast(), n, buf.len()) };
    });
    assert!(outcome.stderr.contains("prevented read past end of buffer"), "{}", outcome.stderr);
}

#[test]
fn pread_family_past_buffer_aborts() {
    assert_fortify("pread", || {
        let mut buf = [0u8; 1];
        // SAFETY: aborts before the syscall.
        unsafe { __pread_chk(-1, buf.as_mut_ptr().cast(), black_box(2), 0, buf.len()) };
    });
    assert_fortify("pread64", || {
        let mut buf = [0u8; 1];
        // SAFETY: aborts before the syscall.
        unsafe { __pread64_chk(-1, buf.as_mut_ptr().cast(), black_box(2), 0, buf.len()) };
    });
}

#[test]
fn pwrite_family_past_buffer_aborts() {
    assert_fortify("pwrite", || {
        let buf = [0u8; 1];
        // SAFETY: aborts before the syscall.
        unsafe { __pwrite_chk(-1, buf.as_ptr().cast(), black_box(2), 0, buf.len()) };
    });
    assert_fortify("pwrite64", || {
        let buf = [0u8; 1];
        // SAFETY: aborts before the syscall.
        unsafe { __pwrite64_chk(-1, buf.as_ptr().cast(), black_box(2), 0, buf.len()) };
    });
}

#[test]
fn read_within_buffer_reaches_kernel() {
    let mut buf = [0u8; 4];
    // SAFETY: buf is writable for its length; fd -1 makes the syscall fail.
    let rc = unsafe { __read_chk(-1, buf.as_mut_ptr().cast(), buf.len(), buf.len()) };
    assert_eq!(rc, -1);
    assert_eq!(std::io::Error::last_os_error().raw_os_error(), Some(libc::EBADF));
}

#[test]
fn readlink_past_buffer_aborts() {
    assert_fortify("readlink", || {
        let mut buf = [0 as c_char; 1];
        let n = black_box(size_of_val(&buf) + 1);
        // SAFETY: aborts before the syscall.
        unsafe { __readlink_chk(c"/dev/null".as_ptr(), buf.as_mut_ptr(), n, buf.len()) };
    });
}

#[test]
fn readlinkat_past_buffer_aborts() {
    assert_fortify("readlinkat", || {
        let mut buf = [0 as c_char; 1];
        let n = black_box(size_of_val(&buf) + 1);
        // SAFETY: aborts before the syscall.
        unsafe {
            __readlinkat_chk(libc::AT_FDCWD, c"/dev/null".as_ptr(), buf.as_mut_ptr(), n, buf.len())
        };
    });
}

#[test]
fn getcwd_past_buffer_aborts() {
    assert_fortify("getcwd", || {
        let mut buf = [0 as c_char; 1];
        let n = black_box(size_of_val(&buf) + 1);
        // SAFETY: aborts before the syscall.
        unsafe { __getcwd_chk(buf.as_mut_ptr(), n, buf.len()) };
    });
}

#[test]
fn getcwd_with_null_buffer_is_not_checked() {
    // SAFETY: null asks libc to allocate.
    let cwd = unsafe { __getcwd_chk(ptr::null_mut(), 0, usize::MAX) };
    assert!(!cwd.is_null());
    // SAFETY: allocated by libc above.
    unsafe { libc::free(cwd.cast()) };
}

#[test]
fn umask_with_non_permission_bits_aborts() {
    assert_fortify("umask", || {
        __umask_chk(black_box(0o1777));
    });
}

#[test]
fn umask_with_permission_bits_proceeds() {
    assert_survives(|| {
        let old = __umask_chk(0o022);
        __umask_chk(old);
    });
}

// ---------------------------------------------------------------------------
// sockets
// ---------------------------------------------------------------------------

#[test]
fn recv_past_buffer_aborts() {
    assert_fortify("recv", || {
        let mut buf = [0u8; 2];
        let n = black_box(size_of_val(&buf) + 1);
        // SAFETY: aborts before the syscall.
        unsafe { __recv_chk(0, buf.as_mut_ptr().cast(), n, buf.len(), 0) };
    });
}

#[test]
fn recvfrom_past_buffer_aborts() {
    assert_fortify("recvfrom", || {
        let mut buf = [0u8; 2];
        // SAFETY: aborts before the syscall.
        unsafe {
            __recvfrom_chk(
                0,
                buf.as_mut_ptr().cast(),
                black_box(3),
                buf.len(),
                0,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
    });
}

#[test]
fn send_past_buffer_aborts() {
    assert_fortify("send", || {
        let buf = [0u8; 2];
        let n = black_box(size_of_val(&buf) + 1);
        // SAFETY: aborts before the syscall.
        unsafe { __send_chk(0, buf.as_ptr().cast(), n, buf.len(), 0) };
    });
}

#[test]
fn sendto_past_buffer_aborts() {
    assert_fortify("sendto", || {
        let buf = [0u8; 2];
        // SAFETY: aborts before the syscall.
        unsafe { __sendto_chk(0, buf.as_ptr().cast(), black_box(3), buf.len(), 0, ptr::null(), 0) };
    });
}

// ---------------------------------------------------------------------------
// fd_set and poll
// ---------------------------------------------------------------------------

#[test]
fn fd_isset_negative_descriptor_aborts() {
    assert_fortify("FD_ISSET", || {
        let set = empty_fd_set();
        // SAFETY: aborts before touching the set.
        unsafe { __FD_ISSET_chk(black_box(-1), &set, size_of::<libc::fd_set>()) };
    });
}

#[test]
fn fd_isset_descriptor_past_setsize_aborts() {
    assert_fortify("FD_ISSET", || {
        let set = empty_fd_set();
        // SAFETY: aborts before touching the set.
        unsafe { __FD_ISSET_chk(black_box(1024), &set, size_of::<libc::fd_set>()) };
    });
}

#[test]
fn fd_isset_on_short_set_aborts() {
    assert_fortify("FD_ISSET", || {
        let small = [0u8; 1];
        // SAFETY: aborts before reading through the undersized pointer.
        unsafe { __FD_ISSET_chk(0, small.as_ptr().cast(), small.len()) };
    });
}

#[test]
fn fd_set_and_clr_round_trip() {
    let mut set = empty_fd_set();
    let size = size_of::<libc::fd_set>();
    // SAFETY: set is a whole fd_set and 5 is in range.
    unsafe {
        __FD_SET_chk(5, &mut set, size);
        assert_eq!(__FD_ISSET_chk(5, &set, size), 1);
        assert_eq!(__FD_ISSET_chk(6, &set, size), 0);
        __FD_CLR_chk(5, &mut set, size);
        assert_eq!(__FD_ISSET_chk(5, &set, size), 0);
    }
}

#[test]
fn fd_set_out_of_range_aborts() {
    assert_fortify("FD_SET", || {
        let mut set = empty_fd_set();
        // SAFETY: aborts before writing.
        unsafe { __FD_SET_chk(black_box(1024), &mut set, size_of::<libc::fd_set>()) };
    });
    assert_fortify("FD_CLR", || {
        let mut set = empty_fd_set();
        // SAFETY: aborts before writing.
        unsafe { __FD_CLR_chk(black_box(-1), &mut set, size_of::<libc::fd_set>()) };
    });
}

#[test]
fn poll_past_array_aborts() {
    assert_fortify("poll", || {
        let mut fds = [libc::pollfd { fd: 0, events: libc::POLLIN, revents: 0 }];
        let nfds = black_box(2);
        // SAFETY: aborts before the syscall.
        unsafe { __poll_chk(fds.as_mut_ptr(), nfds, 0, size_of_val(&fds)) };
    });
}

#[test]
fn ppoll_past_array_aborts() {
    assert_fortify("ppoll", || {
        let mut fds = [libc::pollfd { fd: 0, events: libc::POLLIN, revents: 0 }];
        let timeout = libc::timespec { tv_sec: 0, tv_nsec: 0 };
        let nfds = black_box(2);
        // SAFETY: aborts before the syscall.
        unsafe { __ppoll_chk(fds.as_mut_ptr(), nfds, &timeout, ptr::null(), size_of_val(&fds)) };
    });
}

#[test]
fn poll_within_array_reaches_kernel() {
    let mut fds = [libc::pollfd { fd: -1, events: libc::POLLIN, revents: 0 }; 2];
    // SAFETY: two valid entries; negative fds are ignored by poll.
    let rc = unsafe { __poll_chk(fds.as_mut_ptr(), 2, 0, size_of_val(&fds)) };
    assert_eq!(rc, 0);
}

// ---------------------------------------------------------------------------
// open
// ---------------------------------------------------------------------------

#[test]
fn open_create_without_mode_aborts() {
    assert_fortify("open", || {
        // SAFETY: aborts before the syscall.
        unsafe { __open_2(c"/dev/null".as_ptr(), black_box(libc::O_CREAT)) };
    });
}

#[test]
fn open_tmpfile_without_mode_aborts() {
    assert_fortify("open", || {
        // SAFETY: aborts before the syscall.
        unsafe { __open_2(c"/tmp".as_ptr(), black_box(libc::O_TMPFILE | libc::O_RDWR)) };
    });
}

#[test]
fn openat_create_without_mode_aborts() {
    assert_fortify("openat", || {
        // SAFETY: aborts before the syscall.
        unsafe { __openat_2(libc::AT_FDCWD, c"/dev/null".as_ptr(), black_box(libc::O_CREAT)) };
    });
}

#[test]
fn open_without_create_proceeds() {
    // SAFETY: valid path, flags need no mode.
    let fd = unsafe { __open_2(c"/dev/null".as_ptr(), libc::O_RDONLY) };
    assert!(fd >= 0);
    // SAFETY: fd opened above.
    unsafe { libc::close(fd) };
}
