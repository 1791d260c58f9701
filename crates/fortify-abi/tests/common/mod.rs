//! Fork-based death-test support.
//!
//! The child runs the closure with stderr redirected into a pipe and exits
//! with status 0 if it returns. The parent collects stderr and the wait
//! status. The child of a multi-threaded test binary inherits only the
//! forking thread, so closures stay away from locks other tests may hold.

#![allow(dead_code)]

use std::ffi::c_int;
use std::panic::{self, AssertUnwindSafe};

pub struct ChildOutcome {
    pub status: c_int,
    pub stderr: String,
}

impl ChildOutcome {
    pub fn aborted(&self) -> bool {
        libc::WIFSIGNALED(self.status) && libc::WTERMSIG(self.status) == libc::SIGABRT
    }

    pub fn exited_cleanly(&self) -> bool {
        libc::WIFEXITED(self.status) && libc::WEXITSTATUS(self.status) == 0
    }
}

pub fn run_in_child(f: impl FnOnce()) -> ChildOutcome {
    let mut fds = [0 as c_int; 2];
    // SAFETY: fds has room for both ends.
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0, "pipe failed");

    // SAFETY: the child only runs `f` and then `_exit`s.
    let pid = unsafe { libc::fork() };
    assert!(pid >= 0, "fork failed");
    if pid == 0 {
        // SAFETY: plain descriptor plumbing in the child.
        unsafe {
            libc::close(fds[0]);
            libc::dup2(fds[1], libc::STDERR_FILENO);
            libc::close(fds[1]);
        }
        let code = match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(()) => 0,
            Err(_) => 101,
        };
        // SAFETY: terminate the child without running the parent's atexit state.
        unsafe { libc::_exit(code) };
    }

    // SAFETY: the parent does not write to the pipe.
    unsafe { libc::close(fds[1]) };
    let mut captured = Vec::new();
    let mut chunk = [0u8; 512];
    loop {
        // SAFETY: chunk is a live writable buffer.
        let n = unsafe { libc::read(fds[0], chunk.as_mut_ptr().cast(), chunk.len()) };
        if n <= 0 {
            break;
        }
        captured.extend_from_slice(&chunk[..n as usize]);
    }
    // SAFETY: read end is ours.
    unsafe { libc::close(fds[0]) };

    let mut status: c_int = 0;
    // SAFETY: pid is our direct child.
    let waited = unsafe { libc::waitpid(pid, &mut status, 0) };
    assert_eq!(waited, pid, "waitpid failed");

    ChildOutcome {
        status,
        stderr: String::from_utf8_lossy(&captured).into_owned(),
    }
}

/// Assert that `f` aborts with a fortify diagnostic naming `symbol`.
pub fn assert_fortify(symbol: &str, f: impl FnOnce()) -> ChildOutcome {
    let outcome = run_in_child(f);
    assert!(
        outcome.aborted(),
        "expected SIGABRT for {symbol}, status {:#x}, stderr {:?}",
        outcome.status,
        outcome.stderr
    );
    assert!(
        outcome.stderr.contains(symbol),
        "diagnostic does not name {symbol}: {:?}",
        outcome.stderr
    );
    outcome
}

/// Assert that `f` runs to completion in a child.
pub fn assert_survives(f: impl FnOnce()) {
    let outcome = run_in_child(f);
    assert!(
        outcome.exited_cleanly(),
        "expected clean exit, status {:#x}, stderr {:?}",
        outcome.status,
        outcome.stderr
    );
}
