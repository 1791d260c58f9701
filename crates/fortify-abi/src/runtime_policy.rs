//! Runtime policy bridge for checked entry points.
//!
//! Every entry point funnels through [`enforce`], which asks the membrane for
//! a decision and hands violations to the fatal path. Process configuration
//! is read straight from `environ` on first use and cached in atomics, so
//! nothing here allocates or takes a lock.

use std::ffi::c_char;
use std::sync::atomic::{AtomicU8, Ordering as AtomicOrdering};

use fortify_membrane::config::{self, DiagnosticFormat};
use fortify_membrane::{BufferDescriptor, Decision, Operation, Primitive, Request, decide};

use crate::fatal;

const FORMAT_UNRESOLVED: u8 = 0;
const FORMAT_TEXT: u8 = 1;
const FORMAT_JSONL: u8 = 2;
const FORMAT_RESOLVING: u8 = 255;
const TRACE_UNRESOLVED: u8 = 0;
const TRACE_OFF: u8 = 1;
const TRACE_ON: u8 = 2;
const TRACE_RESOLVING: u8 = 255;

const MAX_ENV_SCAN: usize = 4096;
const MAX_VALUE_LEN: usize = 32;

// UNRESOLVED -> RESOLVING -> value. A call that observes RESOLVING (for
// example a checked call made while scanning) gets the default.
static FORMAT_STATE: AtomicU8 = AtomicU8::new(FORMAT_UNRESOLVED);
static TRACE_STATE: AtomicU8 = AtomicU8::new(TRACE_UNRESOLVED);

unsafe extern "C" {
    static mut environ: *mut *mut c_char;
}

fn format_to_u8(format: DiagnosticFormat) -> u8 {
    match format {
        DiagnosticFormat::Text => FORMAT_TEXT,
        DiagnosticFormat::Jsonl => FORMAT_JSONL,
    }
}

fn u8_to_format(v: u8) -> DiagnosticFormat {
    match v {
        FORMAT_JSONL => DiagnosticFormat::Jsonl,
        _ => DiagnosticFormat::Text,
    }
}

/// Find `KEY=` in a NULL-terminated environment vector and return the value.
///
/// # Safety
///
/// `envp` must be null or point to a NULL-terminated array of NUL-terminated
/// C strings.
pub(crate) unsafe fn env_lookup(envp: *const *const c_char, key: &str) -> Option<*const c_char> {
    if envp.is_null() {
        return None;
    }
    let key = key.as_bytes();
    let mut slot = envp;
    for _ in 0..MAX_ENV_SCAN {
        // SAFETY: slot points into the env vector, which is NULL-terminated.
        let entry = unsafe { *slot };
        if entry.is_null() {
            return None;
        }

        let mut matched = true;
        for (idx, want) in key.iter().enumerate() {
            // SAFETY: entry is NUL-terminated; a mismatch at NUL stops the loop.
            let got = unsafe { *entry.add(idx) as u8 };
            if got != *want {
                matched = false;
                break;
            }
        }
        // SAFETY: the key matched, so index `key.len()` is within the string.
        if matched && unsafe { *entry.add(key.len()) as u8 } == b'=' {
            // SAFETY: value starts right after '=' and is NUL-terminated.
            return Some(unsafe { entry.add(key.len() + 1) });
        }

        // SAFETY: advance to next env vector slot.
        slot = unsafe { slot.add(1) };
    }
    None
}

/// Copy a C string value into `buf` and view it as UTF-8.
///
/// Values longer than the buffer or not valid UTF-8 come back empty, which
/// every parser treats as "unset".
///
/// # Safety
///
/// `value` must point to a NUL-terminated C string.
unsafe fn value_str(value: *const c_char, buf: &mut [u8; MAX_VALUE_LEN]) -> &str {
    let mut len = 0usize;
    loop {
        // SAFETY: value is NUL-terminated; we stop at the NUL.
        let byte = unsafe { *value.add(len) as u8 };
        if byte == 0 {
            break;
        }
        if len == buf.len() {
            return "";
        }
        buf[len] = byte;
        len += 1;
    }
    std::str::from_utf8(&buf[..len]).unwrap_or("")
}

fn read_env<T>(key: &str, parse: fn(&str) -> T, default: T) -> T {
    // SAFETY: process-owned env pointer table, expected to be NULL-terminated.
    let envp = unsafe { environ } as *const *const c_char;
    // SAFETY: environ satisfies env_lookup's contract.
    let Some(value) = (unsafe { env_lookup(envp, key) }) else {
        return default;
    };
    let mut buf = [0u8; MAX_VALUE_LEN];
    // SAFETY: value points into a NUL-terminated env string.
    parse(unsafe { value_str(value, &mut buf) })
}

/// Diagnostic format for this process.
#[must_use]
pub fn diagnostic_format() -> DiagnosticFormat {
    let cached = FORMAT_STATE.load(AtomicOrdering::Acquire);
    if cached != FORMAT_UNRESOLVED && cached != FORMAT_RESOLVING {
        return u8_to_format(cached);
    }
    if cached == FORMAT_RESOLVING {
        return DiagnosticFormat::default();
    }

    if FORMAT_STATE
        .compare_exchange(
            FORMAT_UNRESOLVED,
            FORMAT_RESOLVING,
            AtomicOrdering::SeqCst,
            AtomicOrdering::Relaxed,
        )
        .is_err()
    {
        let v = FORMAT_STATE.load(AtomicOrdering::Acquire);
        return if v != FORMAT_UNRESOLVED && v != FORMAT_RESOLVING {
            u8_to_format(v)
        } else {
            DiagnosticFormat::default()
        };
    }

    let resolved = read_env(config::ENV_KEY, config::parse_format, DiagnosticFormat::default());
    FORMAT_STATE.store(format_to_u8(resolved), AtomicOrdering::Release);
    resolved
}

/// Pin the diagnostic format, bypassing the environment.
pub fn set_diagnostic_format(format: DiagnosticFormat) {
    FORMAT_STATE.store(format_to_u8(format), AtomicOrdering::Release);
}

/// Whether property-hook rewrites are traced to stderr.
#[must_use]
pub fn trace_enabled() -> bool {
    match TRACE_STATE.load(AtomicOrdering::Acquire) {
        TRACE_ON => return true,
        TRACE_OFF | TRACE_RESOLVING => return false,
        _ => {}
    }
    if TRACE_STATE
        .compare_exchange(
            TRACE_UNRESOLVED,
            TRACE_RESOLVING,
            AtomicOrdering::SeqCst,
            AtomicOrdering::Relaxed,
        )
        .is_err()
    {
        return TRACE_STATE.load(AtomicOrdering::Acquire) == TRACE_ON;
    }
    let on = read_env(config::TRACE_ENV_KEY, config::parse_trace, false);
    TRACE_STATE.store(if on { TRACE_ON } else { TRACE_OFF }, AtomicOrdering::Release);
    on
}

/// Check one call and terminate the process on violation.
#[inline]
pub(crate) fn enforce(primitive: Primitive, dest: BufferDescriptor, op: Operation) {
    if let Decision::Abort(violation) = decide(dest, Request::new(primitive, op)) {
        fatal::fortify_fatal(primitive, &violation);
    }
}
