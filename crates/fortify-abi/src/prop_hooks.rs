//! System-property lookup name rewrite.
//!
//! One process image reads a relocated property: when the program name is
//! exactly [`GMS_UNSTABLE`] a lookup of [`PROP_FIRST_API_LEVEL`] is redirected
//! to [`PROP_PIH_FIRST_API_LEVEL`]. With tracing on, that process also logs
//! every name it looks up. Other processes are untouched.

use std::ffi::{CStr, c_char};
use std::fmt::Write;

use fortify_membrane::StackFmt;
use fortify_membrane::diagnostic::{render_lookup, render_trace};

use crate::fatal::write_stderr;
use crate::runtime_policy;

pub const GMS_UNSTABLE: &str = "com.google.android.gms.unstable";
pub const PROP_FIRST_API_LEVEL: &str = "ro.product.first_api_level";
pub const PROP_PIH_FIRST_API_LEVEL: &str = "persist.sys.pihooks_DEVICE_INITIAL_SDK_INT";

const PROP_PIH_FIRST_API_LEVEL_C: &CStr = c"persist.sys.pihooks_DEVICE_INITIAL_SDK_INT";

unsafe extern "C" {
    static program_invocation_short_name: *mut c_char;
}

/// How the hook treats one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Not the target process.
    Untouched,
    /// Target process; name logged, not rewritten.
    Logged,
    /// Target process; name logged and rewritten.
    Rewritten,
}

#[must_use]
pub fn classify(progname: Option<&str>, name: &str) -> Lookup {
    if progname != Some(GMS_UNSTABLE) {
        Lookup::Untouched
    } else if name == PROP_FIRST_API_LEVEL {
        Lookup::Rewritten
    } else {
        Lookup::Logged
    }
}

/// Rewrite `name` for a process called `progname`. Returns true on rewrite.
pub fn rewrite_for(progname: Option<&str>, name: &mut &str) -> bool {
    match classify(progname, *name) {
        Lookup::Untouched => false,
        Lookup::Logged => {
            trace_lookup(*name);
            false
        }
        Lookup::Rewritten => {
            trace_lookup(*name);
            trace(*name, PROP_PIH_FIRST_API_LEVEL);
            *name = PROP_PIH_FIRST_API_LEVEL;
            true
        }
    }
}

/// Current process's short program name.
#[must_use]
pub fn progname() -> Option<&'static str> {
    // SAFETY: libc initialises this before main and never frees it.
    let raw = unsafe { program_invocation_short_name };
    if raw.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated for the process lifetime.
    unsafe { CStr::from_ptr(raw) }.to_str().ok()
}

/// Hook invoked on every property lookup.
pub fn on_find(name: &mut &str) {
    rewrite_for(progname(), name);
}

/// C entry point for [`on_find`].
///
/// # Safety
///
/// `name` must point to a valid pointer to a NUL-terminated C string.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn __system_property_hook_on_find(name: *mut *const c_char) {
    if name.is_null() {
        return;
    }
    // SAFETY: caller passes a valid slot.
    let current = unsafe { *name };
    if current.is_null() {
        return;
    }
    // SAFETY: caller guarantees a NUL-terminated string.
    let Ok(mut view) = unsafe { CStr::from_ptr(current) }.to_str() else {
        return;
    };
    if rewrite_for(progname(), &mut view) {
        // SAFETY: the slot is writable and the replacement is 'static.
        unsafe { *name = PROP_PIH_FIRST_API_LEVEL_C.as_ptr() };
    }
}

fn trace_lookup(name: &str) {
    if !runtime_policy::trace_enabled() {
        return;
    }
    let mut line = StackFmt::<256>::new();
    let _ = render_lookup(&mut line, "property lookup", name);
    if line.is_full() {
        line.clear();
        let _ = line.write_str("FORTIFY-TRACE: property lookup: <truncated>\n");
    }
    write_stderr(line.as_bytes());
}

fn trace(from: &str, to: &str) {
    if !runtime_policy::trace_enabled() {
        return;
    }
    let mut line = StackFmt::<256>::new();
    let _ = render_trace(&mut line, "property", from, to);
    if line.is_full() {
        line.clear();
        let _ = line.write_str("FORTIFY-TRACE: property: <truncated>\n");
    }
    write_stderr(line.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_only_for_matching_process() {
        let mut name = PROP_FIRST_API_LEVEL;
        assert!(rewrite_for(Some(GMS_UNSTABLE), &mut name));
        assert_eq!(name, PROP_PIH_FIRST_API_LEVEL);

        let mut name = PROP_FIRST_API_LEVEL;
        assert!(!rewrite_for(Some("com.google.android.gms"), &mut name));
        assert_eq!(name, PROP_FIRST_API_LEVEL);

        assert!(!rewrite_for(None, &mut name));
    }

    #[test]
    fn target_process_logs_every_lookup() {
        assert_eq!(classify(Some(GMS_UNSTABLE), "ro.build.version.sdk"), Lookup::Logged);
        assert_eq!(classify(Some(GMS_UNSTABLE), ""), Lookup::Logged);
        assert_eq!(classify(Some(GMS_UNSTABLE), PROP_FIRST_API_LEVEL), Lookup::Rewritten);
        assert_eq!(classify(Some("com.android.phone"), PROP_FIRST_API_LEVEL), Lookup::Untouched);
        assert_eq!(classify(None, "ro.build.version.sdk"), Lookup::Untouched);
    }

    #[test]
    fn leaves_other_properties_alone() {
        let mut name = "ro.build.version.sdk";
        assert!(!rewrite_for(Some(GMS_UNSTABLE), &mut name));
        assert_eq!(name, "ro.build.version.sdk");
    }

    #[test]
    fn c_replacement_matches_str_constant() {
        assert_eq!(PROP_PIH_FIRST_API_LEVEL_C.to_str(), Ok(PROP_PIH_FIRST_API_LEVEL));
    }
}
