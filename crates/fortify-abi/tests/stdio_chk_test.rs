#![cfg(target_os = "linux")]

//! Formatted output and buffered-stream entry points.

mod common;

use std::hint::black_box;
use std::ptr;

use common::{assert_fortify, assert_survives};
use fortify_abi::stdio_abi::*;
use fortify_abi::{fortify_snprintf, fortify_sprintf};

macro_rules! two_byte_buffer {
    () => {
        [0u8; 2]
    };
}

#[test]
fn sprintf_past_destination_aborts() {
    assert_fortify("sprintf", || {
        let mut buf = [0u8; 10];
        fortify_sprintf!(buf, "{}", black_box("0123456789"));
    });
}

#[test]
fn sprintf_raw_entry_point_aborts() {
    assert_fortify("sprintf", || {
        let mut buf = [0u8; 4];
        // SAFETY: aborts before writing.
        unsafe { __sprintf_chk(buf.as_mut_ptr().cast(), buf.len(), format_args!("{}", 12345)) };
    });
}

#[test]
fn vsprintf_past_destination_aborts() {
    assert_fortify("vsprintf", || {
        let mut buf = [0u8; 10];
        // SAFETY: aborts before writing.
        unsafe {
            __vsprintf_chk(buf.as_mut_ptr().cast(), buf.len(), format_args!("{}", "0123456789"))
        };
    });
}

#[test]
fn vsnprintf_size_past_destination_aborts() {
    assert_fortify("vsnprintf", || {
        let mut buf = [0u8; 10];
        let size = black_box(11);
        // SAFETY: aborts before writing.
        unsafe {
            __vsnprintf_chk(buf.as_mut_ptr().cast(), size, buf.len(), format_args!("{}", "0123456789"))
        };
    });
}

#[test]
fn snprintf_size_past_destination_aborts() {
    assert_fortify("snprintf", || {
        let mut buf = [0u8; 5];
        let size = black_box(6);
        fortify_snprintf!(buf, size, "aaaaa");
    });
}

#[test]
fn snprintf_size_max_falls_back_to_capacity() {
    assert_fortify("snprintf", || {
        let mut buf = [0u8; 4];
        fortify_snprintf!(buf, usize::MAX, "{}", "abcdef");
    });
    assert_survives(|| {
        let mut buf = [0u8; 8];
        fortify_snprintf!(buf, usize::MAX, "{}", "abcdef");
    });
}

#[test]
fn snprintf_null_measures_only() {
    // SAFETY: null destination with size 0 writes nothing.
    let n = unsafe { __snprintf_chk(ptr::null_mut(), 0, usize::MAX, format_args!("{}", "0123456789")) };
    assert_eq!(n, 10);
}

#[test]
fn snprintf_truncates_within_bound() {
    let mut buf = [b'X'; 10];
    let n = fortify_snprintf!(buf, 4, "{}", "abcdef");
    assert_eq!(n, 6);
    assert_eq!(&buf[..5], b"abc\0X");
}

#[test]
fn macros_evaluate_nested_expansions() {
    // `two_byte_buffer!()` expands to an array place; the capacity is the
    // evaluated array's length.
    let mut small = two_byte_buffer!();
    let n = fortify_snprintf!(small, 2, "{}", "a");
    assert_eq!(n, 1);
    assert_eq!(&small, b"a\0");

    let mut out = [0u8; 16];
    let n = fortify_sprintf!(out, "{}{}", format_args!("{}", 1), "x");
    assert_eq!(n, 2);
    assert_eq!(&out[..3], b"1x\0");
}

#[test]
fn sprintf_writes_exact_fit() {
    let mut buf = [b'X'; 6];
    let n = fortify_sprintf!(buf, "{}", "abcde");
    assert_eq!(n, 5);
    assert_eq!(&buf, b"abcde\0");
}

#[test]
fn fread_past_buffer_aborts() {
    assert_fortify("fread", || {
        let mut buf = [0u8; 1];
        // SAFETY: both are valid C strings.
        let fp = unsafe { libc::fopen(c"/dev/null".as_ptr(), c"r".as_ptr()) };
        if fp.is_null() {
            return;
        }
        let n = black_box(2);
        // SAFETY: aborts before reading.
        unsafe { __fread_chk(buf.as_mut_ptr().cast(), buf.len(), 1, n, fp) };
    });
}

#[test]
fn fread_with_overflowing_product_returns_libc_result() {
    let mut buf = [0u8; 8];
    for buf_len in [usize::MAX, buf.len()] {
        // SAFETY: both are valid C strings.
        let checked_fp = unsafe { libc::fopen(c"/dev/null".as_ptr(), c"r".as_ptr()) };
        // SAFETY: both are valid C strings.
        let plain_fp = unsafe { libc::fopen(c"/dev/null".as_ptr(), c"r".as_ptr()) };
        assert!(!checked_fp.is_null() && !plain_fp.is_null());
        // SAFETY: /dev/null is at EOF, so nothing is stored into `buf`.
        let checked = unsafe {
            __fread_chk(buf.as_mut_ptr().cast(), buf_len, usize::MAX / 2, 3, checked_fp)
        };
        // SAFETY: same arguments against the unchecked primitive.
        let plain = unsafe { libc::fread(buf.as_mut_ptr().cast(), usize::MAX / 2, 3, plain_fp) };
        assert_eq!(checked, plain);
        // SAFETY: streams opened above.
        unsafe {
            libc::fclose(checked_fp);
            libc::fclose(plain_fp);
        }
    }
}

#[test]
fn fwrite_past_buffer_aborts() {
    assert_fortify("fwrite", || {
        let buf = [0u8; 1];
        // SAFETY: both are valid C strings.
        let fp = unsafe { libc::fopen(c"/dev/null".as_ptr(), c"w".as_ptr()) };
        if fp.is_null() {
            return;
        }
        let n = black_box(2);
        // SAFETY: aborts before writing.
        unsafe { __fwrite_chk(buf.as_ptr().cast(), buf.len(), 1, n, fp) };
    });
}

#[test]
fn fwrite_within_buffer_proceeds() {
    let buf = [7u8; 8];
    // SAFETY: both are valid C strings.
    let fp = unsafe { libc::fopen(c"/dev/null".as_ptr(), c"w".as_ptr()) };
    assert!(!fp.is_null());
    // SAFETY: eight bytes readable; stream just opened.
    let written = unsafe { __fwrite_chk(buf.as_ptr().cast(), buf.len(), 2, 4, fp) };
    assert_eq!(written, 4);
    // SAFETY: stream opened above.
    unsafe { libc::fclose(fp) };
}
