//! Abort diagnostics.
//!
//! Rendering targets any `fmt::Write`, so the abort path can format into a
//! [`StackFmt`] without touching the heap. [`ViolationRecord`] is the typed
//! form of one JSONL line for tools that read logs back.

use core::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::config::DiagnosticFormat;
use crate::primitive::{Family, Primitive};
use crate::violation::{Violation, ViolationKind};

/// Event tag carried by every JSONL violation line.
pub const VIOLATION_EVENT: &str = "fortify_violation";

/// Prefix of a text diagnostic.
pub const TEXT_PREFIX: &str = "FORTIFY: ";

/// Prefix of a trace line.
pub const TRACE_PREFIX: &str = "FORTIFY-TRACE: ";

/// Owned fixed-size format buffer. Silently truncates on overflow.
pub struct StackFmt<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> StackFmt<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            len: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Contents as text. A write cut mid-character yields the valid prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match core::str::from_utf8(self.as_bytes()) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&self.buf[..e.valid_up_to()]).unwrap_or(""),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the buffer filled up and later output was dropped.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for StackFmt<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Write for StackFmt<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let n = bytes.len().min(N - self.len);
        self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        Ok(())
    }
}

/// Escapes JSON string content on the way through.
struct JsonEscape<'a, W: Write>(&'a mut W);

impl<W: Write> Write for JsonEscape<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            match c {
                '"' => self.0.write_str("\\\"")?,
                '\\' => self.0.write_str("\\\\")?,
                '\n' => self.0.write_str("\\n")?,
                '\r' => self.0.write_str("\\r")?,
                '\t' => self.0.write_str("\\t")?,
                c if (c as u32) < 0x20 => write!(self.0, "\\u{:04x}", c as u32)?,
                c => self.0.write_char(c)?,
            }
        }
        Ok(())
    }
}

/// `FORTIFY: <symbol>: <reason>\n`
pub fn render_text<W: Write>(w: &mut W, primitive: Primitive, violation: &Violation) -> fmt::Result {
    writeln!(w, "{TEXT_PREFIX}{}: {violation}", primitive.symbol())
}

/// One JSON object terminated by `\n`.
pub fn render_jsonl<W: Write>(
    w: &mut W,
    primitive: Primitive,
    violation: &Violation,
) -> fmt::Result {
    write!(
        w,
        "{{\"event\":\"{VIOLATION_EVENT}\",\"symbol\":\"{}\",\"family\":\"{}\",\"kind\":\"{}\",\"reason\":\"",
        primitive.symbol(),
        primitive.family().as_str(),
        violation.kind().as_str(),
    )?;
    write!(JsonEscape(&mut *w), "{violation}")?;
    w.write_str("\",\"required\":")?;
    write_opt(w, violation.required())?;
    w.write_str(",\"capacity\":")?;
    write_opt(w, violation.capacity())?;
    w.write_str("}\n")
}

fn write_opt<W: Write>(w: &mut W, value: Option<u64>) -> fmt::Result {
    match value {
        Some(v) => write!(w, "{v}"),
        None => w.write_str("null"),
    }
}

/// Render in the selected format.
pub fn render<W: Write>(
    w: &mut W,
    format: DiagnosticFormat,
    primitive: Primitive,
    violation: &Violation,
) -> fmt::Result {
    match format {
        DiagnosticFormat::Text => render_text(w, primitive, violation),
        DiagnosticFormat::Jsonl => render_jsonl(w, primitive, violation),
    }
}

/// `FORTIFY-TRACE: <what>: <from> -> <to>\n`
pub fn render_trace<W: Write>(w: &mut W, what: &str, from: &str, to: &str) -> fmt::Result {
    writeln!(w, "{TRACE_PREFIX}{what}: {from} -> {to}")
}

/// `FORTIFY-TRACE: <what>: <name>\n`
pub fn render_lookup<W: Write>(w: &mut W, what: &str, name: &str) -> fmt::Result {
    writeln!(w, "{TRACE_PREFIX}{what}: {name}")
}

/// Typed form of one JSONL diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub event: String,
    pub symbol: String,
    pub family: Family,
    pub kind: ViolationKind,
    pub reason: String,
    pub required: Option<u64>,
    pub capacity: Option<u64>,
}

impl ViolationRecord {
    #[must_use]
    pub fn new(primitive: Primitive, violation: &Violation) -> Self {
        Self {
            event: VIOLATION_EVENT.to_string(),
            symbol: primitive.symbol().to_string(),
            family: primitive.family(),
            kind: violation.kind(),
            reason: violation.to_string(),
            required: violation.required(),
            capacity: violation.capacity(),
        }
    }

    /// Parse one JSONL line.
    pub fn from_jsonl_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }

    /// Primitive named by `symbol`, if it is one we check.
    #[must_use]
    pub fn primitive(&self) -> Option<Primitive> {
        Primitive::from_symbol(&self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overflow() -> Violation {
        Violation::DestinationOverflow {
            required: 11,
            capacity: 10,
        }
    }

    #[test]
    fn text_line_names_symbol_and_reason() {
        let mut out = StackFmt::<256>::new();
        render_text(&mut out, Primitive::Strcpy, &overflow()).unwrap();
        let line = out.as_str();
        assert!(line.starts_with("FORTIFY: strcpy: prevented write past end of buffer"));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn jsonl_line_parses_back_into_record() {
        let mut out = StackFmt::<512>::new();
        render_jsonl(&mut out, Primitive::Memcpy, &overflow()).unwrap();
        let parsed = ViolationRecord::from_jsonl_line(out.as_str()).unwrap();
        assert_eq!(parsed, ViolationRecord::new(Primitive::Memcpy, &overflow()));
        assert_eq!(parsed.primitive(), Some(Primitive::Memcpy));
        assert_eq!(parsed.family, Family::RawMemory);
    }

    #[test]
    fn jsonl_sizes_are_null_for_argument_policy() {
        let mut out = StackFmt::<512>::new();
        let v = Violation::MissingCreateMode { flags: 0o100 };
        render(&mut out, DiagnosticFormat::Jsonl, Primitive::Open, &v).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.as_str()).unwrap();
        assert!(value["required"].is_null());
        assert!(value["capacity"].is_null());
        assert_eq!(value["kind"], "argument_policy_violation");
    }

    #[test]
    fn json_escape_handles_quotes_and_controls() {
        let mut out = StackFmt::<64>::new();
        write!(JsonEscape(&mut out), "a\"b\\c\n\u{1}").unwrap();
        assert_eq!(out.as_str(), "a\\\"b\\\\c\\n\\u0001");
    }

    #[test]
    fn stack_fmt_truncates_instead_of_failing() {
        let mut out = StackFmt::<8>::new();
        write!(out, "0123456789").unwrap();
        assert_eq!(out.as_str(), "01234567");
        assert!(out.is_full());
        out.clear();
        assert!(out.is_empty());
    }

    #[test]
    fn stack_fmt_truncation_keeps_valid_utf8_prefix() {
        let mut out = StackFmt::<2>::new();
        write!(out, "aé").unwrap();
        assert_eq!(out.as_str(), "a");
    }

    #[test]
    fn trace_line_shape() {
        let mut out = StackFmt::<128>::new();
        render_trace(&mut out, "property", "a.b", "c.d").unwrap();
        assert_eq!(out.as_str(), "FORTIFY-TRACE: property: a.b -> c.d\n");
    }

    #[test]
    fn lookup_line_shape() {
        let mut out = StackFmt::<128>::new();
        render_lookup(&mut out, "property lookup", "ro.x").unwrap();
        assert_eq!(out.as_str(), "FORTIFY-TRACE: property lookup: ro.x\n");
    }
}
