//! Fixture execution engine.
//!
//! Each case describes one checked call as plain values: the declared
//! capacities, the scalar arguments, and the string contents the entry point
//! would scan. String families go through the same [`scan`] builders the
//! entry points use; the runner records what [`decide`] returns.

use fortify_membrane::scan::{self, ScanSource};
use fortify_membrane::{
    BufferDescriptor, Capacity, Decision, Family, Operation, Primitive, Request, decide,
};
use serde_json::Value;

use crate::fixtures::{FixtureCase, FixtureSet, PROCEED};
use crate::diff;
use crate::verify::VerificationResult;

/// Placeholder address for fixture buffers; decisions never look at it.
const FIXTURE_BASE: usize = 0x1000;

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the run, echoed into reports.
    pub campaign: String,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .map(|case| {
                let (actual, diff) = execute_case(case);
                let family = Primitive::from_symbol(&case.function)
                    .map_or("unknown", |p| p.family().as_str());
                VerificationResult {
                    case_name: case.name.clone(),
                    symbol: case.function.clone(),
                    family: family.to_string(),
                    scenario: case.scenario.clone(),
                    passed: actual == case.expected_output,
                    expected: case.expected_output.clone(),
                    actual,
                    diff,
                }
            })
            .collect()
    }
}

/// Outcome string for a decision: `proceed` or `abort:<kind>`.
#[must_use]
pub fn outcome(decision: Decision) -> String {
    match decision {
        Decision::Proceed => PROCEED.to_string(),
        Decision::Abort(violation) => format!("abort:{}", violation.kind().as_str()),
    }
}

fn execute_case(case: &FixtureCase) -> (String, Option<String>) {
    let actual = match Primitive::from_symbol(&case.function) {
        None => format!("unsupported:{}", case.function),
        Some(primitive) => match build_request(primitive, &case.inputs) {
            Ok(Some((capacity, request))) => {
                outcome(decide(BufferDescriptor::new(FIXTURE_BASE, capacity), request))
            }
            Ok(None) => PROCEED.to_string(),
            Err(err) => format!("invalid-input:{err}"),
        },
    };
    let diff = if actual == case.expected_output {
        None
    } else {
        Some(diff::render_diff(&case.expected_output, &actual))
    };
    (actual, diff)
}

/// Translate fixture inputs into the checked buffer's capacity and request.
///
/// `Ok(None)` is a call the entry point forwards without checking.
pub fn build_request(
    primitive: Primitive,
    inputs: &Value,
) -> Result<Option<(Capacity, Request)>, String> {
    let inputs = Inputs(inputs);
    let cap = inputs.capacity("capacity")?;

    let op = match primitive.family() {
        Family::FixedCountCopy => scan::fixed_count_copy(
            inputs.usize("count")?,
            inputs.c_string("src")?.as_slice(),
            inputs.capacity("src_capacity")?,
        )
        .into(),
        Family::UnboundedCopy => scan::unbounded_copy(
            cap,
            inputs.c_string("src")?.as_slice(),
            inputs.capacity("src_capacity")?,
        )
        .into(),
        Family::Concatenation => {
            let limit = match primitive {
                Primitive::Strncat => Some(inputs.usize("n")?),
                _ => None,
            };
            scan::concat(
                cap,
                inputs.c_string("dst")?.as_slice(),
                inputs.c_string("src")?.as_slice(),
                limit,
            )
            .into()
        }
        Family::BoundedLibraryCopy => {
            let size = inputs.usize("size")?;
            let src = inputs.c_string("src")?;
            let found = if primitive == Primitive::Strlcat {
                scan::strlcat(cap, size, inputs.c_string("dst")?.as_slice(), src.as_slice())
            } else {
                scan::strlcpy(size, src.as_slice())
            };
            found.into()
        }
        Family::FormattedOutput => Operation::Format {
            produced: inputs.str("output")?.len(),
        },
        Family::BoundedFormattedOutput => {
            let size = inputs.usize("size")?;
            Operation::BoundedFormat {
                size,
                produced: inputs.str("output")?.len(),
                measure_only: inputs.flag("null_destination")? && size == 0,
            }
        }
        Family::RawMemory => Operation::RawMemory {
            len: inputs.usize("len")?,
            source_capacity: inputs.capacity("src_capacity")?,
        },
        Family::IndexedSearch => match primitive {
            Primitive::Memchr | Primitive::Memrchr => Operation::MemorySearch {
                count: inputs.usize("count")?,
            },
            // strchr also stops at its needle; strrchr and strlen only at NUL.
            _ => {
                let needle = match primitive {
                    Primitive::Strchr => inputs.optional_str("c")?.and_then(|c| c.bytes().next()),
                    _ => None,
                };
                Operation::StringScan {
                    scanned: inputs.c_string("s")?.scan_until(cap, needle),
                }
            }
        },
        Family::DescriptorSet => {
            let set_cap = match inputs.0.get("capacity") {
                None => Capacity::Known(std::mem::size_of::<libc::fd_set>()),
                Some(_) => cap,
            };
            let op = Operation::DescriptorSet {
                fd: inputs.i32("fd")?,
            };
            return Ok(Some((set_cap, Request::new(primitive, op))));
        }
        Family::SizedIo => match primitive {
            Primitive::Fread | Primitive::Fwrite => Operation::ElementIo {
                size: inputs.usize("size")?,
                count: inputs.usize("count")?,
            },
            _ => Operation::SizedIo {
                len: inputs.usize("len")?,
            },
        },
        Family::PathQuery => {
            if inputs.flag("null_buffer")? {
                return Ok(None);
            }
            Operation::PathQuery {
                size: inputs.usize("size")?,
            }
        }
        Family::PollArray => {
            let element_size = match inputs.optional_usize("element_size")? {
                Some(n) => n,
                None => std::mem::size_of::<libc::pollfd>(),
            };
            let array_cap = match inputs.optional_usize("entries")? {
                Some(n) => Capacity::Known(n.saturating_mul(element_size)),
                None => cap,
            };
            let op = Operation::PollArray {
                count: inputs.usize("nfds")? as u64,
                element_size,
            };
            return Ok(Some((array_cap, Request::new(primitive, op))));
        }
        Family::ArgumentPolicy => match primitive {
            Primitive::Umask => Operation::Umask {
                mask: inputs.mode("mask")?,
            },
            _ => Operation::Open {
                flags: inputs.open_flags("flags")?,
                mode_supplied: inputs.flag("mode_supplied")?,
            },
        },
    };
    Ok(Some((cap, Request::new(primitive, op))))
}

struct Inputs<'a>(&'a Value);

impl Inputs<'_> {
    fn field(&self, key: &str) -> Result<&Value, String> {
        self.0.get(key).ok_or_else(|| format!("missing {key}"))
    }

    /// Missing, `null`, or `"unknown"` is an unknown capacity.
    fn capacity(&self, key: &str) -> Result<Capacity, String> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(Capacity::Unknown),
            Some(Value::String(s)) if s == "unknown" => Ok(Capacity::Unknown),
            Some(v) => Ok(Capacity::from_raw(size_value(key, v)?)),
        }
    }

    fn usize(&self, key: &str) -> Result<usize, String> {
        size_value(key, self.field(key)?)
    }

    fn optional_usize(&self, key: &str) -> Result<Option<usize>, String> {
        self.0.get(key).map(|v| size_value(key, v)).transpose()
    }

    fn i32(&self, key: &str) -> Result<i32, String> {
        self.field(key)?
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| format!("{key} is not an i32"))
    }

    fn flag(&self, key: &str) -> Result<bool, String> {
        match self.0.get(key) {
            None => Ok(false),
            Some(v) => v.as_bool().ok_or_else(|| format!("{key} is not a bool")),
        }
    }

    fn str(&self, key: &str) -> Result<&str, String> {
        self.field(key)?
            .as_str()
            .ok_or_else(|| format!("{key} is not a string"))
    }

    fn optional_str(&self, key: &str) -> Result<Option<&str>, String> {
        match self.0.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| format!("{key} is not a string")),
        }
    }

    /// String contents followed by a NUL, unless `<key>_unterminated` is set.
    fn c_string(&self, key: &str) -> Result<Vec<u8>, String> {
        let mut bytes = self.str(key)?.as_bytes().to_vec();
        if !self.flag(&format!("{key}_unterminated"))? {
            bytes.push(0);
        }
        Ok(bytes)
    }

    /// Integer, or an octal string such as `"1777"`.
    fn mode(&self, key: &str) -> Result<u32, String> {
        match self.field(key)? {
            Value::String(s) => u32::from_str_radix(s.trim_start_matches("0o"), 8)
                .map_err(|e| format!("{key}: {e}")),
            v => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| format!("{key} is not a mode")),
        }
    }

    /// Integer, or a list of `O_*` names.
    fn open_flags(&self, key: &str) -> Result<i32, String> {
        match self.field(key)? {
            Value::Array(names) => names.iter().try_fold(0, |acc, name| {
                let name = name.as_str().ok_or_else(|| format!("{key} entry is not a string"))?;
                open_flag(name)
                    .map(|bit| acc | bit)
                    .ok_or_else(|| format!("unknown open flag {name}"))
            }),
            v => v
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| format!("{key} is not a flag set")),
        }
    }
}

/// Non-negative integer, or `"size_max"` for `SIZE_MAX`.
fn size_value(key: &str, value: &Value) -> Result<usize, String> {
    match value {
        Value::String(s) if s.eq_ignore_ascii_case("size_max") => Ok(usize::MAX),
        v => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| format!("{key} is not a size")),
    }
}

fn open_flag(name: &str) -> Option<i32> {
    Some(match name {
        "O_RDONLY" => libc::O_RDONLY,
        "O_WRONLY" => libc::O_WRONLY,
        "O_RDWR" => libc::O_RDWR,
        "O_CREAT" => libc::O_CREAT,
        "O_EXCL" => libc::O_EXCL,
        "O_TRUNC" => libc::O_TRUNC,
        "O_APPEND" => libc::O_APPEND,
        "O_CLOEXEC" => libc::O_CLOEXEC,
        "O_DIRECTORY" => libc::O_DIRECTORY,
        "O_TMPFILE" => libc::O_TMPFILE,
        _ => return None,
    })
}
