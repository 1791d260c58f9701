//! Report generation for conformance runs and violation logs.

use std::collections::BTreeMap;

use fortify_membrane::diagnostic::{TEXT_PREFIX, TRACE_PREFIX, VIOLATION_EVENT};
use fortify_membrane::{Primitive, ViolationRecord};
use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// A conformance report over one or more fixture sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Campaign name the runner was created with.
    pub campaign: String,
    /// Timestamp of the run.
    pub timestamp: String,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Campaign: {}\n", self.campaign));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        out.push_str("| Family | Symbol | Case | Expected | Actual | Status |\n");
        out.push_str("|--------|--------|------|----------|--------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | `{}` | {} | {} | {} | {} |\n",
                r.family, r.symbol, r.case_name, r.expected, r.actual, status
            ));
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// A log line that could not be attributed to a known primitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViolationLogFinding {
    pub line: usize,
    pub symbol: Option<String>,
    pub reason: String,
}

/// Aggregate of captured fortify stderr, text or JSONL or mixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViolationLogReport {
    pub total_lines: usize,
    pub violations: usize,
    pub trace_lines: usize,
    pub other_lines: usize,
    /// Violations per symbol.
    pub by_symbol: BTreeMap<String, usize>,
    /// Violations per kind; text lines carry no kind and are not counted here.
    pub by_kind: BTreeMap<String, usize>,
    pub findings: Vec<ViolationLogFinding>,
}

impl ViolationLogReport {
    /// Build a report from captured stderr.
    #[must_use]
    pub fn from_jsonl_str(log: &str) -> Self {
        let mut report = Self::default();

        for (idx, raw) in log.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            report.total_lines += 1;
            let line_no = idx + 1;

            if line.starts_with(TRACE_PREFIX) {
                report.trace_lines += 1;
                continue;
            }

            if let Some(rest) = line.strip_prefix(TEXT_PREFIX) {
                let symbol = rest.split(':').next().unwrap_or_default().trim();
                report.record(line_no, symbol, None);
                continue;
            }

            if !line.starts_with('{') {
                report.other_lines += 1;
                continue;
            }

            let value: serde_json::Value = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(err) => {
                    report.findings.push(ViolationLogFinding {
                        line: line_no,
                        symbol: None,
                        reason: format!("invalid JSON: {err}"),
                    });
                    continue;
                }
            };
            let is_violation = value
                .get("event")
                .and_then(|v| v.as_str())
                .is_some_and(|e| e == VIOLATION_EVENT);
            if !is_violation {
                report.other_lines += 1;
                continue;
            }

            match serde_json::from_value::<ViolationRecord>(value) {
                Ok(record) => {
                    if let Some(primitive) = record.primitive() {
                        if primitive.family() != record.family {
                            report.findings.push(ViolationLogFinding {
                                line: line_no,
                                symbol: Some(record.symbol.clone()),
                                reason: format!(
                                    "family {} does not match {}",
                                    record.family.as_str(),
                                    primitive.family().as_str()
                                ),
                            });
                        }
                    }
                    report.record(line_no, &record.symbol, Some(record.kind.as_str()));
                }
                Err(err) => report.findings.push(ViolationLogFinding {
                    line: line_no,
                    symbol: None,
                    reason: format!("malformed violation record: {err}"),
                }),
            }
        }

        report
    }

    fn record(&mut self, line: usize, symbol: &str, kind: Option<&str>) {
        if Primitive::from_symbol(symbol).is_none() {
            self.findings.push(ViolationLogFinding {
                line,
                symbol: Some(symbol.to_string()),
                reason: "unknown symbol".to_string(),
            });
            return;
        }
        self.violations += 1;
        *self.by_symbol.entry(symbol.to_string()).or_default() += 1;
        if let Some(kind) = kind {
            *self.by_kind.entry(kind.to_string()).or_default() += 1;
        }
    }

    /// True when every violation line was attributed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Render report as pretty JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }
}
