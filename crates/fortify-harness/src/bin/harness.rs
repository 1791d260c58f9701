//! CLI entrypoint for the fortify conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Conformance tooling for the fortify layer.
#[derive(Debug, Parser)]
#[command(name = "fortify-harness")]
#[command(about = "Decision fixtures and violation-log scanning for fortified calls")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run decision fixtures through the membrane.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown); a JSON twin is written alongside.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Aggregate captured fortify stderr (text, JSONL, or mixed).
    ScanLog {
        /// Log file to read.
        #[arg(long)]
        input: PathBuf,
        /// Print the aggregate as JSON instead of a summary line.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify { fixture, report } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let mut fixture_sets = Vec::new();
            for entry in std::fs::read_dir(&fixture)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().and_then(|s| s.to_str()) != Some("json") {
                    continue;
                }
                match fortify_harness::FixtureSet::from_file(&path) {
                    Ok(set) => fixture_sets.push(set),
                    Err(err) => {
                        eprintln!("Skipping {}: {}", path.display(), err);
                    }
                }
            }
            if fixture_sets.is_empty() {
                return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
            }

            let runner = fortify_harness::TestRunner::new("fixture-verify");
            let mut results = Vec::new();
            for set in &fixture_sets {
                results.extend(runner.run(set));
            }

            let summary = fortify_harness::verify::VerificationSummary::from_results(results);
            let report_doc = fortify_harness::ConformanceReport {
                title: String::from("fortify Decision Conformance Report"),
                campaign: runner.campaign.clone(),
                timestamp: format!("{:?}", std::time::SystemTime::now()),
                summary,
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );
            for failure in report_doc.summary.failures() {
                eprintln!("FAIL {} ({})", failure.case_name, failure.symbol);
                if let Some(diff) = &failure.diff {
                    eprint!("{diff}");
                }
            }

            if let Some(report_path) = report {
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
            }

            if !report_doc.summary.all_passed() {
                return Err("Conformance verification failed".into());
            }
        }
        Command::ScanLog { input, json } => {
            let log = std::fs::read_to_string(&input)?;
            let report = fortify_harness::ViolationLogReport::from_jsonl_str(&log);
            if json {
                println!("{}", report.to_json());
            } else {
                println!(
                    "lines={} violations={} trace={} other={} findings={}",
                    report.total_lines,
                    report.violations,
                    report.trace_lines,
                    report.other_lines,
                    report.findings.len()
                );
                for (symbol, count) in &report.by_symbol {
                    println!("  {symbol}: {count}");
                }
            }
            for finding in &report.findings {
                eprintln!("line {}: {}", finding.line, finding.reason);
            }
            if !report.is_clean() {
                return Err(format!("{} unattributed log lines", report.findings.len()).into());
            }
        }
    }

    Ok(())
}
