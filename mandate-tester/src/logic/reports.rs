use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;

#[allow(clippy::cast_precision_loss)]
fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (passed as f64 / total as f64) * 100.0
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Campaign Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "================================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(passed, total))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{status} {} [{}]",
            result.scenario_name.bold(),
            result.share_code
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;
        if let Some(last) = result.records.last() {
            writeln!(out, "   Last run: {} turns, {}", last.turns, last.ending)?;
        }
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let fastest = results.iter().min_by_key(|r| r.average_duration);
    let slowest = results.iter().max_by_key(|r| r.average_duration);
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# Mandate Campaign Test Results\n")?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(passed, total))?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {status} {} ({})\n", result.scenario_name, result.share_code)?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;
        if !result.records.is_empty() {
            writeln!(out, "\n| Seed | Turns | Ending | Events | Spins |")?;
            writeln!(out, "|------|-------|--------|--------|-------|")?;
            for record in &result.records {
                writeln!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    record.share_code, record.turns, record.ending, record.events_seen, record.spins
                )?;
            }
        }
        if !result.failures.is_empty() {
            writeln!(out, "\n- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// One row per played campaign.
pub fn generate_csv_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(
        out,
        "scenario,share_code,seed,turns,ending,events_seen,spins,rejections,average_support,passed"
    )?;
    for result in results {
        for record in &result.records {
            writeln!(
                out,
                "{},{},{},{},{},{},{},{},{:.2},{}",
                csv_field(&result.scenario_name),
                record.share_code,
                record.seed,
                record.turns,
                csv_field(&record.ending),
                record.events_seen,
                record.spins,
                record.rejections,
                record.average_support,
                record.passed
            )?;
        }
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::RunRecord;

    fn sample() -> Vec<ScenarioResult> {
        vec![ScenarioResult {
            scenario_name: "smoke".to_string(),
            seed: 1337,
            share_code: "ST-PAC01".to_string(),
            passed: false,
            iterations_run: 1,
            successful_iterations: 0,
            failures: vec!["Iteration 1: boom".to_string()],
            average_duration: Duration::from_millis(3),
            records: vec![RunRecord {
                seed: 1337,
                share_code: "ST-PAC01".to_string(),
                turns: 50,
                ending: "defeat: Time Out".to_string(),
                events_seen: 4,
                spins: 2,
                rejections: 0,
                average_support: 48.5,
                passed: false,
            }],
        }]
    }

    #[test]
    fn csv_has_header_and_one_row_per_run() {
        let mut out = Vec::new();
        generate_csv_report(&mut out, &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "smoke,ST-PAC01,1337,50,defeat: Time Out,4,2,0,48.50,false"
        );
    }

    #[test]
    fn csv_quotes_awkward_fields() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn json_report_parses_back() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["scenario_name"], "smoke");
        assert_eq!(value[0]["average_duration"], 3);
    }

    #[test]
    fn markdown_lists_failures() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("### ❌ smoke (ST-PAC01)"));
        assert!(text.contains("  - Iteration 1: boom"));
        assert!(text.contains("| ST-PAC01 | 50 | defeat: Time Out | 4 | 2 |"));
    }
}
