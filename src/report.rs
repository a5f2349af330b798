use crate::analyzer::{self, AnalysisSummary};
use crate::config::Config;
use crate::error::{AnalyzerError, Result};
use crate::parser::LogAggregates;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Analyze the aggregates, print the summary to stdout and write the CSV
/// (plus JSON, if configured).
pub fn report(aggregates: &LogAggregates, config: &Config) -> Result<AnalysisSummary> {
    let stdout = io::stdout();
    report_to(&mut stdout.lock(), aggregates, config)
}

/// [`report`] with the console summary sent to `out`.
pub fn report_to<W: Write>(
    out: &mut W,
    aggregates: &LogAggregates,
    config: &Config,
) -> Result<AnalysisSummary> {
    let summary = analyzer::analyze(aggregates, config.failed_login_threshold);

    print_summary(out, &summary).map_err(AnalyzerError::ConsoleWrite)?;

    write_csv(&summary, &config.output_csv)?;
    writeln!(out, "\nResults saved to {}", config.output_csv.display())
        .and_then(|_| out.flush())
        .map_err(AnalyzerError::ConsoleWrite)?;

    if let Some(json_path) = &config.json_output {
        export_json(&summary, json_path)?;
    }
    Ok(summary)
}

/// Write the human-readable summary.
pub fn print_summary<W: Write>(out: &mut W, summary: &AnalysisSummary) -> io::Result<()> {
    writeln!(out, "{}", "Requests per IP Address:".bold())?;
    for item in &summary.requests_per_ip {
        writeln!(out, "{:<20} {}", item.value, item.count)?;
    }

    if let Some(top) = &summary.most_accessed_endpoint {
        writeln!(out, "\n{}", "Most Frequently Accessed Endpoint:".bold())?;
        writeln!(out, "{} (Accessed {} times)", top.value, top.count)?;
    }

    writeln!(out, "\n{}", "Suspicious Activity Detected:".bold())?;
    if summary.suspicious.is_empty() {
        writeln!(out, "No suspicious activity detected.")?;
    } else {
        for flagged in &summary.suspicious {
            writeln!(out, "{:<20} {}", flagged.ip.red(), flagged.failed_logins)?;
        }
    }
    Ok(())
}

/// Write the summary as a three-section CSV file at `path`.
pub fn write_csv(summary: &AnalysisSummary, path: &Path) -> Result<()> {
    let write = || -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        write_csv_to(&mut w, summary)?;
        w.flush()
    };
    write().map_err(|source| AnalyzerError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote CSV report to '{}'", path.display());
    Ok(())
}

/// CSV body, written to any sink.
pub fn write_csv_to<W: Write>(w: &mut W, summary: &AnalysisSummary) -> io::Result<()> {
    write_row(w, &["Count Requests per IP Address:"])?;
    write_row(w, &["IP Address", "Request Count"])?;
    for item in &summary.requests_per_ip {
        write_row(w, &[item.value.as_str(), &item.count.to_string()])?;
    }

    if let Some(top) = &summary.most_accessed_endpoint {
        write_row(w, &[])?;
        write_row(w, &["Most Accessed Frequently Endpoint:"])?;
        write_row(w, &["Endpoint", "Access Count"])?;
        write_row(w, &[top.value.as_str(), &top.count.to_string()])?;
    }

    write_row(w, &[])?;
    write_row(w, &["Suspicious Activity:"])?;
    write_row(w, &["IP Address", "Failed Login Attempts"])?;
    for flagged in &summary.suspicious {
        write_row(w, &[flagged.ip.as_str(), &flagged.failed_logins.to_string()])?;
    }
    Ok(())
}

/// Export the summary as pretty-printed JSON to the given path
pub fn export_json(summary: &AnalysisSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json).map_err(|source| AnalyzerError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote JSON report to '{}'", path.display());
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn write_row<W: Write>(w: &mut W, fields: &[&str]) -> io::Result<()> {
    let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    writeln!(w, "{}", row.join(","))
}

/// Quote a field only when it holds a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
