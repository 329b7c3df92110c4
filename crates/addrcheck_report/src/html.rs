use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::ValidationReport;

/// Writes a small human-readable companion to the JSON report: run metadata,
/// severity totals, and the dataset-level summary table.
pub fn write_html_report<P: AsRef<Path>>(path: P, report: &ValidationReport) -> anyhow::Result<()> {
    let html = render_html(report);
    fs::write(&path, html)
        .with_context(|| format!("write html report to {}", path.as_ref().display()))?;
    Ok(())
}

fn render_html(report: &ValidationReport) -> String {
    let mut out = String::new();
    out.push_str(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Address Point Quality Report</title>
    <meta http-equiv="Content-Type" content="text/html; charset=UTF-8"/>
    <style>
    body { font-family: Helvetica, Arial, sans-serif; font-size: 14px; padding: 1em 2em; }
    table { border-collapse: collapse; margin-top: 1em; }
    th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: left; }
    .error { color: #b00020; }
    .warning { color: #8a6d00; }
    .info { color: #555; }
    </style>
</head>
<body>
"#,
    );

    let _ = writeln!(out, "<h1>Address Point Quality Report</h1>");
    let _ = writeln!(
        out,
        "<p>Country: <b>{}</b> ({}) &mdash; validated at {} with addrcheck {}</p>",
        escape(&report.country_code),
        escape(&report.policy_name),
        escape(&report.validated_at),
        escape(&report.validator_version),
    );
    let _ = writeln!(
        out,
        "<p>{} rows checked, {} flagged &mdash; \
         <span class=\"error\">{} errors</span>, \
         <span class=\"warning\">{} warnings</span>, \
         <span class=\"info\">{} info</span></p>",
        report.row_count,
        report.flagged_rows,
        report.error_count,
        report.warning_count,
        report.info_count,
    );

    out.push_str("<table>\n<tr><th>Severity</th><th>Code</th><th>Message</th><th>Affected rows</th></tr>\n");
    for entry in &report.summary {
        let severity = format!("{:?}", entry.severity).to_lowercase();
        let affected = entry
            .affected_rows
            .map(|count| count.to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "<tr><td class=\"{severity}\">{severity}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&entry.code),
            escape(&entry.message),
            affected,
        );
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
