//! Console rendering of lint results.
//!
//! Formatting only — exit codes and whether to rewrite files are the CLI's
//! call. Styling degrades to plain text automatically when stdout is not a
//! terminal (handled by `console`).

use console::style;

use crate::engine::pattern::Severity;
use crate::lint::LintResult;

/// Render results as `file:line:col: SEV message` lines plus a summary.
pub fn render_results(results: &[LintResult]) -> String {
    let mut out = String::new();

    for r in results {
        let tag = severity_tag(r.severity);
        let deprecated = if r.deprecated { " [deprecated]" } else { "" };
        out.push_str(&format!(
            "{}:{}:{}: {tag} {}{deprecated}\n",
            r.file_name, r.line, r.column, r.message
        ));
    }

    if results.is_empty() {
        out.push_str("No problems found.\n");
    } else {
        let problems = if results.len() == 1 { "problem" } else { "problems" };
        out.push_str(&format!(
            "{}\n",
            style(format!("✖ {} {problems}", results.len())).bold()
        ));
    }

    out
}

fn severity_tag(severity: Severity) -> String {
    let tag = severity.as_str();
    match severity {
        Severity::Error => style(tag).red().bold().to_string(),
        Severity::Warning => style(tag).yellow().to_string(),
        Severity::Information => style(tag).cyan().to_string(),
        Severity::Hint => style(tag).dim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(severity: Severity) -> LintResult {
        LintResult {
            file_name: "app.js".to_owned(),
            line: 3,
            column: 5,
            severity,
            message: "`var x` should be `let x`".to_owned(),
            matched: "var x".to_owned(),
            suggestion: Some("let x".to_owned()),
            deprecated: false,
        }
    }

    #[test]
    fn test_render_location_and_message() {
        let rendered = render_results(&[result(Severity::Warning)]);
        assert!(rendered.contains("app.js:3:5:"));
        assert!(rendered.contains("`var x` should be `let x`"));
        assert!(rendered.contains("1 problem"));
    }

    #[test]
    fn test_render_empty() {
        assert!(render_results(&[]).contains("No problems found."));
    }

    #[test]
    fn test_deprecated_marker() {
        let mut r = result(Severity::Information);
        r.deprecated = true;
        assert!(render_results(&[r]).contains("[deprecated]"));
    }

    #[test]
    fn test_plural_summary() {
        let rendered = render_results(&[result(Severity::Error), result(Severity::Hint)]);
        assert!(rendered.contains("2 problems"));
    }
}
