//! Lint/fix consumer.
//!
//! Walks source content line by line (in bounded windows, for multi-line
//! templates), consults the trigger matcher, and either collects
//! [`LintResult`]s or splices replacements into the text. The engine decides
//! *whether* a pattern fires; this module decides what to do about it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::GlobSet;
use similar::{Algorithm, TextDiff};
use tracing::{debug, warn};

use crate::engine::matcher::{first_trigger, LineTokens};
use crate::engine::pattern::{BeforeShape, Pattern, Severity};
use crate::engine::rewrite::apply;
use crate::util::atomic::atomic_write;

/// One reported occurrence of a pattern's before-shape.
#[derive(Debug, Clone)]
pub struct LintResult {
    pub file_name: String,
    /// 1-based line number of the first matched line.
    pub line: usize,
    /// 1-based byte column of the match, 1 for multi-line matches.
    pub column: usize,
    pub severity: Severity,
    pub message: String,
    /// The matched text: the span for single-line matches, the whole first
    /// line otherwise.
    pub matched: String,
    /// Rendered replacement, absent for flag-only patterns and patterns
    /// whose placeholders failed to bind.
    pub suggestion: Option<String>,
    pub deprecated: bool,
}

/// Outcome of fixing one file.
#[derive(Debug)]
pub struct FixOutcome {
    pub changed: bool,
    /// Unified diff of the change, empty when nothing changed.
    pub diff: String,
    pub content: String,
}

/// Widest window any pattern in the list can consume.
fn max_window(patterns: &[Pattern]) -> usize {
    patterns
        .iter()
        .map(|p| match &p.before {
            BeforeShape::Literal(t) => t.line_count(),
            BeforeShape::Regex(_) => 1,
        })
        .max()
        .unwrap_or(1)
}

/// Lint in-memory content against a pattern list.
pub fn lint_content(content: &str, patterns: &[Pattern], file_name: &str) -> Vec<LintResult> {
    let lines: Vec<LineTokens> = content.lines().map(LineTokens::new).collect();
    let window = max_window(patterns);
    let mut results = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let end = (i + window).min(lines.len());
        let Some(hit) = first_trigger(&lines[i..end], patterns) else {
            i += 1;
            continue;
        };

        let replacement = apply(hit.pattern, &hit.captures);
        if !replacement.is_clean() {
            // Pattern/capture mismatch — distinct from "no match": report
            // the occurrence but withhold the broken suggestion.
            warn!(
                pattern = hit.pattern_index,
                unbound = ?replacement.unbound,
                "pattern has unbound placeholders"
            );
        }

        let matched = hit.span.map_or_else(
            || lines[i].text().to_owned(),
            |(s, e)| lines[i].text()[s..e].to_owned(),
        );
        let suggestion = (replacement.is_clean() && !replacement.lines.is_empty())
            .then(|| replacement.lines.join("\n"));
        let message = hit.pattern.message.clone().unwrap_or_else(|| {
            default_message(&matched, suggestion.as_deref(), hit.pattern.deprecated)
        });

        results.push(LintResult {
            file_name: file_name.to_owned(),
            line: i + 1,
            column: hit.span.map_or(1, |(s, _)| s + 1),
            severity: hit.pattern.severity,
            message,
            matched,
            suggestion,
            deprecated: hit.pattern.deprecated,
        });

        i += hit.lines_matched.max(1);
    }

    results
}

fn default_message(matched: &str, suggestion: Option<&str>, deprecated: bool) -> String {
    match suggestion {
        Some(s) => format!("`{matched}` should be `{s}`"),
        None if deprecated => format!("`{matched}` is deprecated"),
        None => format!("`{matched}` is flagged"),
    }
}

/// Apply every clean, non-flag-only trigger to `content` in one pass.
///
/// Single-line matches splice the replacement over the matched byte span
/// only, so surrounding text on the line survives; multi-line matches
/// replace the matched lines wholesale. A second pass over the output is a
/// no-op: replaced text no longer contains the before-shape.
pub fn fix_content(content: &str, patterns: &[Pattern]) -> String {
    let src: Vec<&str> = content.lines().collect();
    let lines: Vec<LineTokens> = src.iter().map(|l| LineTokens::new(*l)).collect();
    let window = max_window(patterns);
    let mut out: Vec<String> = Vec::with_capacity(src.len());

    let mut i = 0;
    while i < src.len() {
        let end = (i + window).min(src.len());
        let hit = first_trigger(&lines[i..end], patterns);

        let Some(hit) = hit else {
            out.push(src[i].to_owned());
            i += 1;
            continue;
        };

        let replacement = apply(hit.pattern, &hit.captures);
        if !replacement.is_clean() || replacement.lines.is_empty() {
            // Flag-only or malformed: nothing to rewrite.
            out.push(src[i].to_owned());
            i += 1;
            continue;
        }

        debug!(pattern = hit.pattern_index, line = i + 1, "applying fix");
        if hit.lines_matched == 1 && replacement.lines.len() == 1 {
            if let Some((s, e)) = hit.span {
                let line = src[i];
                out.push(format!("{}{}{}", &line[..s], replacement.lines[0], &line[e..]));
                i += 1;
                continue;
            }
        }
        out.extend(replacement.lines.iter().cloned());
        i += hit.lines_matched.max(1);
    }

    let mut fixed = out.join("\n");
    if content.ends_with('\n') {
        fixed.push('\n');
    }
    fixed
}

/// Lint one file on disk.
pub fn lint_file(path: &Path, patterns: &[Pattern]) -> Result<Vec<LintResult>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(lint_content(
        &content,
        patterns,
        &path.display().to_string(),
    ))
}

/// Fix one file on disk, writing the result atomically unless `dry_run`.
pub fn fix_file(path: &Path, patterns: &[Pattern], dry_run: bool) -> Result<FixOutcome> {
    let old = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let new = fix_content(&old, patterns);
    let changed = new != old;

    let diff = if changed {
        unified_diff(&path.display().to_string(), &old, &new)
    } else {
        String::new()
    };

    if changed && !dry_run {
        atomic_write(path, &new)?;
    }

    Ok(FixOutcome {
        changed,
        diff,
        content: new,
    })
}

/// Unified diff for fix previews (Patience keeps source structure readable).
pub fn unified_diff(file_name: &str, old: &str, new: &str) -> String {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_lines(old, new);

    diff.unified_diff()
        .header(&format!("a/{file_name}"), &format!("b/{file_name}"))
        .to_string()
}

/// Maximum recursion depth for the directory walker.
const MAX_WALK_DEPTH: usize = 50;

/// Collect lintable files under `root`, optionally filtered by a glob set.
/// Hidden entries, `node_modules`, and `target` are skipped, symlinks are
/// not followed, and recursion is depth-capped.
pub fn collect_files(root: &Path, include: Option<&GlobSet>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, include, 0, &mut files)?;
    Ok(files)
}

fn walk(
    dir: &Path,
    include: Option<&GlobSet>,
    depth: usize,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    if depth > MAX_WALK_DEPTH {
        return Ok(());
    }

    let meta = std::fs::symlink_metadata(dir);
    match meta {
        Ok(m) if m.is_file() => {
            if include.is_none_or(|g| g.is_match(dir)) {
                files.push(dir.to_path_buf());
            }
            return Ok(());
        }
        Ok(m) if m.is_symlink() || !m.is_dir() => return Ok(()),
        Err(_) => return Ok(()),
        _ => {}
    }

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry.context("failed to read directory entry")?;
        let path = entry.path();

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') || name == "node_modules" || name == "target" {
                continue;
            }
        }

        let Ok(ft) = entry.file_type() else { continue };
        if ft.is_dir() {
            walk(&path, include, depth + 1, files)?;
        } else if ft.is_file() && include.is_none_or(|g| g.is_match(&path)) {
            files.push(path);
        }
    }

    Ok(())
}
