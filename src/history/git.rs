//! Git history provider — `git log -p` subprocess wrapper.
//!
//! Shells out to the `git` binary (located via `which`) rather than linking
//! a VCS library; the engine only ever sees the parsed [`Diff`] values.
//! Each commit record is delimited with ASCII separator characters so the
//! log output splits unambiguously regardless of commit message content.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

use crate::engine::miner::{CommitInfo, Diff};
use crate::error::RefixError;
use crate::history::{patch, HistoryProvider};

/// Record separator (RS) prefixing each commit in the custom pretty format.
const RECORD_SEP: char = '\u{1e}';
/// Unit separator (US) between hash, author, and subject.
const FIELD_SEP: char = '\u{1f}';

/// History provider backed by `git log -p` over a local repository.
#[derive(Debug, Clone)]
pub struct GitLog {
    repo_dir: PathBuf,
}

impl GitLog {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    fn git_binary() -> Result<PathBuf, RefixError> {
        which::which("git").map_err(|_| RefixError::GitNotFound)
    }
}

impl HistoryProvider for GitLog {
    fn diffs(&self, depth: usize) -> Result<Vec<Diff>> {
        let git = Self::git_binary()?;

        let output = Command::new(git)
            .arg("-C")
            .arg(&self.repo_dir)
            .arg("log")
            .arg(format!("-{depth}"))
            .arg("-p")
            .arg("--no-color")
            .arg("--no-merges")
            .arg("--pretty=format:%x1e%H%x1f%an%x1f%s")
            .output()
            .context("failed to execute git log")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RefixError::SubprocessFailed {
                command: "git log".to_owned(),
                reason: stderr.trim().to_owned(),
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let diffs = parse_log(&stdout);
        debug!(
            repo = %self.repo_dir.display(),
            depth,
            diffs = diffs.len(),
            "collected git history"
        );
        Ok(diffs)
    }
}

/// Split delimited `git log` output into per-commit records and parse each
/// record's patch body.
fn parse_log(text: &str) -> Vec<Diff> {
    let mut diffs = Vec::new();

    for record in text.split(RECORD_SEP).filter(|r| !r.trim().is_empty()) {
        let (header, body) = record.split_once('\n').unwrap_or((record, ""));
        let mut fields = header.split(FIELD_SEP);
        let meta = CommitInfo {
            hash: fields.next().map(str::to_owned),
            author: fields.next().map(str::to_owned),
            message: fields.next().map(str::to_owned),
        };
        diffs.extend(patch::parse_patch(body, Some(&meta)));
    }

    diffs
}
