//! History providers — the boundary that feeds the miner.
//!
//! A provider materializes an ordered sequence of [`Diff`] values for a
//! target; the engine consumes them as plain values and never touches a VCS
//! itself. Two providers ship here: a `git log -p` subprocess wrapper
//! ([`git::GitLog`]) and a unified-diff text parser ([`patch::parse_patch`])
//! for mining straight from a patch file.

pub mod git;
pub mod patch;

use anyhow::Result;

use crate::engine::miner::Diff;

/// Supplies ordered before/after line groups plus commit metadata.
pub trait HistoryProvider {
    /// Up to `depth` most recent changes, newest first.
    fn diffs(&self, depth: usize) -> Result<Vec<Diff>>;
}
