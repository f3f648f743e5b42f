//! Rule-mining and pattern-matching engine.
//!
//! Everything in this module is a pure, in-memory transformation: diffs and
//! source lines come in as values, patterns and replacements come out as
//! values. There is no filesystem, subprocess, or VCS access here — those
//! live in the collaborator modules at the crate root.
//!
//! # Stages
//!
//! 1. [`token`] — split a line into an ordered token sequence
//! 2. [`generalize`] — turn one before/after line-pair into a [`pattern::Pattern`]
//! 3. [`miner`] — fold a diff history into a deduplicated pattern set
//! 4. [`matcher`] — find the first pattern triggered by a candidate line
//! 5. [`rewrite`] — render the matched pattern's after-template
//!
//! Matching is **first-match-wins over the supplied pattern list**. That
//! ordering is a contract, not an accident: rule files are evaluated top to
//! bottom so authors and tests can rely on precedence by position.

pub mod generalize;
pub mod matcher;
pub mod miner;
pub mod pattern;
pub mod rewrite;
pub mod token;
