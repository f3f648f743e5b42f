//! `refix` — history-mined rewrite rules.
//!
//! Learns code-style before → after rewrite rules from version-control
//! history and replays them against new source text, either reporting the
//! occurrences (lint) or splicing in the suggested replacement (fix).
//!
//! # Pipeline
//!
//! ```text
//! mining:   git log -p / patch file → history → miner → generalize → store
//! matching: source line → tokenize → matcher ──(trigger)──→ rewrite → lint
//!                                       ↑
//!                                loaded pattern set
//! ```
//!
//! The engine ([`engine`]) is pure and synchronous: it consumes
//! already-materialized diffs and lines and never touches the filesystem or
//! a version-control system. The collaborators around it ([`history`],
//! [`store`], [`lint`], [`output`]) are thin I/O glue.

pub mod engine;
pub mod error;
pub mod history;
pub mod lint;
pub mod output;
pub mod store;
pub mod util;

pub use engine::generalize::{generalize, GeneralizeOptions};
pub use engine::matcher::{first_trigger, LineTokens, TriggerMatch};
pub use engine::miner::{mine, CommitInfo, Diff, MineMode, MineOptions};
pub use engine::pattern::{Captures, Pattern, Severity};
pub use engine::rewrite::{apply, Replacement};
pub use engine::token::{tokenize, Token};
pub use error::{RefixError, RefixResult};
