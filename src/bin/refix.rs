//! refix — lint and fix source files with history-mined rewrite rules.
//!
//! Usage:
//!   refix lint <path> [--rules <file>] [--glob <pattern>]
//!   refix fix <path> [--rules <file>] [--glob <pattern>] [--dry-run]
//!   refix init [<dir>] [--depth <n>] [--detail] [--out <file>]
//!   refix init-patch <patch> [--detail] [--out <file>]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};

use refix::engine::miner::{mine, CommitInfo, MineMode, MineOptions};
use refix::engine::pattern::Pattern;
use refix::history::git::GitLog;
use refix::history::{patch, HistoryProvider};
use refix::lint::{collect_files, fix_file, lint_file};
use refix::output::render_results;
use refix::store::{load_patterns, resolve_rule_file, save_patterns, RuleMap, DEFAULT_RULE_FILE};

#[derive(Parser)]
#[command(
    name = "refix",
    version,
    about = "Lint and fix source files with rewrite rules mined from your own history"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a file or directory against a rule set
    Lint {
        /// File or directory to lint
        path: PathBuf,
        /// Rule file (defaults to refix.json next to the target)
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Glob filter for directory targets, e.g. "**/*.js"
        #[arg(long)]
        glob: Option<String>,
    },
    /// Apply suggested rewrites to a file or directory
    Fix {
        /// File or directory to fix
        path: PathBuf,
        /// Rule file (defaults to refix.json next to the target)
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Glob filter for directory targets
        #[arg(long)]
        glob: Option<String>,
        /// Print the diff without writing files
        #[arg(long)]
        dry_run: bool,
    },
    /// Mine rules from recent git history
    Init {
        /// Repository directory
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Number of commits to consider
        #[arg(long, default_value_t = 10)]
        depth: usize,
        /// Mine multi-line blocks and record commit provenance
        #[arg(long)]
        detail: bool,
        /// Output rule file (defaults to refix.json in the repository)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Mine rules from a patch file
    InitPatch {
        /// Unified-diff file to mine
        patch: PathBuf,
        /// Mine multi-line blocks and record provenance
        #[arg(long)]
        detail: bool,
        /// Output rule file (defaults to refix.json next to the patch)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Author recorded on mined rules
        #[arg(long)]
        author: Option<String>,
        /// Commit message recorded on mined rules
        #[arg(long)]
        message: Option<String>,
        /// Commit hash recorded on mined rules
        #[arg(long)]
        hash: Option<String>,
    },
}

fn main() -> ExitCode {
    // Logging goes to stderr so lint output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("refix: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Lint { path, rules, glob } => {
            let patterns = load_rules_for(&path, rules.as_deref())?;
            let mut results = Vec::new();
            for file in target_files(&path, glob.as_deref())? {
                results.extend(lint_file(&file, &patterns)?);
            }
            print!("{}", render_results(&results));
            Ok(if results.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }

        Command::Fix {
            path,
            rules,
            glob,
            dry_run,
        } => {
            let patterns = load_rules_for(&path, rules.as_deref())?;
            for file in target_files(&path, glob.as_deref())? {
                let outcome = fix_file(&file, &patterns, dry_run)?;
                if outcome.changed {
                    print!("{}", outcome.diff);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Init {
            dir,
            depth,
            detail,
            out,
        } => {
            let diffs = GitLog::new(&dir).diffs(depth)?;
            let patterns = mine(&diffs, &mine_options(detail));
            let out = out.unwrap_or_else(|| dir.join(DEFAULT_RULE_FILE));
            save_patterns(&out, &patterns)?;
            println!("mined {} rules into {}", patterns.len(), out.display());
            Ok(ExitCode::SUCCESS)
        }

        Command::InitPatch {
            patch: patch_path,
            detail,
            out,
            author,
            message,
            hash,
        } => {
            let content = std::fs::read_to_string(&patch_path)
                .with_context(|| format!("failed to read {}", patch_path.display()))?;
            let meta = (author.is_some() || message.is_some() || hash.is_some()).then(|| {
                CommitInfo {
                    author,
                    message,
                    hash,
                }
            });
            let diffs = patch::parse_patch(&content, meta.as_ref());
            let patterns = mine(&diffs, &mine_options(detail));
            let out = out.unwrap_or_else(|| {
                patch_path
                    .parent()
                    .unwrap_or_else(|| Path::new("."))
                    .join(DEFAULT_RULE_FILE)
            });
            save_patterns(&out, &patterns)?;
            println!("mined {} rules into {}", patterns.len(), out.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn mine_options(detail: bool) -> MineOptions {
    MineOptions {
        mode: if detail {
            MineMode::Detailed
        } else {
            MineMode::SingleLine
        },
        ..MineOptions::default()
    }
}

fn load_rules_for(target: &Path, explicit: Option<&Path>) -> Result<Vec<Pattern>> {
    let root = if target.is_dir() {
        target
    } else {
        target.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."))
    };
    let rule_file = resolve_rule_file(explicit, root, target, &RuleMap::default()).ok_or_else(
        || anyhow!("no rule file found — pass --rules or create {DEFAULT_RULE_FILE}"),
    )?;
    load_patterns(&rule_file)
}

fn target_files(path: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let set = glob
        .map(|g| -> Result<GlobSet> {
            let mut builder = GlobSetBuilder::new();
            builder.add(Glob::new(g).with_context(|| format!("invalid glob `{g}`"))?);
            Ok(builder.build()?)
        })
        .transpose()?;
    collect_files(path, set.as_ref())
}
