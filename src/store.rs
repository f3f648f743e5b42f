//! Pattern store — rule-file load/save and rule-file resolution.
//!
//! Rule files are JSON arrays of pattern objects. The on-disk DTO
//! ([`RawPattern`]) is deliberately dumb: string-or-array `before`/`after`,
//! camelCase flags, one-letter severities. Hand-authored and mined files
//! share the exact same shape. Loading is lenient per element — a pattern
//! with an invalid regex or an empty before is skipped with a warning and
//! the rest of the file still loads.
//!
//! The language → rule-file table is an explicit [`RuleMap`] callers pass
//! in, not a process-wide registry; absent a mapping, a `refix.json` next
//! to the linted project is picked up.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::pattern::{BeforeShape, Pattern, Severity};
use crate::error::{RefixError, RefixResult};
use crate::util::atomic::atomic_write;

/// Default rule-file name looked up next to the linted project.
pub const DEFAULT_RULE_FILE: &str = "refix.json";

/// A JSON field that accepts either one string or an array of strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }

    fn from_lines(lines: &[String]) -> Self {
        if lines.len() == 1 {
            Self::One(lines[0].clone())
        } else {
            Self::Many(lines.to_vec())
        }
    }
}

/// On-disk pattern shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPattern {
    pub before: OneOrMany,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<OneOrMany>,
    #[serde(default)]
    pub is_regex: bool,
    #[serde(default = "default_match_case")]
    pub match_case: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

const fn default_match_case() -> bool {
    true
}

impl RawPattern {
    /// Convert the DTO into an engine pattern, compiling regex-mode
    /// expressions up front.
    pub fn into_pattern(self) -> RefixResult<Pattern> {
        let before = self.before.into_vec();
        let after = self.after.map_or_else(Vec::new, OneOrMany::into_vec);

        let mut pattern = if self.is_regex {
            let source = before.first().cloned().unwrap_or_default();
            Pattern::regex(&source, after, self.match_case)?
        } else {
            let mut p = Pattern::literal(before, after)?;
            p.match_case = self.match_case;
            p
        };

        pattern.severity = self
            .severity
            .as_deref()
            .and_then(Severity::parse)
            .unwrap_or_default();
        pattern.message = self.message;
        pattern.deprecated = self.deprecated;
        Ok(pattern)
    }

    pub fn from_pattern(pattern: &Pattern) -> Self {
        Self {
            before: OneOrMany::from_lines(&pattern.before_lines()),
            after: if pattern.after.is_empty() {
                None
            } else {
                Some(OneOrMany::from_lines(&pattern.after))
            },
            is_regex: matches!(pattern.before, BeforeShape::Regex(_)),
            match_case: pattern.match_case,
            severity: Some(pattern.severity.as_str().to_owned()),
            message: pattern.message.clone(),
            deprecated: pattern.deprecated,
        }
    }
}

/// Load a rule file, skipping elements that fail to convert.
pub fn load_patterns(path: &Path) -> Result<Vec<Pattern>> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            RefixError::RuleFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RefixError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let raw: Vec<RawPattern> = serde_json::from_str(&content)
        .with_context(|| format!("malformed rule file {}", path.display()))?;

    let mut patterns = Vec::new();
    for (index, item) in raw.into_iter().enumerate() {
        match item.into_pattern() {
            Ok(p) => patterns.push(p),
            Err(e) => warn!(index, error = %e, "skipping unusable pattern"),
        }
    }
    Ok(patterns)
}

/// Save patterns, unmodified in order, as a pretty-printed JSON array.
pub fn save_patterns(path: &Path, patterns: &[Pattern]) -> Result<()> {
    let raw: Vec<RawPattern> = patterns.iter().map(RawPattern::from_pattern).collect();
    let mut json = serde_json::to_string_pretty(&raw)?;
    json.push('\n');
    atomic_write(path, &json)
}

/// Source languages recognized for rule-file mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Rust,
    Go,
    Java,
    Ruby,
    C,
    Cpp,
    Other,
}

impl Language {
    /// Detect a language from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
        {
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "py" => Self::Python,
            "rs" => Self::Rust,
            "go" => Self::Go,
            "java" => Self::Java,
            "rb" => Self::Ruby,
            "c" | "h" => Self::C,
            "cc" | "cpp" | "cxx" | "hpp" => Self::Cpp,
            _ => Self::Other,
        }
    }
}

/// Explicit language → rule-file mapping. Callers build one (or pass the
/// empty default) instead of the engine consulting any global table.
#[derive(Debug, Clone, Default)]
pub struct RuleMap {
    entries: HashMap<Language, PathBuf>,
}

impl RuleMap {
    pub fn insert(&mut self, language: Language, rule_file: impl Into<PathBuf>) {
        self.entries.insert(language, rule_file.into());
    }

    pub fn get(&self, language: Language) -> Option<&Path> {
        self.entries.get(&language).map(PathBuf::as_path)
    }
}

/// Resolve which rule file applies to `source`.
///
/// Precedence: an explicitly requested file, then `refix.json` in
/// `project_root`, then the caller's language mapping.
pub fn resolve_rule_file(
    explicit: Option<&Path>,
    project_root: &Path,
    source: &Path,
    map: &RuleMap,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let project_file = project_root.join(DEFAULT_RULE_FILE);
    if project_file.is_file() {
        return Some(project_file);
    }
    map.get(Language::from_path(source)).map(Path::to_path_buf)
}
