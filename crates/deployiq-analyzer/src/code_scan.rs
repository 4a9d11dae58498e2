//! Code-quality scan over a deterministic sample of source files.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use deployiq_core::constants::{SOURCE_EXTENSIONS, TYPE_CONFIG_FILE};
use deployiq_core::models::{RiskFactor, Severity};
use deployiq_core::traits::{IProjectSource, SourceFile};

use crate::snapshot::has_extension;

static DEBUG_STATEMENT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\bconsole\.(?:log|debug|trace)\s*\(|\bdebugger\s*;").ok()
});

static TODO_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(?:TODO|FIXME|HACK|XXX)\b").ok());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeQualityReport {
    pub listed_files: usize,
    pub sampled_files: usize,
    pub debug_statements: usize,
    pub debug_files: Vec<String>,
    pub todo_markers: usize,
    pub todo_files: Vec<String>,
    pub missing_type_config: bool,
}

impl CodeQualityReport {
    pub fn risk_factors(&self) -> Vec<RiskFactor> {
        let mut risks = Vec::new();
        if self.missing_type_config {
            risks.push(
                RiskFactor::new(
                    "missing_type_config",
                    Severity::High,
                    "TypeScript sources without tsconfig.json",
                )
                .with_file(TYPE_CONFIG_FILE),
            );
        }
        if let Some(first) = self.debug_files.first() {
            risks.push(
                RiskFactor::new(
                    "debug_statements",
                    Severity::Low,
                    format!(
                        "{} debug statements in {} sampled files",
                        self.debug_statements,
                        self.debug_files.len()
                    ),
                )
                .with_file(first.clone()),
            );
        }
        if let Some(first) = self.todo_files.first() {
            risks.push(
                RiskFactor::new(
                    "todo_markers",
                    Severity::Low,
                    format!(
                        "{} TODO/FIXME markers in {} sampled files",
                        self.todo_markers,
                        self.todo_files.len()
                    ),
                )
                .with_file(first.clone()),
            );
        }
        risks
    }
}

/// Evenly spaced, order-preserving sample of at most `size` items.
pub fn sample<T>(items: &[T], size: usize) -> Vec<&T> {
    if items.len() <= size {
        return items.iter().collect();
    }
    (0..size).map(|i| &items[i * items.len() / size]).collect()
}

/// Scan `files` (the bounded root listing, sorted) for smells.
pub fn scan(
    source: &dyn IProjectSource,
    files: &[SourceFile],
    sample_size: usize,
    typed_source: bool,
) -> CodeQualityReport {
    let candidates: Vec<&SourceFile> = files
        .iter()
        .filter(|f| has_extension(&f.path, SOURCE_EXTENSIONS))
        .collect();
    let sampled = sample(&candidates, sample_size);

    let mut report = CodeQualityReport {
        listed_files: candidates.len(),
        sampled_files: sampled.len(),
        missing_type_config: typed_source && !source.exists(TYPE_CONFIG_FILE),
        ..Default::default()
    };

    for file in sampled {
        let Ok(content) = source.read_file(&file.path) else {
            continue;
        };
        let debug = count_matches(&DEBUG_STATEMENT, &content);
        if debug > 0 {
            report.debug_statements += debug;
            report.debug_files.push(file.path.clone());
        }
        let todos = count_matches(&TODO_MARKER, &content);
        if todos > 0 {
            report.todo_markers += todos;
            report.todo_files.push(file.path.clone());
        }
    }
    report
}

fn count_matches(re: &LazyLock<Option<Regex>>, content: &str) -> usize {
    re.as_ref().map_or(0, |re| re.find_iter(content).count())
}
