//! Knowledge-base records: known solutions and the fixes they hold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ErrorType;
use crate::constants::{DISCOVERED_SOLUTION_CONFIDENCE, MAX_CONFIDENCE, MAX_RECORDED_CAUSES};

/// Heuristic 0–10 score: success rate weighted 8, usage volume weighted 2
/// (saturating at ten applications).
pub fn effectiveness_score(success_rate: f64, times_applied: u32) -> f64 {
    let usage = (f64::from(times_applied) / 10.0).min(1.0);
    (success_rate * 8.0 + usage * 2.0).round().min(10.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    Create,
    Replace,
    Append,
    Delete,
}

/// A file edit performed by a solution, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub action: FileAction,
    #[serde(default)]
    pub content: Option<String>,
}

/// One concrete fix for a known error pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub id: String,
    pub description: String,
    pub commands: Vec<String>,
    pub file_changes: Vec<FileChange>,
    pub success_rate: f64,
    pub effectiveness: f64,
    pub times_applied: u32,
    pub times_successful: u32,
    /// Opt-in gate: only solutions flagged safe may run unattended.
    pub automation_safe: bool,
    pub last_used: Option<DateTime<Utc>>,
}

impl Solution {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            description: description.into(),
            commands: Vec::new(),
            file_changes: Vec::new(),
            success_rate: 0.0,
            effectiveness: 0.0,
            times_applied: 0,
            times_successful: 0,
            automation_safe: false,
            last_used: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn with_file_change(mut self, change: FileChange) -> Self {
        self.file_changes.push(change);
        self
    }

    pub fn with_effectiveness(mut self, effectiveness: f64) -> Self {
        self.effectiveness = effectiveness.clamp(0.0, 10.0);
        self
    }

    pub fn automation_safe(mut self, safe: bool) -> Self {
        self.automation_safe = safe;
        self
    }

    /// Count one application and recompute the derived scores from the counts.
    pub fn record_application(&mut self, succeeded: bool, at: DateTime<Utc>) {
        self.times_applied += 1;
        if succeeded {
            self.times_successful += 1;
        }
        self.last_used = Some(at);
        self.recompute();
    }

    /// Success rate is always the exact ratio of the counters, never an
    /// incrementally adjusted float.
    pub fn recompute(&mut self) {
        self.success_rate = if self.times_applied == 0 {
            0.0
        } else {
            f64::from(self.times_successful) / f64::from(self.times_applied)
        };
        self.effectiveness = effectiveness_score(self.success_rate, self.times_applied);
    }

    /// Total number of steps (commands, then file changes).
    pub fn step_count(&self) -> usize {
        self.commands.len() + self.file_changes.len()
    }
}

/// Knowledge-base entry keyed by normalized error pattern and error type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownSolution {
    pub error_pattern: String,
    pub error_type: ErrorType,
    pub solutions: Vec<Solution>,
    /// Raw messages that normalized onto this pattern (bounded, de-duplicated).
    pub causes: Vec<String>,
    pub occurrences: u32,
    pub confidence: f64,
    /// Human-reviewed. Never set automatically.
    pub verified: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KnownSolution {
    /// Entry for a pattern seen for the first time on a failed deployment.
    /// Holds a single investigation placeholder that is never automation safe.
    pub fn discovered(
        error_pattern: impl Into<String>,
        error_type: ErrorType,
        raw_cause: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let error_pattern = error_pattern.into();
        let placeholder = Solution::new(format!("Investigate recurring {error_type} error: {error_pattern}"));
        Self {
            error_pattern,
            error_type,
            solutions: vec![placeholder],
            causes: vec![raw_cause.to_string()],
            occurrences: 1,
            confidence: DISCOVERED_SOLUTION_CONFIDENCE,
            verified: false,
            tags: vec!["auto-discovered".to_string(), error_type.as_str().to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    /// Empty entry used when an integrator seeds a curated fix.
    pub fn curated(error_pattern: impl Into<String>, error_type: ErrorType, now: DateTime<Utc>) -> Self {
        Self {
            error_pattern: error_pattern.into(),
            error_type,
            solutions: Vec::new(),
            causes: Vec::new(),
            occurrences: 0,
            confidence: DISCOVERED_SOLUTION_CONFIDENCE,
            verified: false,
            tags: vec!["curated".to_string(), error_type.as_str().to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record_cause(&mut self, raw_cause: &str, now: DateTime<Utc>) {
        self.occurrences += 1;
        self.updated_at = now;
        if self.causes.iter().any(|c| c == raw_cause) {
            return;
        }
        if self.causes.len() >= MAX_RECORDED_CAUSES {
            self.causes.remove(0);
        }
        self.causes.push(raw_cause.to_string());
    }

    pub fn adjust_confidence(&mut self, delta: f64) {
        self.confidence = (self.confidence + delta).clamp(0.0, MAX_CONFIDENCE);
    }

    pub fn solution_mut(&mut self, solution_id: &str) -> Option<&mut Solution> {
        self.solutions.iter_mut().find(|s| s.id == solution_id)
    }
}

/// A solution flattened out of its parent entry for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSolution {
    pub error_pattern: String,
    pub error_type: ErrorType,
    pub verified: bool,
    pub solution: Solution,
}

/// Record of a solution applied during one deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedSolution {
    pub solution_id: String,
    pub error_pattern: String,
    pub applied_at: DateTime<Utc>,
    /// Whether every step ran cleanly.
    pub success: bool,
    pub failed_step: Option<usize>,
    pub confidence: f64,
}
