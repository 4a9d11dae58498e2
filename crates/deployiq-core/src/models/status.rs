//! Enumerated states. Parsed back from their string form at the store boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a deployment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Pending,
    InProgress,
    Success,
    Failed,
    RolledBack,
}

impl DeploymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::RolledBack => "rolled_back",
        }
    }

    /// Success, failed, and rolled back are terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::RolledBack)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "rolled_back" => Ok(Self::RolledBack),
            other => Err(format!("unknown deployment status: {other}")),
        }
    }
}

/// The terminal subset of `DeploymentStatus`, accepted by completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentOutcome {
    Success,
    Failed,
    RolledBack,
}

impl DeploymentOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<DeploymentOutcome> for DeploymentStatus {
    fn from(outcome: DeploymentOutcome) -> Self {
        match outcome {
            DeploymentOutcome::Success => Self::Success,
            DeploymentOutcome::Failed => Self::Failed,
            DeploymentOutcome::RolledBack => Self::RolledBack,
        }
    }
}

/// Ordered stages of one deployment. The ordinal (1–7) never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentPhase {
    Validation = 1,
    DependencyInstall = 2,
    Build = 3,
    Upload = 4,
    Configuration = 5,
    HealthCheck = 6,
    TrafficRouting = 7,
}

impl DeploymentPhase {
    pub const ALL: [DeploymentPhase; 7] = [
        Self::Validation,
        Self::DependencyInstall,
        Self::Build,
        Self::Upload,
        Self::Configuration,
        Self::HealthCheck,
        Self::TrafficRouting,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal).checked_sub(1)?).copied()
    }

    pub fn stage_name(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::DependencyInstall => "dependency_install",
            Self::Build => "build",
            Self::Upload => "upload",
            Self::Configuration => "configuration",
            Self::HealthCheck => "health_check",
            Self::TrafficRouting => "traffic_routing",
        }
    }
}

impl fmt::Display for DeploymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ordinal(), self.stage_name())
    }
}

/// Category of a build or runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Syntax,
    Dependency,
    Build,
    Runtime,
}

impl ErrorType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Dependency => "dependency",
            Self::Build => "build",
            Self::Runtime => "runtime",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "syntax" => Ok(Self::Syntax),
            "dependency" => Ok(Self::Dependency),
            "build" => Ok(Self::Build),
            "runtime" => Ok(Self::Runtime),
            other => Err(format!("unknown error type: {other}")),
        }
    }
}
