//! Deployment stages

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A point in a deployment's lifecycle.
///
/// Non-terminal stages advance in declaration order up to `Complete`.
/// `Failed` can be entered from any non-terminal stage. Both `Complete` and
/// `Failed` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStage {
    Queued,
    Committing,
    CreatingNamespace,
    CreatingPvc,
    Building,
    Deploying,
    Complete,
    Failed,
}

impl DeploymentStage {
    /// The canonical successful progression, in order.
    pub const ALL: [DeploymentStage; 7] = [
        DeploymentStage::Queued,
        DeploymentStage::Committing,
        DeploymentStage::CreatingNamespace,
        DeploymentStage::CreatingPvc,
        DeploymentStage::Building,
        DeploymentStage::Deploying,
        DeploymentStage::Complete,
    ];

    /// Position in the canonical progression. `Failed` sorts after everything.
    pub fn ordinal(&self) -> usize {
        match self {
            DeploymentStage::Queued => 0,
            DeploymentStage::Committing => 1,
            DeploymentStage::CreatingNamespace => 2,
            DeploymentStage::CreatingPvc => 3,
            DeploymentStage::Building => 4,
            DeploymentStage::Deploying => 5,
            DeploymentStage::Complete => 6,
            DeploymentStage::Failed => 7,
        }
    }

    /// Whether no further transitions leave this stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentStage::Complete | DeploymentStage::Failed)
    }

    /// Whether moving from `self` to `next` follows the expected progression.
    ///
    /// Skipping intermediate stages counts as progression; staying on the same
    /// stage or moving backwards does not.
    pub fn is_progression_to(&self, next: DeploymentStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            DeploymentStage::Failed => true,
            next => next.ordinal() > self.ordinal(),
        }
    }

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStage::Queued => "queued",
            DeploymentStage::Committing => "committing",
            DeploymentStage::CreatingNamespace => "creating_namespace",
            DeploymentStage::CreatingPvc => "creating_pvc",
            DeploymentStage::Building => "building",
            DeploymentStage::Deploying => "deploying",
            DeploymentStage::Complete => "complete",
            DeploymentStage::Failed => "failed",
        }
    }
}

impl fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(DeploymentStage::Queued),
            "committing" => Ok(DeploymentStage::Committing),
            "creating_namespace" => Ok(DeploymentStage::CreatingNamespace),
            "creating_pvc" => Ok(DeploymentStage::CreatingPvc),
            "building" => Ok(DeploymentStage::Building),
            "deploying" => Ok(DeploymentStage::Deploying),
            "complete" => Ok(DeploymentStage::Complete),
            "failed" => Ok(DeploymentStage::Failed),
            _ => Err(format!("Unknown deployment stage: {}", s)),
        }
    }
}
