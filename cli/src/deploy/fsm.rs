//! Display state machine for deployment progress
//!
//! Decides, per observation, whether the user-visible stage changes and
//! whether the observation's log lines are shown. Ordering is taken as
//! delivered by the transport: a stale or reordered observation still moves
//! the display, it is only flagged as a regression.

use backend_im_openapi::DeploymentStage;

use crate::deploy::observation::StatusObservation;

/// Outcome of feeding one observation to the display state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Display stage after the observation
    pub stage: DeploymentStage,

    /// The stage differs from the previously displayed one
    pub stage_changed: bool,

    /// The stage moved against the canonical progression
    pub regressed: bool,

    /// The observation carries log lines to surface
    pub emit_logs: bool,
}

/// Compute the display transition for `observation`
pub fn transition(current: Option<DeploymentStage>, observation: &StatusObservation) -> Transition {
    let next = observation.stage;
    let (stage_changed, regressed) = match current {
        None => (true, false),
        Some(current) if current == next => (false, false),
        Some(current) => (true, !current.is_progression_to(next)),
    };

    Transition {
        stage: next,
        stage_changed,
        regressed,
        emit_logs: !observation.logs.is_empty(),
    }
}
