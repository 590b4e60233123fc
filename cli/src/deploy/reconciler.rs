//! Progress reconciler
//!
//! Folds a transport's observation sequence into a deduplicated log of
//! progress events and a single [`DeploymentResult`].

use backend_im_openapi::DeploymentStage;
use tracing::{debug, warn};

use crate::deploy::fsm::transition;
use crate::deploy::observation::StatusObservation;
use crate::errors::WatchError;
use crate::transport::ObservationSource;

/// User-visible progress, in the order it should be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The displayed stage changed
    StageChanged {
        stage: DeploymentStage,
        namespace: Option<String>,
        pvc: Option<String>,
    },

    /// A log line reported with an observation
    Log(String),
}

/// Final outcome of a watch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentResult {
    /// Reached `complete` with a URL
    Success { url: String },

    /// Reached `complete` but no URL was ever observed. Non-fatal.
    MissingUrl,

    /// The remote reported `failed`
    Failure { reason: String },

    /// The sequence ended without a terminal stage
    Unknown { reason: WatchError },
}

impl DeploymentResult {
    /// Whether the deployment completed, with or without a URL
    pub fn is_complete(&self) -> bool {
        matches!(self, DeploymentResult::Success { .. } | DeploymentResult::MissingUrl)
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            DeploymentResult::Success { url } => Some(url),
            _ => None,
        }
    }
}

/// Per-watch state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilerState {
    /// Stage last shown to the user
    pub last_emitted_stage: Option<DeploymentStage>,

    /// Most recent non-empty URL; never cleared once set
    pub accumulated_url: Option<String>,
}

/// Drives observations through the display state machine
#[derive(Debug, Default)]
pub struct Reconciler {
    state: ReconcilerState,
    outcome: Option<DeploymentResult>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ReconcilerState {
        &self.state
    }

    /// The result, once a terminal stage has been observed
    pub fn outcome(&self) -> Option<&DeploymentResult> {
        self.outcome.as_ref()
    }

    /// Fold one observation, returning the events to display.
    ///
    /// Once a terminal stage has resolved the outcome, further observations
    /// are ignored.
    pub fn observe(&mut self, observation: &StatusObservation) -> Vec<ProgressEvent> {
        if self.outcome.is_some() {
            debug!(
                "Ignoring {} observation after terminal stage",
                observation.stage
            );
            return Vec::new();
        }

        let step = transition(self.state.last_emitted_stage, observation);
        let mut events = Vec::with_capacity(observation.logs.len() + 1);

        if step.stage_changed {
            if step.regressed {
                warn!(
                    "Deployment {} reported {} after {}",
                    observation.deployment_id,
                    step.stage,
                    self.state
                        .last_emitted_stage
                        .map(|s| s.as_str())
                        .unwrap_or("nothing")
                );
            }
            events.push(ProgressEvent::StageChanged {
                stage: step.stage,
                namespace: observation.namespace.clone(),
                pvc: observation.pvc.clone(),
            });
            self.state.last_emitted_stage = Some(step.stage);
        }

        if step.emit_logs {
            events.extend(observation.logs.iter().cloned().map(ProgressEvent::Log));
        }

        if let Some(url) = &observation.url {
            self.state.accumulated_url = Some(url.clone());
        }

        match step.stage {
            DeploymentStage::Complete => {
                self.outcome = Some(match &self.state.accumulated_url {
                    Some(url) => DeploymentResult::Success { url: url.clone() },
                    None => DeploymentResult::MissingUrl,
                });
            }
            DeploymentStage::Failed => {
                let reason = observation
                    .logs
                    .last()
                    .cloned()
                    .unwrap_or_else(|| "deployment reported failed".to_string());
                self.outcome = Some(DeploymentResult::Failure { reason });
            }
            _ => {}
        }

        events
    }

    /// Resolve the watch. `transport_error` is the failure that ended the
    /// sequence, if any.
    pub fn finish(self, transport_error: Option<WatchError>) -> DeploymentResult {
        match self.outcome {
            Some(outcome) => outcome,
            None => DeploymentResult::Unknown {
                reason: transport_error.unwrap_or(WatchError::NoTerminalState),
            },
        }
    }
}

/// Consume `source` until the deployment resolves.
///
/// `on_event` receives progress events as they are produced. The source is
/// closed before returning, so a terminal stage stops the watch even when the
/// transport still has buffered observations.
pub async fn watch<S, F>(source: &mut S, mut on_event: F) -> DeploymentResult
where
    S: ObservationSource + ?Sized,
    F: FnMut(ProgressEvent),
{
    let mut reconciler = Reconciler::new();
    let mut transport_error = None;

    while let Some(next) = source.next().await {
        match next {
            Ok(observation) => {
                for event in reconciler.observe(&observation) {
                    on_event(event);
                }
                if reconciler.outcome().is_some() {
                    break;
                }
            }
            Err(e) => {
                debug!("Observation sequence ended with error: {}", e);
                transport_error = Some(e);
                break;
            }
        }
    }

    source.close().await;
    reconciler.finish(transport_error)
}
