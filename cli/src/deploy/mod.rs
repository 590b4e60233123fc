//! Deployment progress tracking

pub mod fsm;
pub mod observation;
pub mod reconciler;

pub use observation::StatusObservation;
pub use reconciler::{watch, DeploymentResult, ProgressEvent, Reconciler, ReconcilerState};
