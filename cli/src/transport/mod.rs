//! Deployment status transports
//!
//! Both transports turn a deployment id into an ordered sequence of
//! [`StatusObservation`]s. The sequence ends after a terminal stage, after the
//! first error, or when the watch is cancelled.

use async_trait::async_trait;

use crate::deploy::observation::StatusObservation;
use crate::errors::WatchError;

pub mod cancel;
pub mod polling;
pub mod streaming;

pub use cancel::{cancellation, CancelHandle, Cancellation};

/// A lazy sequence of status observations for one deployment
#[async_trait]
pub trait ObservationSource: Send {
    /// The next observation, or `None` once the sequence has ended.
    ///
    /// After an error or a terminal stage has been returned, every further call
    /// returns `None`.
    async fn next(&mut self) -> Option<Result<StatusObservation, WatchError>>;

    /// Release the underlying connection. Safe to call more than once.
    async fn close(&mut self);
}

#[async_trait]
impl<T: ObservationSource + ?Sized> ObservationSource for Box<T> {
    async fn next(&mut self) -> Option<Result<StatusObservation, WatchError>> {
        (**self).next().await
    }

    async fn close(&mut self) {
        (**self).close().await
    }
}
