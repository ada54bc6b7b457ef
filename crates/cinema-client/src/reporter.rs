//! Status reporting seam.
//!
//! Rendering outcomes (toasts, banners) belongs to the UI. The engine hands
//! every settled write to a [`StatusReporter`] exactly once.

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::events::OutcomePayload;
use crate::outcome::{Settlement, WriteOutcome};

#[cfg_attr(test, mockall::automock)]
pub trait StatusReporter: Send + Sync {
    fn report(&self, outcome: &WriteOutcome);
}

/// Logs outcomes; used when no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn report(&self, outcome: &WriteOutcome) {
        let action = outcome.action.tag();
        let movie_id = outcome.settlement.movie_id().or_else(|| outcome.action.target());
        let message = outcome.message();

        match &outcome.settlement {
            Settlement::Success { .. } => info!(action, ?movie_id, %message, "Catalog write succeeded"),
            Settlement::PartialFailure(_) => {
                warn!(action, ?movie_id, %message, "Catalog write partially applied")
            }
            Settlement::Failure(e) => {
                error!(action, ?movie_id, error = %e, "Catalog write failed")
            }
        }
    }
}

/// Forwards outcome payloads to a UI task over a channel.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<OutcomePayload>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutcomePayload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StatusReporter for ChannelReporter {
    fn report(&self, outcome: &WriteOutcome) {
        if self.tx.send(OutcomePayload::from(outcome)).is_err() {
            warn!(action = outcome.action.tag(), "Outcome receiver dropped; outcome not delivered");
        }
    }
}
