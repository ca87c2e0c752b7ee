//! Events emitted to whatever front end renders the ledger.

use crate::gate::{GateState, MutationAction};
use crate::view::{Listing, SummaryView};
use crate::window::Period;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

const CAPACITY: usize = 64;

/// Something the front end may want to re-render for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum LedgerEvent {
    /// The monthly or yearly period selector changed.
    PeriodChanged { period: Period },
    /// A mutation moved to a new state. `message` is the text to show for that state, if any.
    MutationStateChanged {
        action: MutationAction,
        state: GateState,
        message: Option<String>,
    },
    /// Totals for the summary view were recomputed.
    ViewReady(SummaryView),
    /// A per-type listing was recomputed.
    ListingReady(Listing),
}

/// A broadcast fan-out of `LedgerEvent`s. Cloning shares the channel. Emitting with no subscribers
/// is not an error; a subscriber that falls behind by more than the channel capacity misses events.
#[derive(Debug, Clone)]
pub struct Events {
    sender: broadcast::Sender<LedgerEvent>,
}

impl Default for Events {
    fn default() -> Self {
        Self::new()
    }
}

impl Events {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn emit(&self, event: LedgerEvent) {
        if self.sender.send(event).is_err() {
            trace!("No event subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_without_subscribers() {
        let events = Events::new();
        events.emit(LedgerEvent::PeriodChanged {
            period: Period::year(2024),
        });
    }

    #[tokio::test]
    async fn test_subscriber_receives() {
        let events = Events::new();
        let mut rx = events.subscribe();
        events.emit(LedgerEvent::PeriodChanged {
            period: Period::year(2024),
        });
        match rx.recv().await.unwrap() {
            LedgerEvent::PeriodChanged { period } => assert_eq!(period, Period::year(2024)),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
