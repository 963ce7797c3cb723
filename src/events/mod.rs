use crate::flights::FlightStatus;
use crate::types::{AccountId, FlightKey};
use log::debug;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Notifications published by the settlement core. Oracle workers subscribe
/// to learn about open requests; the presentation layer subscribes to follow
/// tallies and finalizations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuretyEvent {
    /// A status request was opened; oracles holding `index` should respond
    OracleRequest { index: u8, flight: FlightKey },
    /// An oracle's response was recorded in an open bucket
    OracleReport {
        flight: FlightKey,
        status: FlightStatus,
        oracle: AccountId,
        votes: u32,
    },
    /// A quorum of matching responses finalized the flight's status
    FlightStatusInfo {
        flight: FlightKey,
        status: FlightStatus,
    },
}

/// Fan-out publish/subscribe channel. Fire-and-forget: publishing never
/// blocks, and subscribers that dropped their receiver are pruned on the
/// next publish.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Sender<SuretyEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus::default()
    }

    /// Open a new subscription. Events published after this call are
    /// delivered in order on the returned receiver.
    pub fn subscribe(&mut self) -> Receiver<SuretyEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: SuretyEvent) {
        debug!("Publishing {:?}", event);
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
