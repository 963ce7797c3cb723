use crate::app::SuretyApp;
use crate::config::ORACLE_INDEX_COUNT;
use crate::errors::SuretyError;
use crate::events::SuretyEvent;
use crate::flights::FlightStatus;
use crate::oracles::SubmissionOutcome;
use crate::types::AccountId;
use log::{debug, warn};
use rand::Rng;
use std::sync::mpsc::Receiver;

/// Simulated off-chain oracle: registers against the fee, subscribes to
/// request notifications and answers every request carrying one of its
/// assigned indexes. By default it reports a random status, the way real
/// oracles would disagree; a scripted status makes a worker deterministic.
pub struct OracleWorker {
    id: AccountId,
    indexes: [u8; ORACLE_INDEX_COUNT],
    scripted: Option<FlightStatus>,
}

impl OracleWorker {
    /// Register a worker that answers with random status codes
    pub fn register(app: &SuretyApp, id: AccountId) -> Result<Self, SuretyError> {
        Self::register_scripted(app, id, None)
    }

    /// Register a worker that always answers with the given status
    pub fn register_scripted(
        app: &SuretyApp,
        id: AccountId,
        scripted: Option<FlightStatus>,
    ) -> Result<Self, SuretyError> {
        let indexes = app.register_oracle(id, app.registration_fee())?;
        Ok(OracleWorker {
            id,
            indexes,
            scripted,
        })
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn indexes(&self) -> [u8; ORACLE_INDEX_COUNT] {
        self.indexes
    }

    /// Consume notifications until the core shuts down, answering matching
    /// requests. Intended to run on its own thread.
    pub fn run(&self, app: &SuretyApp, events: Receiver<SuretyEvent>) {
        for event in events {
            self.handle_event(app, event);
        }
        debug!("Oracle worker {} stopping, event bus closed", self.id);
    }

    /// Answer a single notification if it is a request on one of our
    /// indexes. Returns the submission outcome when a response was sent.
    pub fn handle_event(&self, app: &SuretyApp, event: SuretyEvent) -> Option<SubmissionOutcome> {
        let (index, flight) = match event {
            SuretyEvent::OracleRequest { index, flight } => (index, flight),
            _ => return None,
        };
        if !self.indexes.contains(&index) {
            return None;
        }
        let status = self.pick_status();
        match app.submit_oracle_response(
            self.id,
            index,
            flight.airline,
            &flight.flight,
            flight.timestamp,
            status,
        ) {
            Ok(outcome) => {
                debug!(
                    "Worker {} answered {:?} for {}: {:?}",
                    self.id, status, flight, outcome
                );
                Some(outcome)
            }
            Err(e) => {
                warn!("Worker {} failed to respond for {}: {}", self.id, flight, e);
                None
            }
        }
    }

    fn pick_status(&self) -> FlightStatus {
        match self.scripted {
            Some(status) => status,
            None => {
                let mut rng = rand::thread_rng();
                FlightStatus::ALL[rng.gen_range(0..FlightStatus::ALL.len())]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FlightKey;

    fn account(n: u64) -> AccountId {
        AccountId::from_low_u64(n)
    }

    fn app() -> SuretyApp {
        SuretyApp::new(account(0), account(1))
    }

    #[test]
    fn test_worker_registers_against_the_fee() {
        let app = app();
        let worker = OracleWorker::register(&app, account(30)).unwrap();
        assert_eq!(app.get_my_indexes(account(30)).unwrap(), worker.indexes());
        assert!(OracleWorker::register(&app, account(30)).is_err());
    }

    #[test]
    fn test_worker_ignores_foreign_indexes() {
        let app = app();
        let worker =
            OracleWorker::register_scripted(&app, account(30), Some(FlightStatus::OnTime)).unwrap();
        let foreign = (0..10)
            .find(|i| !worker.indexes().contains(i))
            .unwrap();

        let event = SuretyEvent::OracleRequest {
            index: foreign,
            flight: FlightKey::new(account(1), "ND1309", 1_700_000_000),
        };
        assert_eq!(worker.handle_event(&app, event), None);
    }

    #[test]
    fn test_worker_answers_matching_requests() {
        let app = app();
        let worker =
            OracleWorker::register_scripted(&app, account(30), Some(FlightStatus::LateAirline))
                .unwrap();

        // Re-request with fresh timestamps until the derived index lands on
        // one of the worker's; the index derivation cycles fast enough that
        // this terminates almost immediately
        for attempt in 0..500 {
            let timestamp = 1_700_000_000 + attempt;
            let index = app
                .fetch_flight_status(account(0), account(1), "ND1309", timestamp)
                .unwrap();
            if !worker.indexes().contains(&index) {
                continue;
            }
            let event = SuretyEvent::OracleRequest {
                index,
                flight: FlightKey::new(account(1), "ND1309", timestamp),
            };
            assert_eq!(
                worker.handle_event(&app, event),
                Some(SubmissionOutcome::Recorded { votes: 1 })
            );
            return;
        }
        panic!("no request landed on the worker's indexes");
    }
}
