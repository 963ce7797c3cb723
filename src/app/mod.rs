use crate::access::AccessControl;
use crate::airlines::AirlineRegistry;
use crate::config::{ConfigError, SuretyConfig, ORACLE_INDEX_COUNT};
use crate::errors::SuretyError;
use crate::events::{EventBus, SuretyEvent};
use crate::flights::{FlightStatus, FlightTable};
use crate::insurance::{InsurancePool, LedgerPayments, PaymentHandler};
use crate::oracles::{OracleCoordinator, SubmissionOutcome};
use crate::types::{AccountId, FlightKey};
use log::{info, warn};
use parking_lot::RwLock;
use std::sync::mpsc::Receiver;

// The five components plus the event bus, guarded as one unit so every
// public operation applies atomically
struct CoreState {
    access: AccessControl,
    airlines: AirlineRegistry,
    flights: FlightTable,
    insurance: InsurancePool,
    oracles: OracleCoordinator,
    events: EventBus,
}

/// The settlement core: a single owned state aggregate exposing the whole
/// operation surface. Each operation takes the write lock for its duration,
/// so concurrent oracle submissions are serialized and exactly one of them
/// can finalize a bucket.
pub struct SuretyApp {
    state: RwLock<CoreState>,
    payments: Box<dyn PaymentHandler>,
    config: SuretyConfig,
}

impl SuretyApp {
    /// Build a core with the reference parameters and an in-process payment
    /// rail. The first airline is registered at construction, so governance
    /// has a funded proposer path from the start.
    pub fn new(owner: AccountId, first_airline: AccountId) -> Self {
        Self::build(
            owner,
            first_airline,
            SuretyConfig::default(),
            Box::new(LedgerPayments::new()),
        )
    }

    pub fn with_config(
        owner: AccountId,
        first_airline: AccountId,
        config: SuretyConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(
            owner,
            first_airline,
            config,
            Box::new(LedgerPayments::new()),
        ))
    }

    pub fn with_payment_handler(
        owner: AccountId,
        first_airline: AccountId,
        config: SuretyConfig,
        payments: Box<dyn PaymentHandler>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(owner, first_airline, config, payments))
    }

    fn build(
        owner: AccountId,
        first_airline: AccountId,
        config: SuretyConfig,
        payments: Box<dyn PaymentHandler>,
    ) -> Self {
        let mut airlines =
            AirlineRegistry::new(config.min_airline_funding, config.airline_fast_path);
        airlines.register_first(first_airline);
        info!(
            "Settlement core started: owner {}, first airline {}",
            owner, first_airline
        );
        SuretyApp {
            state: RwLock::new(CoreState {
                access: AccessControl::new(owner),
                airlines,
                flights: FlightTable::new(),
                insurance: InsurancePool::new(config.max_premium),
                oracles: OracleCoordinator::new(
                    config.oracle_registration_fee,
                    config.min_responses,
                    config.max_index,
                ),
                events: EventBus::new(),
            }),
            payments,
            config,
        }
    }

    pub fn config(&self) -> &SuretyConfig {
        &self.config
    }

    /// Subscribe to request, report and finalization notifications
    pub fn subscribe(&self) -> Receiver<SuretyEvent> {
        self.state.write().events.subscribe()
    }

    // ---- Admin ----

    pub fn is_operational(&self) -> bool {
        self.state.read().access.is_operational()
    }

    pub fn set_operating_status(
        &self,
        caller: AccountId,
        operational: bool,
    ) -> Result<(), SuretyError> {
        self.state
            .write()
            .access
            .set_operating_status(caller, operational)
    }

    pub fn authorize_caller(
        &self,
        caller: AccountId,
        account: AccountId,
    ) -> Result<(), SuretyError> {
        self.state.write().access.authorize_caller(caller, account)
    }

    pub fn revoke_caller(&self, caller: AccountId, account: AccountId) -> Result<(), SuretyError> {
        self.state.write().access.revoke_caller(caller, account)
    }

    pub fn is_caller_authorized(&self, account: AccountId) -> bool {
        self.state.read().access.is_caller_authorized(account)
    }

    // ---- Airline admission ----

    pub fn register_airline(
        &self,
        candidate: AccountId,
        proposer: AccountId,
    ) -> Result<(bool, u32), SuretyError> {
        let mut state = self.state.write();
        state.access.require_operational()?;
        state.airlines.register_airline(candidate, proposer)
    }

    pub fn fund_airline(&self, airline: AccountId, amount: u64) -> Result<(), SuretyError> {
        let mut state = self.state.write();
        state.access.require_operational()?;
        state.airlines.fund_airline(airline, amount)
    }

    pub fn is_airline_registered(&self, airline: AccountId) -> bool {
        self.state.read().airlines.is_airline_registered(airline)
    }

    pub fn is_airline_funded(&self, airline: AccountId) -> bool {
        self.state.read().airlines.is_airline_funded(airline)
    }

    pub fn get_airline_votes(&self, airline: AccountId) -> u32 {
        self.state.read().airlines.get_airline_votes(airline)
    }

    pub fn get_airline_balance(&self, airline: AccountId) -> u64 {
        self.state.read().airlines.get_airline_balance(airline)
    }

    pub fn count_airlines_registered(&self) -> usize {
        self.state.read().airlines.count_airlines_registered()
    }

    // ---- Flights ----

    /// Record a flight offered for insurance. Privileged: the caller must be
    /// the owner or an authorized account, and the operating airline funded.
    pub fn register_flight(
        &self,
        caller: AccountId,
        flight_code: &str,
        status: FlightStatus,
        timestamp: u64,
        airline: AccountId,
    ) -> Result<(), SuretyError> {
        let mut state = self.state.write();
        state.access.require_operational()?;
        state.access.require_authorized(caller)?;
        if !state.airlines.is_airline_funded(airline) {
            return Err(SuretyError::NotFunded);
        }
        let key = FlightKey::new(airline, flight_code, timestamp);
        state.flights.register_flight(key, status)
    }

    pub fn registered_flights(&self) -> (Vec<String>, Vec<u64>, Vec<AccountId>) {
        self.state.read().flights.registered_flights()
    }

    pub fn flight_status(&self, flight: &FlightKey) -> Option<FlightStatus> {
        self.state.read().flights.status(flight)
    }

    // ---- Insurance ----

    pub fn buy(
        &self,
        passenger: AccountId,
        flight: &FlightKey,
        premium: u64,
    ) -> Result<(), SuretyError> {
        let mut state = self.state.write();
        state.access.require_operational()?;
        if !state.flights.contains(flight) {
            return Err(SuretyError::UnknownFlight);
        }
        state.insurance.buy(passenger, flight, premium)
    }

    pub fn get_credit(&self, passenger: AccountId) -> u64 {
        self.state.read().insurance.get_credit(passenger)
    }

    /// Release a passenger's withdrawable credit through the payment handler.
    /// Returns the amount released; zero if nothing was credited.
    pub fn withdraw(&self, passenger: AccountId) -> Result<u64, SuretyError> {
        let mut state = self.state.write();
        state.access.require_operational()?;
        state.insurance.withdraw(passenger, &*self.payments)
    }

    // ---- Oracles ----

    pub fn registration_fee(&self) -> u64 {
        self.config.oracle_registration_fee
    }

    pub fn register_oracle(
        &self,
        oracle: AccountId,
        fee_paid: u64,
    ) -> Result<[u8; ORACLE_INDEX_COUNT], SuretyError> {
        let mut state = self.state.write();
        state.access.require_operational()?;
        state.oracles.register_oracle(oracle, fee_paid)
    }

    pub fn get_my_indexes(
        &self,
        oracle: AccountId,
    ) -> Result<[u8; ORACLE_INDEX_COUNT], SuretyError> {
        self.state.read().oracles.get_my_indexes(oracle)
    }

    /// Open a flight-status request. A response bucket is created under a
    /// derived index and an `OracleRequest` notification goes out to every
    /// subscriber. Returns the index oracles must hold to answer.
    pub fn fetch_flight_status(
        &self,
        requester: AccountId,
        airline: AccountId,
        flight_code: &str,
        timestamp: u64,
    ) -> Result<u8, SuretyError> {
        let mut state = self.state.write();
        state.access.require_operational()?;
        let key = FlightKey::new(airline, flight_code, timestamp);
        let index = state.oracles.open_request(requester, &key);
        state
            .events
            .publish(SuretyEvent::OracleRequest { index, flight: key });
        Ok(index)
    }

    /// Record one oracle response. On quorum the flight status is finalized,
    /// a `FlightStatusInfo` notification goes out, and a delay attributable
    /// to the airline credits every unclaimed policy on the flight.
    pub fn submit_oracle_response(
        &self,
        oracle: AccountId,
        index: u8,
        airline: AccountId,
        flight_code: &str,
        timestamp: u64,
        status: FlightStatus,
    ) -> Result<SubmissionOutcome, SuretyError> {
        let mut state = self.state.write();
        state.access.require_operational()?;
        let key = FlightKey::new(airline, flight_code, timestamp);
        let outcome = state.oracles.submit_response(oracle, index, &key, status)?;

        match outcome {
            SubmissionOutcome::Ignored => {}
            SubmissionOutcome::Recorded { votes } => {
                state.events.publish(SuretyEvent::OracleReport {
                    flight: key,
                    status,
                    oracle,
                    votes,
                });
            }
            SubmissionOutcome::Finalized { status, votes } => {
                state.events.publish(SuretyEvent::OracleReport {
                    flight: key.clone(),
                    status,
                    oracle,
                    votes,
                });
                match state.flights.finalize_status(&key, status) {
                    Ok(_) => {}
                    Err(SuretyError::UnknownFlight) => {
                        // A request may target a flight nobody registered;
                        // consensus still closes the bucket
                        warn!("Consensus on unregistered flight {}", key);
                    }
                    Err(e) => return Err(e),
                }
                state.events.publish(SuretyEvent::FlightStatusInfo {
                    flight: key.clone(),
                    status,
                });
                if status.is_airline_fault() {
                    let credited = state.insurance.credit_payouts(&key);
                    info!(
                        "Flight {} delayed by airline, {} policies credited",
                        key, credited
                    );
                }
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(n: u64) -> AccountId {
        AccountId::from_low_u64(n)
    }

    fn app() -> SuretyApp {
        SuretyApp::new(account(0), account(1))
    }

    #[test]
    fn test_first_airline_is_registered_at_construction() {
        let app = app();
        assert!(app.is_airline_registered(account(1)));
        assert!(!app.is_airline_funded(account(1)));
        assert_eq!(app.count_airlines_registered(), 1);
    }

    #[test]
    fn test_circuit_breaker_gates_mutating_operations() {
        let app = app();
        let min = app.config().min_airline_funding;
        app.set_operating_status(account(0), false).unwrap();

        assert_eq!(
            app.fund_airline(account(1), min),
            Err(SuretyError::NotOperational)
        );
        assert_eq!(
            app.register_airline(account(2), account(1)),
            Err(SuretyError::NotOperational)
        );
        assert_eq!(
            app.register_oracle(account(20), app.registration_fee()),
            Err(SuretyError::NotOperational)
        );
        assert_eq!(
            app.fetch_flight_status(account(0), account(1), "ND1309", 1_700_000_000),
            Err(SuretyError::NotOperational)
        );
        assert_eq!(app.withdraw(account(10)), Err(SuretyError::NotOperational));

        // Reads stay available while the breaker is closed
        assert!(app.is_airline_registered(account(1)));

        app.set_operating_status(account(0), true).unwrap();
        assert!(app.fund_airline(account(1), min).is_ok());
    }

    #[test]
    fn test_register_flight_requires_authorization() {
        let app = app();
        let min = app.config().min_airline_funding;
        app.fund_airline(account(1), min).unwrap();

        assert_eq!(
            app.register_flight(
                account(9),
                "ND1309",
                FlightStatus::Unknown,
                1_700_000_000,
                account(1)
            ),
            Err(SuretyError::Unauthorized)
        );

        app.authorize_caller(account(0), account(9)).unwrap();
        assert!(app
            .register_flight(
                account(9),
                "ND1309",
                FlightStatus::Unknown,
                1_700_000_000,
                account(1)
            )
            .is_ok());

        app.revoke_caller(account(0), account(9)).unwrap();
        assert_eq!(
            app.register_flight(
                account(9),
                "ND1310",
                FlightStatus::Unknown,
                1_700_000_000,
                account(1)
            ),
            Err(SuretyError::Unauthorized)
        );
    }

    #[test]
    fn test_register_flight_requires_funded_airline() {
        let app = app();
        assert_eq!(
            app.register_flight(
                account(0),
                "ND1309",
                FlightStatus::Unknown,
                1_700_000_000,
                account(1)
            ),
            Err(SuretyError::NotFunded)
        );
    }

    #[test]
    fn test_buy_requires_existing_flight() {
        let app = app();
        let key = FlightKey::new(account(1), "ND1309", 1_700_000_000);
        assert_eq!(app.buy(account(10), &key, 500), Err(SuretyError::UnknownFlight));
    }

    #[test]
    fn test_fetch_flight_status_notifies_subscribers() {
        let app = app();
        let rx = app.subscribe();
        let index = app
            .fetch_flight_status(account(0), account(1), "ND1309", 1_700_000_000)
            .unwrap();

        match rx.try_recv().unwrap() {
            SuretyEvent::OracleRequest {
                index: event_index,
                flight,
            } => {
                assert_eq!(event_index, index);
                assert_eq!(flight, FlightKey::new(account(1), "ND1309", 1_700_000_000));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
