#![allow(dead_code)]

use aerosurety::utils::current_time;
use aerosurety::{AccountId, FlightKey, FlightStatus, SuretyApp};

/// Test harness mirroring a fresh deployment: an owner, a first airline
/// registered at construction and a pool of spare addresses.
pub struct TestConfig {
    pub owner: AccountId,
    pub first_airline: AccountId,
    pub test_addresses: Vec<AccountId>,
    pub app: SuretyApp,
}

impl TestConfig {
    pub fn new() -> Self {
        let owner = AccountId::from_low_u64(0);
        let first_airline = AccountId::from_low_u64(1);
        TestConfig {
            owner,
            first_airline,
            test_addresses: (2..12).map(AccountId::from_low_u64).collect(),
            app: SuretyApp::new(owner, first_airline),
        }
    }

    /// Harness with `count` airlines registered and funded: the first
    /// airline plus spares from the address pool
    pub fn with_funded_airlines(count: usize) -> Self {
        let config = Self::new();
        let min = config.min_funding();
        config.app.fund_airline(config.first_airline, min).unwrap();
        for airline in config.test_addresses.iter().take(count - 1) {
            config
                .app
                .register_airline(*airline, config.first_airline)
                .unwrap();
            config.app.fund_airline(*airline, min).unwrap();
        }
        assert_eq!(config.app.count_airlines_registered(), count);
        config
    }

    pub fn min_funding(&self) -> u64 {
        self.app.config().min_airline_funding
    }

    pub fn max_premium(&self) -> u64 {
        self.app.config().max_premium
    }

    /// Register a flight for the given airline (the owner is implicitly
    /// authorized) and return its key
    pub fn register_test_flight(&self, airline: AccountId, code: &str) -> FlightKey {
        let timestamp = current_time() + 2 * 60 * 60;
        self.app
            .register_flight(self.owner, code, FlightStatus::Unknown, timestamp, airline)
            .unwrap();
        FlightKey::new(airline, code, timestamp)
    }

    /// Register fresh oracles until `needed` of them hold `index`. Each
    /// oracle holds 3 of 10 indexes, so a handful of registrations is
    /// normally enough; the bound is generous to make the draw reliable.
    pub fn oracles_holding(&self, index: u8, needed: usize) -> Vec<AccountId> {
        let fee = self.app.registration_fee();
        let mut holders = Vec::new();
        for n in 0..2000u64 {
            let oracle = AccountId::from_low_u64(1000 + n);
            let indexes = self.app.register_oracle(oracle, fee).unwrap();
            if indexes.contains(&index) {
                holders.push(oracle);
                if holders.len() == needed {
                    return holders;
                }
            }
        }
        panic!("could not draw {} oracles holding index {}", needed, index);
    }
}
