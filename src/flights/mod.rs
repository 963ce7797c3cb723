use crate::errors::SuretyError;
use crate::types::{AccountId, FlightKey};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resolved flight status. The numeric codes are the wire values oracles
/// submit and the presentation layer displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    /// All codes an oracle may submit
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    pub fn code(&self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FlightStatus::Unknown),
            10 => Some(FlightStatus::OnTime),
            20 => Some(FlightStatus::LateAirline),
            30 => Some(FlightStatus::LateWeather),
            40 => Some(FlightStatus::LateTechnical),
            50 => Some(FlightStatus::LateOther),
            _ => None,
        }
    }

    /// Delays attributable to the airline trigger payouts
    pub fn is_airline_fault(&self) -> bool {
        matches!(self, FlightStatus::LateAirline)
    }
}

/// Flight records keyed by (airline, code, timestamp). Status starts Unknown
/// and is set exactly once, by oracle consensus.
pub struct FlightTable {
    flights: HashMap<FlightKey, FlightStatus>,
    // Registration order, for listing flights as parallel arrays
    order: Vec<FlightKey>,
}

impl FlightTable {
    pub fn new() -> Self {
        FlightTable {
            flights: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn register_flight(
        &mut self,
        key: FlightKey,
        status: FlightStatus,
    ) -> Result<(), SuretyError> {
        if self.flights.contains_key(&key) {
            return Err(SuretyError::AlreadyRegistered);
        }
        info!("Flight {} registered", key);
        self.flights.insert(key.clone(), status);
        self.order.push(key);
        Ok(())
    }

    pub fn contains(&self, key: &FlightKey) -> bool {
        self.flights.contains_key(key)
    }

    pub fn status(&self, key: &FlightKey) -> Option<FlightStatus> {
        self.flights.get(key).copied()
    }

    /// Record the consensus status for a flight. The first finalization wins;
    /// a later one (a second request round that reached quorum independently)
    /// leaves the record untouched. Returns whether the status was applied.
    pub fn finalize_status(
        &mut self,
        key: &FlightKey,
        status: FlightStatus,
    ) -> Result<bool, SuretyError> {
        let entry = self
            .flights
            .get_mut(key)
            .ok_or(SuretyError::UnknownFlight)?;
        if *entry != FlightStatus::Unknown {
            warn!(
                "Flight {} already finalized as {:?}, ignoring {:?}",
                key, entry, status
            );
            return Ok(false);
        }
        info!("Flight {} finalized as {:?}", key, status);
        *entry = status;
        Ok(true)
    }

    /// All registered flights as parallel arrays of code, timestamp and
    /// airline, in registration order
    pub fn registered_flights(&self) -> (Vec<String>, Vec<u64>, Vec<AccountId>) {
        let mut codes = Vec::with_capacity(self.order.len());
        let mut timestamps = Vec::with_capacity(self.order.len());
        let mut airlines = Vec::with_capacity(self.order.len());
        for key in &self.order {
            codes.push(key.flight.clone());
            timestamps.push(key.timestamp);
            airlines.push(key.airline);
        }
        (codes, timestamps, airlines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u64, flight: &str) -> FlightKey {
        FlightKey::new(AccountId::from_low_u64(n), flight, 1_700_000_000 + n)
    }

    #[test]
    fn test_status_codes_round_trip() {
        for status in FlightStatus::ALL {
            assert_eq!(FlightStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(FlightStatus::from_code(25), None);
    }

    #[test]
    fn test_only_airline_delay_pays_out() {
        for status in FlightStatus::ALL {
            assert_eq!(
                status.is_airline_fault(),
                status == FlightStatus::LateAirline
            );
        }
    }

    #[test]
    fn test_duplicate_flight_registration_fails() {
        let mut table = FlightTable::new();
        table
            .register_flight(key(1, "ND1309"), FlightStatus::Unknown)
            .unwrap();
        assert_eq!(
            table.register_flight(key(1, "ND1309"), FlightStatus::Unknown),
            Err(SuretyError::AlreadyRegistered)
        );
    }

    #[test]
    fn test_finalize_applies_once() {
        let mut table = FlightTable::new();
        let flight = key(1, "ND1309");
        table
            .register_flight(flight.clone(), FlightStatus::Unknown)
            .unwrap();

        assert!(table
            .finalize_status(&flight, FlightStatus::LateAirline)
            .unwrap());
        assert_eq!(table.status(&flight), Some(FlightStatus::LateAirline));

        // A second finalization leaves the first result in place
        assert!(!table.finalize_status(&flight, FlightStatus::OnTime).unwrap());
        assert_eq!(table.status(&flight), Some(FlightStatus::LateAirline));
    }

    #[test]
    fn test_finalize_unknown_flight_fails() {
        let mut table = FlightTable::new();
        assert_eq!(
            table.finalize_status(&key(1, "XX0000"), FlightStatus::OnTime),
            Err(SuretyError::UnknownFlight)
        );
    }

    #[test]
    fn test_parallel_arrays_keep_registration_order() {
        let mut table = FlightTable::new();
        table
            .register_flight(key(1, "ND1309"), FlightStatus::Unknown)
            .unwrap();
        table
            .register_flight(key(2, "ND1310"), FlightStatus::Unknown)
            .unwrap();

        let (codes, timestamps, airlines) = table.registered_flights();
        assert_eq!(codes, vec!["ND1309".to_string(), "ND1310".to_string()]);
        assert_eq!(timestamps, vec![1_700_000_001, 1_700_000_002]);
        assert_eq!(
            airlines,
            vec![AccountId::from_low_u64(1), AccountId::from_low_u64(2)]
        );
    }
}
