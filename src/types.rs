use serde::{Deserialize, Serialize};
use std::fmt;

/// 20-byte account identifier for airlines, passengers, oracles and the owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// Build an id with the value packed into the low 8 bytes, handy for
    /// enumerating accounts in demos and tests
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        AccountId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Identifies a flight: the operating airline, the flight code and the
/// scheduled departure timestamp (seconds since the Unix epoch)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    pub airline: AccountId,
    pub flight: String,
    pub timestamp: u64,
}

impl FlightKey {
    pub fn new(airline: AccountId, flight: &str, timestamp: u64) -> Self {
        FlightKey {
            airline,
            flight: flight.to_string(),
            timestamp,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.flight, self.timestamp, self.airline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_from_low_u64() {
        let id = AccountId::from_low_u64(0x1122);
        assert_eq!(&id.0[..12], &[0u8; 12]);
        assert_eq!(id.0[18], 0x11);
        assert_eq!(id.0[19], 0x22);
    }

    #[test]
    fn test_account_id_display_is_hex() {
        let id = AccountId::from_low_u64(1);
        let rendered = id.to_string();
        assert!(rendered.starts_with("0x"));
        assert_eq!(rendered.len(), 2 + 40);
        assert!(rendered.ends_with('1'));
    }

    #[test]
    fn test_flight_keys_distinguish_timestamp() {
        let airline = AccountId::from_low_u64(7);
        let a = FlightKey::new(airline, "ND1309", 1_700_000_000);
        let b = FlightKey::new(airline, "ND1309", 1_700_000_060);
        assert_ne!(a, b);
    }
}
