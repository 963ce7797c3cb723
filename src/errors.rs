use std::fmt;

/// Errors raised by the settlement core. Every variant aborts the triggering
/// operation atomically with no state change. Duplicate governance votes and
/// duplicate or late oracle responses are benign no-ops, not errors, and never
/// surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuretyError {
    /// The operational circuit breaker is closed
    NotOperational,
    /// Caller lacks the owner or authorized-caller role
    Unauthorized,
    /// Funding, fee or premium below the required minimum
    InsufficientFunds,
    /// Premium above the per-policy cap
    PremiumTooHigh,
    /// Second purchase for the same passenger and flight
    DuplicatePolicy,
    /// Oracle responded on an index it was not assigned
    InvalidIndex,
    /// Response to a request that was never opened
    NoSuchBucket,
    /// Double registration (oracle, airline or flight)
    AlreadyRegistered,
    /// Airline is not registered
    NotRegistered,
    /// Airline has not provided funding
    NotFunded,
    /// No flight recorded under the given key
    UnknownFlight,
    /// Oracle is not registered
    UnknownOracle,
    /// The external payment step failed after the credit was released
    PaymentFailed(String),
}

impl fmt::Display for SuretyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuretyError::NotOperational => write!(f, "Contract is not operational"),
            SuretyError::Unauthorized => write!(f, "Caller is not authorized"),
            SuretyError::InsufficientFunds => write!(f, "Amount is below the required minimum"),
            SuretyError::PremiumTooHigh => write!(f, "Premium exceeds the per-policy cap"),
            SuretyError::DuplicatePolicy => {
                write!(f, "Passenger already holds a policy for this flight")
            }
            SuretyError::InvalidIndex => write!(f, "Index is not assigned to this oracle"),
            SuretyError::NoSuchBucket => write!(f, "No open request for this index and flight"),
            SuretyError::AlreadyRegistered => write!(f, "Already registered"),
            SuretyError::NotRegistered => write!(f, "Airline is not registered"),
            SuretyError::NotFunded => write!(f, "Airline has not provided funding"),
            SuretyError::UnknownFlight => write!(f, "Flight is not registered"),
            SuretyError::UnknownOracle => write!(f, "Oracle is not registered"),
            SuretyError::PaymentFailed(msg) => write!(f, "Payment failed: {}", msg),
        }
    }
}

impl std::error::Error for SuretyError {}
