pub mod governance;

use crate::errors::SuretyError;
use crate::types::AccountId;
use governance::{endorsement_threshold, EndorsementRound};
use log::{debug, info};
use std::collections::HashMap;

/// Lifecycle of an airline. Status only ever advances; a funded airline
/// never reverts to merely registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AirlineStatus {
    /// Known only as an admission candidate
    Unregistered,
    /// Admitted, but not yet backing policies with a deposit
    Registered,
    /// Deposited at least the minimum funding; may propose and vote
    Funded,
}

#[derive(Debug, Clone)]
pub struct Airline {
    pub status: AirlineStatus,
    pub balance: u64,
    endorsements: EndorsementRound,
}

impl Airline {
    fn candidate() -> Self {
        Airline {
            status: AirlineStatus::Unregistered,
            balance: 0,
            endorsements: EndorsementRound::new(),
        }
    }
}

/// Airline lifecycle and balance bookkeeping. Admission goes through the
/// endorsement vote once the fast path is exhausted.
pub struct AirlineRegistry {
    min_funding: u64,
    fast_path: usize,
    airlines: HashMap<AccountId, Airline>,
}

impl AirlineRegistry {
    pub fn new(min_funding: u64, fast_path: usize) -> Self {
        AirlineRegistry {
            min_funding,
            fast_path,
            airlines: HashMap::new(),
        }
    }

    /// Admit the first airline without a proposer, mirroring deployment
    /// where the platform launches with one airline already registered
    pub fn register_first(&mut self, airline: AccountId) {
        self.admit(airline);
    }

    /// Admit `candidate`, proposed by a funded airline. While fewer than
    /// `fast_path` airlines are registered the candidate is admitted
    /// immediately; afterwards the proposer's endorsement is recorded and
    /// admission happens once distinct endorsers reach half of the
    /// registered count, rounded up.
    ///
    /// Returns whether registration occurred and the endorsement tally.
    pub fn register_airline(
        &mut self,
        candidate: AccountId,
        proposer: AccountId,
    ) -> Result<(bool, u32), SuretyError> {
        if !self.is_airline_funded(proposer) {
            return Err(SuretyError::NotFunded);
        }
        if self.is_airline_registered(candidate) {
            return Err(SuretyError::AlreadyRegistered);
        }

        let registered = self.count_airlines_registered();
        if registered < self.fast_path {
            self.admit(candidate);
            info!(
                "Airline {} registered directly by {} ({} registered)",
                candidate,
                proposer,
                registered + 1
            );
            return Ok((true, 0));
        }

        let threshold = endorsement_threshold(registered);
        let entry = self
            .airlines
            .entry(candidate)
            .or_insert_with(Airline::candidate);
        if !entry.endorsements.endorse(proposer) {
            debug!("Duplicate endorsement of {} by {}", candidate, proposer);
        }
        let votes = entry.endorsements.votes();

        if entry.endorsements.reached(threshold) {
            entry.status = AirlineStatus::Registered;
            entry.endorsements = EndorsementRound::new();
            info!(
                "Airline {} registered by consensus with {} of {} required votes",
                candidate, votes, threshold
            );
            Ok((true, votes))
        } else {
            debug!(
                "Airline {} has {} of {} required votes",
                candidate, votes, threshold
            );
            Ok((false, votes))
        }
    }

    /// Credit an airline's deposit. The airline must already be registered
    /// and the amount must meet the minimum; the status advance to Funded
    /// is monotonic, and further deposits only grow the balance.
    pub fn fund_airline(&mut self, airline: AccountId, amount: u64) -> Result<(), SuretyError> {
        if amount < self.min_funding {
            return Err(SuretyError::InsufficientFunds);
        }
        let entry = match self.airlines.get_mut(&airline) {
            Some(entry) if entry.status >= AirlineStatus::Registered => entry,
            _ => return Err(SuretyError::NotRegistered),
        };
        entry.balance += amount;
        entry.status = AirlineStatus::Funded;
        info!(
            "Airline {} funded with {} (balance {})",
            airline, amount, entry.balance
        );
        Ok(())
    }

    pub fn is_airline_registered(&self, airline: AccountId) -> bool {
        self.airlines
            .get(&airline)
            .map(|a| a.status >= AirlineStatus::Registered)
            .unwrap_or(false)
    }

    pub fn is_airline_funded(&self, airline: AccountId) -> bool {
        self.airlines
            .get(&airline)
            .map(|a| a.status == AirlineStatus::Funded)
            .unwrap_or(false)
    }

    /// Endorsements currently recorded for a candidate. Cleared on admission,
    /// so this reads zero once an airline is registered.
    pub fn get_airline_votes(&self, airline: AccountId) -> u32 {
        self.airlines
            .get(&airline)
            .map(|a| a.endorsements.votes())
            .unwrap_or(0)
    }

    pub fn get_airline_balance(&self, airline: AccountId) -> u64 {
        self.airlines.get(&airline).map(|a| a.balance).unwrap_or(0)
    }

    pub fn count_airlines_registered(&self) -> usize {
        self.airlines
            .values()
            .filter(|a| a.status >= AirlineStatus::Registered)
            .count()
    }

    fn admit(&mut self, airline: AccountId) {
        let entry = self
            .airlines
            .entry(airline)
            .or_insert_with(Airline::candidate);
        entry.status = AirlineStatus::Registered;
        entry.endorsements = EndorsementRound::new();
    }
}
