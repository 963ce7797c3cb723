pub mod worker;

use crate::config::ORACLE_INDEX_COUNT;
use crate::errors::SuretyError;
use crate::flights::FlightStatus;
use crate::types::{AccountId, FlightKey};
use log::{debug, info};
use rand::rngs::OsRng;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

/// Immutable per-oracle state: the three distinct indexes assigned at
/// registration. An oracle may only answer requests carrying one of them.
#[derive(Debug, Clone)]
pub struct OracleRegistration {
    pub indexes: [u8; ORACLE_INDEX_COUNT],
}

impl OracleRegistration {
    pub fn holds_index(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Per-(index, flight) response aggregation. Open on creation; frozen
/// permanently once a status code reaches quorum. There is no expiry: an
/// unanswered request stays open indefinitely.
#[derive(Debug)]
struct ResponseBucket {
    requester: AccountId,
    finalized: bool,
    tallies: HashMap<FlightStatus, HashSet<AccountId>>,
    responders: HashSet<AccountId>,
}

impl ResponseBucket {
    fn new(requester: AccountId) -> Self {
        ResponseBucket {
            requester,
            finalized: false,
            tallies: HashMap::new(),
            responders: HashSet::new(),
        }
    }
}

/// Effect of one response submission. Duplicate and post-finalization
/// submissions are benign and report `Ignored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Bucket already frozen, or this oracle already contributed
    Ignored,
    /// Response tallied; quorum not yet reached for any status
    Recorded { votes: u32 },
    /// This response completed the quorum and froze the bucket
    Finalized { status: FlightStatus, votes: u32 },
}

/// Oracle registration, request fan-out index assignment and response
/// tallying up to quorum.
pub struct OracleCoordinator {
    registration_fee: u64,
    min_responses: u32,
    max_index: u8,
    oracles: HashMap<AccountId, OracleRegistration>,
    buckets: HashMap<(u8, FlightKey), ResponseBucket>,
    // Folded into the request-index derivation so repeated requests for the
    // same flight can land on different indexes
    request_nonce: u64,
}

impl OracleCoordinator {
    pub fn new(registration_fee: u64, min_responses: u32, max_index: u8) -> Self {
        OracleCoordinator {
            registration_fee,
            min_responses,
            max_index,
            oracles: HashMap::new(),
            buckets: HashMap::new(),
            request_nonce: 0,
        }
    }

    pub fn registration_fee(&self) -> u64 {
        self.registration_fee
    }

    /// Register an oracle against the fee and assign its three distinct
    /// indexes. Registration is permanent; registering twice fails.
    pub fn register_oracle(
        &mut self,
        oracle: AccountId,
        fee_paid: u64,
    ) -> Result<[u8; ORACLE_INDEX_COUNT], SuretyError> {
        if fee_paid < self.registration_fee {
            return Err(SuretyError::InsufficientFunds);
        }
        if self.oracles.contains_key(&oracle) {
            return Err(SuretyError::AlreadyRegistered);
        }
        let indexes = self.generate_indexes();
        info!("Oracle {} registered with indexes {:?}", oracle, indexes);
        self.oracles.insert(oracle, OracleRegistration { indexes });
        Ok(indexes)
    }

    pub fn is_oracle_registered(&self, oracle: AccountId) -> bool {
        self.oracles.contains_key(&oracle)
    }

    pub fn get_my_indexes(
        &self,
        oracle: AccountId,
    ) -> Result<[u8; ORACLE_INDEX_COUNT], SuretyError> {
        self.oracles
            .get(&oracle)
            .map(|r| r.indexes)
            .ok_or(SuretyError::UnknownOracle)
    }

    /// Open a response bucket for the flight under a pseudo-randomly derived
    /// index, unless one is already open for that pair. Returns the index the
    /// request was assigned to.
    pub fn open_request(&mut self, requester: AccountId, flight: &FlightKey) -> u8 {
        let index = self.derive_index(requester, flight);
        self.buckets
            .entry((index, flight.clone()))
            .or_insert_with(|| ResponseBucket::new(requester));
        info!("Status request for flight {} opened at index {}", flight, index);
        index
    }

    /// Record one oracle's response in the bucket for (index, flight).
    ///
    /// Hard failures: the oracle does not hold `index`, or no bucket was ever
    /// opened for the pair. A frozen bucket or a repeated contribution by the
    /// same oracle is a benign no-op. When a status code's tally reaches the
    /// quorum the bucket freezes and the consensus status is reported.
    pub fn submit_response(
        &mut self,
        oracle: AccountId,
        index: u8,
        flight: &FlightKey,
        status: FlightStatus,
    ) -> Result<SubmissionOutcome, SuretyError> {
        let registration = self
            .oracles
            .get(&oracle)
            .ok_or(SuretyError::UnknownOracle)?;
        if !registration.holds_index(index) {
            return Err(SuretyError::InvalidIndex);
        }
        let bucket = self
            .buckets
            .get_mut(&(index, flight.clone()))
            .ok_or(SuretyError::NoSuchBucket)?;

        if bucket.finalized {
            debug!(
                "Oracle {} responded after finalization of flight {}, ignoring",
                oracle, flight
            );
            return Ok(SubmissionOutcome::Ignored);
        }
        if !bucket.responders.insert(oracle) {
            debug!(
                "Oracle {} already contributed to flight {} at index {}, ignoring",
                oracle, flight, index
            );
            return Ok(SubmissionOutcome::Ignored);
        }

        let tally = bucket.tallies.entry(status).or_default();
        tally.insert(oracle);
        let votes = tally.len() as u32;
        debug!(
            "Oracle {} reported {:?} for flight {} ({} of {})",
            oracle, status, flight, votes, self.min_responses
        );

        if votes >= self.min_responses {
            bucket.finalized = true;
            info!(
                "Flight {} reached quorum: {:?} with {} responses",
                flight, status, votes
            );
            Ok(SubmissionOutcome::Finalized { status, votes })
        } else {
            Ok(SubmissionOutcome::Recorded { votes })
        }
    }

    /// Account that opened the bucket for (index, flight), if any
    pub fn bucket_requester(&self, index: u8, flight: &FlightKey) -> Option<AccountId> {
        self.buckets
            .get(&(index, flight.clone()))
            .map(|b| b.requester)
    }

    /// Whether the bucket for (index, flight) is open and accepting responses
    pub fn is_request_open(&self, index: u8, flight: &FlightKey) -> bool {
        self.buckets
            .get(&(index, flight.clone()))
            .map(|b| !b.finalized)
            .unwrap_or(false)
    }

    /// Three distinct indexes drawn uniformly from [0, max_index)
    fn generate_indexes(&self) -> [u8; ORACLE_INDEX_COUNT] {
        let mut rng = OsRng;
        let mut indexes = [0u8; ORACLE_INDEX_COUNT];
        let mut taken = HashSet::new();
        for slot in indexes.iter_mut() {
            loop {
                let candidate = rng.gen_range(0..self.max_index);
                if taken.insert(candidate) {
                    *slot = candidate;
                    break;
                }
            }
        }
        indexes
    }

    /// One index derived from the request context, so callers cannot choose
    /// which oracles get to answer
    fn derive_index(&mut self, requester: AccountId, flight: &FlightKey) -> u8 {
        let mut hasher = Sha256::new();
        hasher.update(self.request_nonce.to_be_bytes());
        hasher.update(requester.as_bytes());
        hasher.update(flight.airline.as_bytes());
        hasher.update(flight.flight.as_bytes());
        hasher.update(flight.timestamp.to_be_bytes());
        let digest = hasher.finalize();
        self.request_nonce = self.request_nonce.wrapping_add(1);
        digest[0] % self.max_index
    }

    #[cfg(test)]
    fn register_with_indexes(&mut self, oracle: AccountId, indexes: [u8; ORACLE_INDEX_COUNT]) {
        self.oracles.insert(oracle, OracleRegistration { indexes });
    }
}
