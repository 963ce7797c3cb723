use crate::types::AccountId;
use std::collections::HashSet;

/// Distinct endorsers required to admit a candidate once the fast path no
/// longer applies: half of the currently registered airlines, rounded up
pub fn endorsement_threshold(registered_count: usize) -> u32 {
    ((registered_count + 1) / 2) as u32
}

/// Endorsement tally for one admission candidate. Votes accumulate until the
/// threshold is reached; the round is then discarded. A voter counts at most
/// once, and repeating a vote is a benign no-op rather than a failure.
#[derive(Debug, Clone, Default)]
pub struct EndorsementRound {
    endorsers: HashSet<AccountId>,
}

impl EndorsementRound {
    pub fn new() -> Self {
        EndorsementRound::default()
    }

    /// Record a vote. Returns `true` if the voter was newly counted,
    /// `false` for a duplicate.
    pub fn endorse(&mut self, voter: AccountId) -> bool {
        self.endorsers.insert(voter)
    }

    pub fn votes(&self) -> u32 {
        self.endorsers.len() as u32
    }

    pub fn reached(&self, threshold: u32) -> bool {
        self.votes() >= threshold
    }
}
