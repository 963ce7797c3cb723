use crate::errors::SuretyError;
use crate::types::{AccountId, FlightKey};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::HashMap;

/// External value-transfer step invoked by `withdraw`. Implementations may
/// fail; the pool zeroes the internal credit before calling out, so a failed
/// transfer can never be replayed into a double payout.
#[cfg_attr(test, mockall::automock)]
pub trait PaymentHandler: Send + Sync {
    fn transfer(&self, to: AccountId, amount: u64) -> Result<(), SuretyError>;
}

/// In-process payment rail: records released amounts per account. Stands in
/// for the platform's real transfer mechanism in demos and tests.
#[derive(Default)]
pub struct LedgerPayments {
    released: Mutex<HashMap<AccountId, u64>>,
}

impl LedgerPayments {
    pub fn new() -> Self {
        LedgerPayments::default()
    }

    /// Total amount released to an account so far
    pub fn total_released(&self, account: AccountId) -> u64 {
        self.released.lock().get(&account).copied().unwrap_or(0)
    }
}

impl PaymentHandler for LedgerPayments {
    fn transfer(&self, to: AccountId, amount: u64) -> Result<(), SuretyError> {
        *self.released.lock().entry(to).or_insert(0) += amount;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Policy {
    pub passenger: AccountId,
    pub premium: u64,
    pub claimed: bool,
}

/// Policy bookkeeping, payout computation and withdrawable credits
pub struct InsurancePool {
    max_premium: u64,
    policies: HashMap<FlightKey, Vec<Policy>>,
    credits: HashMap<AccountId, u64>,
}

impl InsurancePool {
    pub fn new(max_premium: u64) -> Self {
        InsurancePool {
            max_premium,
            policies: HashMap::new(),
            credits: HashMap::new(),
        }
    }

    /// Record a policy purchase. One policy per (passenger, flight); the
    /// premium must be positive and within the cap. The flight's existence
    /// is checked by the caller, which owns the flight table.
    pub fn buy(
        &mut self,
        passenger: AccountId,
        flight: &FlightKey,
        premium: u64,
    ) -> Result<(), SuretyError> {
        if premium == 0 {
            return Err(SuretyError::InsufficientFunds);
        }
        if premium > self.max_premium {
            return Err(SuretyError::PremiumTooHigh);
        }
        let policies = self.policies.entry(flight.clone()).or_default();
        if policies.iter().any(|p| p.passenger == passenger) {
            return Err(SuretyError::DuplicatePolicy);
        }
        info!(
            "Passenger {} insured flight {} for {}",
            passenger, flight, premium
        );
        policies.push(Policy {
            passenger,
            premium,
            claimed: false,
        });
        Ok(())
    }

    /// Credit every unclaimed policy on the flight with premium times 1.5
    /// (integer arithmetic). Each policy is credited at most once; calling
    /// again is a no-op. Returns the number of policies credited.
    pub fn credit_payouts(&mut self, flight: &FlightKey) -> usize {
        let mut credited = 0;
        if let Some(policies) = self.policies.get_mut(flight) {
            for policy in policies.iter_mut().filter(|p| !p.claimed) {
                let payout = policy.premium * 3 / 2;
                *self.credits.entry(policy.passenger).or_insert(0) += payout;
                policy.claimed = true;
                credited += 1;
                debug!(
                    "Credited {} to passenger {} for flight {}",
                    payout, policy.passenger, flight
                );
            }
        }
        if credited > 0 {
            info!("Credited {} policies on flight {}", credited, flight);
        }
        credited
    }

    pub fn get_credit(&self, passenger: AccountId) -> u64 {
        self.credits.get(&passenger).copied().unwrap_or(0)
    }

    /// Release a passenger's withdrawable credit. The internal balance is
    /// zeroed before the external transfer is attempted, so a failing
    /// transfer cannot be retried into a double payout. Returns the amount
    /// released; zero credit is not an error.
    pub fn withdraw(
        &mut self,
        passenger: AccountId,
        payments: &dyn PaymentHandler,
    ) -> Result<u64, SuretyError> {
        let amount = self.credits.remove(&passenger).unwrap_or(0);
        if amount == 0 {
            return Ok(0);
        }
        payments.transfer(passenger, amount)?;
        info!("Passenger {} withdrew {}", passenger, amount);
        Ok(amount)
    }
}
