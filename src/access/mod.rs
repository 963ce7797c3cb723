use crate::errors::SuretyError;
use crate::types::AccountId;
use log::{info, warn};
use std::collections::HashSet;

/// Operational circuit breaker and caller authorization. Every mutating
/// operation in the other components checks the operational flag first;
/// privileged operations additionally check the authorized-caller set.
pub struct AccessControl {
    owner: AccountId,
    operational: bool,
    authorized: HashSet<AccountId>,
}

impl AccessControl {
    /// Create a new access controller. The contract starts operational and
    /// the owner is implicitly authorized.
    pub fn new(owner: AccountId) -> Self {
        AccessControl {
            owner,
            operational: true,
            authorized: HashSet::new(),
        }
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Toggle the process-wide operational flag. Owner only.
    pub fn set_operating_status(
        &mut self,
        caller: AccountId,
        operational: bool,
    ) -> Result<(), SuretyError> {
        self.require_owner(caller)?;
        if self.operational != operational {
            warn!(
                "Operating status changed to {} by owner {}",
                operational, caller
            );
        }
        self.operational = operational;
        Ok(())
    }

    /// Grant an account permission to invoke privileged operations. Owner only.
    pub fn authorize_caller(
        &mut self,
        caller: AccountId,
        account: AccountId,
    ) -> Result<(), SuretyError> {
        self.require_owner(caller)?;
        if self.authorized.insert(account) {
            info!("Caller {} authorized", account);
        }
        Ok(())
    }

    /// Revoke a previously granted permission. Owner only.
    pub fn revoke_caller(
        &mut self,
        caller: AccountId,
        account: AccountId,
    ) -> Result<(), SuretyError> {
        self.require_owner(caller)?;
        if self.authorized.remove(&account) {
            info!("Caller {} revoked", account);
        }
        Ok(())
    }

    /// The owner is always authorized; other accounts must have been granted
    pub fn is_caller_authorized(&self, account: AccountId) -> bool {
        account == self.owner || self.authorized.contains(&account)
    }

    /// Gate for every state-mutating operation
    pub fn require_operational(&self) -> Result<(), SuretyError> {
        if self.operational {
            Ok(())
        } else {
            Err(SuretyError::NotOperational)
        }
    }

    /// Gate for privileged operations
    pub fn require_authorized(&self, caller: AccountId) -> Result<(), SuretyError> {
        if self.is_caller_authorized(caller) {
            Ok(())
        } else {
            Err(SuretyError::Unauthorized)
        }
    }

    fn require_owner(&self, caller: AccountId) -> Result<(), SuretyError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(SuretyError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(n: u64) -> AccountId {
        AccountId::from_low_u64(n)
    }

    #[test]
    fn test_starts_operational() {
        let access = AccessControl::new(account(0));
        assert!(access.is_operational());
        assert!(access.require_operational().is_ok());
    }

    #[test]
    fn test_only_owner_toggles_operating_status() {
        let mut access = AccessControl::new(account(0));

        assert_eq!(
            access.set_operating_status(account(9), false),
            Err(SuretyError::Unauthorized)
        );
        assert!(access.is_operational());

        access.set_operating_status(account(0), false).unwrap();
        assert!(!access.is_operational());
        assert_eq!(
            access.require_operational(),
            Err(SuretyError::NotOperational)
        );

        access.set_operating_status(account(0), true).unwrap();
        assert!(access.is_operational());
    }

    #[test]
    fn test_authorize_and_revoke_caller() {
        let mut access = AccessControl::new(account(0));
        let app = account(5);

        assert!(!access.is_caller_authorized(app));
        assert_eq!(
            access.require_authorized(app),
            Err(SuretyError::Unauthorized)
        );

        access.authorize_caller(account(0), app).unwrap();
        assert!(access.is_caller_authorized(app));
        assert!(access.require_authorized(app).is_ok());

        access.revoke_caller(account(0), app).unwrap();
        assert!(!access.is_caller_authorized(app));
    }

    #[test]
    fn test_non_owner_cannot_grant() {
        let mut access = AccessControl::new(account(0));
        assert_eq!(
            access.authorize_caller(account(1), account(2)),
            Err(SuretyError::Unauthorized)
        );
        assert_eq!(
            access.revoke_caller(account(1), account(2)),
            Err(SuretyError::Unauthorized)
        );
    }

    #[test]
    fn test_owner_is_always_authorized() {
        let access = AccessControl::new(account(0));
        assert!(access.is_caller_authorized(account(0)));
    }
}
