//=========================================================================
// In-Memory Credits Service
//=========================================================================
//
// `CreditsApi` backed by a token → balance map. Used by the demo binary
// and the test suites in place of the remote service.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use super::client::{CreditsApi, CreditsError, PurchaseReceipt};

//=== InMemoryCredits =====================================================

#[derive(Debug, Default)]
pub struct InMemoryCredits {
    accounts: Mutex<HashMap<String, u64>>,
    offline: Mutex<bool>,
    latency: Duration,
}

impl InMemoryCredits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, token: &str, credits: u64) -> Self {
        self.set_balance(token, credits);
        self
    }

    /// Delays every call, for exercising in-flight states.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_balance(&self, token: &str, credits: u64) {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.to_string(), credits);
    }

    pub fn balance(&self, token: &str) -> Option<u64> {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .copied()
    }

    /// While offline every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap_or_else(PoisonError::into_inner) = offline;
    }

    fn check(&self) -> Result<(), CreditsError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        if *self.offline.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(CreditsError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

impl CreditsApi for InMemoryCredits {
    fn fetch_balance(&self, token: &str) -> Result<u64, CreditsError> {
        self.check()?;
        self.balance(token).ok_or(CreditsError::Status(404))
    }

    fn add_credits(&self, token: &str, amount: u64) -> Result<PurchaseReceipt, CreditsError> {
        self.check()?;
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        let balance = accounts.entry(token.to_string()).or_insert(0);
        let previous = *balance;
        *balance = balance.saturating_add(amount);
        Ok(PurchaseReceipt {
            total_credits: Some(*balance),
            credits: None,
            previous_credits: Some(previous),
        })
    }
}
