//=========================================================================
// Credits Session
//=========================================================================
//
// Explicitly owned credits state for the signed-in user.
//
// Balances:
//   account_credits  mirror of the remote service, refreshed on demand
//   loaded_credits   moved onto this terminal, spent on launches, never persisted
//
// Remote calls run on the credits worker; replies are applied by `poll()`
// on the tick thread. `sign_out()` bumps the generation so replies issued
// before it are discarded.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

//=== Module Declarations =================================================

mod client;
mod memory;
mod worker;

//=== Public API ==========================================================

pub use client::{BalanceReply, CreditsApi, CreditsError, HttpCreditsClient, PurchaseReceipt};
pub use memory::InMemoryCredits;

//=== Internal Dependencies ===============================================

use crate::core::identity::IdentityProvider;
use crate::core::notice::Notice;
use worker::{CreditsJob, CreditsReply, CreditsWorker};

//=== Balance Types =======================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreditsBalance {
    pub account_credits: u64,
    pub loaded_credits: u64,
}

/// Rejected account → terminal transfers. Balances are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    ZeroAmount,
    Insufficient { requested: u64, available: u64 },
    /// Account balance is still being refreshed.
    BalancePending,
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroAmount => write!(f, "Amount must be greater than zero"),
            Self::Insufficient {
                requested,
                available,
            } => write!(
                f,
                "Insufficient credits: requested {}, account has {}",
                requested, available
            ),
            Self::BalancePending => write!(f, "Account balance is still loading"),
        }
    }
}

impl std::error::Error for TransferError {}

/// Outcome of the launch gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchDecision {
    /// Cost deducted from loaded credits.
    Granted { loaded_credits: u64 },

    /// Refresh in flight; ask again once it lands.
    BalancePending,

    /// Account can cover the cost once credits are loaded onto the terminal.
    NeedsTransfer { account_credits: u64 },

    /// Neither balance covers the cost.
    NeedsPurchase { account_credits: u64 },
}

//=== CreditsSession ======================================================

pub struct CreditsSession {
    balance: CreditsBalance,
    refreshes: usize,
    generation: u64,
    worker: CreditsWorker,
    notices: Vec<Notice>,
}

impl CreditsSession {
    pub fn new(api: Arc<dyn CreditsApi>) -> Self {
        Self {
            balance: CreditsBalance::default(),
            refreshes: 0,
            generation: 0,
            worker: CreditsWorker::spawn(api),
            notices: Vec::new(),
        }
    }

    //--- Query API --------------------------------------------------------

    pub fn balance(&self) -> CreditsBalance {
        self.balance
    }

    pub fn account_credits(&self) -> u64 {
        self.balance.account_credits
    }

    pub fn loaded_credits(&self) -> u64 {
        self.balance.loaded_credits
    }

    /// True while a balance refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.refreshes > 0
    }

    /// Remote calls not yet answered, including discarded generations.
    pub fn in_flight(&self) -> usize {
        self.worker.in_flight()
    }

    //--- Remote Operations ------------------------------------------------

    /// Re-reads the account balance.
    ///
    /// Signed-out callers get a zero balance immediately. Failures are
    /// logged and read as zero once applied.
    pub fn refresh(&mut self, identity: &dyn IdentityProvider) {
        let Some(token) = identity.bearer_token() else {
            debug!(target: "credits", "Refresh while signed out, balance reset");
            self.balance.account_credits = 0;
            return;
        };

        let job = CreditsJob::Refresh {
            generation: self.generation,
            token,
        };
        if self.worker.submit(job) {
            self.refreshes += 1;
        } else {
            self.balance.account_credits = 0;
        }
    }

    /// Buys `amount` credits for the signed-in account.
    ///
    /// The result arrives through [`Self::poll`] as a notice.
    pub fn purchase(&mut self, identity: &dyn IdentityProvider, amount: u64) -> Result<(), CreditsError> {
        if amount == 0 {
            return Err(CreditsError::InvalidAmount);
        }
        let token = identity.bearer_token().ok_or(CreditsError::NotSignedIn)?;

        info!(target: "credits", "Purchasing {} credits", amount);
        let job = CreditsJob::Purchase {
            generation: self.generation,
            token,
            amount,
        };
        if self.worker.submit(job) {
            Ok(())
        } else {
            Err(CreditsError::Transport("credits worker unavailable".to_string()))
        }
    }

    //--- Local Operations -------------------------------------------------

    /// Moves `amount` from the account onto this terminal.
    pub fn transfer_to_terminal(&mut self, amount: u64) -> Result<CreditsBalance, TransferError> {
        if self.is_loading() {
            return Err(TransferError::BalancePending);
        }
        if amount == 0 {
            return Err(TransferError::ZeroAmount);
        }
        if amount > self.balance.account_credits {
            return Err(TransferError::Insufficient {
                requested: amount,
                available: self.balance.account_credits,
            });
        }

        self.balance.account_credits -= amount;
        self.balance.loaded_credits += amount;
        info!(
            target: "credits",
            "Loaded {} credits onto terminal ({} account / {} loaded)",
            amount, self.balance.account_credits, self.balance.loaded_credits
        );
        Ok(self.balance)
    }

    /// Launch gate for a game costing `cost` loaded credits.
    pub fn authorize_launch(&mut self, cost: u64) -> LaunchDecision {
        if self.balance.loaded_credits >= cost {
            self.balance.loaded_credits -= cost;
            return LaunchDecision::Granted {
                loaded_credits: self.balance.loaded_credits,
            };
        }
        if self.is_loading() {
            return LaunchDecision::BalancePending;
        }

        let account_credits = self.balance.account_credits;
        if account_credits >= cost {
            LaunchDecision::NeedsTransfer { account_credits }
        } else {
            LaunchDecision::NeedsPurchase { account_credits }
        }
    }

    /// Drops both balances and invalidates replies still in flight.
    pub fn sign_out(&mut self) {
        self.generation += 1;
        self.refreshes = 0;
        self.balance = CreditsBalance::default();
        info!(target: "credits", "Credits session reset (generation {})", self.generation);
    }

    //--- Reply Handling ---------------------------------------------------

    /// Applies every reply that has arrived and returns pending notices.
    pub fn poll(&mut self) -> Vec<Notice> {
        while let Some(reply) = self.worker.try_recv() {
            self.apply(reply);
        }
        std::mem::take(&mut self.notices)
    }

    /// Blocks up to `timeout` until every outstanding call has answered.
    ///
    /// Replies are applied; their notices stay queued for [`Self::poll`].
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.worker.in_flight() > 0 {
            match self.worker.recv_until(deadline) {
                Some(reply) => self.apply(reply),
                None => break,
            }
        }
        self.worker.in_flight() == 0
    }

    fn apply(&mut self, reply: CreditsReply) {
        match reply {
            CreditsReply::Balance { generation, .. } | CreditsReply::Purchase { generation, .. }
                if generation != self.generation =>
            {
                debug!(target: "credits", "Discarding reply from generation {}", generation);
            }
            CreditsReply::Balance { result, .. } => {
                self.refreshes = self.refreshes.saturating_sub(1);
                self.balance.account_credits = match result {
                    Ok(credits) => credits,
                    Err(e) => {
                        warn!(target: "credits", "Balance refresh failed: {}", e);
                        0
                    }
                };
            }
            CreditsReply::Purchase { amount, result, .. } => match result {
                Ok(receipt) => {
                    let account_credits = receipt.new_balance(amount, self.balance.account_credits);
                    self.balance.account_credits = account_credits;
                    self.notices.push(Notice::PurchaseCompleted {
                        amount,
                        account_credits,
                    });
                }
                Err(e) => {
                    warn!(target: "credits", "Purchase of {} credits failed: {}", amount, e);
                    self.notices.push(Notice::PurchaseFailed {
                        amount,
                        reason: e.to_string(),
                    });
                }
            },
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::StaticIdentity;

    const WAIT: Duration = Duration::from_secs(2);

    fn session_with(account: u64) -> (CreditsSession, StaticIdentity) {
        let api = InMemoryCredits::new().with_account("tok", account);
        let identity = StaticIdentity::signed_in("tok");
        let mut session = CreditsSession::new(Arc::new(api));
        session.refresh(&identity);
        assert!(session.settle(WAIT));
        (session, identity)
    }

    //--- Refresh ----------------------------------------------------------

    #[test]
    fn refresh_mirrors_account() {
        let (session, _) = session_with(200);
        assert_eq!(session.account_credits(), 200);
        assert!(!session.is_loading());
    }

    #[test]
    fn refresh_signed_out_is_zero_and_not_loading() {
        let mut session = CreditsSession::new(Arc::new(InMemoryCredits::new()));
        session.refresh(&StaticIdentity::signed_out());
        assert_eq!(session.account_credits(), 0);
        assert!(!session.is_loading());
        assert_eq!(session.in_flight(), 0);
    }

    #[test]
    fn refresh_failure_reads_as_zero() {
        let api = Arc::new(InMemoryCredits::new().with_account("tok", 90));
        let identity = StaticIdentity::signed_in("tok");
        let mut session = CreditsSession::new(api.clone());
        session.refresh(&identity);
        session.settle(WAIT);
        assert_eq!(session.account_credits(), 90);

        api.set_offline(true);
        session.refresh(&identity);
        session.settle(WAIT);
        assert_eq!(session.account_credits(), 0);
        assert!(session.poll().is_empty());
    }

    //--- Transfer ---------------------------------------------------------

    #[test]
    fn transfer_moves_credits() {
        let (mut session, _) = session_with(200);
        let balance = session.transfer_to_terminal(100).unwrap();
        assert_eq!(
            balance,
            CreditsBalance {
                account_credits: 100,
                loaded_credits: 100
            }
        );
    }

    #[test]
    fn transfer_over_balance_changes_nothing() {
        let (mut session, _) = session_with(40);
        assert_eq!(
            session.transfer_to_terminal(50),
            Err(TransferError::Insufficient {
                requested: 50,
                available: 40
            })
        );
        assert_eq!(session.transfer_to_terminal(0), Err(TransferError::ZeroAmount));
        assert_eq!(
            session.balance(),
            CreditsBalance {
                account_credits: 40,
                loaded_credits: 0
            }
        );
    }

    #[test]
    fn transfer_blocked_while_loading() {
        let api = InMemoryCredits::new()
            .with_account("tok", 500)
            .with_latency(Duration::from_millis(100));
        let mut session = CreditsSession::new(Arc::new(api));
        session.refresh(&StaticIdentity::signed_in("tok"));

        assert_eq!(session.transfer_to_terminal(10), Err(TransferError::BalancePending));
        assert_eq!(session.authorize_launch(10), LaunchDecision::BalancePending);
        session.settle(WAIT);
        assert!(session.transfer_to_terminal(10).is_ok());
    }

    //--- Launch Gate ------------------------------------------------------

    #[test]
    fn launch_gate_decisions() {
        let (mut session, _) = session_with(200);
        assert_eq!(
            session.authorize_launch(50),
            LaunchDecision::NeedsTransfer {
                account_credits: 200
            }
        );

        session.transfer_to_terminal(100).unwrap();
        assert_eq!(
            session.authorize_launch(50),
            LaunchDecision::Granted { loaded_credits: 50 }
        );
        assert_eq!(
            session.authorize_launch(500),
            LaunchDecision::NeedsPurchase {
                account_credits: 100
            }
        );
        assert_eq!(session.loaded_credits(), 50);
    }

    //--- Purchase ---------------------------------------------------------

    #[test]
    fn purchase_updates_account_and_notifies() {
        let (mut session, identity) = session_with(40);
        session.purchase(&identity, 100).unwrap();
        session.settle(WAIT);

        assert_eq!(session.account_credits(), 140);
        assert_eq!(
            session.poll(),
            vec![Notice::PurchaseCompleted {
                amount: 100,
                account_credits: 140
            }]
        );
    }

    #[test]
    fn purchase_failure_keeps_balance() {
        let api = Arc::new(InMemoryCredits::new().with_account("tok", 40));
        let identity = StaticIdentity::signed_in("tok");
        let mut session = CreditsSession::new(api.clone());
        session.refresh(&identity);
        session.settle(WAIT);

        api.set_offline(true);
        session.purchase(&identity, 100).unwrap();
        session.settle(WAIT);

        assert_eq!(session.account_credits(), 40);
        assert!(matches!(
            session.poll().as_slice(),
            [Notice::PurchaseFailed { amount: 100, .. }]
        ));
    }

    #[test]
    fn purchase_rejects_zero_and_signed_out() {
        let (mut session, identity) = session_with(10);
        assert_eq!(session.purchase(&identity, 0), Err(CreditsError::InvalidAmount));
        assert_eq!(
            session.purchase(&StaticIdentity::signed_out(), 5),
            Err(CreditsError::NotSignedIn)
        );
        assert_eq!(session.in_flight(), 0);
    }

    //--- Sign-out ---------------------------------------------------------

    #[test]
    fn sign_out_discards_inflight_replies() {
        let api = InMemoryCredits::new()
            .with_account("tok", 300)
            .with_latency(Duration::from_millis(50));
        let identity = StaticIdentity::signed_in("tok");
        let mut session = CreditsSession::new(Arc::new(api));
        session.refresh(&identity);
        session.purchase(&identity, 10).unwrap();

        session.sign_out();
        assert!(session.settle(WAIT));

        assert_eq!(session.balance(), CreditsBalance::default());
        assert!(!session.is_loading());
        assert!(session.poll().is_empty());
    }
}
