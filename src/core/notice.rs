//=========================================================================
// Notices
//=========================================================================
//
// User-visible alerts published on the message bus during a tick and
// collected into the café's notice log at the tick boundary.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Notice ==============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Terminal transfer rejected; balances unchanged.
    TransferFailed { requested: u64, reason: String },

    /// Purchase call failed; balance unchanged.
    PurchaseFailed { amount: u64, reason: String },

    PurchaseCompleted { amount: u64, account_credits: u64 },

    /// Launch blocked until more credits are bought.
    PurchaseRequired { game: String, cost: u64 },

    /// Credits moved onto this terminal.
    CreditsLoaded { amount: u64, loaded_credits: u64 },

    GameFailed { game: String, reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransferFailed { requested, reason } => {
                write!(f, "Could not load {} credits: {}", requested, reason)
            }
            Self::PurchaseFailed { amount, reason } => {
                write!(f, "Purchase of {} credits failed: {}", amount, reason)
            }
            Self::PurchaseCompleted {
                amount,
                account_credits,
            } => write!(
                f,
                "Purchased {} credits. Account balance: {}",
                amount, account_credits
            ),
            Self::PurchaseRequired { game, cost } => write!(
                f,
                "{} costs {} credits. Visit the cashier to buy more.",
                game, cost
            ),
            Self::CreditsLoaded {
                amount,
                loaded_credits,
            } => write!(
                f,
                "Loaded {} credits onto this terminal ({} available)",
                amount, loaded_credits
            ),
            Self::GameFailed { game, reason } => write!(f, "{} could not start: {}", game, reason),
        }
    }
}
