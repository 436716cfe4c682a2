//=========================================================================
// Credits API Client
//=========================================================================
//
// Remote credits service. Every failure (network, non-2xx, malformed
// body) is reported as an error; callers fail closed.
//
//   POST /get_credits/  {account}            → {credits | total_credits}
//   POST /add_credit/   {account, quantity}  → {total_credits | credits | previous_credits}
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::config::EndpointConfig;

//=== CreditsError ========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreditsError {
    /// No signed-in account to charge or query.
    NotSignedIn,

    /// Zero-credit purchases are rejected locally.
    InvalidAmount,

    /// Connection or timeout failure.
    Transport(String),

    /// Service answered with a non-success status.
    Status(u16),

    /// Response body could not be decoded.
    Decode(String),
}

impl fmt::Display for CreditsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "Not signed in"),
            Self::InvalidAmount => write!(f, "Amount must be greater than zero"),
            Self::Transport(e) => write!(f, "Credits service unreachable: {}", e),
            Self::Status(code) => write!(f, "Credits service returned status {}", code),
            Self::Decode(e) => write!(f, "Malformed credits response: {}", e),
        }
    }
}

impl std::error::Error for CreditsError {}

impl From<reqwest::Error> for CreditsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

//=== Wire Types ==========================================================

#[derive(Debug, Serialize)]
struct AccountRequest<'a> {
    account: &'a str,
}

#[derive(Debug, Serialize)]
struct AddCreditRequest<'a> {
    account: &'a str,
    quantity: String,
}

/// Balance reply of `/get_credits/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BalanceReply {
    #[serde(default)]
    pub credits: Option<u64>,
    #[serde(default)]
    pub total_credits: Option<u64>,
}

impl BalanceReply {
    /// Prefers a non-zero `credits`, then `total_credits`, else zero.
    pub fn balance(&self) -> u64 {
        self.credits
            .filter(|credits| *credits > 0)
            .or(self.total_credits)
            .unwrap_or(0)
    }
}

/// Reply of `/add_credit/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PurchaseReceipt {
    #[serde(default)]
    pub total_credits: Option<u64>,
    #[serde(default)]
    pub credits: Option<u64>,
    #[serde(default)]
    pub previous_credits: Option<u64>,
}

impl PurchaseReceipt {
    /// Account balance after buying `amount`, given the mirrored `current`.
    pub fn new_balance(&self, amount: u64, current: u64) -> u64 {
        self.total_credits
            .or(self.credits)
            .or(self.previous_credits.map(|previous| previous.saturating_add(amount)))
            .unwrap_or_else(|| current.saturating_add(amount))
    }
}

//=== CreditsApi ==========================================================

/// Credits service seam. Implementations may block; the session calls them
/// from its worker thread.
pub trait CreditsApi: Send + Sync {
    fn fetch_balance(&self, token: &str) -> Result<u64, CreditsError>;

    fn add_credits(&self, token: &str, amount: u64) -> Result<PurchaseReceipt, CreditsError>;
}

//=== HttpCreditsClient ===================================================

/// Blocking HTTP implementation of [`CreditsApi`].
pub struct HttpCreditsClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpCreditsClient {
    pub fn new(endpoint: &EndpointConfig) -> Result<Self, CreditsError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(endpoint.timeout())
            .build()?;
        Ok(Self {
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl CreditsApi for HttpCreditsClient {
    fn fetch_balance(&self, token: &str) -> Result<u64, CreditsError> {
        let reply: BalanceReply = self
            .http
            .post(self.url("/get_credits/"))
            .json(&AccountRequest { account: token })
            .send()?
            .error_for_status()?
            .json()?;
        debug!(target: "credits", "Balance reply: {:?}", reply);
        Ok(reply.balance())
    }

    fn add_credits(&self, token: &str, amount: u64) -> Result<PurchaseReceipt, CreditsError> {
        let receipt: PurchaseReceipt = self
            .http
            .post(self.url("/add_credit/"))
            .json(&AddCreditRequest {
                account: token,
                quantity: amount.to_string(),
            })
            .send()?
            .error_for_status()?
            .json()?;
        debug!(target: "credits", "Purchase receipt: {:?}", receipt);
        Ok(receipt)
    }
}

//=========================================================================
// Tests
//=========================================================================
