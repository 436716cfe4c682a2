//=========================================================================
// Identity
//=========================================================================
//
// Read-only view of the external identity provider. Authentication itself
// happens elsewhere; the café only asks whether someone is signed in and
// which bearer token to forward.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::{Arc, PoisonError, RwLock};

//=== IdentityProvider ====================================================

pub trait IdentityProvider: Send + Sync {
    fn is_signed_in(&self) -> bool;

    /// Token forwarded to the credits and game-session services.
    fn bearer_token(&self) -> Option<String>;
}

//=== StaticIdentity ======================================================

/// Cloneable identity handle driven by the host application.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    token: Arc<RwLock<Option<String>>>,
}

impl StaticIdentity {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(token: &str) -> Self {
        let identity = Self::default();
        identity.sign_in(token);
        identity
    }

    pub fn sign_in(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    pub fn sign_out(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl IdentityProvider for StaticIdentity {
    fn is_signed_in(&self) -> bool {
        self.bearer_token().is_some()
    }

    fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|token| !token.is_empty())
    }
}
