// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential resolver trait.
//!
//! Credential discovery (environment, keychain, on-disk config) lives
//! outside the core. The proxy only asks the resolver for a token per
//! provider and signals invalidation on `POST /reload`.

use async_trait::async_trait;

use crate::types::Provider;

/// An opaque credential for one provider.
#[derive(Clone)]
pub struct Credential {
    /// Raw token value, sent in the provider-appropriate auth header.
    pub token: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[redacted]")
            .finish()
    }
}

/// Capability for resolving upstream credentials.
///
/// Implementations may cache; `invalidate` must drop any cached values so
/// the next `resolve` re-reads the underlying source.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Resolve a credential for the given provider, or `None` if the
    /// source has nothing for it.
    async fn resolve(&self, provider: Provider) -> Option<Credential>;

    /// Drop cached credentials.
    async fn invalidate(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_redacts_token() {
        let cred = Credential {
            token: "sk-super-secret".into(),
        };
        let debug = format!("{cred:?}");
        assert!(!debug.contains("sk-super-secret"));
        assert!(debug.contains("[redacted]"));
    }
}
