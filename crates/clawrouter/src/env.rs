// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment-backed credential resolver.
//!
//! The default collaborator behind the core's [`CredentialResolver`]
//! seam. Values are snapshotted per provider until `/reload`
//! invalidates the cache.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use clawrouter_core::{Credential, CredentialResolver, Provider};

/// Env var funding BlockRun marketplace models.
const BLOCKRUN_WALLET_KEY: &str = "BLOCKRUN_WALLET_KEY";
/// Env var for OpenAI direct.
const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Env vars for Anthropic direct, in precedence order.
const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
const CLAUDE_CODE_OAUTH_TOKEN: &str = "CLAUDE_CODE_OAUTH_TOKEN";

/// Resolver reading provider credentials from the environment, with the
/// configured wallet key taking precedence for BlockRun.
pub struct EnvCredentialResolver {
    wallet_key: Option<String>,
    cache: RwLock<HashMap<Provider, Option<String>>>,
}

impl EnvCredentialResolver {
    pub fn new(wallet_key: Option<String>) -> Self {
        Self {
            wallet_key: wallet_key.filter(|k| !k.is_empty()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The wallet key this resolver would use for BlockRun, if any.
    pub fn wallet_key(&self) -> Option<String> {
        self.wallet_key
            .clone()
            .or_else(|| non_empty_var(BLOCKRUN_WALLET_KEY))
    }

    fn read_source(&self, provider: Provider) -> Option<String> {
        match provider {
            Provider::Blockrun => self.wallet_key(),
            Provider::OpenAi => non_empty_var(OPENAI_API_KEY),
            Provider::Anthropic => {
                non_empty_var(ANTHROPIC_API_KEY).or_else(|| non_empty_var(CLAUDE_CODE_OAUTH_TOKEN))
            }
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[async_trait]
impl CredentialResolver for EnvCredentialResolver {
    async fn resolve(&self, provider: Provider) -> Option<Credential> {
        {
            let cache = self.cache.read().expect("credential cache lock poisoned");
            if let Some(cached) = cache.get(&provider) {
                return cached.clone().map(|token| Credential { token });
            }
        }

        let token = self.read_source(provider);
        self.cache
            .write()
            .expect("credential cache lock poisoned")
            .insert(provider, token.clone());
        token.map(|token| Credential { token })
    }

    async fn invalidate(&self) {
        self.cache
            .write()
            .expect("credential cache lock poisoned")
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn configured_wallet_key_wins_for_blockrun() {
        let resolver = EnvCredentialResolver::new(Some("0xabc123".to_string()));
        let cred = resolver.resolve(Provider::Blockrun).await.unwrap();
        assert_eq!(cred.token, "0xabc123");
    }

    #[tokio::test]
    async fn empty_wallet_key_is_never_handed_out() {
        let resolver = EnvCredentialResolver::new(Some(String::new()));
        assert_ne!(resolver.wallet_key().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn resolution_is_cached_until_invalidated() {
        let resolver = EnvCredentialResolver::new(Some("first".to_string()));
        assert_eq!(
            resolver.resolve(Provider::Blockrun).await.unwrap().token,
            "first"
        );

        // A second resolve comes from the snapshot even though the
        // source is consulted again after invalidation.
        assert_eq!(
            resolver.resolve(Provider::Blockrun).await.unwrap().token,
            "first"
        );
        resolver.invalidate().await;
        assert_eq!(
            resolver.resolve(Provider::Blockrun).await.unwrap().token,
            "first"
        );
    }
}
