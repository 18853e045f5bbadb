//! Provider binder.
//!
//! The only place contract handles are created. A handle is tied to one
//! signer, so an account change goes through [`ProviderBinder::bind`]
//! again instead of patching the existing handle.

use alloy_primitives::Address;

use crate::config::ContractConfig;
use crate::core::error::{SessionError, WalletError};
use crate::core::network::{self, NetworkVerdict};
use crate::core::provider::WalletProvider;

/// Result of a successful bind.
#[derive(Clone, Debug)]
pub struct Binding<C> {
    pub account: Address,
    pub chain_id: u64,
    pub contract: C,
}

/// Turns an injected provider into a contract handle for the configured
/// address and chain.
pub struct ProviderBinder<W> {
    provider: Option<W>,
    contract_address: Address,
    required_chain_id: u64,
}

impl<W: WalletProvider> ProviderBinder<W> {
    /// `provider` is `None` when no wallet was injected into the page.
    pub fn new(provider: Option<W>, config: &ContractConfig) -> Self {
        Self {
            provider,
            contract_address: config.address,
            required_chain_id: config.chain_id,
        }
    }

    pub fn provider(&self) -> Result<&W, SessionError> {
        self.provider.as_ref().ok_or(SessionError::ProviderUnavailable)
    }

    pub fn required_chain_id(&self) -> u64 {
        self.required_chain_id
    }

    /// Request account access, then bind the first granted account.
    pub async fn connect(&self) -> Result<Binding<W::Contract>, SessionError> {
        let provider = self.provider()?;
        let accounts = provider.request_accounts().await?;
        let account = *accounts.first().ok_or(WalletError::NoAccount)?;
        log::info!("wallet granted account {}", account);
        self.bind(account).await
    }

    /// Bind an already granted account (from `accountsChanged`).
    pub async fn bind(&self, account: Address) -> Result<Binding<W::Contract>, SessionError> {
        let provider = self.provider()?;
        let chain_id = provider.chain_id().await?;

        match network::check(chain_id, self.required_chain_id) {
            NetworkVerdict::Reset => {
                log::warn!(
                    "wallet is on chain_id={} ({}), need chain_id={}",
                    chain_id,
                    network::chain_name(chain_id),
                    self.required_chain_id
                );
                Err(SessionError::WrongNetwork {
                    expected: self.required_chain_id,
                    actual: chain_id,
                })
            }
            NetworkVerdict::Continue => {
                let contract = provider.contract(self.contract_address, account);
                log::debug!(
                    "bound contract {} to signer {}",
                    self.contract_address,
                    account
                );
                Ok(Binding {
                    account,
                    chain_id,
                    contract,
                })
            }
        }
    }
}
