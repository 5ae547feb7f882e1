use std::sync::Arc;

use alloy::{primitives::Address, rpc::types::TransactionRequest};
use alloy_provider::Provider;
use anyhow::{Context, bail};
use async_trait::async_trait;
use tracing::info;

use crate::{
    ProxyRegistry,
    access::with_gas,
    config::GasConfig,
    registry::{ContractRegistry, PROXY_REGISTRY},
};

/// The current account's delegated execution account.
#[async_trait]
pub trait ProxyAccountManager: Send + Sync {
    async fn current_proxy(&self) -> anyhow::Result<Option<Address>>;

    /// Deploy a proxy. Explicit and user-visible; trades never call this.
    async fn build(&self) -> anyhow::Result<Address>;
}

/// Proxies indexed by the on-chain proxy registry.
pub struct RegistryProxyAccounts<P> {
    provider: P,
    owner: Address,
    registry: Arc<ContractRegistry>,
    gas: GasConfig,
}

impl<P: Provider + Clone> RegistryProxyAccounts<P> {
    pub fn new(
        provider: P,
        owner: Address,
        registry: Arc<ContractRegistry>,
        gas: GasConfig,
    ) -> Self {
        Self { provider, owner, registry, gas }
    }

    fn contract(&self) -> anyhow::Result<ProxyRegistry::ProxyRegistryInstance<P>> {
        let address = self.registry.address(PROXY_REGISTRY, None)?;
        Ok(ProxyRegistry::new(address, self.provider.clone()))
    }

    /// `build()` on the proxy registry from the owner, with the configured gas applied.
    pub(crate) fn build_request(&self) -> anyhow::Result<TransactionRequest> {
        let registry = self.contract()?;
        let call = registry.build().from(self.owner);
        Ok(with_gas(call.into_transaction_request(), &self.gas))
    }
}

#[async_trait]
impl<P: Provider + Clone> ProxyAccountManager for RegistryProxyAccounts<P> {
    async fn current_proxy(&self) -> anyhow::Result<Option<Address>> {
        let registry = self.contract()?;
        let proxy =
            registry.proxies(self.owner).call().await.context("ProxyRegistry.proxies")?;
        Ok((!proxy.is_zero()).then_some(proxy))
    }

    async fn build(&self) -> anyhow::Result<Address> {
        if let Some(existing) = self.current_proxy().await? {
            return Ok(existing);
        }

        let tx = self.build_request()?;
        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .context("ProxyRegistry.build")?
            .get_receipt()
            .await
            .context("proxy build receipt")?;
        if !receipt.status() {
            bail!("proxy build reverted in {}", receipt.transaction_hash);
        }

        match self.current_proxy().await? {
            Some(proxy) => {
                info!(owner = %self.owner, %proxy, "built proxy account");
                Ok(proxy)
            },
            None => bail!("proxy registry has no proxy for {} after build", self.owner),
        }
    }
}
