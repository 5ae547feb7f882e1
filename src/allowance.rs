use std::sync::Arc;

use alloy::{
    primitives::{Address, U256},
    rpc::types::TransactionRequest,
};
use alloy_provider::Provider;
use anyhow::{Context, bail};
use async_trait::async_trait;
use tracing::info;

use crate::{
    IERC20, access::with_gas, config::GasConfig, currency::Currency, registry::ContractRegistry,
};

/// Spending authorization held by a spender over the current account's tokens.
#[async_trait]
pub trait AllowanceManager: Send + Sync {
    async fn has_sufficient_allowance(
        &self,
        token: &Currency,
        spender: Address,
        amount: U256,
    ) -> anyhow::Result<bool>;

    /// Grant `spender` authorization over `token`. Only ever invoked by the caller.
    async fn require_allowance(&self, token: &Currency, spender: Address) -> anyhow::Result<()>;
}

/// ERC-20 `allowance` / `approve` against the registry's token addresses.
pub struct Erc20Allowances<P> {
    provider: P,
    owner: Address,
    registry: Arc<ContractRegistry>,
    gas: GasConfig,
}

impl<P: Provider + Clone> Erc20Allowances<P> {
    pub fn new(
        provider: P,
        owner: Address,
        registry: Arc<ContractRegistry>,
        gas: GasConfig,
    ) -> Self {
        Self { provider, owner, registry, gas }
    }

    fn token(&self, token: &Currency) -> anyhow::Result<IERC20::IERC20Instance<P>> {
        if token.is_native() {
            bail!("{} is native and has no allowance", token.symbol);
        }
        let address = self.registry.address(&token.symbol, None)?;
        Ok(IERC20::new(address, self.provider.clone()))
    }

    /// Unlimited `approve` from the owner, with the configured gas applied.
    pub(crate) fn approval_request(
        &self,
        token: &Currency,
        spender: Address,
    ) -> anyhow::Result<TransactionRequest> {
        let erc20 = self.token(token)?;
        let call = erc20.approve(spender, U256::MAX).from(self.owner);
        Ok(with_gas(call.into_transaction_request(), &self.gas))
    }
}

#[async_trait]
impl<P: Provider + Clone> AllowanceManager for Erc20Allowances<P> {
    async fn has_sufficient_allowance(
        &self,
        token: &Currency,
        spender: Address,
        amount: U256,
    ) -> anyhow::Result<bool> {
        let erc20 = self.token(token)?;
        let allowance = erc20
            .allowance(self.owner, spender)
            .call()
            .await
            .with_context(|| format!("{}.allowance", token.symbol))?;
        Ok(allowance >= amount)
    }

    async fn require_allowance(&self, token: &Currency, spender: Address) -> anyhow::Result<()> {
        if self.has_sufficient_allowance(token, spender, U256::MAX).await? {
            return Ok(());
        }

        let tx = self.approval_request(token, spender)?;
        info!(token = %token.symbol, %spender, "approving unlimited allowance");
        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .with_context(|| format!("{}.approve", token.symbol))?
            .get_receipt()
            .await
            .context("approval receipt")?;
        if !receipt.status() {
            bail!("{} approval for {spender} reverted", token.symbol);
        }
        Ok(())
    }
}
