use std::sync::Arc;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, U256, keccak256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use alloy_provider::Provider;
use anyhow::{Context, bail};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    DSProxy, config::GasConfig, params::CallArg, registry::ContractRegistry, trade::TxHandle,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Native currency attached to the transaction.
    pub value: Option<U256>,
    /// Route the call through this proxy's `execute(target, data)`.
    pub via_proxy: Option<Address>,
}

/// Named-contract calls bound to the current signing account.
///
/// Implementations must encode `args` in the order given.
#[async_trait]
pub trait ContractAccess: Send + Sync {
    /// Read-only call returning a single word.
    async fn call(&self, contract: &str, method: &str, args: &[CallArg]) -> anyhow::Result<U256>;

    async fn send(
        &self,
        contract: &str,
        method: &str,
        args: &[CallArg],
        options: SendOptions,
    ) -> anyhow::Result<TxHandle>;
}

/// `method(type0,type1,...)`
pub fn signature(method: &str, args: &[CallArg]) -> String {
    let types: Vec<&str> = args.iter().map(CallArg::sol_type).collect();
    format!("{}({})", method, types.join(","))
}

/// Selector followed by one 32-byte word per argument.
pub fn encode_call(method: &str, args: &[CallArg]) -> Bytes {
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(&keccak256(signature(method, args).as_bytes())[..4]);
    for arg in args {
        data.extend_from_slice(arg.word().as_slice());
    }
    data.into()
}

/// `ContractAccess` over an alloy provider, resolving names through the registry.
pub struct RpcContractAccess<P> {
    provider: P,
    registry: Arc<ContractRegistry>,
    gas: GasConfig,
}

impl<P: Provider + Clone> RpcContractAccess<P> {
    pub fn new(provider: P, registry: Arc<ContractRegistry>, gas: GasConfig) -> Self {
        Self { provider, registry, gas }
    }

    /// The transaction `send` submits: to the contract, or to the proxy's
    /// `execute(contract, calldata)`.
    pub(crate) fn send_request(
        &self,
        contract: &str,
        method: &str,
        args: &[CallArg],
        options: SendOptions,
    ) -> anyhow::Result<TransactionRequest> {
        let target = self.registry.address(contract, None)?;
        let data = encode_call(method, args);

        let (to, input): (Address, Bytes) = match options.via_proxy {
            Some(proxy) => {
                let execute = DSProxy::executeCall { _target: target, _data: data };
                (proxy, execute.abi_encode().into())
            },
            None => (target, data),
        };

        let tx = TransactionRequest::default().with_to(to).with_input(input);
        let mut tx = with_gas(tx, &self.gas);
        if let Some(value) = options.value {
            tx = tx.with_value(value);
        }
        Ok(tx)
    }
}

pub(crate) fn with_gas(mut tx: TransactionRequest, gas: &GasConfig) -> TransactionRequest {
    if let Some(price) = gas.gas_price {
        tx = tx.with_gas_price(price);
    }
    if let Some(limit) = gas.gas_limit {
        tx = tx.with_gas_limit(limit);
    }
    tx
}

#[async_trait]
impl<P: Provider + Clone> ContractAccess for RpcContractAccess<P> {
    async fn call(&self, contract: &str, method: &str, args: &[CallArg]) -> anyhow::Result<U256> {
        let address = self.registry.address(contract, None)?;
        let tx =
            TransactionRequest::default().with_to(address).with_input(encode_call(method, args));

        let out = self
            .provider
            .call(tx)
            .await
            .with_context(|| format!("eth_call {contract}.{method}"))?;
        if out.len() < 32 {
            bail!("{contract}.{method} returned {} bytes, expected a word", out.len());
        }
        Ok(U256::from_be_slice(&out[..32]))
    }

    async fn send(
        &self,
        contract: &str,
        method: &str,
        args: &[CallArg],
        options: SendOptions,
    ) -> anyhow::Result<TxHandle> {
        let tx = self.send_request(contract, method, args, options)?;
        debug!(to = ?tx.to, contract, method, value = ?options.value, "sending transaction");
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .with_context(|| format!("send {contract}.{method}"))?;
        Ok(TxHandle { hash: *pending.tx_hash() })
    }
}
