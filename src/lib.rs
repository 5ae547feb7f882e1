pub mod access;
pub mod allowance;
pub mod config;
pub mod currency;
pub mod engine;
pub mod err;
pub mod params;
pub mod proxy;
pub mod registry;
pub mod route;
pub mod trade;
pub mod weth;

include!("abis/oasis_abis.rs");

pub use access::{ContractAccess, RpcContractAccess, SendOptions};
pub use allowance::{AllowanceManager, Erc20Allowances};
pub use config::{EngineConfig, GasConfig};
pub use currency::{Currency, CurrencyAmount};
pub use engine::{RpcTradeEngine, TradeEngine};
pub use err::{ConfigError, PairIssue, Result, TradeError};
pub use params::{DEFAULT_SLIPPAGE, Slippage};
pub use proxy::{ProxyAccountManager, RegistryProxyAccounts};
pub use registry::ContractRegistry;
pub use route::{CurrencyRole, Direction, Route};
pub use trade::{SubmittedTrade, TradeStage, TxHandle};

#[cfg(test)]
mod tests {
    use std::{str::FromStr, sync::Arc};

    use alloy::{
        primitives::{Address, TxKind, U256, address},
        sol_types::SolCall,
        transports::http::reqwest::Url,
    };
    use alloy_provider::{Provider, ProviderBuilder};

    use super::*;
    use crate::{
        access::encode_call,
        params::CallArg,
        registry::{DIRECT_PROXY, PROXY_REGISTRY},
    };

    const MAPPING: &str = r#"[{
        "network_id": 42,
        "contracts": {
            "MAKER_OTC": [
                { "version": 1, "address": "0x0000000000000000000000000000000000000a01" }
            ],
            "OASIS_DIRECT_PROXY": [
                { "version": 1, "address": "0x0000000000000000000000000000000000000b01" }
            ],
            "PROXY_REGISTRY": [
                { "version": 1, "address": "0x0000000000000000000000000000000000000c01" }
            ]
        },
        "tokens": [
            { "symbol": "ETH", "decimals": 18, "native": true },
            { "symbol": "WETH", "decimals": 18, "wrapped": true,
              "versions": [
                  { "version": 1, "address": "0x0000000000000000000000000000000000000e01" }
              ] },
            { "symbol": "DAI", "decimals": 18,
              "versions": [
                  { "version": 1, "address": "0x0000000000000000000000000000000000000d01" }
              ] }
        ]
    }]"#;

    const OWNER: Address = address!("1111111111111111111111111111111111111111");
    const PROXY: Address = address!("00000000000000000000000000000000000000c1");
    const DAI: Address = address!("0000000000000000000000000000000000000d01");

    // Nothing here reaches the node.
    fn rpc_engine(config: EngineConfig) -> RpcTradeEngine<impl Provider + Clone> {
        let url = Url::from_str("http://127.0.0.1:8545").unwrap();
        let provider = ProviderBuilder::new().connect_http(url);
        let registry = Arc::new(ContractRegistry::from_json_str(MAPPING, 42).unwrap());
        TradeEngine::connect(provider, OWNER, registry, config)
    }

    fn configured() -> EngineConfig {
        let json = r#"{ "gas": { "gas_price": 5000000000, "gas_limit": 300000 } }"#;
        EngineConfig::from_json_str(json).unwrap()
    }

    #[tokio::test]
    async fn rpc_engine_rejects_bad_pairs_offline() {
        let engine = rpc_engine(EngineConfig::default());

        let err = engine.sell("ETH", "ETH", "1").await.unwrap_err();
        assert!(matches!(err, TradeError::InvalidPair { reason: PairIssue::BothNative, .. }));

        let err = engine.get_buy_amount("MKR", "WETH", "1").await.unwrap_err();
        assert!(matches!(
            err,
            TradeError::InvalidPair { reason: PairIssue::UnknownSymbol(ref s), .. } if s == "MKR"
        ));
    }

    #[test]
    fn approval_request_uses_configured_gas() {
        let engine = rpc_engine(configured());
        let dai = engine.registry().currency("DAI").unwrap().clone();

        let tx = engine.allowances().approval_request(&dai, PROXY).unwrap();
        assert_eq!(tx.to, Some(TxKind::Call(DAI)));
        assert_eq!(tx.from, Some(OWNER));
        assert_eq!(tx.gas_price, Some(5_000_000_000));
        assert_eq!(tx.gas, Some(300_000));
        let approve = IERC20::approveCall { spender: PROXY, amount: U256::MAX }.abi_encode();
        assert_eq!(tx.input.input().map(|b| b.to_vec()), Some(approve));

        let eth = engine.registry().currency("ETH").unwrap().clone();
        assert!(engine.allowances().approval_request(&eth, PROXY).is_err());
    }

    #[test]
    fn proxy_build_request_targets_registry() {
        let engine = rpc_engine(configured());

        let tx = engine.proxies().build_request().unwrap();
        let registry = engine.registry().address(PROXY_REGISTRY, None).unwrap();
        assert_eq!(tx.to, Some(TxKind::Call(registry)));
        assert_eq!(tx.from, Some(OWNER));
        assert_eq!(tx.gas, Some(300_000));
        let input = tx.input.input().unwrap();
        assert_eq!(&input[..4], &ProxyRegistry::buildCall::SELECTOR[..]);
    }

    #[test]
    fn proxied_send_wraps_calldata_in_execute() {
        let engine = rpc_engine(configured());
        let args = [CallArg::Address(DAI), CallArg::Uint(U256::from(7u64))];
        let options = SendOptions { value: Some(U256::from(9u64)), via_proxy: Some(PROXY) };

        let tx =
            engine.contracts().send_request(DIRECT_PROXY, "sellAllAmount", &args, options).unwrap();
        let direct = engine.registry().address(DIRECT_PROXY, None).unwrap();
        let execute =
            DSProxy::executeCall { _target: direct, _data: encode_call("sellAllAmount", &args) };
        assert_eq!(tx.to, Some(TxKind::Call(PROXY)));
        assert_eq!(tx.value, Some(U256::from(9u64)));
        assert_eq!(tx.gas_price, Some(5_000_000_000));
        assert_eq!(tx.input.input().map(|b| b.to_vec()), Some(execute.abi_encode()));

        let direct_tx = engine
            .contracts()
            .send_request(DIRECT_PROXY, "sellAllAmount", &args, SendOptions::default())
            .unwrap();
        assert_eq!(direct_tx.to, Some(TxKind::Call(direct)));
        assert_eq!(direct_tx.value, None);
    }
}
