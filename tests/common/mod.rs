#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::primitives::{Address, TxHash, U256, address};
use anyhow::bail;
use async_trait::async_trait;
use oasis_direct::{
    AllowanceManager, ContractAccess, ContractRegistry, Currency, EngineConfig,
    ProxyAccountManager, SendOptions, TradeEngine, TxHandle, params::CallArg,
};

pub const OTC: Address = address!("0000000000000000000000000000000000000a01");
pub const DIRECT_PROXY: Address = address!("0000000000000000000000000000000000000b01");
pub const WETH: Address = address!("0000000000000000000000000000000000000e01");
pub const DAI: Address = address!("0000000000000000000000000000000000000d01");
pub const MKR: Address = address!("0000000000000000000000000000000000000f01");
pub const PROXY: Address = address!("00000000000000000000000000000000000000c1");

const MAPPING: &str = r#"[{
    "network_id": 42,
    "contracts": {
        "MAKER_OTC": [{ "version": 1, "address": "0x0000000000000000000000000000000000000a01" }],
        "OASIS_DIRECT_PROXY": [
            { "version": 1, "address": "0x0000000000000000000000000000000000000b01" }
        ],
        "PROXY_REGISTRY": [
            { "version": 1, "address": "0x0000000000000000000000000000000000000b02" }
        ]
    },
    "tokens": [
        { "symbol": "ETH", "decimals": 18, "native": true },
        { "symbol": "WETH", "decimals": 18, "wrapped": true,
          "versions": [{ "version": 1, "address": "0x0000000000000000000000000000000000000e01" }] },
        { "symbol": "DAI", "decimals": 18,
          "versions": [{ "version": 1, "address": "0x0000000000000000000000000000000000000d01" }] },
        { "symbol": "MKR", "decimals": 18,
          "versions": [{ "version": 1, "address": "0x0000000000000000000000000000000000000f01" }] }
    ]
}]"#;

pub fn registry() -> Arc<ContractRegistry> {
    Arc::new(ContractRegistry::from_json_str(MAPPING, 42).unwrap())
}

pub fn wei(value: u128) -> U256 {
    U256::from(value)
}

/// Resting offer: `sell_amt` of `sell_gem` for `buy_amt` of `buy_gem`.
#[derive(Clone, Copy, Debug)]
pub struct Offer {
    pub sell_gem: Address,
    pub sell_amt: U256,
    pub buy_gem: Address,
    pub buy_amt: U256,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sent {
    pub contract: String,
    pub method: String,
    pub args: Vec<CallArg>,
    pub options: SendOptions,
}

/// Order book priced at 20 DAI per WETH in both directions.
pub struct FakeMarket {
    pub offers: Vec<Offer>,
    pub reads: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<Sent>>,
    pub reject_sends: bool,
    pub read_delay: Option<Duration>,
    pub send_delay: Option<Duration>,
}

impl Default for FakeMarket {
    fn default() -> Self {
        let one_weth = wei(1_000_000_000_000_000_000);
        let twenty_dai = wei(20_000_000_000_000_000_000);
        Self {
            offers: vec![
                Offer { sell_gem: WETH, sell_amt: one_weth, buy_gem: DAI, buy_amt: twenty_dai },
                Offer { sell_gem: DAI, sell_amt: twenty_dai, buy_gem: WETH, buy_amt: one_weth },
            ],
            reads: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            reject_sends: false,
            read_delay: None,
            send_delay: None,
        }
    }
}

impl FakeMarket {
    fn offer(&self, sell_gem: Address, buy_gem: Address) -> Option<&Offer> {
        self.offers.iter().find(|o| o.sell_gem == sell_gem && o.buy_gem == buy_gem)
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

fn addr(arg: &CallArg) -> Address {
    match arg {
        CallArg::Address(a) => *a,
        other => panic!("expected address, got {other:?}"),
    }
}

fn uint(arg: &CallArg) -> U256 {
    match arg {
        CallArg::Uint(v) => *v,
        other => panic!("expected uint, got {other:?}"),
    }
}

#[async_trait]
impl ContractAccess for FakeMarket {
    async fn call(&self, contract: &str, method: &str, args: &[CallArg]) -> anyhow::Result<U256> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        self.reads.lock().unwrap().push(format!("{contract}.{method}"));
        if contract != "MAKER_OTC" {
            bail!("unexpected read on {contract}");
        }
        match method {
            // getBuyAmount(buy_gem, pay_gem, pay_amt)
            "getBuyAmount" => Ok(self
                .offer(addr(&args[0]), addr(&args[1]))
                .map(|o| uint(&args[2]) * o.sell_amt / o.buy_amt)
                .unwrap_or_default()),
            // getPayAmount(pay_gem, buy_gem, buy_amt)
            "getPayAmount" => Ok(self
                .offer(addr(&args[1]), addr(&args[0]))
                .map(|o| uint(&args[2]) * o.buy_amt / o.sell_amt)
                .unwrap_or_default()),
            other => bail!("unknown method {other}"),
        }
    }

    async fn send(
        &self,
        contract: &str,
        method: &str,
        args: &[CallArg],
        options: SendOptions,
    ) -> anyhow::Result<TxHandle> {
        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }
        if self.reject_sends {
            bail!("execution reverted: limit violated");
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(Sent {
            contract: contract.to_string(),
            method: method.to_string(),
            args: args.to_vec(),
            options,
        });
        Ok(TxHandle { hash: TxHash::with_last_byte(sent.len() as u8) })
    }
}

#[derive(Default)]
pub struct FakeAllowances {
    pub granted: Mutex<HashMap<(String, Address), U256>>,
    pub checks: Mutex<Vec<(String, Address, U256)>>,
}

impl FakeAllowances {
    pub fn grant(&self, symbol: &str, spender: Address, amount: U256) {
        self.granted.lock().unwrap().insert((symbol.to_string(), spender), amount);
    }

    pub fn checks(&self) -> Vec<(String, Address, U256)> {
        self.checks.lock().unwrap().clone()
    }
}

#[async_trait]
impl AllowanceManager for FakeAllowances {
    async fn has_sufficient_allowance(
        &self,
        token: &Currency,
        spender: Address,
        amount: U256,
    ) -> anyhow::Result<bool> {
        self.checks.lock().unwrap().push((token.symbol.clone(), spender, amount));
        let granted = self.granted.lock().unwrap();
        Ok(granted.get(&(token.symbol.clone(), spender)).is_some_and(|g| *g >= amount))
    }

    async fn require_allowance(&self, token: &Currency, spender: Address) -> anyhow::Result<()> {
        self.grant(&token.symbol, spender, U256::MAX);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeProxies {
    pub proxy: Mutex<Option<Address>>,
    pub delay: Option<Duration>,
}

impl FakeProxies {
    pub fn deployed() -> Self {
        Self { proxy: Mutex::new(Some(PROXY)), delay: None }
    }
}

#[async_trait]
impl ProxyAccountManager for FakeProxies {
    async fn current_proxy(&self) -> anyhow::Result<Option<Address>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(*self.proxy.lock().unwrap())
    }

    async fn build(&self) -> anyhow::Result<Address> {
        *self.proxy.lock().unwrap() = Some(PROXY);
        Ok(PROXY)
    }
}

pub type Engine = TradeEngine<FakeMarket, FakeAllowances, FakeProxies>;

pub fn engine_with(
    market: FakeMarket,
    allowances: FakeAllowances,
    proxies: FakeProxies,
    config: EngineConfig,
) -> Engine {
    TradeEngine::new(registry(), market, allowances, proxies, config)
}

/// Proxy deployed, no allowances granted.
pub fn engine() -> Engine {
    engine_with(
        FakeMarket::default(),
        FakeAllowances::default(),
        FakeProxies::deployed(),
        EngineConfig::default(),
    )
}
