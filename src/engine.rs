//! Quotes and trades against the matching market through the direct proxy.
//!
//! A trade walks `Quoting -> SelectingMethod -> BuildingParams ->
//! AwaitingProxy -> CheckingAuthorization -> Submitting`. Missing
//! preconditions (proxy account, allowance) fail the trade instead of being
//! acquired on the caller's behalf, and nothing is retried.

use std::{future::Future, sync::Arc};

use alloy::primitives::{Address, U256};
use alloy_provider::Provider;
use tracing::{debug, info, instrument, warn};

use crate::{
    access::{ContractAccess, RpcContractAccess, SendOptions},
    allowance::{AllowanceManager, Erc20Allowances},
    config::EngineConfig,
    currency::{Currency, CurrencyAmount},
    err::{BoxError, PairIssue, Result, TradeError},
    params::{CallArg, Slippage, TradeLegs, TradeParameters},
    proxy::{ProxyAccountManager, RegistryProxyAccounts},
    registry::{ContractRegistry, DIRECT_PROXY, OTC},
    route::{CurrencyRole, Direction, Route},
    trade::{SubmittedTrade, TradeStage},
};

pub struct TradeEngine<C, A, P> {
    registry: Arc<ContractRegistry>,
    contracts: C,
    allowances: A,
    proxies: P,
    config: EngineConfig,
}

/// Engine wired to a node through `provider`.
pub type RpcTradeEngine<P> =
    TradeEngine<RpcContractAccess<P>, Erc20Allowances<P>, RegistryProxyAccounts<P>>;

/// Currencies of a pair that passed classification.
struct Pair {
    pay: Currency,
    buy: Currency,
    role: CurrencyRole,
}

impl<P> RpcTradeEngine<P>
where
    P: Provider + Clone,
{
    /// Engine over a node for `owner`. Every collaborator sends with `config.gas`.
    pub fn connect(
        provider: P,
        owner: Address,
        registry: Arc<ContractRegistry>,
        config: EngineConfig,
    ) -> Self {
        let gas = config.gas;
        let contracts = RpcContractAccess::new(provider.clone(), registry.clone(), gas);
        let allowances = Erc20Allowances::new(provider.clone(), owner, registry.clone(), gas);
        let proxies = RegistryProxyAccounts::new(provider, owner, registry.clone(), gas);
        Self::new(registry, contracts, allowances, proxies, config)
    }
}

impl<C, A, P> TradeEngine<C, A, P>
where
    C: ContractAccess,
    A: AllowanceManager,
    P: ProxyAccountManager,
{
    pub fn new(
        registry: Arc<ContractRegistry>,
        contracts: C,
        allowances: A,
        proxies: P,
        config: EngineConfig,
    ) -> Self {
        Self { registry, contracts, allowances, proxies, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn contracts(&self) -> &C {
        &self.contracts
    }

    /// For granting allowances ahead of a trade.
    pub fn allowances(&self) -> &A {
        &self.allowances
    }

    /// For building the proxy account ahead of a trade.
    pub fn proxies(&self) -> &P {
        &self.proxies
    }

    /// Amount of `buy` received for paying `pay_amount` of `pay`, at current
    /// market state and without slippage.
    #[instrument(skip(self))]
    pub async fn get_buy_amount(
        &self,
        buy: &str,
        pay: &str,
        pay_amount: &str,
    ) -> Result<CurrencyAmount> {
        let pair = self.pair(pay, buy)?;
        let amount = pair.pay.parse(pay_amount)?;
        self.quote_buy(&pair, &amount).await
    }

    /// Amount of `pay` needed to receive `buy_amount` of `buy`, without slippage.
    #[instrument(skip(self))]
    pub async fn get_pay_amount(
        &self,
        pay: &str,
        buy: &str,
        buy_amount: &str,
    ) -> Result<CurrencyAmount> {
        let pair = self.pair(pay, buy)?;
        let amount = pair.buy.parse(buy_amount)?;
        self.quote_pay(&pair, &amount).await
    }

    /// Least amount of `buy` a sell of `pay_amount` will accept.
    pub async fn min_buy_amount(
        &self,
        buy: &str,
        pay: &str,
        pay_amount: &str,
    ) -> Result<CurrencyAmount> {
        let quote = self.get_buy_amount(buy, pay, pay_amount).await?;
        bound(&quote, self.config.slippage, Direction::Sell)
    }

    /// Most of `pay` a buy of `buy_amount` will spend.
    pub async fn max_pay_amount(
        &self,
        pay: &str,
        buy: &str,
        buy_amount: &str,
    ) -> Result<CurrencyAmount> {
        let quote = self.get_pay_amount(pay, buy, buy_amount).await?;
        bound(&quote, self.config.slippage, Direction::Buy)
    }

    /// Sell exactly `pay_amount` of `pay` for at least the bounded quote of `buy`.
    pub async fn sell(&self, pay: &str, buy: &str, pay_amount: &str) -> Result<SubmittedTrade> {
        self.sell_with(pay, buy, pay_amount, self.config.slippage).await
    }

    #[instrument(skip(self))]
    pub async fn sell_with(
        &self,
        pay: &str,
        buy: &str,
        pay_amount: &str,
        slippage: Slippage,
    ) -> Result<SubmittedTrade> {
        let pair = self.pair(pay, buy)?;
        let exact = pair.pay.parse(pay_amount)?;
        self.trade(Direction::Sell, pair, exact, slippage).await
    }

    /// Buy exactly `buy_amount` of `buy` paying at most the bounded quote of `pay`.
    pub async fn buy(&self, buy: &str, pay: &str, buy_amount: &str) -> Result<SubmittedTrade> {
        self.buy_with(buy, pay, buy_amount, self.config.slippage).await
    }

    #[instrument(skip(self))]
    pub async fn buy_with(
        &self,
        buy: &str,
        pay: &str,
        buy_amount: &str,
        slippage: Slippage,
    ) -> Result<SubmittedTrade> {
        let pair = self.pair(pay, buy)?;
        let exact = pair.buy.parse(buy_amount)?;
        self.trade(Direction::Buy, pair, exact, slippage).await
    }

    async fn trade(
        &self,
        direction: Direction,
        pair: Pair,
        exact: CurrencyAmount,
        slippage: Slippage,
    ) -> Result<SubmittedTrade> {
        // 1. quote the counter side and bound it
        debug!(stage = ?TradeStage::Quoting, %exact);
        let quote = match direction {
            Direction::Sell => self.quote_buy(&pair, &exact).await?,
            Direction::Buy => self.quote_pay(&pair, &exact).await?,
        };
        let limit = bound(&quote, slippage, direction)?;

        // 2. method
        let route = Route::select(direction, pair.role);
        debug!(stage = ?TradeStage::SelectingMethod, method = route.method_name());

        // 3. arguments
        let legs = TradeLegs {
            otc: self.registry.address(OTC, None)?,
            pay_token: self.registry.exchange_token(&pair.pay)?,
            buy_token: self.registry.exchange_token(&pair.buy)?,
            amount: exact.to_base_units(),
            limit: limit.to_base_units(),
        };
        let params = TradeParameters::build(route, &legs);
        debug!(
            stage = ?TradeStage::BuildingParams,
            args = params.args.len(),
            value = ?params.value
        );

        // 4. proxy must already exist; it is also the spender checked below
        let proxy = self
            .within(TradeStage::AwaitingProxy, async {
                self.proxies.current_proxy().await.map_err(|e| TradeError::ProxyLookup(e.into()))
            })
            .await?
            .ok_or(TradeError::NoProxyAccount)?;
        debug!(stage = ?TradeStage::AwaitingProxy, %proxy);

        // 5. allowance over whatever the proxy may pull from the account
        if !pair.pay.is_native() {
            let required = match direction {
                Direction::Sell => exact.to_base_units(),
                Direction::Buy => limit.to_base_units(),
            };
            self.check_allowance(&pair.pay, proxy, required).await?;
        }

        // 6. submit
        debug!(stage = ?TradeStage::Submitting, method = params.method());
        let options = SendOptions { value: params.value, via_proxy: Some(proxy) };
        let tx = self
            .within(TradeStage::Submitting, async {
                self.contracts
                    .send(DIRECT_PROXY, params.method(), &params.args, options)
                    .await
                    .map_err(|e| TradeError::Submission {
                        method: params.method(),
                        source: e.into(),
                    })
            })
            .await?;

        info!(tx = %tx.hash, method = params.method(), %exact, %limit, "trade submitted");
        Ok(SubmittedTrade { tx, route, amount: exact, limit, proxy })
    }

    fn pair(&self, pay: &str, buy: &str) -> Result<Pair> {
        let lookup = |symbol: &str| {
            self.registry.currency(symbol).cloned().map_err(|_| TradeError::InvalidPair {
                pay: pay.to_string(),
                buy: buy.to_string(),
                reason: PairIssue::UnknownSymbol(symbol.to_string()),
            })
        };
        let pay_currency = lookup(pay)?;
        let buy_currency = lookup(buy)?;
        let role = CurrencyRole::classify(&pay_currency, &buy_currency)?;
        Ok(Pair { pay: pay_currency, buy: buy_currency, role })
    }

    async fn quote_buy(&self, pair: &Pair, pay_amount: &CurrencyAmount) -> Result<CurrencyAmount> {
        let args = [
            CallArg::Address(self.registry.exchange_token(&pair.buy)?),
            CallArg::Address(self.registry.exchange_token(&pair.pay)?),
            CallArg::Uint(pay_amount.to_base_units()),
        ];
        let raw = self.read_quote("getBuyAmount", &args, pair, pay_amount).await?;
        Ok(CurrencyAmount::from_base_units(raw, pair.buy.clone()))
    }

    async fn quote_pay(&self, pair: &Pair, buy_amount: &CurrencyAmount) -> Result<CurrencyAmount> {
        let args = [
            CallArg::Address(self.registry.exchange_token(&pair.pay)?),
            CallArg::Address(self.registry.exchange_token(&pair.buy)?),
            CallArg::Uint(buy_amount.to_base_units()),
        ];
        let raw = self.read_quote("getPayAmount", &args, pair, buy_amount).await?;
        Ok(CurrencyAmount::from_base_units(raw, pair.pay.clone()))
    }

    async fn read_quote(
        &self,
        method: &str,
        args: &[CallArg],
        pair: &Pair,
        amount: &CurrencyAmount,
    ) -> Result<U256> {
        let unavailable = |source: Option<BoxError>| TradeError::QuoteUnavailable {
            buy: pair.buy.symbol.clone(),
            pay: pair.pay.symbol.clone(),
            amount: amount.to_string(),
            source,
        };

        let raw = self
            .within(TradeStage::Quoting, async {
                let read = self.contracts.call(OTC, method, args).await;
                read.map_err(|e| unavailable(Some(e.into())))
            })
            .await?;

        // an empty book quotes zero
        if raw.is_zero() {
            return Err(unavailable(None));
        }
        Ok(raw)
    }

    async fn check_allowance(
        &self,
        token: &Currency,
        spender: Address,
        required: U256,
    ) -> Result<()> {
        let sufficient = self
            .within(TradeStage::CheckingAuthorization, async {
                self.allowances
                    .has_sufficient_allowance(token, spender, required)
                    .await
                    .map_err(|e| TradeError::AllowanceLookup {
                        token: token.symbol.clone(),
                        source: e.into(),
                    })
            })
            .await?;

        if !sufficient {
            return Err(TradeError::InsufficientAllowance {
                token: token.symbol.clone(),
                spender,
                required,
            });
        }
        debug!(
            stage = ?TradeStage::CheckingAuthorization,
            token = %token.symbol,
            "allowance sufficient"
        );
        Ok(())
    }

    async fn within<T>(
        &self,
        stage: TradeStage,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let after = self.config.call_timeout();
        match tokio::time::timeout(after, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(?stage, ?after, "deadline exceeded");
                Err(TradeError::Timeout { stage, after })
            },
        }
    }
}

/// Apply the tolerance in the direction that protects the user.
fn bound(
    quote: &CurrencyAmount,
    slippage: Slippage,
    direction: Direction,
) -> Result<CurrencyAmount> {
    let raw = quote.to_base_units();
    let limit = match direction {
        Direction::Sell => slippage.min_receive(raw),
        Direction::Buy => slippage.max_pay(raw),
    };
    let limit = limit.ok_or_else(|| TradeError::InvalidAmount {
        symbol: quote.symbol().to_string(),
        amount: raw.to_string(),
        reason: "slippage bound overflows".to_string(),
    })?;
    Ok(CurrencyAmount::from_base_units(limit, quote.currency().clone()))
}
