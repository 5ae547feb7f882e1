use alloy::primitives::{Address, TxHash};

use crate::{currency::CurrencyAmount, route::Route};

/// Steps a trade passes through. Failure at any step ends the trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TradeStage {
    Quoting,
    SelectingMethod,
    BuildingParams,
    AwaitingProxy,
    CheckingAuthorization,
    Submitting,
}

/// Handle on a transaction accepted by the submission layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxHandle {
    pub hash: TxHash,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmittedTrade {
    pub tx: TxHandle,
    pub route: Route,
    /// Exact side: paid amount for sells, bought amount for buys.
    pub amount: CurrencyAmount,
    /// Bound on the other side: minimum receive for sells, maximum pay for buys.
    pub limit: CurrencyAmount,
    pub proxy: Address,
}

impl SubmittedTrade {
    pub fn method(&self) -> &'static str {
        self.route.method_name()
    }
}
