use crate::{
    currency::Currency,
    err::{PairIssue, Result, TradeError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Pay an exact amount, receive at least a bound.
    Sell,
    /// Receive an exact amount, pay at most a bound.
    Buy,
}

/// Where native currency sits in a pair. Native on both legs has no variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CurrencyRole {
    TokenToToken,
    PayNative,
    BuyNative,
}

impl CurrencyRole {
    pub fn classify(pay: &Currency, buy: &Currency) -> Result<Self> {
        let invalid = |reason| TradeError::InvalidPair {
            pay: pay.symbol.clone(),
            buy: buy.symbol.clone(),
            reason,
        };

        match (pay.native, buy.native) {
            (true, true) => Err(invalid(PairIssue::BothNative)),
            _ if pay.symbol == buy.symbol => Err(invalid(PairIssue::SameAsset)),
            // ETH <-> WETH would trade the wrapped token against itself
            (true, false) if buy.wrapped => Err(invalid(PairIssue::SameAsset)),
            (false, true) if pay.wrapped => Err(invalid(PairIssue::SameAsset)),
            (true, false) => Ok(CurrencyRole::PayNative),
            (false, true) => Ok(CurrencyRole::BuyNative),
            (false, false) => Ok(CurrencyRole::TokenToToken),
        }
    }
}

/// Direct-proxy entry point for a `(Direction, CurrencyRole)` combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    SellAllAmount,
    SellAllAmountPayEth,
    SellAllAmountBuyEth,
    BuyAllAmount,
    BuyAllAmountPayEth,
    BuyAllAmountBuyEth,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::SellAllAmount,
        Route::SellAllAmountPayEth,
        Route::SellAllAmountBuyEth,
        Route::BuyAllAmount,
        Route::BuyAllAmountPayEth,
        Route::BuyAllAmountBuyEth,
    ];

    pub const fn select(direction: Direction, role: CurrencyRole) -> Self {
        match (direction, role) {
            (Direction::Sell, CurrencyRole::TokenToToken) => Route::SellAllAmount,
            (Direction::Sell, CurrencyRole::PayNative) => Route::SellAllAmountPayEth,
            (Direction::Sell, CurrencyRole::BuyNative) => Route::SellAllAmountBuyEth,
            (Direction::Buy, CurrencyRole::TokenToToken) => Route::BuyAllAmount,
            (Direction::Buy, CurrencyRole::PayNative) => Route::BuyAllAmountPayEth,
            (Direction::Buy, CurrencyRole::BuyNative) => Route::BuyAllAmountBuyEth,
        }
    }

    /// Classify the pair and select in one step.
    pub fn for_pair(direction: Direction, pay: &Currency, buy: &Currency) -> Result<Self> {
        CurrencyRole::classify(pay, buy).map(|role| Self::select(direction, role))
    }

    pub const fn method_name(&self) -> &'static str {
        match self {
            Route::SellAllAmount => "sellAllAmount",
            Route::SellAllAmountPayEth => "sellAllAmountPayEth",
            Route::SellAllAmountBuyEth => "sellAllAmountBuyEth",
            Route::BuyAllAmount => "buyAllAmount",
            Route::BuyAllAmountPayEth => "buyAllAmountPayEth",
            Route::BuyAllAmountBuyEth => "buyAllAmountBuyEth",
        }
    }

    pub const fn direction(&self) -> Direction {
        match self {
            Route::SellAllAmount | Route::SellAllAmountPayEth | Route::SellAllAmountBuyEth => {
                Direction::Sell
            },
            Route::BuyAllAmount | Route::BuyAllAmountPayEth | Route::BuyAllAmountBuyEth => {
                Direction::Buy
            },
        }
    }

    pub const fn role(&self) -> CurrencyRole {
        match self {
            Route::SellAllAmount | Route::BuyAllAmount => CurrencyRole::TokenToToken,
            Route::SellAllAmountPayEth | Route::BuyAllAmountPayEth => CurrencyRole::PayNative,
            Route::SellAllAmountBuyEth | Route::BuyAllAmountBuyEth => CurrencyRole::BuyNative,
        }
    }

    pub const fn arg_count(&self) -> usize {
        match self.role() {
            CurrencyRole::PayNative => 4,
            CurrencyRole::TokenToToken | CurrencyRole::BuyNative => 5,
        }
    }
}
