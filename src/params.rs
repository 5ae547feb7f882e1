use alloy::primitives::{Address, B256, U256};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::{
    err::{Result, TradeError},
    route::Route,
};

/// Tolerance applied to quotes when bounding a trade: sells accept 98% of
/// the quote, buys pay up to 102%.
pub const DEFAULT_SLIPPAGE: Slippage = Slippage(dec!(0.02));

/// Fraction of a quote the price may move against the user, in `[0, 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Slippage(Decimal);

impl Default for Slippage {
    fn default() -> Self {
        DEFAULT_SLIPPAGE
    }
}

impl TryFrom<Decimal> for Slippage {
    type Error = TradeError;

    fn try_from(tolerance: Decimal) -> Result<Self> {
        Self::new(tolerance)
    }
}

impl Slippage {
    pub fn new(tolerance: Decimal) -> Result<Self> {
        if tolerance.is_sign_negative() || tolerance >= Decimal::ONE {
            return Err(TradeError::InvalidSlippage(tolerance.to_string()));
        }
        Ok(Self(tolerance.normalize()))
    }

    pub fn tolerance(&self) -> Decimal {
        self.0
    }

    /// `(numerator, denominator)` with `tolerance == numerator / denominator`.
    fn ratio(&self) -> (U256, U256) {
        let numerator = U256::from(self.0.mantissa().unsigned_abs());
        let denominator = U256::from(10u8).pow(U256::from(self.0.scale()));
        (numerator, denominator)
    }

    /// Least amount a sell may receive: `expected * (1 - t)`, truncated.
    pub fn min_receive(&self, expected: U256) -> Option<U256> {
        let (t, one) = self.ratio();
        expected.checked_mul(one.checked_sub(t)?)?.checked_div(one)
    }

    /// Most a buy may pay: `expected * (1 + t)`, rounded up.
    pub fn max_pay(&self, expected: U256) -> Option<U256> {
        let (t, one) = self.ratio();
        let scaled = expected.checked_mul(one.checked_add(t)?)?;
        let (quotient, remainder) = scaled.div_rem(one);
        if remainder.is_zero() { Some(quotient) } else { quotient.checked_add(U256::ONE) }
    }
}

/// One ABI argument. Every argument the direct proxy takes is a static
/// 32-byte word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallArg {
    Address(Address),
    Uint(U256),
}

impl CallArg {
    pub fn sol_type(&self) -> &'static str {
        match self {
            CallArg::Address(_) => "address",
            CallArg::Uint(_) => "uint256",
        }
    }

    pub fn word(&self) -> B256 {
        match self {
            CallArg::Address(address) => address.into_word(),
            CallArg::Uint(value) => B256::from(*value),
        }
    }
}

/// The addresses and amounts a trade is built from, all already in base
/// units and exchange-token form.
#[derive(Clone, Copy, Debug)]
pub struct TradeLegs {
    pub otc: Address,
    pub pay_token: Address,
    pub buy_token: Address,
    /// Exact side of the trade: pay amount for sells, buy amount for buys.
    pub amount: U256,
    /// Slippage-bounded side: minimum receive for sells, maximum pay for buys.
    pub limit: U256,
}

/// Ordered call arguments for a route plus the value the transaction carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TradeParameters {
    pub route: Route,
    pub args: Vec<CallArg>,
    pub value: Option<U256>,
    /// Minimum receive for sells, maximum pay for buys.
    pub limit: U256,
}

impl TradeParameters {
    /// Arguments in the order the direct proxy declares them. Native currency
    /// is represented by the wrapped token address on both legs.
    pub fn build(route: Route, legs: &TradeLegs) -> Self {
        use CallArg::{Address as Addr, Uint};

        let TradeLegs { otc, pay_token, buy_token, amount, limit } = *legs;
        let (args, value) = match route {
            Route::SellAllAmount | Route::SellAllAmountBuyEth => (
                vec![Addr(otc), Addr(pay_token), Uint(amount), Addr(buy_token), Uint(limit)],
                None,
            ),
            Route::SellAllAmountPayEth => (
                vec![Addr(otc), Addr(pay_token), Addr(buy_token), Uint(limit)],
                Some(amount),
            ),
            Route::BuyAllAmount | Route::BuyAllAmountBuyEth => (
                vec![Addr(otc), Addr(buy_token), Uint(amount), Addr(pay_token), Uint(limit)],
                None,
            ),
            // the bound travels as value; unspent value is refunded by the proxy
            Route::BuyAllAmountPayEth => (
                vec![Addr(otc), Addr(buy_token), Uint(amount), Addr(pay_token)],
                Some(limit),
            ),
        };

        debug_assert_eq!(args.len(), route.arg_count());
        Self { route, args, value, limit }
    }

    pub fn method(&self) -> &'static str {
        self.route.method_name()
    }
}
