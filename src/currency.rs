use std::fmt;

use alloy::primitives::{
    U256,
    utils::{ParseUnits, format_units, parse_units},
};
use serde::Deserialize;

use crate::err::{Result, TradeError};

/// A tradable currency. Native currency and its wrapped token are the same
/// type, told apart by flags.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Currency {
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub native: bool,
    #[serde(default)]
    pub wrapped: bool,
}

impl Currency {
    pub fn token(symbol: impl Into<String>, decimals: u8) -> Self {
        Self { symbol: symbol.into(), decimals, native: false, wrapped: false }
    }

    pub fn native(symbol: impl Into<String>, decimals: u8) -> Self {
        Self { symbol: symbol.into(), decimals, native: true, wrapped: false }
    }

    pub fn wrapped(symbol: impl Into<String>, decimals: u8) -> Self {
        Self { symbol: symbol.into(), decimals, native: false, wrapped: true }
    }

    pub fn is_native(&self) -> bool {
        self.native
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Parse a human decimal string ("0.01") into an amount of this currency.
    pub fn parse(&self, amount: &str) -> Result<CurrencyAmount> {
        let invalid = |reason: String| TradeError::InvalidAmount {
            symbol: self.symbol.clone(),
            amount: amount.to_string(),
            reason,
        };

        let amount_str = amount.trim();
        // parse_units drops digits past `decimals` instead of failing
        if let Some((_, fraction)) = amount_str.split_once('.') {
            if fraction.trim_end_matches('0').len() > usize::from(self.decimals) {
                return Err(invalid(format!("more than {} decimal places", self.decimals)));
            }
        }

        let parsed = parse_units(amount_str, self.decimals).map_err(|e| invalid(e.to_string()))?;
        let base_units = match parsed {
            ParseUnits::U256(v) => v,
            ParseUnits::I256(_) => return Err(invalid("negative amount".to_string())),
        };
        Ok(CurrencyAmount::from_base_units(base_units, self.clone()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// An exact amount of a currency, held in the integer base units the
/// contracts expect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyAmount {
    currency: Currency,
    base_units: U256,
}

impl CurrencyAmount {
    pub fn from_base_units(base_units: U256, currency: Currency) -> Self {
        Self { currency, base_units }
    }

    pub fn to_base_units(&self) -> U256 {
        self.base_units
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn symbol(&self) -> &str {
        &self.currency.symbol
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_units(self.base_units, self.currency.decimals) {
            Ok(human) => write!(f, "{} {}", human, self.currency.symbol),
            Err(_) => write!(f, "{} base units of {}", self.base_units, self.currency.symbol),
        }
    }
}
