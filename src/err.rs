use std::time::Duration;

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::trade::TradeStage;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a currency pair cannot be traded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairIssue {
    BothNative,
    SameAsset,
    NotWrappable,
    UnknownSymbol(String),
}

impl std::fmt::Display for PairIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>,) -> std::fmt::Result {
        match self {
            PairIssue::BothNative => write!(f, "native currency on both legs"),
            PairIssue::SameAsset => write!(f, "both legs resolve to the same exchange token"),
            PairIssue::NotWrappable => write!(f, "not a native/wrapped pair"),
            PairIssue::UnknownSymbol(symbol,) => write!(f, "unknown symbol {symbol}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TradeError {
    #[error("invalid pair {pay} -> {buy}: {reason}")]
    InvalidPair { pay: String, buy: String, reason: PairIssue },

    #[error("invalid amount {amount:?} for {symbol}: {reason}")]
    InvalidAmount { symbol: String, amount: String, reason: String },

    #[error("slippage tolerance {0} outside [0, 1)")]
    InvalidSlippage(String),

    #[error("proxy {spender} lacks allowance of {required} base units for {token}")]
    InsufficientAllowance { token: String, spender: Address, required: U256 },

    #[error("no proxy account deployed for the current account")]
    NoProxyAccount,

    #[error("no quote for {amount} {pay} -> {buy}")]
    QuoteUnavailable {
        buy: String,
        pay: String,
        amount: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("submission of {method} rejected")]
    Submission {
        method: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("{stage:?} timed out after {after:?}")]
    Timeout { stage: TradeStage, after: Duration },

    #[error("registry lookup for {name} failed: {reason}")]
    Registry { name: String, reason: String },

    #[error("allowance check for {token} failed")]
    AllowanceLookup {
        token: String,
        #[source]
        source: BoxError,
    },

    #[error("proxy lookup failed")]
    ProxyLookup(#[source] BoxError),
}

impl TradeError {
    /// The stage a failure belongs to, when it is tied to one.
    pub fn stage(&self,) -> Option<TradeStage,> {
        match self {
            TradeError::InvalidPair { .. } => Some(TradeStage::SelectingMethod,),
            TradeError::QuoteUnavailable { .. } => Some(TradeStage::Quoting,),
            TradeError::InsufficientAllowance { .. } | TradeError::AllowanceLookup { .. } => {
                Some(TradeStage::CheckingAuthorization,)
            },
            TradeError::NoProxyAccount | TradeError::ProxyLookup(_,) => {
                Some(TradeStage::AwaitingProxy,)
            },
            TradeError::Submission { .. } => Some(TradeStage::Submitting,),
            TradeError::Timeout { stage, .. } => Some(*stage,),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T,> = std::result::Result<T, TradeError,>;
