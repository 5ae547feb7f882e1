use std::collections::HashMap;

use alloy::primitives::Address;
use serde::Deserialize;

use crate::{
    currency::Currency,
    err::{ConfigError, PairIssue, Result, TradeError},
};

/// Matching market the direct proxy trades against.
pub const OTC: &str = "MAKER_OTC";
/// Stateless helper executed through the user's proxy.
pub const DIRECT_PROXY: &str = "OASIS_DIRECT_PROXY";
/// Registry that deploys and indexes proxy accounts.
pub const PROXY_REGISTRY: &str = "PROXY_REGISTRY";

#[derive(Clone, Debug, Deserialize)]
pub struct ContractInfo {
    pub version: u32,
    pub address: Address,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokenEntry {
    #[serde(flatten)]
    pub currency: Currency,
    #[serde(default)]
    pub versions: Vec<ContractInfo>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NetworkMapping {
    pub network_id: u64,
    #[serde(default)]
    pub contracts: HashMap<String, Vec<ContractInfo>>,
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

/// Addresses and token metadata for a single network.
#[derive(Clone, Debug)]
pub struct ContractRegistry {
    network_id: u64,
    contracts: HashMap<String, Vec<ContractInfo>>,
    tokens: HashMap<String, TokenEntry>,
}

impl ContractRegistry {
    /// Pick the mapping for `network_id` out of a multi-network list.
    pub fn for_network(
        mappings: Vec<NetworkMapping>,
        network_id: u64,
    ) -> std::result::Result<Self, ConfigError> {
        let mapping = mappings.into_iter().find(|m| m.network_id == network_id).ok_or_else(|| {
            ConfigError::Invalid(format!("network id {network_id} not found in mapping"))
        })?;
        Self::from_mapping(mapping)
    }

    pub fn from_mapping(mapping: NetworkMapping) -> std::result::Result<Self, ConfigError> {
        let mut tokens = HashMap::with_capacity(mapping.tokens.len());
        for entry in mapping.tokens {
            let symbol = entry.currency.symbol.clone();
            if entry.currency.native && entry.currency.wrapped {
                let reason = format!("{symbol} cannot be both native and wrapped");
                return Err(ConfigError::Invalid(reason));
            }
            if !entry.currency.native && entry.versions.is_empty() {
                return Err(ConfigError::Invalid(format!("token {symbol} has no address")));
            }
            if tokens.insert(symbol.clone(), entry).is_some() {
                return Err(ConfigError::Invalid(format!("token {symbol} listed twice")));
            }
        }

        let natives = tokens.values().filter(|t| t.currency.native).count();
        let wrapped = tokens.values().filter(|t| t.currency.wrapped).count();
        if natives > 1 || wrapped > 1 {
            let reason = "at most one native and one wrapped token per network";
            return Err(ConfigError::Invalid(reason.to_string()));
        }
        if natives == 1 && wrapped == 0 {
            let reason = "native currency listed without its wrapped token";
            return Err(ConfigError::Invalid(reason.to_string()));
        }

        Ok(Self { network_id: mapping.network_id, contracts: mapping.contracts, tokens })
    }

    pub fn from_json_str(json: &str, network_id: u64) -> std::result::Result<Self, ConfigError> {
        let mappings: Vec<NetworkMapping> = serde_json::from_str(json)?;
        Self::for_network(mappings, network_id)
    }

    pub fn network_id(&self) -> u64 {
        self.network_id
    }

    /// Address of a named contract or token; latest version unless one is given.
    pub fn address(&self, name: &str, version: Option<u32>) -> Result<Address> {
        let infos = match self.contracts.get(name) {
            Some(infos) => infos,
            None => match self.tokens.get(name) {
                Some(token) => &token.versions,
                None => {
                    return Err(TradeError::Registry {
                        name: name.to_string(),
                        reason: format!("not a contract on network {}", self.network_id),
                    });
                },
            },
        };

        let info = select_version(infos, version).ok_or_else(|| TradeError::Registry {
            name: name.to_string(),
            reason: match version {
                Some(v) => format!("version {v} not found"),
                None => "no versions registered".to_string(),
            },
        })?;
        Ok(info.address)
    }

    pub fn currency(&self, symbol: &str) -> Result<&Currency> {
        self.tokens.get(symbol).map(|t| &t.currency).ok_or_else(|| TradeError::InvalidPair {
            pay: symbol.to_string(),
            buy: symbol.to_string(),
            reason: PairIssue::UnknownSymbol(symbol.to_string()),
        })
    }

    /// The token standing in for the native currency inside the exchange.
    pub fn wrapped_native(&self) -> Result<&Currency> {
        let mut currencies = self.tokens.values().map(|t| &t.currency);
        currencies.find(|c| c.wrapped).ok_or_else(|| TradeError::Registry {
            name: "wrapped native".to_string(),
            reason: format!("no wrapped token on network {}", self.network_id),
        })
    }

    /// Token address the exchange knows a currency by. Native currency maps
    /// to its wrapped token.
    pub fn exchange_token(&self, currency: &Currency) -> Result<Address> {
        if currency.native {
            let wrapped = self.wrapped_native()?;
            return self.address(&wrapped.symbol, None);
        }
        self.address(&currency.symbol, None)
    }
}

fn select_version(infos: &[ContractInfo], version: Option<u32>) -> Option<&ContractInfo> {
    match version {
        Some(v) => infos.iter().find(|info| info.version == v),
        None => infos.iter().max_by_key(|info| info.version),
    }
}
