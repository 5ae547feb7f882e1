//! Moving value between the native currency and its wrapped token.

use tracing::info;

use crate::{
    access::{ContractAccess, SendOptions},
    currency::{Currency, CurrencyAmount},
    err::{PairIssue, Result, TradeError},
    params::CallArg,
    trade::TxHandle,
};

fn check_pair(from: &Currency, to: &Currency, ok: bool) -> Result<()> {
    if ok {
        return Ok(());
    }
    Err(TradeError::InvalidPair {
        pay: from.symbol.clone(),
        buy: to.symbol.clone(),
        reason: PairIssue::NotWrappable,
    })
}

/// Deposit `amount` of native currency into the wrapped token contract.
pub async fn wrap_native<C>(
    contracts: &C,
    wrapped: &Currency,
    amount: &CurrencyAmount,
) -> Result<TxHandle>
where
    C: ContractAccess + ?Sized,
{
    check_pair(amount.currency(), wrapped, amount.currency().is_native() && wrapped.is_wrapped())?;

    info!(%amount, "wrapping native currency");
    let options = SendOptions { value: Some(amount.to_base_units()), via_proxy: None };
    contracts
        .send(&wrapped.symbol, "deposit", &[], options)
        .await
        .map_err(|e| TradeError::Submission { method: "deposit", source: e.into() })
}

/// Withdraw `amount` of the wrapped token back to native currency.
pub async fn unwrap_native<C>(
    contracts: &C,
    native: &Currency,
    amount: &CurrencyAmount,
) -> Result<TxHandle>
where
    C: ContractAccess + ?Sized,
{
    check_pair(amount.currency(), native, amount.currency().is_wrapped() && native.is_native())?;

    info!(%amount, "unwrapping to native currency");
    let args = [CallArg::Uint(amount.to_base_units())];
    contracts
        .send(amount.symbol(), "withdraw", &args, SendOptions::default())
        .await
        .map_err(|e| TradeError::Submission { method: "withdraw", source: e.into() })
}
