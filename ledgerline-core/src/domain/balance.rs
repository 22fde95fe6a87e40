//! Balance domain model
//!
//! Balances live in the ledger as base-10 integer text. A key with no
//! stored value is "not found", which is different from a stored `0`.

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Signed integer balance as stored in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Balance(pub i64);

impl Balance {
    /// Parse a balance or amount supplied as an argument
    pub fn parse_amount(text: &str) -> Result<Self> {
        text.parse::<i64>()
            .map(Self)
            .map_err(|_| Error::InvalidAmount(text.to_string()))
    }

    /// Decode a value read from the ledger under `key`
    pub fn decode(key: &str, bytes: &[u8]) -> Result<Self> {
        std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Self)
            .ok_or_else(|| Error::CorruptBalance {
                key: key.to_string(),
                value: String::from_utf8_lossy(bytes).into_owned(),
            })
    }

    /// Encode for storage
    pub fn encode(self) -> Vec<u8> {
        self.0.to_string().into_bytes()
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

/// A transfer of `amount` units from `from` to `to`
///
/// Built per invocation and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: i64,
}

impl TransferRequest {
    /// Build from the positional arguments `[from, to, amount]`
    pub fn from_args(args: &[String]) -> Result<Self> {
        Error::check_args(args, 3)?;
        let amount = Balance::parse_amount(&args[2])?;
        Ok(Self {
            from: args[0].clone(),
            to: args[1].clone(),
            amount: amount.value(),
        })
    }

    /// Apply the transfer to the two current balances
    ///
    /// Negative results are allowed; results outside `i64` are not.
    pub fn apply(&self, from: Balance, to: Balance) -> Result<(Balance, Balance)> {
        let new_from = from
            .0
            .checked_sub(self.amount)
            .ok_or_else(|| Error::BalanceOverflow(self.from.clone()))?;
        let new_to = to
            .0
            .checked_add(self.amount)
            .ok_or_else(|| Error::BalanceOverflow(self.to.clone()))?;
        Ok((Balance(new_from), Balance(new_to)))
    }
}

/// Structured query response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Amount")]
    pub amount: String,
}
