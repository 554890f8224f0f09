use super::blockchain_id::BlockchainId;
use super::records::RecordError;
use super::store::Store;
use chrono::{Local, NaiveDateTime};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Local wall-clock time, to the second.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Invalid amount - {0:?}")]
    InvalidAmount(String),

    #[error("Amount outside the supported range - {0:?}")]
    AmountOutOfRange(String),

    #[error("Unable to save transaction - {0}")]
    Record(#[from] RecordError),
}

pub type TransactionResult<T> = anyhow::Result<T, TransactionError>;

/// Parses the amount typed into the transfer form.
/// Sign and balance are not checked. Numbers that `Decimal` cannot hold (about ±7.9e28, or
/// more than 28 decimal places) are reported apart from text that is not a number at all.
pub fn parse_amount(text: &str) -> TransactionResult<Decimal> {
    let trimmed = text.trim();
    let parsed = Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed));
    if let Ok(amount) = parsed {
        return Ok(amount);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            Err(TransactionError::AmountOutOfRange(text.to_owned()))
        }
        _ => Err(TransactionError::InvalidAmount(text.to_owned())),
    }
}

/// Money moved from one blockchain id to another.
/// Neither id has to belong to a registered user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    pub sender_id: BlockchainId,

    pub receiver_id: BlockchainId,

    /// Written to disk as a JSON number
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

impl Transaction {
    pub fn new(
        sender_id: BlockchainId,
        receiver_id: BlockchainId,
        amount: Decimal,
        at: NaiveDateTime,
    ) -> Self {
        Self {
            sender_id,
            receiver_id,
            amount,
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Date part of the timestamp.
    pub fn day(&self) -> &str {
        self.timestamp
            .split(' ')
            .next()
            .unwrap_or(self.timestamp.as_str())
    }

    pub fn involves(&self, blockchain_id: &BlockchainId) -> bool {
        &self.sender_id == blockchain_id || &self.receiver_id == blockchain_id
    }

    /// Records a transfer stamped with the current local time.
    pub fn transfer(
        sender_id: BlockchainId,
        receiver_id: BlockchainId,
        amount: Decimal,
        store: &mut Store,
    ) -> TransactionResult<Transaction> {
        Self::new(sender_id, receiver_id, amount, Local::now().naive_local()).save(store)
    }

    /// Appends to the global list, then to the history of each user it involves.
    /// The transactions file is written before the users file.
    pub(crate) fn save(self, store: &mut Store) -> TransactionResult<Transaction> {
        store.transactions.push(self.clone());
        store.persist_transactions()?;

        for user in store.users.iter_mut() {
            if self.involves(&user.blockchain_id) {
                user.transactions.push(self.clone());
            }
        }
        store.persist_users()?;

        info!(
            "Transferred {} from {} to {}",
            self.amount, self.sender_id, self.receiver_id
        );
        Ok(self)
    }
}

/// Counts, per account and day, the transactions naming that account as sender or receiver.
/// A transaction counts once for its sender and once for its receiver.
pub fn count_by_account_and_day(
    transactions: &[Transaction],
) -> HashMap<(BlockchainId, String), u32> {
    let mut counts = HashMap::new();
    for transaction in transactions {
        let day = transaction.day();
        for account in [&transaction.sender_id, &transaction.receiver_id] {
            *counts
                .entry((account.clone(), day.to_owned()))
                .or_insert(0) += 1;
        }
    }
    counts
}

/// Today's date in the format used by [`Transaction::day`].
pub fn today() -> String {
    Local::now().format(DAY_FORMAT).to_string()
}
