mod account;
mod blockchain_id;
mod records;
mod store;
mod transaction;

pub use self::{
    account::{AccountError, Banker, Profile, User},
    blockchain_id::BlockchainId,
    store::Store,
    transaction::{parse_amount, today, Transaction, TransactionError},
};
