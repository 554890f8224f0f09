use std::path::{Path, PathBuf};

use super::{
    account::{Banker, User},
    blockchain_id::BlockchainId,
    records::{load_records, save_records, RecordResult},
    transaction::Transaction,
};

pub const USERS_FILE: &str = "users.json";
pub const BANKERS_FILE: &str = "bankers.json";
pub const TRANSACTIONS_FILE: &str = "transactions.json";

/// Users, bankers and transactions, held in memory and mirrored to one JSON file each
/// under `data_dir`. Every mutation rewrites the whole file of the table it touched.
#[derive(Debug)]
pub struct Store {
    data_dir: PathBuf,
    pub(crate) users: Vec<User>,
    pub(crate) bankers: Vec<Banker>,
    pub(crate) transactions: Vec<Transaction>,
}

impl Store {
    /// Loads the three tables from `data_dir`. Missing files start out empty.
    pub fn open(data_dir: impl Into<PathBuf>) -> RecordResult<Self> {
        let data_dir = data_dir.into();
        let store = Self {
            users: load_records(&data_dir.join(USERS_FILE))?,
            bankers: load_records(&data_dir.join(BANKERS_FILE))?,
            transactions: load_records(&data_dir.join(TRANSACTIONS_FILE))?,
            data_dir,
        };

        info!(
            "Loaded {} users, {} bankers and {} transactions from {}",
            store.users.len(),
            store.bankers.len(),
            store.transactions.len(),
            store.data_dir.display()
        );
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn bankers(&self) -> &[Banker] {
        &self.bankers
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub(crate) fn persist_users(&self) -> RecordResult<()> {
        save_records(&self.data_dir.join(USERS_FILE), &self.users)
    }

    pub(crate) fn persist_bankers(&self) -> RecordResult<()> {
        save_records(&self.data_dir.join(BANKERS_FILE), &self.bankers)
    }

    pub(crate) fn persist_transactions(&self) -> RecordResult<()> {
        save_records(&self.data_dir.join(TRANSACTIONS_FILE), &self.transactions)
    }

    /// Subscribes every banker to a newly registered user.
    pub(crate) fn notify_bankers(&mut self, user_id: &BlockchainId) -> RecordResult<()> {
        for banker in self.bankers.iter_mut() {
            banker.users.push(user_id.clone());
        }
        debug!("Notified {} bankers of user {}", self.bankers.len(), user_id);
        self.persist_bankers()
    }
}
