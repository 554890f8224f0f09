use super::blockchain_id::BlockchainId;
use super::records::RecordError;
use super::store::Store;
use super::transaction::{count_by_account_and_day, Transaction};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("A blockchain id was chosen but none was supplied")]
    MissingBlockchainId,

    #[error("Unable to save account - {0}")]
    Record(#[from] RecordError),
}

pub type AccountResult<T> = anyhow::Result<T, AccountError>;

/// Personal details shared by users and bankers. None of them are validated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub email: String,
    /// Kept as text. Older files may hold a number here.
    #[serde(deserialize_with = "string_or_number")]
    pub age: String,
    pub address: String,
    pub account: String,
    pub branch: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Outcome of a login form: either an account with the resolved id was already on file,
/// or a new one was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Existing(BlockchainId),
    Created(BlockchainId),
}

impl Registration {
    pub fn id(&self) -> &BlockchainId {
        match self {
            Registration::Existing(id) | Registration::Created(id) => id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    #[serde(flatten)]
    pub profile: Profile,

    pub blockchain_id: BlockchainId,

    /// Copies of every transaction this user sent or received while the server was running.
    /// Not rebuilt from the global list on load.
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    /// Transactions touching this user on the day a banker last looked. Never written to disk.
    #[serde(skip)]
    pub transactions_count: u32,
}

impl User {
    /// Picks the identifier a registering user ends up with: the supplied one verbatim when
    /// the form says `yes`, a generated one otherwise.
    pub fn resolve_id(
        profile: &Profile,
        blockchain_option: Option<&str>,
        supplied: Option<&str>,
    ) -> AccountResult<BlockchainId> {
        match blockchain_option {
            Some("yes") => supplied
                .map(BlockchainId::from)
                .ok_or(AccountError::MissingBlockchainId),
            _ => Ok(BlockchainId::generate(&profile.name, &profile.email)),
        }
    }

    pub fn find_by_id<'a>(blockchain_id: &BlockchainId, store: &'a Store) -> Option<&'a User> {
        store
            .users
            .iter()
            .find(|user| &user.blockchain_id == blockchain_id)
    }

    /// Finds the user with `blockchain_id`, or creates one and subscribes every banker to it.
    /// An existing user is returned as-is even when the profile differs.
    pub fn register(
        profile: Profile,
        blockchain_id: BlockchainId,
        store: &mut Store,
    ) -> AccountResult<Registration> {
        if Self::find_by_id(&blockchain_id, store).is_some() {
            debug!("User {} already registered", blockchain_id);
            return Ok(Registration::Existing(blockchain_id));
        }

        store.users.push(User {
            profile,
            blockchain_id: blockchain_id.clone(),
            transactions: Vec::new(),
            transactions_count: 0,
        });
        store.persist_users()?;
        store.notify_bankers(&blockchain_id)?;

        info!("Registered user {}", blockchain_id);
        Ok(Registration::Created(blockchain_id))
    }

    /// Sets `transactions_count` on every user to the number of transactions that name them
    /// as sender or receiver on `day` (`YYYY-MM-DD`).
    pub fn annotate_transaction_counts(day: &str, store: &mut Store) {
        let counts = count_by_account_and_day(&store.transactions);
        for user in store.users.iter_mut() {
            user.transactions_count = counts
                .get(&(user.blockchain_id.clone(), day.to_owned()))
                .copied()
                .unwrap_or(0);
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Banker {
    #[serde(flatten)]
    pub profile: Profile,

    pub resignation: String,

    pub blockchain_id: BlockchainId,

    /// Users this banker was notified about.
    #[serde(default)]
    pub users: Vec<BlockchainId>,
}

impl Banker {
    pub fn find_by_id<'a>(blockchain_id: &BlockchainId, store: &'a Store) -> Option<&'a Banker> {
        store
            .bankers
            .iter()
            .find(|banker| &banker.blockchain_id == blockchain_id)
    }

    /// Finds or creates the banker whose id is generated from the profile's name and email.
    /// A new banker starts with no users.
    pub fn register(
        profile: Profile,
        resignation: String,
        store: &mut Store,
    ) -> AccountResult<Registration> {
        let blockchain_id = BlockchainId::generate(&profile.name, &profile.email);
        if Self::find_by_id(&blockchain_id, store).is_some() {
            debug!("Banker {} already registered", blockchain_id);
            return Ok(Registration::Existing(blockchain_id));
        }

        store.bankers.push(Banker {
            profile,
            resignation,
            blockchain_id: blockchain_id.clone(),
            users: Vec::new(),
        });
        store.persist_bankers()?;

        info!("Registered banker {}", blockchain_id);
        Ok(Registration::Created(blockchain_id))
    }
}
