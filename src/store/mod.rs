//! The ledger store: the external system of record for transactions.
//!
//! The rest of the crate only talks to the store through the `LedgerStore` trait. Two
//! implementations are provided: `FileStore`, which keeps the ledger in a JSON file, and
//! `MemoryStore`, which keeps it in memory and is used in tests and in test mode.

mod file;
mod memory;
mod records;

pub use file::FileStore;
pub use memory::{MemoryStore, SEED_USER};

use crate::error::{ErrorType, IntoResult};
use crate::model::{Transaction, TransactionDraft, TransactionId, UserId};
use crate::window::QueryWindow;
use crate::{Config, Result};
use std::sync::Arc;
use tracing::debug;

/// The environment variable that, when set and non-empty, puts the app in `Mode::Test`.
pub const TEST_MODE_ENV: &str = "FINTRACK_IN_TEST_MODE";

/// All operations are fallible and report errors distinguishable from success. Dates are calendar
/// dates and amounts are exact decimals.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    /// Returns every transaction of the window's user dated within the window.
    async fn list_transactions(&self, window: &QueryWindow) -> anyhow::Result<Vec<Transaction>>;

    /// Returns one transaction, or `None` if the user has no transaction with that ID.
    async fn get_transaction(
        &self,
        user_id: &UserId,
        id: &TransactionId,
    ) -> anyhow::Result<Option<Transaction>>;

    /// Creates a transaction and assigns it a new, never reused ID.
    async fn create_transaction(
        &self,
        user_id: &UserId,
        draft: &TransactionDraft,
    ) -> anyhow::Result<Transaction>;

    /// Replaces every field of an existing transaction except its ID and owner.
    async fn update_transaction(
        &self,
        user_id: &UserId,
        id: &TransactionId,
        draft: &TransactionDraft,
    ) -> anyhow::Result<Transaction>;

    /// Deletes a transaction and returns its ID.
    async fn delete_transaction(
        &self,
        user_id: &UserId,
        id: &TransactionId,
    ) -> anyhow::Result<TransactionId>;
}

/// Whether the app uses the real ledger file or throwaway seeded data.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Use the ledger file in the home directory.
    #[default]
    File,
    /// Use an in-memory store seeded with demo data. Nothing is persisted.
    Test,
}

impl Mode {
    /// `Mode::Test` if `FINTRACK_IN_TEST_MODE` is set and non-empty, otherwise `Mode::File`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::File,
        }
    }
}

/// Creates the `LedgerStore` for `mode`.
pub async fn store(config: &Config, mode: Mode) -> Result<Arc<dyn LedgerStore>> {
    match mode {
        Mode::File => {
            debug!("Using the ledger file at {}", config.ledger_path().display());
            Ok(Arc::new(FileStore::new(config.ledger_path())))
        }
        Mode::Test => {
            debug!("Using seeded in-memory ledger (test mode)");
            let store = MemoryStore::seeded().pub_result(ErrorType::Internal)?;
            Ok(Arc::new(store))
        }
    }
}
