//! Implements the `LedgerStore` trait on top of a JSON file.

use crate::model::{Transaction, TransactionDraft, TransactionId, UserId};
use crate::store::records::Records;
use crate::store::LedgerStore;
use crate::utils;
use crate::window::QueryWindow;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, trace};

const LEDGER_VERSION: u8 = 1;

/// The serialization format of the ledger file.
///
/// ```json
/// {
///   "version": 1,
///   "records": {
///     "transactions": [
///       {
///         "id": "txn-6f1c...",
///         "userId": "asha",
///         "description": "Salary",
///         "amount": "300.00",
///         "type": "income",
///         "date": "2024-01-10"
///       }
///     ]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerFile {
    version: u8,
    records: Records,
}

/// A `LedgerStore` that reads and rewrites a JSON file for every operation. The file is created on
/// the first write. Operations are serialized within this process.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Records> {
        if !self.path.is_file() {
            trace!("No ledger file at {}, starting empty", self.path.display());
            return Ok(Records::default());
        }
        let file: LedgerFile = utils::deserialize(&self.path).await?;
        ensure!(
            file.version == LEDGER_VERSION,
            "Unsupported ledger file version {} in {}",
            file.version,
            self.path.display()
        );
        Ok(file.records)
    }

    async fn save(&self, records: Records) -> Result<()> {
        let file = LedgerFile {
            version: LEDGER_VERSION,
            records,
        };
        let json = serde_json::to_string_pretty(&file).context("Unable to serialize ledger")?;
        utils::replace(&self.path, json)
            .await
            .context("Unable to save the ledger file")?;
        debug!("Saved ledger to {}", self.path.display());
        Ok(())
    }
}

#[async_trait::async_trait]
impl LedgerStore for FileStore {
    async fn list_transactions(&self, window: &QueryWindow) -> Result<Vec<Transaction>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.list(window))
    }

    async fn get_transaction(
        &self,
        user_id: &UserId,
        id: &TransactionId,
    ) -> Result<Option<Transaction>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.get(user_id, id))
    }

    async fn create_transaction(
        &self,
        user_id: &UserId,
        draft: &TransactionDraft,
    ) -> Result<Transaction> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let created = records.create(user_id, draft);
        self.save(records).await?;
        Ok(created)
    }

    async fn update_transaction(
        &self,
        user_id: &UserId,
        id: &TransactionId,
        draft: &TransactionDraft,
    ) -> Result<Transaction> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let updated = records.update(user_id, id, draft)?;
        self.save(records).await?;
        Ok(updated)
    }

    async fn delete_transaction(&self, user_id: &UserId, id: &TransactionId) -> Result<TransactionId> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let deleted = records.delete(user_id, id)?;
        self.save(records).await?;
        Ok(deleted)
    }
}
