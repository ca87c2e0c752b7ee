//! The in-memory set of transactions shared by the store adapters.

use crate::model::{Transaction, TransactionDraft, TransactionId, UserId};
use crate::utils::generate_transaction_id;
use crate::window::QueryWindow;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// All transactions of all users, in insertion order.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct Records {
    transactions: Vec<Transaction>,
}

impl Records {
    pub(crate) fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// The transactions admitted by `window`, ordered by date.
    pub(crate) fn list(&self, window: &QueryWindow) -> Vec<Transaction> {
        let mut found: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| window.admits(t))
            .cloned()
            .collect();
        found.sort_by_key(|t| t.date());
        found
    }

    pub(crate) fn get(&self, user_id: &UserId, id: &TransactionId) -> Option<Transaction> {
        self.transactions
            .iter()
            .find(|t| t.id() == id && t.user_id() == user_id)
            .cloned()
    }

    pub(crate) fn create(&mut self, user_id: &UserId, draft: &TransactionDraft) -> Transaction {
        let transaction = from_draft(
            TransactionId::new(generate_transaction_id()),
            user_id.clone(),
            draft,
        );
        self.transactions.push(transaction.clone());
        transaction
    }

    pub(crate) fn update(
        &mut self,
        user_id: &UserId,
        id: &TransactionId,
        draft: &TransactionDraft,
    ) -> Result<Transaction> {
        let Some(slot) = self.find_mut(user_id, id) else {
            bail!("Transaction '{id}' was not found for user '{user_id}'");
        };
        *slot = from_draft(id.clone(), user_id.clone(), draft);
        Ok(slot.clone())
    }

    pub(crate) fn delete(&mut self, user_id: &UserId, id: &TransactionId) -> Result<TransactionId> {
        let before = self.transactions.len();
        self.transactions
            .retain(|t| !(t.id() == id && t.user_id() == user_id));
        if self.transactions.len() == before {
            bail!("Transaction '{id}' was not found for user '{user_id}'");
        }
        Ok(id.clone())
    }

    fn find_mut(&mut self, user_id: &UserId, id: &TransactionId) -> Option<&mut Transaction> {
        self.transactions
            .iter_mut()
            .find(|t| t.id() == id && t.user_id() == user_id)
    }
}

fn from_draft(id: TransactionId, user_id: UserId, draft: &TransactionDraft) -> Transaction {
    Transaction::new(
        id,
        user_id,
        draft.description(),
        draft.amount(),
        draft.r#type(),
        draft.date(),
    )
}
