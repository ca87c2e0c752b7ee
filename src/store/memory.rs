//! Implements the `LedgerStore` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without touching the ledger file (see `Mode::Test`).

use crate::model::{
    Amount, Transaction, TransactionDraft, TransactionId, TransactionType, UserId, DATE_FORMAT,
};
use crate::store::records::Records;
use crate::store::LedgerStore;
use crate::window::QueryWindow;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Cursor;
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::trace;

/// The user that owns the seed data.
pub const SEED_USER: &str = "demo";

/// An implementation of the `LedgerStore` trait that holds its transactions in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
}

impl MemoryStore {
    /// Create an empty `MemoryStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `MemoryStore` holding `transactions`.
    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            records: Mutex::new(Records::new(transactions)),
        }
    }

    /// Create a `MemoryStore` loaded with the seed data from this module.
    pub fn seeded() -> Result<Self> {
        Ok(Self::with_transactions(load_csv(SEED_DATA)?))
    }
}

#[async_trait::async_trait]
impl LedgerStore for MemoryStore {
    async fn list_transactions(&self, window: &QueryWindow) -> Result<Vec<Transaction>> {
        trace!("list_transactions for {window}");
        Ok(self.records.lock().await.list(window))
    }

    async fn get_transaction(
        &self,
        user_id: &UserId,
        id: &TransactionId,
    ) -> Result<Option<Transaction>> {
        Ok(self.records.lock().await.get(user_id, id))
    }

    async fn create_transaction(
        &self,
        user_id: &UserId,
        draft: &TransactionDraft,
    ) -> Result<Transaction> {
        Ok(self.records.lock().await.create(user_id, draft))
    }

    async fn update_transaction(
        &self,
        user_id: &UserId,
        id: &TransactionId,
        draft: &TransactionDraft,
    ) -> Result<Transaction> {
        self.records.lock().await.update(user_id, id, draft)
    }

    async fn delete_transaction(&self, user_id: &UserId, id: &TransactionId) -> Result<TransactionId> {
        self.records.lock().await.delete(user_id, id)
    }
}

/// One row of CSV seed data.
#[derive(Debug, Deserialize)]
struct SeedRow {
    id: String,
    user_id: String,
    description: String,
    amount: String,
    r#type: String,
    date: String,
}

/// Loads transactions from a CSV-formatted string with a header row.
fn load_csv(csv_data: &str) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut transactions = Vec::new();
    for (ix, result) in rdr.deserialize::<SeedRow>().enumerate() {
        let row = result.with_context(|| format!("Bad seed row {}", ix + 2))?;
        let amount = Amount::from_str(&row.amount)
            .with_context(|| format!("Bad amount '{}' in seed row {}", row.amount, ix + 2))?;
        let r#type = TransactionType::from_str(&row.r#type)
            .with_context(|| format!("Bad type '{}' in seed row {}", row.r#type, ix + 2))?;
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
            .with_context(|| format!("Bad date '{}' in seed row {}", row.date, ix + 2))?;
        transactions.push(Transaction::new(
            TransactionId::new(row.id),
            UserId::new(row.user_id),
            row.description,
            amount,
            r#type,
            date,
        ));
    }
    Ok(transactions)
}

/// Seed transaction data.
const SEED_DATA: &str = r##"id,user_id,description,amount,type,date
seed-001,demo,Salary,300.00,income,2024-01-10
seed-002,demo,Rent,150.00,expense,2024-03-01
seed-003,demo,Bonus,200.00,income,2024-06-15
seed-004,demo,Utilities,100.00,expense,2024-06-16
seed-005,demo,Freelance Work,1250.75,income,2025-02-03
seed-006,demo,Groceries,87.43,expense,2025-02-04
seed-007,demo,Internet,89.99,expense,2025-02-11
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionForm;
    use crate::window::{month_window, year_window};

    #[tokio::test]
    async fn test_seeded_store() {
        let store = MemoryStore::seeded().unwrap();
        let demo = UserId::new(SEED_USER);
        let year = store
            .list_transactions(&year_window(&demo, 2024).unwrap())
            .await
            .unwrap();
        assert_eq!(year.len(), 4);
        let june = store
            .list_transactions(&month_window(&demo, 6, 2024).unwrap())
            .await
            .unwrap();
        let names: Vec<_> = june.iter().map(|t| t.description()).collect();
        assert_eq!(names, vec!["Bonus", "Utilities"]);
    }

    #[tokio::test]
    async fn test_crud() {
        let store = MemoryStore::new();
        let u1 = UserId::new("u1");
        let draft = TransactionForm::new("Coffee", "4.50", "expense", "2024-05-05")
            .validate()
            .unwrap();
        let created = store.create_transaction(&u1, &draft).await.unwrap();
        assert_eq!(
            store.get_transaction(&u1, created.id()).await.unwrap(),
            Some(created.clone())
        );
        let deleted = store.delete_transaction(&u1, created.id()).await.unwrap();
        assert_eq!(&deleted, created.id());
        assert!(store
            .update_transaction(&u1, created.id(), &draft)
            .await
            .is_err());
    }

    #[test]
    fn test_load_csv_reports_bad_rows() {
        let bad = "id,user_id,description,amount,type,date\nx,u,Rent,abc,expense,2024-01-01\n";
        let err = load_csv(bad).unwrap_err();
        assert!(err.to_string().contains("Bad amount"));
    }
}
