use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifies the user who owns a transaction.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The opaque identifier the ledger store assigns to a transaction.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Whether money came in or went out.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    /// The heading of the listing that shows transactions of this type.
    pub fn bucket_name(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expenses",
        }
    }
}

/// A single income or expense record as held by the ledger store.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: TransactionId,
    user_id: UserId,
    description: String,
    amount: Amount,
    #[serde(rename = "type")]
    r#type: TransactionType,
    date: NaiveDate,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        user_id: UserId,
        description: impl Into<String>,
        amount: Amount,
        r#type: TransactionType,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            user_id,
            description: description.into(),
            amount,
            r#type,
            date,
        }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_income(&self) -> bool {
        self.r#type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.r#type == TransactionType::Expense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transaction_type_strings() {
        assert_eq!(TransactionType::Income.to_string(), "income");
        assert_eq!(
            TransactionType::from_str("expense").unwrap(),
            TransactionType::Expense
        );
        assert!(TransactionType::from_str("transfer").is_err());
    }

    #[test]
    fn test_transaction_json_shape() {
        let t = Transaction::new(
            "t1".into(),
            "u1".into(),
            "Salary",
            Amount::from_str("300").unwrap(),
            TransactionType::Income,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        );
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["id"], "t1");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["type"], "income");
        assert_eq!(json["amount"], "300");
        assert_eq!(json["date"], "2024-01-10");

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
