//! User input for creating or editing a transaction, and its validation.

use crate::error::{Error, ErrorType, Result};
use crate::model::{Amount, Transaction, TransactionType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The message shown to the user whenever a form fails validation.
pub const INVALID_DETAILS: &str = "Please provide valid transaction details.";

/// The largest amount a single transaction may carry, one trillion.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// The date format used on forms and on the ledger store interface.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The raw, unvalidated fields of a transaction form, exactly as the user typed them.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    pub description: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub r#type: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

impl TransactionForm {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        r#type: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            r#type: r#type.into(),
            date: date.into(),
        }
    }

    /// Checks every field and returns a `TransactionDraft` that can be sent to the ledger store.
    ///
    /// # Errors
    /// Returns an `ErrorType::Validation` error whose message is `INVALID_DETAILS` when the
    /// description is blank, the amount is not a number greater than zero or exceeds
    /// `MAX_AMOUNT`, the type is not `income` or `expense`, or the date is not a `YYYY-MM-DD`
    /// calendar date.
    pub fn validate(&self) -> Result<TransactionDraft> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(invalid("the description is empty"));
        }
        let amount = Amount::from_str(&self.amount)
            .map_err(|e| invalid(format!("the amount '{}' is not a number: {e}", self.amount)))?;
        if !amount.is_positive() {
            return Err(invalid(format!(
                "the amount must be greater than zero, got '{}'",
                self.amount.trim()
            )));
        }
        if amount.value() > MAX_AMOUNT {
            return Err(invalid(format!(
                "the amount must not exceed {}, got '{}'",
                Amount::new(MAX_AMOUNT),
                self.amount.trim()
            )));
        }
        let r#type = TransactionType::from_str(self.r#type.trim())
            .map_err(|_| invalid(format!("unknown transaction type '{}'", self.r#type)))?;
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|e| invalid(format!("the date '{}' is not valid: {e}", self.date)))?;
        Ok(TransactionDraft {
            description: description.to_string(),
            amount,
            r#type,
            date,
        })
    }
}

impl From<&Transaction> for TransactionForm {
    /// Pre-fills a form for editing an existing transaction.
    fn from(t: &Transaction) -> Self {
        Self {
            description: t.description().to_string(),
            amount: t.amount().value().to_string(),
            r#type: t.r#type().to_string(),
            date: t.date().format(DATE_FORMAT).to_string(),
        }
    }
}

fn invalid(reason: impl std::fmt::Display) -> Error {
    Error::new(
        ErrorType::Validation,
        anyhow::anyhow!("{reason}").context(INVALID_DETAILS),
    )
}

/// The validated fields of a transaction that is about to be created or updated.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    description: String,
    amount: Amount,
    #[serde(rename = "type")]
    r#type: TransactionType,
    date: NaiveDate,
}

impl TransactionDraft {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(description: &str, amount: &str, t: &str, date: &str) -> TransactionForm {
        TransactionForm::new(description, amount, t, date)
    }

    fn assert_invalid(f: TransactionForm) {
        let err = f.validate().unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert_eq!(err.message(), INVALID_DETAILS);
    }

    #[test]
    fn test_valid_form() {
        let draft = form("  Salary ", "1,500.25", "income", "2024-02-29")
            .validate()
            .unwrap();
        assert_eq!(draft.description(), "Salary");
        assert_eq!(draft.amount(), Amount::from_str("1500.25").unwrap());
        assert_eq!(draft.r#type(), TransactionType::Income);
        assert_eq!(draft.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_empty_description() {
        assert_invalid(form("", "10", "income", "2024-01-01"));
        assert_invalid(form("   ", "10", "income", "2024-01-01"));
    }

    #[test]
    fn test_non_positive_amount() {
        assert_invalid(form("Rent", "0", "expense", "2024-01-01"));
        assert_invalid(form("Rent", "-5", "expense", "2024-01-01"));
    }

    #[test]
    fn test_amount_upper_bound() {
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000_i64));
        assert!(form("Windfall", "1000000000000", "income", "2024-01-01")
            .validate()
            .is_ok());
        assert_invalid(form("Windfall", "1000000000000.01", "income", "2024-01-01"));
        assert_invalid(form(
            "Windfall",
            "79228162514264337593543950335",
            "income",
            "2024-01-01",
        ));
    }

    #[test]
    fn test_non_numeric_amount() {
        assert_invalid(form("Rent", "", "expense", "2024-01-01"));
        assert_invalid(form("Rent", "ten", "expense", "2024-01-01"));
    }

    #[test]
    fn test_bad_type() {
        assert_invalid(form("Rent", "10", "", "2024-01-01"));
        assert_invalid(form("Rent", "10", "transfer", "2024-01-01"));
    }

    #[test]
    fn test_bad_date() {
        assert_invalid(form("Rent", "10", "expense", "2023-02-29"));
        assert_invalid(form("Rent", "10", "expense", "01/02/2024"));
        assert_invalid(form("Rent", "10", "expense", ""));
    }

    #[test]
    fn test_prefill_from_transaction() {
        let t = Transaction::new(
            "t9".into(),
            "u1".into(),
            "Utilities",
            Amount::from_str("100.50").unwrap(),
            TransactionType::Expense,
            NaiveDate::from_ymd_opt(2024, 6, 16).unwrap(),
        );
        let f = TransactionForm::from(&t);
        assert_eq!(f, form("Utilities", "100.50", "expense", "2024-06-16"));
        assert!(f.validate().is_ok());
    }
}
