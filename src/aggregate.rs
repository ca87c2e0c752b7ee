//! Reduces a set of transactions to income, expense and savings totals.

use crate::error::{Error, ErrorType, Result};
use crate::model::{Amount, Transaction, TransactionType};
use serde::Serialize;

/// Income, expense and savings sums for a filtered subset of transactions.
///
/// `savings == income - expenses` always holds. Totals are computed fresh on every call and are
/// never cached.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct Totals {
    income: Amount,
    expenses: Amount,
    savings: Amount,
}

impl Totals {
    fn new(income: Amount, expenses: Amount) -> Result<Self> {
        let savings = income.checked_sub(expenses).ok_or_else(too_large)?;
        Ok(Self {
            income,
            expenses,
            savings,
        })
    }

    pub fn income(&self) -> Amount {
        self.income
    }

    pub fn expenses(&self) -> Amount {
        self.expenses
    }

    /// Income minus expenses, negative when more went out than came in.
    pub fn savings(&self) -> Amount {
        self.savings
    }
}

/// Sums the amounts of the income and expense transactions that satisfy `predicate`.
///
/// Empty partitions total zero.
///
/// # Errors
/// Returns an `ErrorType::Internal` error if a total does not fit in an `Amount`.
pub fn aggregate<'a, I, P>(transactions: I, predicate: P) -> Result<Totals>
where
    I: IntoIterator<Item = &'a Transaction>,
    P: Fn(&Transaction) -> bool,
{
    let (income, expenses) = transactions
        .into_iter()
        .filter(|t| predicate(t))
        .try_fold((Amount::ZERO, Amount::ZERO), |(income, expenses), t| {
            match t.r#type() {
                TransactionType::Income => Some((income.checked_add(t.amount())?, expenses)),
                TransactionType::Expense => Some((income, expenses.checked_add(t.amount())?)),
            }
        })
        .ok_or_else(too_large)?;
    Totals::new(income, expenses)
}

/// Sums the amounts of all transactions of one type.
///
/// # Errors
/// Returns an `ErrorType::Internal` error if the total does not fit in an `Amount`.
pub fn total_of<'a, I>(transactions: I, r#type: TransactionType) -> Result<Amount>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|t| t.r#type() == r#type)
        .try_fold(Amount::ZERO, |total, t| total.checked_add(t.amount()))
        .ok_or_else(too_large)
}

fn too_large() -> Error {
    Error::msg(
        ErrorType::Internal,
        "The transactions add up to more than an amount can hold",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures;
    use crate::window::Period;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_is_zero() {
        let totals = aggregate(&Vec::<Transaction>::new(), |_| true).unwrap();
        assert_eq!(totals, Totals::default());
        assert!(totals.income().is_zero());
        assert!(totals.expenses().is_zero());
        assert!(totals.savings().is_zero());
    }

    #[test]
    fn test_year_totals() {
        let set = fixtures::year_2024();
        let year = Period::year(2024);
        let totals = aggregate(&set, |t| year.contains(t.date())).unwrap();
        assert_eq!(totals.income(), amt("500"));
        assert_eq!(totals.expenses(), amt("250"));
        assert_eq!(totals.savings(), amt("250"));
    }

    #[test]
    fn test_month_totals() {
        let set = fixtures::year_2024();
        let june = Period::month(6, 2024).unwrap();
        let totals = aggregate(&set, |t| june.contains(t.date())).unwrap();
        assert_eq!(totals.income(), amt("200"));
        assert_eq!(totals.expenses(), amt("100"));
        assert_eq!(totals.savings(), amt("100"));
    }

    #[test]
    fn test_predicate_excludes_everything() {
        let set = fixtures::year_2024();
        let totals = aggregate(&set, |t| Period::year(1999).contains(t.date())).unwrap();
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn test_savings_may_be_negative() {
        let set = vec![
            fixtures::txn("a", "u1", "Gift", "10.10", TransactionType::Income, (2024, 1, 1)),
            fixtures::txn("b", "u1", "Rent", "900", TransactionType::Expense, (2024, 1, 2)),
        ];
        let totals = aggregate(&set, |_| true).unwrap();
        assert_eq!(totals.savings(), amt("-889.90"));
        assert_eq!(totals.savings().to_string(), "-889.90");
    }

    #[test]
    fn test_no_float_drift() {
        let set: Vec<_> = (0..10)
            .map(|i| {
                fixtures::txn(
                    &format!("c{i}"),
                    "u1",
                    "Coffee",
                    "0.1",
                    TransactionType::Expense,
                    (2024, 3, 1),
                )
            })
            .collect();
        let totals = aggregate(&set, |_| true).unwrap();
        assert_eq!(totals.expenses(), amt("1"));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let set = fixtures::year_2024();
        let first = aggregate(&set, |_| true).unwrap();
        let second = aggregate(&set, |_| true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let max = "79228162514264337593543950335";
        let set = vec![
            fixtures::txn("a", "u1", "Huge", max, TransactionType::Income, (2024, 1, 1)),
            fixtures::txn("b", "u1", "Huge", max, TransactionType::Income, (2024, 1, 2)),
        ];
        let err = aggregate(&set, |_| true).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Internal);
        let err = total_of(&set, TransactionType::Income).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Internal);

        // One of them alone still totals
        let one = aggregate(&set[..1], |_| true).unwrap();
        assert_eq!(one.income().value(), rust_decimal::Decimal::MAX);
    }

    #[test]
    fn test_total_of() {
        let set = fixtures::year_2024();
        assert_eq!(total_of(&set, TransactionType::Income).unwrap(), amt("500"));
        assert_eq!(total_of(&set, TransactionType::Expense).unwrap(), amt("250"));
    }
}
