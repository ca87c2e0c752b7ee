//! Types that represent the core data model, such as `Transaction` and `Amount`.
mod amount;
mod form;
mod transaction;

pub use amount::{Amount, AmountError};
pub use form::{TransactionDraft, TransactionForm, DATE_FORMAT, INVALID_DETAILS, MAX_AMOUNT};
pub use transaction::{Transaction, TransactionId, TransactionType, UserId};
