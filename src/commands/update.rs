//! The `edit` command handler.

use crate::args::EditArgs;
use crate::commands::{confirmer, Ledger, MutationReport, Out};
use crate::gate::MutationIntent;
use crate::model::TransactionId;
use crate::store::Mode;
use crate::{Config, Result};
use tracing::debug;

/// Changes an existing transaction. The current values are read from the ledger store (never
/// from the cache) and the fields given in `args` are laid over them.
///
/// # Errors
/// - `ErrorType::Validation` if the transaction does not exist or the new details are invalid.
/// - `ErrorType::Session` if no user is configured.
/// - `ErrorType::Store` if the ledger could not be read or saved.
pub async fn edit(config: Config, mode: Mode, args: EditArgs) -> Result<Out<MutationReport>> {
    let ledger = Ledger::open(config, mode).await?;
    let mut gate = ledger.gate();
    let id = TransactionId::new(args.id());

    let mut form = gate.load_form(&id).await?;
    debug!("Editing {id}, currently {form:?}");
    if let Some(description) = args.description() {
        form.description = description.to_string();
    }
    if let Some(amount) = args.amount() {
        form.amount = amount.to_string();
    }
    if let Some(kind) = args.kind() {
        form.r#type = kind.to_string();
    }
    if let Some(date) = args.date() {
        form.date = date.to_string();
    }

    let outcome = gate
        .run(MutationIntent::Update { id, form }, confirmer(args.yes()))
        .await?;
    ledger.conclude(outcome).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::model::TransactionType;
    use crate::test::{fixtures, TestEnv};

    #[tokio::test]
    async fn test_edit_moves_transaction_between_buckets() {
        let env = TestEnv::new().await;
        env.seed(fixtures::year_2024()).await;

        // Salary was income in January
        let args = EditArgs::new("t1", true)
            .with_kind(TransactionType::Expense)
            .with_date("2024-06-30");
        let out = edit(env.config(), Mode::File, args).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(
            report.outcome().message(),
            "Transaction updated successfully."
        );
        let updated = report.outcome().transaction().unwrap();
        assert_eq!(updated.description(), "Salary");
        assert_eq!(updated.amount().to_string(), "300.00");

        let listing = report.listing().unwrap();
        assert_eq!(listing.bucket(), TransactionType::Expense);
        let names: Vec<_> = listing
            .transactions()
            .iter()
            .map(|t| t.description())
            .collect();
        assert_eq!(names, vec!["Utilities", "Salary"]);
    }

    #[tokio::test]
    async fn test_edit_unknown_id() {
        let env = TestEnv::new().await;
        env.seed(fixtures::year_2024()).await;
        let args = EditArgs::new("nope", true).with_amount("5");
        let err = edit(env.config(), Mode::File, args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_edit_invalid_overlay() {
        let env = TestEnv::new().await;
        env.seed(fixtures::year_2024()).await;
        let args = EditArgs::new("t2", true).with_description("   ");
        let err = edit(env.config(), Mode::File, args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }
}
