//! The `add` command handler.

use crate::args::AddArgs;
use crate::commands::{confirmer, today, Ledger, MutationReport, Out};
use crate::gate::MutationIntent;
use crate::model::{TransactionForm, DATE_FORMAT};
use crate::store::Mode;
use crate::{Config, Result};

/// Adds a transaction after asking for confirmation (unless `--yes`).
///
/// On success the new transaction is patched into the cache, and once the navigation delay has
/// passed the listing of its type for its month is returned.
///
/// # Errors
/// - `ErrorType::Validation` if the transaction details are invalid. Nothing is asked or saved.
/// - `ErrorType::Session` if no user is configured.
/// - `ErrorType::Store` if the ledger could not be saved.
pub async fn add(config: Config, mode: Mode, args: AddArgs) -> Result<Out<MutationReport>> {
    let ledger = Ledger::open(config, mode).await?;
    let date = match args.date() {
        Some(date) => date.to_string(),
        None => today().format(DATE_FORMAT).to_string(),
    };
    let form = TransactionForm::new(
        args.description(),
        args.amount(),
        args.kind().to_string(),
        date,
    );
    let outcome = ledger
        .gate()
        .run(MutationIntent::Create(form), confirmer(args.yes()))
        .await?;
    ledger.conclude(outcome).await
}
