//! The `delete` command handler.

use crate::args::DeleteArgs;
use crate::commands::{confirmer, Ledger, MutationReport, Out};
use crate::gate::MutationIntent;
use crate::model::TransactionId;
use crate::store::Mode;
use crate::{Config, Result};

/// Deletes a transaction by ID after asking for confirmation (unless `--yes`).
///
/// # Errors
/// - `ErrorType::Session` if no user is configured.
/// - `ErrorType::Store` if the transaction does not exist or the ledger could not be saved.
pub async fn delete(config: Config, mode: Mode, args: DeleteArgs) -> Result<Out<MutationReport>> {
    let ledger = Ledger::open(config, mode).await?;
    let intent = MutationIntent::Delete {
        id: TransactionId::new(args.id()),
    };
    let outcome = ledger.gate().run(intent, confirmer(args.yes())).await?;
    ledger.conclude(outcome).await
}
