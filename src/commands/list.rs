//! The `list` command handler.

use crate::args::ListArgs;
use crate::commands::{render_listing, today, Ledger, Out};
use crate::store::Mode;
use crate::view::Listing;
use crate::{Config, Result};
use chrono::Datelike;

/// Lists the income or expense transactions of a month with their total. The month and year
/// default to the current ones.
///
/// If no user is configured nothing is fetched and the output has no structure.
pub async fn list(config: Config, mode: Mode, args: ListArgs) -> Result<Out<Listing>> {
    let ledger = Ledger::open(config, mode).await?;
    let today = today();
    let month = args.month().unwrap_or(today.month());
    let year = args.year().unwrap_or(today.year());

    match ledger
        .view(today)
        .listing(args.kind(), month, year)
        .await?
    {
        Some(listing) => Ok(Out::new(render_listing(&listing), listing)),
        None => Ok(no_user().into()),
    }
}

pub(super) fn no_user() -> &'static str {
    "No user is set, run 'fintrack init --user <id>' or pass --user"
}
