//! The `summary` command handler.

use crate::args::SummaryArgs;
use crate::commands::list::no_user;
use crate::commands::{render_summary, today, Ledger, Out};
use crate::error::{Error, ErrorType};
use crate::store::Mode;
use crate::view::SummaryView;
use crate::{Config, Result};
use chrono::{Datelike, NaiveDate};

/// Shows income, expenses and savings for a month and for its year. The month and year default
/// to the current ones.
///
/// If no user is configured nothing is fetched and the output has no structure.
pub async fn summary(config: Config, mode: Mode, args: SummaryArgs) -> Result<Out<SummaryView>> {
    let ledger = Ledger::open(config, mode).await?;
    let today = today();
    let month = args.month().unwrap_or(today.month());
    let year = args.year().unwrap_or(today.year());
    let on = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        Error::msg(
            ErrorType::Validation,
            format!("The month {year}-{month:02} is out of range"),
        )
    })?;

    match ledger.view(on).refresh().await? {
        Some(view) => Ok(Out::new(render_summary(&view, args.year_only()), view)),
        None => Ok(no_user().into()),
    }
}
