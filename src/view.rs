//! The ledger view controller composes windows, the cache and aggregation into what the front end
//! shows: the savings summary (one monthly and one yearly period, selected independently) and the
//! per-type listings.

use crate::aggregate::{aggregate, total_of, Totals};
use crate::cache::LedgerCache;
use crate::error::Result;
use crate::events::{Events, LedgerEvent};
use crate::gate::{GateState, MutationOutcome};
use crate::model::{Amount, Transaction, TransactionType};
use crate::session::Session;
use crate::window::{month_window, Period};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// The totals of one selected period.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct PeriodSummary {
    period: Period,
    totals: Totals,
}

impl PeriodSummary {
    pub fn period(&self) -> Period {
        self.period
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }
}

/// The savings summary for the two period selectors.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct SummaryView {
    display_name: String,
    monthly: PeriodSummary,
    yearly: PeriodSummary,
}

impl SummaryView {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn monthly(&self) -> PeriodSummary {
        self.monthly
    }

    pub fn yearly(&self) -> PeriodSummary {
        self.yearly
    }
}

/// The transactions of one type in one month, with their total.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Listing {
    bucket: TransactionType,
    period: Period,
    transactions: Vec<Transaction>,
    total: Amount,
}

impl Listing {
    pub fn bucket(&self) -> TransactionType {
        self.bucket
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The heading of the listing, "Income" or "Expenses".
    pub fn title(&self) -> &'static str {
        self.bucket.bucket_name()
    }

    /// What to show in place of an empty listing.
    pub fn empty_message(&self) -> String {
        format!("No {} transactions found for this period.", self.bucket)
    }
}

/// Recomputes the summary and listings for one session.
pub struct LedgerViewController {
    session: Session,
    cache: Arc<LedgerCache>,
    events: Events,
    monthly: Period,
    yearly: Period,
}

impl LedgerViewController {
    /// Both selectors start on the period containing `today`.
    pub fn new(session: Session, cache: Arc<LedgerCache>, events: Events, today: NaiveDate) -> Self {
        Self {
            session,
            cache,
            events,
            monthly: Period::Month {
                month: today.month(),
                year: today.year(),
            },
            yearly: Period::year(today.year()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn monthly(&self) -> Period {
        self.monthly
    }

    pub fn yearly(&self) -> Period {
        self.yearly
    }

    /// Fetches the monthly and yearly windows concurrently and totals them.
    ///
    /// Returns `Ok(None)` without fetching anything if there is no user in the session.
    ///
    /// # Errors
    /// Returns an `ErrorType::Store` error if either fetch fails.
    pub async fn refresh(&self) -> Result<Option<SummaryView>> {
        let Some(user_id) = self.session.user_id() else {
            debug!("No user in the session, skipping the summary");
            return Ok(None);
        };
        let month_window = self.monthly.window(user_id)?;
        let year_window = self.yearly.window(user_id)?;
        let (in_month, in_year) = tokio::join!(
            self.cache.get(&month_window),
            self.cache.get(&year_window)
        );
        let (in_month, in_year) = (in_month?, in_year?);

        let monthly = self.monthly;
        let yearly = self.yearly;
        let view = SummaryView {
            display_name: self.session.display_name().to_string(),
            monthly: PeriodSummary {
                period: monthly,
                totals: aggregate(in_month.iter(), |t| monthly.contains(t.date()))?,
            },
            yearly: PeriodSummary {
                period: yearly,
                totals: aggregate(in_year.iter(), |t| yearly.contains(t.date()))?,
            },
        };
        self.events.emit(LedgerEvent::ViewReady(view.clone()));
        Ok(Some(view))
    }

    /// Selects the month of the monthly summary and refreshes.
    ///
    /// # Errors
    /// Returns an `ErrorType::Validation` error if `month` or `year` is out of range, without
    /// changing the selection.
    pub async fn select_month(&mut self, month: u32, year: i32) -> Result<Option<SummaryView>> {
        let period = Period::month(month, year)?;
        period.bounds()?;
        self.monthly = period;
        self.events.emit(LedgerEvent::PeriodChanged {
            period: self.monthly,
        });
        self.refresh().await
    }

    /// Selects the year of the yearly summary and refreshes.
    ///
    /// # Errors
    /// Returns an `ErrorType::Validation` error if `year` is out of range, without changing the
    /// selection.
    pub async fn select_year(&mut self, year: i32) -> Result<Option<SummaryView>> {
        let period = Period::year(year);
        period.bounds()?;
        self.yearly = period;
        self.events.emit(LedgerEvent::PeriodChanged {
            period: self.yearly,
        });
        self.refresh().await
    }

    /// Refreshes if the mutation succeeded. Other outcomes leave the view as it was.
    pub async fn on_mutation(&self, outcome: &MutationOutcome) -> Result<Option<SummaryView>> {
        if outcome.state() != GateState::Succeeded {
            debug!("Mutation ended {}, not refreshing", outcome.state());
            return Ok(None);
        }
        self.refresh().await
    }

    /// The transactions of type `bucket` in `month` of `year`, and their total.
    ///
    /// Returns `Ok(None)` without fetching anything if there is no user in the session.
    pub async fn listing(
        &self,
        bucket: TransactionType,
        month: u32,
        year: i32,
    ) -> Result<Option<Listing>> {
        let Some(user_id) = self.session.user_id() else {
            debug!("No user in the session, skipping the {bucket} listing");
            return Ok(None);
        };
        let period = Period::month(month, year)?;
        let window = month_window(user_id, month, year)?;
        let fetched = self.cache.get(&window).await?;

        let transactions: Vec<Transaction> = fetched
            .iter()
            .filter(|t| t.r#type() == bucket)
            .cloned()
            .collect();
        let listing = Listing {
            bucket,
            period,
            total: total_of(&transactions, bucket)?,
            transactions,
        };
        self.events.emit(LedgerEvent::ListingReady(listing.clone()));
        Ok(Some(listing))
    }

    /// Like `listing` but always rereads the month from the store, for arriving at a listing
    /// right after a mutation.
    pub async fn refresh_listing(
        &self,
        bucket: TransactionType,
        month: u32,
        year: i32,
    ) -> Result<Option<Listing>> {
        if let Some(user_id) = self.session.user_id() {
            self.cache
                .invalidate(&month_window(user_id, month, year)?)
                .await;
        }
        self.listing(bucket, month, year).await
    }
}
