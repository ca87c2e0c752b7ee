//! Command handlers for the fintrack CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod delete;
mod init;
mod insert;
mod list;
mod summary;
mod update;

use crate::cache::LedgerCache;
use crate::error::{Error, ErrorType, IntoResult};
use crate::events::Events;
use crate::gate::{Confirm, GateState, MutationGate, MutationOutcome};
use crate::model::Transaction;
use crate::session::Session;
use crate::store::{self, Mode};
use crate::view::{LedgerViewController, Listing, SummaryView};
use crate::window::Period;
use crate::{Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::{Debug, Write};
use std::sync::Arc;
use tracing::{debug, info};

pub use delete::delete;
pub use init::init;
pub use insert::add;
pub use list::list;
pub use summary::summary;
pub use update::edit;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// The structured output of `add`, `edit` and `delete`.
#[derive(Debug, Clone, Serialize)]
pub struct MutationReport {
    outcome: MutationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    listing: Option<Listing>,
}

impl MutationReport {
    pub fn outcome(&self) -> &MutationOutcome {
        &self.outcome
    }

    /// The listing shown after a successful add or edit.
    pub fn listing(&self) -> Option<&Listing> {
        self.listing.as_ref()
    }
}

/// Asks on the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct Prompt;

impl Confirm for Prompt {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("Unable to read the confirmation")
            .pub_result(ErrorType::Internal)
    }
}

/// The terminal prompt, or a fixed yes when the user passed `--yes`.
fn confirmer(yes: bool) -> &'static dyn Confirm {
    if yes {
        &true
    } else {
        &Prompt
    }
}

/// The pieces a command needs to read or change the ledger for the configured session.
struct Ledger {
    session: Session,
    cache: Arc<LedgerCache>,
    events: Events,
    config: Config,
}

impl Ledger {
    async fn open(config: Config, mode: Mode) -> Result<Self> {
        let store = store::store(&config, mode).await?;
        Ok(Self {
            session: config.session(),
            cache: Arc::new(LedgerCache::new(store)),
            events: Events::new(),
            config,
        })
    }

    fn gate(&self) -> MutationGate {
        MutationGate::new(self.cache.clone(), self.session.clone(), self.events.clone())
            .with_follow_up_delay(self.config.navigation_delay())
    }

    /// A view whose selectors start on the period containing `on`.
    fn view(&self, on: NaiveDate) -> LedgerViewController {
        LedgerViewController::new(
            self.session.clone(),
            self.cache.clone(),
            self.events.clone(),
            on,
        )
    }

    /// Turns a mutation outcome into command output. A successful add or edit waits for the
    /// scheduled navigation and then shows the listing it leads to.
    async fn conclude(&self, outcome: MutationOutcome) -> Result<Out<MutationReport>> {
        match outcome.state() {
            GateState::Failed => {
                return Err(Error::msg(
                    ErrorType::Store,
                    match outcome.detail() {
                        Some(detail) => format!("{} {detail}", outcome.message()),
                        None => outcome.message().to_string(),
                    },
                ))
            }
            GateState::Succeeded => {}
            _ => return Ok(without_listing(outcome)),
        }
        let Some(follow_up) = outcome.follow_up() else {
            return Ok(without_listing(outcome));
        };

        info!("{}", outcome.message());
        let listing = match follow_up.schedule().wait().await {
            Some(arrived) => match arrived.period() {
                // Arriving at a listing after a mutation always rereads the month, even one the
                // create just patched
                Period::Month { month, year } => {
                    self.view(today())
                        .refresh_listing(arrived.bucket(), month, year)
                        .await?
                }
                Period::Year { .. } => None,
            },
            None => None,
        };
        let message = match &listing {
            Some(listing) => render_listing(listing),
            None => outcome.message().to_string(),
        };
        Ok(Out::new(message, MutationReport { outcome, listing }))
    }
}

fn without_listing(outcome: MutationOutcome) -> Out<MutationReport> {
    let message = outcome.message().to_string();
    Out::new(
        message,
        MutationReport {
            outcome,
            listing: None,
        },
    )
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn render_transaction(out: &mut String, t: &Transaction) {
    let _ = writeln!(
        out,
        "  {}  {:<36} {:>12}  {}",
        t.date(),
        t.description(),
        t.amount().to_string(),
        t.id()
    );
}

/// Renders a listing as text for the terminal.
pub(crate) fn render_listing(listing: &Listing) -> String {
    let mut out = format!("{}, {}\n", listing.title(), listing.period());
    if listing.is_empty() {
        out.push_str(&listing.empty_message());
        return out;
    }
    for t in listing.transactions() {
        render_transaction(&mut out, t);
    }
    let _ = write!(out, "Total: {}", listing.total());
    out
}

/// Renders the savings summary as text for the terminal.
pub(crate) fn render_summary(view: &SummaryView, year_only: bool) -> String {
    let mut out = format!("Hello, {}\n", view.display_name());
    let mut periods = Vec::new();
    if !year_only {
        periods.push(view.monthly());
    }
    periods.push(view.yearly());
    for summary in periods {
        let totals = summary.totals();
        let _ = write!(
            out,
            "\n{}\n  Income:   {:>12}\n  Expenses: {:>12}\n  Savings:  {:>12}\n",
            summary.period(),
            totals.income().to_string(),
            totals.expenses().to_string(),
            totals.savings().to_string(),
        );
    }
    out
}
