//! These structs provide the CLI interface for the fintrack CLI.

use crate::model::TransactionType;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fintrack: A command-line tool for tracking income and expenses.
///
/// Record what comes in and what goes out, list it by month, and see how much you saved in a
/// month and across a year. Every change asks for confirmation before it is written to the
/// ledger.
///
/// Set FINTRACK_IN_TEST_MODE to any non-empty value to run against seeded demo data (user
/// "demo") that is never saved.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. Pass --user to choose who the tracker records
    /// transactions for. By default the data directory is $HOME/fintrack, pass --fintrack-home to
    /// put it somewhere else.
    Init(InitArgs),
    /// Add an income or expense transaction.
    Add(AddArgs),
    /// Change an existing transaction. Fields that are not given keep their current values.
    Edit(EditArgs),
    /// Delete a transaction.
    Delete(DeleteArgs),
    /// List the income or expense transactions of a month.
    List(ListArgs),
    /// Show income, expenses and savings for a month and for a year.
    Summary(SummaryArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where fintrack data and configuration is held. Defaults to ~/fintrack
    #[arg(long, env = "FINTRACK_HOME", default_value_t = default_fintrack_home())]
    fintrack_home: DisplayPath,

    /// The user to act for. Overrides the user in the config file for this invocation.
    #[arg(long, env = "FINTRACK_USER", global = true)]
    user: Option<String>,
}

impl Common {
    pub fn new(log_level: LevelFilter, fintrack_home: PathBuf, user: Option<String>) -> Self {
        Self {
            log_level,
            fintrack_home: fintrack_home.into(),
            user,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn fintrack_home(&self) -> &DisplayPath {
        &self.fintrack_home
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

/// (Not shown): Args for the `fintrack init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The name to greet you with. Defaults to "User".
    #[arg(long)]
    name: Option<String>,
}

impl InitArgs {
    pub fn new(name: Option<String>) -> Self {
        Self { name }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// (Not shown): Args for the `fintrack add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// What the transaction was for.
    #[arg(long)]
    description: String,

    /// The amount, greater than zero, e.g. 12.50
    #[arg(long, allow_hyphen_values = true)]
    amount: String,

    /// income or expense
    #[arg(long = "type", value_enum)]
    kind: TransactionType,

    /// The date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<String>,

    /// Do not ask for confirmation.
    #[arg(long, short)]
    yes: bool,
}

impl AddArgs {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        kind: TransactionType,
        date: Option<String>,
        yes: bool,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            kind,
            date,
            yes,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// (Not shown): Args for the `fintrack edit` command.
#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    /// The ID of the transaction to change.
    id: String,

    #[arg(long)]
    description: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    amount: Option<String>,

    #[arg(long = "type", value_enum)]
    kind: Option<TransactionType>,

    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,

    /// Do not ask for confirmation.
    #[arg(long, short)]
    yes: bool,
}

impl EditArgs {
    pub fn new(id: impl Into<String>, yes: bool) -> Self {
        Self {
            id: id.into(),
            description: None,
            amount: None,
            kind: None,
            date: None,
            yes,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn kind(&self) -> Option<TransactionType> {
        self.kind
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// (Not shown): Args for the `fintrack delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The ID of the transaction to delete.
    id: String,

    /// Do not ask for confirmation.
    #[arg(long, short)]
    yes: bool,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>, yes: bool) -> Self {
        Self { id: id.into(), yes }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// (Not shown): Args for the `fintrack list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// income or expense
    #[arg(long = "type", value_enum)]
    kind: TransactionType,

    /// 1 to 12. Defaults to the current month.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,
}

impl ListArgs {
    pub fn new(kind: TransactionType, month: Option<u32>, year: Option<i32>) -> Self {
        Self { kind, month, year }
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }
}

/// (Not shown): Args for the `fintrack summary` command.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// The month of the monthly summary, 1 to 12. Defaults to the current month.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// The year of both summaries. Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,

    /// Only show the yearly summary.
    #[arg(long)]
    year_only: bool,
}

impl SummaryArgs {
    pub fn new(month: Option<u32>, year: Option<i32>, year_only: bool) -> Self {
        Self {
            month,
            year,
            year_only,
        }
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn year_only(&self) -> bool {
        self.year_only
    }
}

fn default_fintrack_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("fintrack"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --fintrack-home or FINTRACK_HOME instead of relying on the \
                default fintrack home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("fintrack")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
