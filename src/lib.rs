//! fintrack: a personal income and expense tracker.
//!
//! The library keeps a cache of transaction lists per date window in front of a ledger store,
//! routes every change through a confirmation gate, and derives monthly and yearly savings from
//! whatever the cache holds. The `fintrack` binary is a thin CLI over it.

pub mod aggregate;
pub mod args;
pub mod cache;
pub mod commands;
mod config;
mod error;
pub mod events;
pub mod gate;
pub mod model;
pub mod session;
pub mod store;
mod utils;
pub mod view;
pub mod window;


pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use store::Mode;
