//! The ledger cache: a read-through, write-around view of the ledger store, keyed by query window.
//!
//! Entries are tagged fresh or stale. `get` serves fresh entries without touching the store and
//! otherwise fetches, sharing a single in-flight fetch among all concurrent callers for the same
//! window. After a successful create, matching fresh entries are patched in place. After an update
//! or delete, entries are invalidated, because either may move a transaction out of the window
//! it is filed under.
//!
//! Every slot carries an epoch that is bumped whenever the slot is patched or invalidated. A fetch
//! remembers the epoch it started under and only stores its result as fresh if the epoch is
//! unchanged when it lands, so a fetch that raced a mutation can never overwrite newer state.

use crate::error::{Error, ErrorType, IntoResult, Res, Result};
use crate::model::Transaction;
use crate::store::LedgerStore;
use crate::window::QueryWindow;
use anyhow::{bail, Context};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, trace, warn};

/// Whether a window's cached transactions can be trusted without asking the store.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Matches the store's last known truth, plus local patches.
    Fresh,
    /// Must be refetched before use.
    Stale,
    /// Never fetched.
    Absent,
}

/// A window's cached transactions and their freshness.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    transactions: Arc<Vec<Transaction>>,
    freshness: Freshness,
}

impl CacheEntry {
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }
}

/// What followers of an in-flight fetch receive. Errors are shared as text since `anyhow::Error`
/// cannot be cloned.
type Shared = std::result::Result<Arc<Vec<Transaction>>, String>;

#[derive(Debug)]
struct InFlight {
    id: u64,
    rx: watch::Receiver<Option<Shared>>,
}

#[derive(Debug, Default)]
struct Slot {
    entry: Option<CacheEntry>,
    epoch: u64,
    in_flight: Option<InFlight>,
}

impl Slot {
    fn fresh(&self) -> Option<Arc<Vec<Transaction>>> {
        self.entry
            .as_ref()
            .filter(|e| e.freshness == Freshness::Fresh)
            .map(|e| e.transactions.clone())
    }

    /// Marks the entry stale and detaches any in-flight fetch so the next `get` starts over.
    fn mark_stale(&mut self) {
        self.epoch += 1;
        self.in_flight = None;
        if let Some(entry) = self.entry.as_mut() {
            entry.freshness = Freshness::Stale;
        }
    }

    /// Appends `transaction` to a fresh entry. Returns `false` if there is no fresh entry.
    fn patch(&mut self, window: &QueryWindow, transaction: &Transaction) -> Res<bool> {
        if self.fresh().is_none() {
            // A fetch already underway may predate the new transaction
            if self.in_flight.is_some() {
                self.mark_stale();
            }
            return Ok(false);
        }
        let Some(entry) = self.entry.as_mut() else {
            return Ok(false);
        };
        if entry.transactions.iter().any(|t| t.id() == transaction.id()) {
            bail!(
                "Window {window} already holds transaction '{}'",
                transaction.id()
            );
        }
        Arc::make_mut(&mut entry.transactions).push(transaction.clone());
        self.epoch += 1;
        Ok(true)
    }
}

/// The part a caller of `get` plays for one window.
enum Role {
    Cached(Arc<Vec<Transaction>>),
    Leader {
        id: u64,
        epoch: u64,
        tx: watch::Sender<Option<Shared>>,
    },
    Follower {
        id: u64,
        rx: watch::Receiver<Option<Shared>>,
    },
}

/// The process-local cache of transaction lists, one per query window. It is only mutated through
/// `get`, `patch_on_create`, `patch_all_on_create`, `invalidate` and `invalidate_all`.
pub struct LedgerCache {
    store: Arc<dyn LedgerStore>,
    slots: Mutex<HashMap<QueryWindow, Slot>>,
    next_fetch_id: AtomicU64,
}

impl LedgerCache {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            slots: Mutex::new(HashMap::new()),
            next_fetch_id: AtomicU64::new(0),
        }
    }

    /// The store this cache reads through.
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Returns the transactions for `window`, from the cache if fresh, otherwise from the store.
    ///
    /// Concurrent calls for the same window while a fetch is pending wait on that fetch rather
    /// than issuing another.
    ///
    /// # Errors
    /// Returns an `ErrorType::Store` error if the fetch fails. The cache is left untouched.
    pub async fn get(&self, window: &QueryWindow) -> Result<Arc<Vec<Transaction>>> {
        loop {
            match self.claim(window).await {
                Role::Cached(transactions) => {
                    trace!("Cache hit for {window}");
                    return Ok(transactions);
                }
                Role::Leader { id, epoch, tx } => return self.fetch(window, id, epoch, tx).await,
                Role::Follower { id, mut rx } => {
                    debug!("Waiting on the in-flight fetch for {window}");
                    let shared = match rx.wait_for(Option::is_some).await {
                        Ok(done) => done.clone(),
                        Err(_) => None,
                    };
                    match shared {
                        Some(Ok(transactions)) => return Ok(transactions),
                        Some(Err(message)) => return Err(Error::msg(ErrorType::Store, message)),
                        // The leader was dropped before it finished, try again
                        None => self.abandon(window, id).await,
                    }
                }
            }
        }
    }

    /// Appends `transaction` to the fresh entry for `window`, if there is one and the window
    /// admits the transaction. Returns `true` if the entry was patched.
    ///
    /// A patch that does not fit the entry falls back to invalidating the window.
    pub async fn patch_on_create(&self, window: &QueryWindow, transaction: &Transaction) -> bool {
        if !window.admits(transaction) {
            trace!(
                "Transaction '{}' does not belong in {window}",
                transaction.id()
            );
            return false;
        }
        let mut slots = self.slots.lock().await;
        match slots.get_mut(window) {
            Some(slot) => apply_patch(window, slot, transaction),
            None => false,
        }
    }

    /// Patches every fresh entry whose window admits `transaction`. Returns the number of entries
    /// patched.
    pub async fn patch_all_on_create(&self, transaction: &Transaction) -> usize {
        let mut slots = self.slots.lock().await;
        let mut patched = 0;
        for (window, slot) in slots.iter_mut() {
            if window.admits(transaction) && apply_patch(window, slot, transaction) {
                patched += 1;
            }
        }
        debug!(
            "Patched {patched} cached window{} with transaction '{}'",
            if patched == 1 { "" } else { "s" },
            transaction.id()
        );
        patched
    }

    /// Marks `window` stale so that the next `get` refetches it.
    pub async fn invalidate(&self, window: &QueryWindow) {
        if let Some(slot) = self.slots.lock().await.get_mut(window) {
            debug!("Invalidating {window}");
            slot.mark_stale();
        }
    }

    /// Marks every window stale.
    pub async fn invalidate_all(&self) {
        let mut slots = self.slots.lock().await;
        debug!("Invalidating all {} cached windows", slots.len());
        slots.values_mut().for_each(Slot::mark_stale);
    }

    /// The freshness of `window` without fetching anything.
    pub async fn freshness(&self, window: &QueryWindow) -> Freshness {
        self.slots
            .lock()
            .await
            .get(window)
            .and_then(|slot| slot.entry.as_ref())
            .map_or(Freshness::Absent, |entry| entry.freshness)
    }

    /// The cached entry for `window`, fresh or not, without fetching anything.
    pub async fn peek(&self, window: &QueryWindow) -> Option<CacheEntry> {
        self.slots
            .lock()
            .await
            .get(window)
            .and_then(|slot| slot.entry.clone())
    }

    /// Decides under the lock whether the caller serves from cache, leads a fetch, or follows one.
    async fn claim(&self, window: &QueryWindow) -> Role {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(window.clone()).or_default();
        if let Some(transactions) = slot.fresh() {
            return Role::Cached(transactions);
        }
        if let Some(in_flight) = &slot.in_flight {
            return Role::Follower {
                id: in_flight.id,
                rx: in_flight.rx.clone(),
            };
        }
        let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = watch::channel(None);
        slot.in_flight = Some(InFlight { id, rx });
        Role::Leader {
            id,
            epoch: slot.epoch,
            tx,
        }
    }

    async fn fetch(
        &self,
        window: &QueryWindow,
        id: u64,
        epoch: u64,
        tx: watch::Sender<Option<Shared>>,
    ) -> Result<Arc<Vec<Transaction>>> {
        debug!("Fetching {window} from the ledger store");
        let result = self.store.list_transactions(window).await;

        let mut slots = self.slots.lock().await;
        let slot = slots.entry(window.clone()).or_default();
        if slot.in_flight.as_ref().is_some_and(|f| f.id == id) {
            slot.in_flight = None;
        }
        match result {
            Ok(transactions) => {
                let transactions = Arc::new(transactions);
                if slot.epoch == epoch {
                    slot.entry = Some(CacheEntry {
                        transactions: transactions.clone(),
                        freshness: Freshness::Fresh,
                    });
                } else {
                    debug!("Fetch for {window} was superseded while in flight, not caching it");
                }
                tx.send_replace(Some(Ok(transactions.clone())));
                Ok(transactions)
            }
            Err(e) => {
                warn!("Unable to fetch {window}: {e:#}");
                tx.send_replace(Some(Err(format!("{e:#}"))));
                Err(e)
                    .with_context(|| format!("Unable to list transactions for {window}"))
                    .pub_result(ErrorType::Store)
            }
        }
    }

    /// Forgets an in-flight fetch whose leader went away without answering.
    async fn abandon(&self, window: &QueryWindow, id: u64) {
        if let Some(slot) = self.slots.lock().await.get_mut(window) {
            if slot.in_flight.as_ref().is_some_and(|f| f.id == id) {
                debug!("Abandoning the orphaned fetch for {window}");
                slot.in_flight = None;
            }
        }
    }
}

fn apply_patch(window: &QueryWindow, slot: &mut Slot, transaction: &Transaction) -> bool {
    match slot
        .patch(window, transaction)
        .pub_result(ErrorType::StaleWindow)
    {
        Ok(patched) => {
            if patched {
                debug!("Patched {window} with transaction '{}'", transaction.id());
            }
            patched
        }
        Err(e) => {
            debug!("{} error: {e}, falling back to refetch", e.error_type());
            slot.mark_stale();
            false
        }
    }
}
