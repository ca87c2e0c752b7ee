//! The mutation gate: every create, update and delete passes through a confirmation step before
//! the ledger store is touched.
//!
//! A mutation attempt moves `Idle -> AwaitingConfirmation -> {Cancelled | Submitting}` and from
//! `Submitting` to `Succeeded` or `Failed`. Input is validated in `begin`, so a bad form never
//! reaches confirmation. Cache patches and invalidations happen only after the store confirms.

use crate::cache::LedgerCache;
use crate::error::{Error, ErrorType, IntoResult, Result};
use crate::events::{Events, LedgerEvent};
use crate::model::{
    Transaction, TransactionDraft, TransactionForm, TransactionId, TransactionType, UserId,
};
use crate::session::Session;
use crate::window::Period;
use anyhow::Context;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long the success message stays up before the listing is shown.
pub const DEFAULT_FOLLOW_UP_DELAY: Duration = Duration::from_secs(2);

/// The kind of change a mutation makes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    Create,
    Update,
    Delete,
}

serde_plain::derive_display_from_serialize!(MutationAction);

impl MutationAction {
    /// The yes/no question asked before submitting.
    pub fn prompt(&self) -> &'static str {
        match self {
            MutationAction::Create => "Are you sure you want to add this transaction?",
            MutationAction::Update => "Are you sure you want to update this transaction?",
            MutationAction::Delete => "Do you want to delete this transaction?",
        }
    }

    fn succeeded(&self) -> &'static str {
        match self {
            MutationAction::Create => "Transaction added successfully.",
            MutationAction::Update => "Transaction updated successfully.",
            MutationAction::Delete => "Transaction deleted successfully.",
        }
    }

    fn failed(&self) -> &'static str {
        match self {
            MutationAction::Create => "Error saving transaction.",
            MutationAction::Update => "Error updating transaction.",
            MutationAction::Delete => "Error deleting transaction.",
        }
    }

    fn cancelled(&self) -> &'static str {
        match self {
            MutationAction::Create => "Transaction canceled.",
            MutationAction::Update => "Transaction update canceled.",
            MutationAction::Delete => "Transaction deletion canceled.",
        }
    }
}

/// Where a mutation attempt stands.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    #[default]
    Idle,
    AwaitingConfirmation,
    /// Terminal. The user declined and the store was never contacted.
    Cancelled,
    Submitting,
    /// Terminal.
    Succeeded,
    /// Terminal. The store reported an error; the cache was not touched.
    Failed,
}

serde_plain::derive_display_from_serialize!(GateState);

impl GateState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GateState::Cancelled | GateState::Succeeded | GateState::Failed
        )
    }
}

/// What the user asked to do, before validation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum MutationIntent {
    Create(TransactionForm),
    Update {
        id: TransactionId,
        form: TransactionForm,
    },
    Delete {
        id: TransactionId,
    },
}

impl MutationIntent {
    pub fn action(&self) -> MutationAction {
        match self {
            MutationIntent::Create(_) => MutationAction::Create,
            MutationIntent::Update { .. } => MutationAction::Update,
            MutationIntent::Delete { .. } => MutationAction::Delete,
        }
    }
}

/// A validated intent waiting for the user's answer.
#[derive(Debug, Clone)]
enum Prepared {
    Create(TransactionDraft),
    Update(TransactionId, TransactionDraft),
    Delete(TransactionId),
}

impl Prepared {
    fn action(&self) -> MutationAction {
        match self {
            Prepared::Create(_) => MutationAction::Create,
            Prepared::Update(..) => MutationAction::Update,
            Prepared::Delete(_) => MutationAction::Delete,
        }
    }
}

#[derive(Debug, Clone)]
struct Pending {
    user_id: UserId,
    prepared: Prepared,
}

/// Answers the confirmation question. Implemented by interactive front ends and by `bool` for a
/// fixed answer.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(*self)
    }
}

/// The navigation to perform after a successful create or update: show the listing of the
/// transaction's type for the transaction's month once `delay` has passed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct FollowUp {
    bucket: TransactionType,
    period: Period,
    #[serde(skip)]
    delay: Duration,
}

impl FollowUp {
    fn for_transaction(transaction: &Transaction, delay: Duration) -> Self {
        let date = transaction.date();
        Self {
            bucket: transaction.r#type(),
            period: Period::Month {
                month: date.month(),
                year: date.year(),
            },
            delay,
        }
    }

    pub fn bucket(&self) -> TransactionType {
        self.bucket
    }

    /// Always a `Period::Month`.
    pub fn period(&self) -> Period {
        self.period
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Starts the timer. Must be called from within a tokio runtime.
    pub fn schedule(self) -> ScheduledNavigation {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(self.delay).await;
            self
        });
        ScheduledNavigation { handle }
    }
}

/// A pending `FollowUp` that can be awaited or cancelled.
#[derive(Debug)]
pub struct ScheduledNavigation {
    handle: JoinHandle<FollowUp>,
}

impl ScheduledNavigation {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Resolves once the delay has passed. Returns `None` if the navigation was cancelled.
    pub async fn wait(self) -> Option<FollowUp> {
        self.handle.await.ok()
    }
}

/// The terminal result of a mutation attempt.
#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
    action: MutationAction,
    state: GateState,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction: Option<Transaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    follow_up: Option<FollowUp>,
}

impl MutationOutcome {
    fn new(action: MutationAction, state: GateState, message: &str) -> Self {
        Self {
            action,
            state,
            message: message.to_string(),
            transaction: None,
            detail: None,
            follow_up: None,
        }
    }

    pub fn action(&self) -> MutationAction {
        self.action
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// The text to show the user.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The created or updated transaction.
    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    /// The underlying store error of a failed mutation.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn follow_up(&self) -> Option<FollowUp> {
        self.follow_up
    }
}

/// Guards create, update and delete for one session.
pub struct MutationGate {
    cache: Arc<LedgerCache>,
    session: Session,
    events: Events,
    follow_up_delay: Duration,
    state: GateState,
    pending: Option<Pending>,
}

impl MutationGate {
    pub fn new(cache: Arc<LedgerCache>, session: Session, events: Events) -> Self {
        Self {
            cache,
            session,
            events,
            follow_up_delay: DEFAULT_FOLLOW_UP_DELAY,
            state: GateState::Idle,
            pending: None,
        }
    }

    pub fn with_follow_up_delay(mut self, delay: Duration) -> Self {
        self.follow_up_delay = delay;
        self
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Reads a transaction from the store, bypassing the cache, and returns a form pre-filled
    /// with its fields.
    ///
    /// # Errors
    /// - `ErrorType::Session` if there is no user.
    /// - `ErrorType::Validation` if the user has no transaction with this ID.
    /// - `ErrorType::Store` if the store fails.
    pub async fn load_form(&self, id: &TransactionId) -> Result<TransactionForm> {
        let user_id = self.user_id()?;
        let found = self
            .cache
            .store()
            .get_transaction(user_id, id)
            .await
            .with_context(|| format!("Unable to load transaction '{id}'"))
            .pub_result(ErrorType::Store)?;
        match found {
            Some(transaction) => Ok(TransactionForm::from(&transaction)),
            None => Err(Error::msg(
                ErrorType::Validation,
                format!("Transaction '{id}' was not found"),
            )),
        }
    }

    /// Validates `intent` and moves to `AwaitingConfirmation`. Returns the question to ask.
    ///
    /// May be called from `Idle`, from any terminal state (a retry starts from scratch), or while
    /// awaiting confirmation, in which case the earlier intent is discarded.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if the form is invalid. The gate returns to `Idle`.
    /// - `ErrorType::Session` if there is no user.
    pub fn begin(&mut self, intent: MutationIntent) -> Result<&'static str> {
        let action = intent.action();
        if self.state == GateState::Submitting {
            return Err(Error::msg(
                ErrorType::Internal,
                "A mutation is already being submitted",
            ));
        }
        self.pending = None;

        let prepared = match self.prepare(intent) {
            Ok(prepared) => prepared,
            Err(e) => {
                debug!("Rejected {action}: {e}");
                let message = (e.error_type() == ErrorType::Validation).then(|| e.message());
                self.transition(action, GateState::Idle, message);
                return Err(e);
            }
        };
        let user_id = match self.user_id() {
            Ok(user_id) => user_id.clone(),
            Err(e) => {
                self.transition(action, GateState::Idle, None);
                return Err(e);
            }
        };

        self.pending = Some(Pending { user_id, prepared });
        self.transition(
            action,
            GateState::AwaitingConfirmation,
            Some(action.prompt().to_string()),
        );
        Ok(action.prompt())
    }

    /// Supplies the user's answer. Declining cancels without contacting the store. Accepting
    /// submits to the store and applies the cache effect on success.
    ///
    /// A store failure is not an `Err`: it is reported as a `Failed` outcome and the user may
    /// retry by calling `begin` again.
    ///
    /// # Errors
    /// Returns an `ErrorType::Internal` error if nothing is awaiting confirmation.
    pub async fn confirm(&mut self, answer: bool) -> Result<MutationOutcome> {
        if self.state != GateState::AwaitingConfirmation {
            return Err(Error::msg(
                ErrorType::Internal,
                format!("No mutation is awaiting confirmation (state is {})", self.state),
            ));
        }
        let Some(pending) = self.pending.take() else {
            return Err(Error::msg(
                ErrorType::Internal,
                "The pending mutation is missing",
            ));
        };
        let action = pending.prepared.action();

        if !answer {
            info!("{}", action.cancelled());
            let outcome = MutationOutcome::new(action, GateState::Cancelled, action.cancelled());
            self.finish(&outcome);
            return Ok(outcome);
        }

        self.transition(action, GateState::Submitting, None);
        let outcome = match self.submit(&pending).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{} {e:#}", action.failed());
                let mut outcome = MutationOutcome::new(action, GateState::Failed, action.failed());
                outcome.detail = Some(format!("{e:#}"));
                outcome
            }
        };
        self.finish(&outcome);
        Ok(outcome)
    }

    /// `begin`, ask `confirm`, then `confirm`.
    pub async fn run(
        &mut self,
        intent: MutationIntent,
        confirm: &dyn Confirm,
    ) -> Result<MutationOutcome> {
        let prompt = self.begin(intent)?;
        let answer = match confirm.confirm(prompt) {
            Ok(answer) => answer,
            Err(e) => {
                // Nothing was submitted, so the attempt simply ends
                self.pending = None;
                self.state = GateState::Idle;
                return Err(e);
            }
        };
        self.confirm(answer).await
    }

    fn user_id(&self) -> Result<&UserId> {
        self.session.user_id().ok_or_else(|| {
            Error::msg(
                ErrorType::Session,
                "No user is signed in, set a user with 'fintrack init --user' or '--user'",
            )
        })
    }

    fn prepare(&self, intent: MutationIntent) -> Result<Prepared> {
        Ok(match intent {
            MutationIntent::Create(form) => Prepared::Create(form.validate()?),
            MutationIntent::Update { id, form } => Prepared::Update(id, form.validate()?),
            MutationIntent::Delete { id } => Prepared::Delete(id),
        })
    }

    async fn submit(&self, pending: &Pending) -> anyhow::Result<MutationOutcome> {
        let store = self.cache.store();
        let user_id = &pending.user_id;
        let action = pending.prepared.action();
        let mut outcome = MutationOutcome::new(action, GateState::Succeeded, action.succeeded());
        match &pending.prepared {
            Prepared::Create(draft) => {
                let created = store.create_transaction(user_id, draft).await?;
                info!("Created transaction '{}'", created.id());
                self.cache.patch_all_on_create(&created).await;
                outcome.follow_up = Some(FollowUp::for_transaction(
                    &created,
                    self.follow_up_delay,
                ));
                outcome.transaction = Some(created);
            }
            Prepared::Update(id, draft) => {
                let updated = store.update_transaction(user_id, id, draft).await?;
                info!("Updated transaction '{id}'");
                // The old date may have been in any window
                self.cache.invalidate_all().await;
                outcome.follow_up = Some(FollowUp::for_transaction(
                    &updated,
                    self.follow_up_delay,
                ));
                outcome.transaction = Some(updated);
            }
            Prepared::Delete(id) => {
                let deleted = store.delete_transaction(user_id, id).await?;
                info!("Deleted transaction '{deleted}'");
                self.cache.invalidate_all().await;
            }
        }
        Ok(outcome)
    }

    fn finish(&mut self, outcome: &MutationOutcome) {
        self.transition(
            outcome.action,
            outcome.state,
            Some(outcome.message.clone()),
        );
    }

    fn transition(&mut self, action: MutationAction, state: GateState, message: Option<String>) {
        debug!("{action} mutation: {} -> {state}", self.state);
        self.state = state;
        self.events.emit(LedgerEvent::MutationStateChanged {
            action,
            state,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Freshness;
    use crate::model::INVALID_DETAILS;
    use crate::test::{fixtures, Op, SpyStore};
    use crate::window::{month_window, year_window};
    use tokio::sync::broadcast::error::TryRecvError;

    struct Harness {
        store: Arc<SpyStore>,
        cache: Arc<LedgerCache>,
        events: Events,
        gate: MutationGate,
    }

    fn harness(session: Session) -> Harness {
        let store = Arc::new(SpyStore::new(fixtures::year_2024()));
        let cache = Arc::new(LedgerCache::new(store.clone()));
        let events = Events::new();
        let gate = MutationGate::new(cache.clone(), session, events.clone())
            .with_follow_up_delay(Duration::from_millis(5));
        Harness {
            store,
            cache,
            events,
            gate,
        }
    }

    fn u1() -> UserId {
        UserId::new("u1")
    }

    fn side_gig() -> MutationIntent {
        MutationIntent::Create(TransactionForm::new(
            "Side gig",
            "75.25",
            "income",
            "2024-06-20",
        ))
    }

    #[tokio::test]
    async fn test_create_confirmed_patches_cache() {
        let mut h = harness(Session::new("u1"));
        let june = month_window(&u1(), 6, 2024).unwrap();
        let year = year_window(&u1(), 2024).unwrap();
        h.cache.get(&june).await.unwrap();
        h.cache.get(&year).await.unwrap();

        let outcome = h.gate.run(side_gig(), &true).await.unwrap();
        assert_eq!(outcome.state(), GateState::Succeeded);
        assert_eq!(outcome.message(), "Transaction added successfully.");
        assert_eq!(h.gate.state(), GateState::Succeeded);

        let created = outcome.transaction().unwrap().clone();
        assert!(h.cache.get(&june).await.unwrap().contains(&created));
        assert!(h.cache.get(&year).await.unwrap().contains(&created));
        assert_eq!(h.store.calls(Op::List), 2);
        assert_eq!(h.store.calls(Op::Create), 1);

        let follow_up = outcome.follow_up().unwrap();
        assert_eq!(follow_up.bucket(), TransactionType::Income);
        assert_eq!(follow_up.period(), Period::month(6, 2024).unwrap());
    }

    #[tokio::test]
    async fn test_declined_create_never_contacts_store() {
        let mut h = harness(Session::new("u1"));
        let june = month_window(&u1(), 6, 2024).unwrap();
        h.cache.get(&june).await.unwrap();
        let before = h.cache.peek(&june).await.unwrap();

        let prompt = h.gate.begin(side_gig()).unwrap();
        assert_eq!(prompt, "Are you sure you want to add this transaction?");
        assert_eq!(h.gate.state(), GateState::AwaitingConfirmation);

        let outcome = h.gate.confirm(false).await.unwrap();
        assert_eq!(outcome.state(), GateState::Cancelled);
        assert_eq!(outcome.message(), "Transaction canceled.");
        assert!(outcome.follow_up().is_none());
        assert_eq!(h.store.mutations(), 0);

        let after = h.cache.peek(&june).await.unwrap();
        assert_eq!(after.transactions(), before.transactions());
        assert_eq!(after.freshness(), Freshness::Fresh);
    }

    #[tokio::test]
    async fn test_declined_update_and_delete_messages() {
        let mut h = harness(Session::new("u1"));
        let update = MutationIntent::Update {
            id: TransactionId::new("t1"),
            form: TransactionForm::new("Salary", "310", "income", "2024-01-10"),
        };
        assert_eq!(
            h.gate.begin(update).unwrap(),
            "Are you sure you want to update this transaction?"
        );
        let outcome = h.gate.confirm(false).await.unwrap();
        assert_eq!(outcome.message(), "Transaction update canceled.");

        let delete = MutationIntent::Delete {
            id: TransactionId::new("t1"),
        };
        let outcome = h.gate.run(delete, &false).await.unwrap();
        assert_eq!(outcome.message(), "Transaction deletion canceled.");
        assert_eq!(h.store.mutations(), 0);
    }

    #[tokio::test]
    async fn test_invalid_forms_never_reach_confirmation() {
        let mut h = harness(Session::new("u1"));
        let bad_forms = [
            TransactionForm::new("", "10", "income", "2024-06-20"),
            TransactionForm::new("Gift", "0", "income", "2024-06-20"),
            TransactionForm::new("Gift", "-5", "income", "2024-06-20"),
            TransactionForm::new("Gift", "ten", "income", "2024-06-20"),
            TransactionForm::new("Gift", "10", "transfer", "2024-06-20"),
            TransactionForm::new("Gift", "10", "income", "2024-02-30"),
        ];
        for form in bad_forms {
            let err = h.gate.begin(MutationIntent::Create(form)).unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Validation);
            assert_eq!(err.message(), INVALID_DETAILS);
            assert_eq!(h.gate.state(), GateState::Idle);
        }
        assert!(h.gate.confirm(true).await.is_err());
        assert_eq!(h.store.mutations(), 0);
    }

    #[tokio::test]
    async fn test_no_user_is_a_session_error() {
        let mut h = harness(Session::anonymous());
        let err = h.gate.begin(side_gig()).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Session);
        assert_eq!(h.gate.state(), GateState::Idle);
        let err = h.gate.load_form(&TransactionId::new("t1")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Session);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_cache_and_allows_retry() {
        let mut h = harness(Session::new("u1"));
        let june = month_window(&u1(), 6, 2024).unwrap();
        h.cache.get(&june).await.unwrap();
        h.store.fail(Op::Create, true);

        let outcome = h.gate.run(side_gig(), &true).await.unwrap();
        assert_eq!(outcome.state(), GateState::Failed);
        assert_eq!(outcome.message(), "Error saving transaction.");
        assert!(outcome.detail().unwrap().contains("unavailable"));
        assert_eq!(h.cache.freshness(&june).await, Freshness::Fresh);
        assert_eq!(h.cache.get(&june).await.unwrap().len(), 2);

        h.store.fail(Op::Create, false);
        let retry = h.gate.run(side_gig(), &true).await.unwrap();
        assert_eq!(retry.state(), GateState::Succeeded);
        assert_eq!(h.cache.get(&june).await.unwrap().len(), 3);
        assert_eq!(h.store.calls(Op::Create), 2);
        assert_eq!(h.store.calls(Op::List), 1);
    }

    #[tokio::test]
    async fn test_update_invalidates_every_window() {
        let mut h = harness(Session::new("u1"));
        let jan = month_window(&u1(), 1, 2024).unwrap();
        let june = month_window(&u1(), 6, 2024).unwrap();
        h.cache.get(&jan).await.unwrap();
        h.cache.get(&june).await.unwrap();

        // Moves the salary from January to June
        let intent = MutationIntent::Update {
            id: TransactionId::new("t1"),
            form: TransactionForm::new("Salary", "300", "income", "2024-06-01"),
        };
        let outcome = h.gate.run(intent, &true).await.unwrap();
        assert_eq!(outcome.message(), "Transaction updated successfully.");
        assert_eq!(
            outcome.follow_up().unwrap().period(),
            Period::month(6, 2024).unwrap()
        );
        assert_eq!(h.cache.freshness(&jan).await, Freshness::Stale);
        assert_eq!(h.cache.freshness(&june).await, Freshness::Stale);

        assert!(h.cache.get(&jan).await.unwrap().is_empty());
        assert_eq!(h.cache.get(&june).await.unwrap().len(), 3);
        assert_eq!(h.store.calls(Op::List), 4);
    }

    #[tokio::test]
    async fn test_delete_invalidates_and_has_no_follow_up() {
        let mut h = harness(Session::new("u1"));
        let year = year_window(&u1(), 2024).unwrap();
        h.cache.get(&year).await.unwrap();

        let intent = MutationIntent::Delete {
            id: TransactionId::new("t4"),
        };
        let outcome = h.gate.run(intent, &true).await.unwrap();
        assert_eq!(outcome.message(), "Transaction deleted successfully.");
        assert!(outcome.follow_up().is_none());
        assert_eq!(h.cache.get(&year).await.unwrap().len(), 3);
        assert_eq!(h.store.calls(Op::List), 2);
    }

    #[tokio::test]
    async fn test_failed_delete_of_unknown_id() {
        let mut h = harness(Session::new("u1"));
        let year = year_window(&u1(), 2024).unwrap();
        h.cache.get(&year).await.unwrap();
        let intent = MutationIntent::Delete {
            id: TransactionId::new("nope"),
        };
        let outcome = h.gate.run(intent, &true).await.unwrap();
        assert_eq!(outcome.state(), GateState::Failed);
        assert_eq!(outcome.message(), "Error deleting transaction.");
        assert_eq!(h.cache.freshness(&year).await, Freshness::Fresh);
    }

    #[tokio::test]
    async fn test_load_form_reads_the_store() {
        let h = harness(Session::new("u1"));
        let form = h.gate.load_form(&TransactionId::new("t3")).await.unwrap();
        assert_eq!(
            form,
            TransactionForm::new("Bonus", "200", "income", "2024-06-15")
        );
        assert_eq!(h.store.calls(Op::Get), 1);
        assert_eq!(h.store.calls(Op::List), 0);

        let err = h
            .gate
            .load_form(&TransactionId::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_state_changes_are_emitted() {
        let mut h = harness(Session::new("u1"));
        let mut rx = h.events.subscribe();
        h.gate.run(side_gig(), &false).await.unwrap();

        let mut states = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(LedgerEvent::MutationStateChanged { state, .. }) => states.push(state),
                Ok(_) => {}
                Err(TryRecvError::Empty) => break,
                Err(e) => panic!("{e}"),
            }
        }
        assert_eq!(
            states,
            vec![GateState::AwaitingConfirmation, GateState::Cancelled]
        );
    }

    #[tokio::test]
    async fn test_follow_up_can_be_awaited_or_cancelled() {
        let mut h = harness(Session::new("u1"));
        let outcome = h.gate.run(side_gig(), &true).await.unwrap();
        let follow_up = outcome.follow_up().unwrap();
        assert_eq!(follow_up.delay(), Duration::from_millis(5));

        let arrived = follow_up.schedule().wait().await.unwrap();
        assert_eq!(arrived.bucket(), TransactionType::Income);

        let slow = FollowUp {
            delay: Duration::from_secs(60),
            ..follow_up
        };
        let scheduled = slow.schedule();
        scheduled.cancel();
        assert!(scheduled.wait().await.is_none());
    }
}
