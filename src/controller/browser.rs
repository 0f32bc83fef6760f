//! Repository browser controller
//!
//! Two layers:
//!
//! - [`BrowserMachine`] is synchronous and owns every decision: which request
//!   an intent issues, when the search debounce fires, and whether a finished
//!   request may still be folded into state.
//! - [`BrowserController`] runs a machine on a tokio task. Intents and
//!   finished requests are applied one at a time; snapshots are published on
//!   a watch channel.
//!
//! Every issued request carries a sequence number. A result is applied only
//! when its number is still the latest issued one, so a slow response for a
//! superseded search can never overwrite fresher state. Network calls are not
//! cancelled; stale results are dropped when they arrive.

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};

use crate::core::model::RepositorySummary;
use crate::core::outcome::Outcome;
use crate::core::usecases::RepositoryQueries;

/// Quiet period before a typed search is sent
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// What the displayed list is a listing of
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryContext {
    /// The user's repositories, unfiltered
    #[default]
    Default,
    /// Repositories matching a non-blank search term
    Search(String),
}

impl QueryContext {
    fn for_term(term: &str) -> Self {
        if term.trim().is_empty() {
            QueryContext::Default
        } else {
            QueryContext::Search(term.to_string())
        }
    }
}

/// One page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub context: QueryContext,
    pub page: u32,
    /// Append to the current items instead of replacing them
    pub append: bool,
}

/// A request tagged with its sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub request: QueryRequest,
}

/// User intents accepted by the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserIntent {
    Refresh,
    Search(String),
    LoadMore,
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BrowserStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    LoadedEmpty,
    Error(String),
}

/// Snapshot handed to the UI
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrowserState {
    pub status: BrowserStatus,
    pub items: Vec<RepositorySummary>,
    pub has_more: bool,
    /// Last page folded into `items`
    pub page: u32,
    /// Search input as typed
    pub search_term: String,
    /// Query the current `items` came from
    pub active_query: QueryContext,
}

impl BrowserState {
    pub fn is_loading(&self) -> bool {
        self.status == BrowserStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            BrowserStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Browser state machine
#[derive(Debug)]
pub struct BrowserMachine {
    state: BrowserState,
    page_size: u32,
    debounce: Duration,
    deadline: Option<Instant>,
    latest_seq: u64,
    last_request: Option<QueryRequest>,
}

impl BrowserMachine {
    pub fn new(page_size: u32, debounce: Duration) -> Self {
        Self {
            state: BrowserState::default(),
            page_size,
            debounce,
            deadline: None,
            latest_seq: 0,
            last_request: None,
        }
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    /// When the pending search fires, if one is pending
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Reload page 1 of the default listing
    ///
    /// Drops the held search term and any pending debounce.
    pub fn refresh(&mut self) -> Ticket {
        self.deadline = None;
        self.state.search_term.clear();
        self.issue(QueryRequest {
            context: QueryContext::Default,
            page: 1,
            append: false,
        })
    }

    /// Record a keystroke and restart the debounce window
    ///
    /// Returns false when `text` equals the held term.
    pub fn search(&mut self, text: &str, now: Instant) -> bool {
        if self.state.search_term == text {
            return false;
        }

        self.state.search_term = text.to_string();
        self.deadline = Some(now + self.debounce);
        // Whatever is in flight answers an older term.
        self.latest_seq += 1;
        true
    }

    /// Issue the debounced search if its window has elapsed
    ///
    /// Nothing is issued when the settled term resolves to the query already
    /// on display, so pages loaded for it are kept.
    pub fn fire_debounce(&mut self, now: Instant) -> Option<Ticket> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                let context = QueryContext::for_term(&self.state.search_term);
                if self.is_displaying(&context) {
                    tracing::debug!(query = ?context, "search settled on displayed query");
                    return None;
                }
                Some(self.issue(QueryRequest {
                    context,
                    page: 1,
                    append: false,
                }))
            }
            _ => None,
        }
    }

    fn is_displaying(&self, context: &QueryContext) -> bool {
        matches!(
            self.state.status,
            BrowserStatus::Loaded | BrowserStatus::LoadedEmpty
        ) && self.state.active_query == *context
    }

    /// Next page of the displayed query
    pub fn load_more(&mut self) -> Option<Ticket> {
        if self.state.status != BrowserStatus::Loaded || !self.state.has_more {
            return None;
        }

        Some(self.issue(QueryRequest {
            context: self.state.active_query.clone(),
            page: self.state.page + 1,
            append: true,
        }))
    }

    /// Re-issue the last request as it was parameterized
    ///
    /// Does nothing before the first request.
    pub fn retry(&mut self) -> Option<Ticket> {
        let request = self.last_request.clone()?;
        Some(self.issue(request))
    }

    pub fn handle(&mut self, intent: BrowserIntent, now: Instant) -> Option<Ticket> {
        match intent {
            BrowserIntent::Refresh => Some(self.refresh()),
            BrowserIntent::Search(text) => {
                self.search(&text, now);
                None
            }
            BrowserIntent::LoadMore => self.load_more(),
            BrowserIntent::Retry => self.retry(),
        }
    }

    fn issue(&mut self, request: QueryRequest) -> Ticket {
        self.latest_seq += 1;
        self.state.status = BrowserStatus::Loading;
        self.last_request = Some(request.clone());

        tracing::debug!(
            seq = self.latest_seq,
            page = request.page,
            query = ?request.context,
            "issuing repository query"
        );

        Ticket {
            seq: self.latest_seq,
            request,
        }
    }

    /// Fold a finished request into state
    ///
    /// Returns false when the result was discarded as stale.
    pub fn complete(&mut self, seq: u64, outcome: Outcome<Vec<RepositorySummary>>) -> bool {
        if seq != self.latest_seq {
            tracing::debug!(seq, latest = self.latest_seq, "discarding stale result");
            return false;
        }

        let Some(request) = self.last_request.clone() else {
            return false;
        };

        match outcome {
            Outcome::Ok(items) if request.append => {
                let returned = items.len();
                let known: HashSet<String> =
                    self.state.items.iter().map(|r| r.full_name()).collect();
                self.state
                    .items
                    .extend(items.into_iter().filter(|r| !known.contains(&r.full_name())));
                self.state.has_more = returned >= self.page_size as usize;
                self.state.page = request.page;
                self.state.status = if self.state.items.is_empty() {
                    BrowserStatus::LoadedEmpty
                } else {
                    BrowserStatus::Loaded
                };
            }
            Outcome::Ok(items) => {
                self.state.status = if items.is_empty() {
                    BrowserStatus::LoadedEmpty
                } else {
                    BrowserStatus::Loaded
                };
                self.state.has_more = !items.is_empty();
                self.state.items = items;
                self.state.page = request.page;
                self.state.active_query = request.context;
            }
            Outcome::Failed { message, .. } => {
                self.state.status = BrowserStatus::Error(message);
            }
            Outcome::Pending => return false,
        }
        true
    }
}

struct Completion {
    seq: u64,
    outcome: Outcome<Vec<RepositorySummary>>,
}

/// Handle to a running browser controller
///
/// The controller task stops once every handle has been dropped.
#[derive(Clone)]
pub struct BrowserController {
    intents: mpsc::UnboundedSender<BrowserIntent>,
    state: watch::Receiver<BrowserState>,
}

impl BrowserController {
    /// Start the controller and issue the initial listing
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(queries: RepositoryQueries, debounce: Duration) -> Self {
        let machine = BrowserMachine::new(queries.page_size, debounce);
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(machine.state().clone());

        tokio::spawn(run(machine, queries, intent_rx, state_tx));

        Self {
            intents: intent_tx,
            state: state_rx,
        }
    }

    pub fn refresh(&self) {
        self.send(BrowserIntent::Refresh);
    }

    pub fn search(&self, text: impl Into<String>) {
        self.send(BrowserIntent::Search(text.into()));
    }

    pub fn load_more(&self) {
        self.send(BrowserIntent::LoadMore);
    }

    pub fn retry(&self) {
        self.send(BrowserIntent::Retry);
    }

    /// Current snapshot
    pub fn state(&self) -> BrowserState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<BrowserState> {
        self.state.clone()
    }

    fn send(&self, intent: BrowserIntent) {
        if self.intents.send(intent).is_err() {
            tracing::warn!("browser controller has stopped; intent dropped");
        }
    }
}

async fn run(
    mut machine: BrowserMachine,
    queries: RepositoryQueries,
    mut intents: mpsc::UnboundedReceiver<BrowserIntent>,
    state_tx: watch::Sender<BrowserState>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();

    let ticket = machine.refresh();
    dispatch(&queries, ticket, &done_tx);
    publish(&state_tx, &machine);

    loop {
        let deadline = machine.deadline();

        tokio::select! {
            intent = intents.recv() => {
                let Some(intent) = intent else { break };
                if let Some(ticket) = machine.handle(intent, Instant::now()) {
                    dispatch(&queries, ticket, &done_tx);
                }
            }
            Some(done) = done_rx.recv() => {
                machine.complete(done.seq, done.outcome);
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(ticket) = machine.fire_debounce(Instant::now()) {
                    dispatch(&queries, ticket, &done_tx);
                }
            }
        }

        publish(&state_tx, &machine);
    }
}

fn dispatch(queries: &RepositoryQueries, ticket: Ticket, done: &mpsc::UnboundedSender<Completion>) {
    let queries = queries.clone();
    let done = done.clone();

    tokio::spawn(async move {
        let Ticket { seq, request } = ticket;
        let outcome = match &request.context {
            QueryContext::Default => queries.list.run(request.page).await,
            QueryContext::Search(term) => queries.search.run_page(term, request.page).await,
        };
        // The controller may already be gone.
        let _ = done.send(Completion { seq, outcome });
    });
}

fn publish(state_tx: &watch::Sender<BrowserState>, machine: &BrowserMachine) {
    state_tx.send_if_modified(|current| {
        if current == machine.state() {
            false
        } else {
            *current = machine.state().clone();
            true
        }
    });
}
