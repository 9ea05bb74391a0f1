//! Public surface: start, cancel and observe remote requests.
//!
//! - Owns one [`RequestSlot`] per [`QueryKind`] and one result cell per kind.
//! - Submits units of work to the [`Executor`] and arms a timeout for each.
//! - Never blocks the caller; results arrive through the cells.
mod config;
pub use config::DispatcherConfig;

use std::sync::{Arc, Weak};

use slotfetch_model::{FetchQuery, Page, QueryKind, SearchQuery};
use tracing::{debug, instrument, trace};

use crate::{
    cell::Observable,
    error::CoreError,
    executor::{Executor, RequestId, WorkHandle},
    metrics::{MetricsHandle, noop_metrics},
    remote::RemoteService,
    slot::RequestSlot,
    unit::{self, FetchFlow, Flow, SearchFlow},
};

/// Result cell of a query kind, as returned by [`Dispatcher::results`].
#[derive(Debug)]
pub enum Results<'a, I> {
    /// Accumulated search results; `None` after a failed search.
    List(&'a Observable<Option<Vec<I>>>),
    /// Last fetched item; `None` after a failed fetch.
    Item(&'a Observable<Option<I>>),
}

struct Inner<S: RemoteService> {
    remote: Arc<S>,
    config: DispatcherConfig,
    executor: Executor,
    metrics: MetricsHandle,
    search_slot: RequestSlot,
    fetch_slot: RequestSlot,
    search_results: Arc<Observable<Option<Vec<S::Item>>>>,
    item_result: Arc<Observable<Option<S::Item>>>,
    timed_out: Arc<Observable<bool>>,
}

/// Single-flight, timeout-bounded request dispatcher.
///
/// Cloning is cheap and every clone shares the same slots and cells, so the application
/// builds one dispatcher and hands clones to whoever needs to start or observe requests.
///
/// Starting a request of a kind that already has one in flight does **not** cancel the
/// earlier unit; it only stops referencing it. Call [`Dispatcher::cancel_all`] first to
/// suppress a stale result deterministically.
pub struct Dispatcher<S: RemoteService> {
    inner: Arc<Inner<S>>,
}

impl<S: RemoteService> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: RemoteService> Dispatcher<S> {
    /// Build a dispatcher on the current tokio runtime with no-op metrics.
    pub fn new(remote: S, config: DispatcherConfig) -> Result<Self, CoreError> {
        Self::builder(remote, config).build()
    }

    pub fn builder(remote: S, config: DispatcherConfig) -> DispatcherBuilder<S> {
        DispatcherBuilder {
            remote,
            config,
            executor: None,
            metrics: None,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.inner.config
    }

    /// Start a search for `text` at `page` (one-based).
    ///
    /// Fails only for `page == 0`.
    pub fn start_search(&self, text: impl Into<String>, page: u32) -> Result<(), CoreError> {
        let page = Page::new(page)?;
        self.submit_search(SearchQuery::new(text, page));
        Ok(())
    }

    /// Start fetching the resource `id`.
    ///
    /// Fails only for an empty id.
    pub fn start_fetch_by_id(&self, id: impl Into<String>) -> Result<(), CoreError> {
        let query = FetchQuery::new(id)?;
        self.submit_fetch(query);
        Ok(())
    }

    /// Submit a search unit and arm its timeout.
    ///
    /// When the timeout fires before the unit settled, the unit is asked to cancel and can
    /// no longer publish; the list cell keeps whatever it held before. The timer is dropped
    /// as soon as the unit finishes.
    #[instrument(level = "debug", skip(self, query), fields(query = %query.text, page = query.page.get()))]
    pub fn submit_search(&self, query: SearchQuery) -> RequestId {
        let inner = &self.inner;
        let flow = SearchFlow::new(
            Arc::clone(&inner.remote),
            inner.config.api_key.clone(),
            query,
            Arc::clone(&inner.search_results),
        );
        let handle = self.launch(&inner.search_slot, flow);

        let metrics = Arc::clone(&inner.metrics);
        let pending = handle.clone();
        inner.executor.schedule_after(&handle, inner.config.timeout(), move || {
            if !pending.try_expire() {
                trace!(request = %pending.id(), "timeout elapsed after settlement; ignored");
                return;
            }
            debug!(request = %pending.id(), "search timed out; requesting cancellation");
            metrics.record_timeout(QueryKind::Search);
            pending.cancel();
        });

        handle.id().clone()
    }

    /// Submit a fetch-by-id unit and arm its timeout.
    ///
    /// Resets the timed-out cell to `false` first. When the timeout fires before the unit
    /// settled and the unit is still the referenced fetch, the cell flips to `true`; the
    /// unit can then no longer publish, so a flagged fetch never delivers an item.
    #[instrument(level = "debug", skip(self, query), fields(id = %query.id()))]
    pub fn submit_fetch(&self, query: FetchQuery) -> RequestId {
        let inner = &self.inner;
        inner.timed_out.set(false);

        let flow = FetchFlow::new(
            Arc::clone(&inner.remote),
            inner.config.api_key.clone(),
            query,
            Arc::clone(&inner.item_result),
        );
        let handle = self.launch(&inner.fetch_slot, flow);

        let dispatcher: Weak<Inner<S>> = Arc::downgrade(&self.inner);
        let pending = handle.clone();
        inner.executor.schedule_after(&handle, inner.config.timeout(), move || {
            if !pending.try_expire() {
                trace!(request = %pending.id(), "timeout elapsed after settlement; ignored");
                return;
            }
            if let Some(inner) = dispatcher.upgrade() {
                if inner.fetch_slot.is_current(pending.id()) {
                    debug!(request = %pending.id(), "fetch-by-id timed out");
                    inner.timed_out.set(true);
                } else {
                    trace!(request = %pending.id(), "superseded fetch timed out; flag untouched");
                }
                inner.metrics.record_timeout(QueryKind::FetchById);
            }
            pending.cancel();
        });

        handle.id().clone()
    }

    /// Ask the referenced unit of every kind to cancel.
    ///
    /// Units no longer referenced by their slot (superseded by a later start) are not reached.
    pub fn cancel_all(&self) {
        let search = self.inner.search_slot.cancel();
        let fetch = self.inner.fetch_slot.cancel();
        debug!(search, fetch, "cancel requested for referenced units");
    }

    /// Result cell for `kind`.
    pub fn results(&self, kind: QueryKind) -> Results<'_, S::Item> {
        match kind {
            QueryKind::Search => Results::List(self.search_results()),
            QueryKind::FetchById => Results::Item(self.item_result()),
        }
    }

    /// Accumulated search results.
    pub fn search_results(&self) -> &Observable<Option<Vec<S::Item>>> {
        &self.inner.search_results
    }

    /// Last fetched item.
    pub fn item_result(&self) -> &Observable<Option<S::Item>> {
        &self.inner.item_result
    }

    /// `true` when the most recent fetch-by-id hit its timeout.
    pub fn timed_out(&self) -> &Observable<bool> {
        &self.inner.timed_out
    }

    /// Id of the unit currently referenced by the slot of `kind`.
    pub fn active_request(&self, kind: QueryKind) -> Option<RequestId> {
        self.slot(kind).current().map(|h| h.id().clone())
    }

    fn slot(&self, kind: QueryKind) -> &RequestSlot {
        match kind {
            QueryKind::Search => &self.inner.search_slot,
            QueryKind::FetchById => &self.inner.fetch_slot,
        }
    }

    fn launch<F: Flow>(&self, slot: &RequestSlot, flow: F) -> WorkHandle {
        let id = RequestId::next(flow.kind().as_str());
        let unit_id = id.clone();
        let metrics = Arc::clone(&self.inner.metrics);
        let executor = &self.inner.executor;

        slot.replace_with(move || {
            executor.submit(id, move |cancel| async move {
                unit::run(flow, unit_id, cancel, metrics).await;
            })
        })
    }
}

/// Builder for [`Dispatcher`] with optional executor and metrics overrides.
pub struct DispatcherBuilder<S: RemoteService> {
    remote: S,
    config: DispatcherConfig,
    executor: Option<Executor>,
    metrics: Option<MetricsHandle>,
}

impl<S: RemoteService> DispatcherBuilder<S> {
    /// Run units on `executor` instead of the current runtime.
    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Report unit lifecycle to `metrics`.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate the config and build the dispatcher.
    pub fn build(self) -> Result<Dispatcher<S>, CoreError> {
        self.config.validate()?;
        let executor = match self.executor {
            Some(executor) => executor,
            None => Executor::current()?,
        };

        debug!(
            remote = self.remote.name(),
            timeout_ms = self.config.timeout_ms,
            "dispatcher ready"
        );
        let inner = Inner {
            remote: Arc::new(self.remote),
            config: self.config,
            executor,
            metrics: self.metrics.unwrap_or_else(noop_metrics),
            search_slot: RequestSlot::new(QueryKind::Search),
            fetch_slot: RequestSlot::new(QueryKind::FetchById),
            search_results: Arc::new(Observable::new(None)),
            item_result: Arc::new(Observable::new(None)),
            timed_out: Arc::new(Observable::new(false)),
        };
        Ok(Dispatcher {
            inner: Arc::new(inner),
        })
    }
}
