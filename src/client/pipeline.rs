//! Request coalescing pipeline.
//!
//! Every setter on [`PaginationClient`] rebuilds the request URL and, when it
//! changed, queues a trigger for a background driver task. The driver drains
//! all triggers queued in the same burst, keeps only the last one and starts
//! one request for it, cancelling whatever request was still in flight. Only
//! the response of the latest request is ever published.
//!
//! A burst is everything queued before the driver gets to run. On a
//! current-thread runtime that is all setters called between two `.await`
//! points of the caller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::client::query_builder::QueryBuilder;
use crate::client::replay::ReplayChannel;
use crate::client::response::{Interpreted, interpret};
use crate::client::transport::{Transport, TransportError, TransportResponse};
use crate::client::{ClientError, ClientResult, FETCH_ALL_PAGE_SIZE, PaginationOptions};
use crate::domain::page::PageEnvelope;
use crate::domain::sort::SortSpec;

enum Trigger {
    /// The request state changed; duplicates of the previous state are dropped.
    State(String),
    /// Re-request even if the URL did not change.
    Refresh(String),
}

struct RequestState {
    base_url: String,
    query: QueryBuilder,
}

impl RequestState {
    fn url(&self) -> Option<String> {
        (!self.base_url.is_empty()).then(|| format!("{}{}", self.base_url, self.query.build()))
    }
}

struct Shared<T> {
    state: Mutex<RequestState>,
    triggers: UnboundedSender<Trigger>,
    results: ReplayChannel<PageEnvelope<T>>,
    running: ReplayChannel<bool>,
    last_result: RwLock<Option<PageEnvelope<T>>>,
    transport: Arc<dyn Transport>,
    shutdown: CancellationToken,
}

impl<T> Shared<T> {
    fn state(&self) -> MutexGuard<'_, RequestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `change` and queues a state trigger if it reported a change.
    fn update(&self, change: impl FnOnce(&mut RequestState) -> bool) {
        let url = {
            let mut state = self.state();
            if !change(&mut state) {
                return;
            }
            state.url()
        };
        self.send(url.map(Trigger::State));
    }

    fn send(&self, trigger: Option<Trigger>) {
        let Some(trigger) = trigger else {
            return;
        };
        if self.shutdown.is_cancelled() {
            return;
        }
        // The driver only stops after shutdown.
        let _ = self.triggers.send(trigger);
    }
}

type Completion = (u64, Result<TransportResponse, TransportError>);

/// Keeps the page of a remote collection described by its request state.
///
/// Must be created inside a Tokio runtime; the driver task lives until
/// [`PaginationClient::dispose`] is called or the client is dropped.
pub struct PaginationClient<T> {
    shared: Arc<Shared<T>>,
}

impl<T> PaginationClient<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Creates a client with default options and requests the first page.
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self::with_options(transport, base_url, PaginationOptions::default())
    }

    pub fn with_options(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        options: PaginationOptions,
    ) -> Self {
        let (triggers, receiver) = mpsc::unbounded_channel();
        let state = RequestState {
            base_url: base_url.into(),
            query: QueryBuilder {
                page: options.page.max(1),
                page_size: options.page_size.max(1),
                sort: options.sort,
                then_sort: options.then_sort,
                params: Vec::new(),
            },
        };
        let initial = state.url();

        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            triggers,
            results: ReplayChannel::new(),
            running: ReplayChannel::with_value(false),
            last_result: RwLock::new(None),
            transport,
            shutdown: CancellationToken::new(),
        });
        shared.send(initial.map(Trigger::State));

        tokio::spawn(drive(shared.clone(), receiver));
        Self { shared }
    }
}

impl<T> PaginationClient<T> {
    pub fn base_url(&self) -> String {
        self.shared.state().base_url.clone()
    }

    /// Setting an empty base URL suspends requests until a new one is set.
    pub fn set_base_url(&self, base_url: impl Into<String>) {
        let base_url = base_url.into();
        self.shared.update(|state| {
            if state.base_url == base_url {
                return false;
            }
            state.base_url = base_url;
            true
        });
    }

    pub fn page(&self) -> usize {
        self.shared.state().query.page
    }

    /// Values below one are raised to one.
    pub fn set_page(&self, page: usize) {
        let page = page.max(1);
        self.shared.update(|state| {
            if state.query.page == page {
                return false;
            }
            state.query.page = page;
            true
        });
    }

    pub fn page_size(&self) -> usize {
        self.shared.state().query.page_size
    }

    /// Values below one are raised to one.
    pub fn set_page_size(&self, page_size: usize) {
        let page_size = page_size.max(1);
        self.shared.update(|state| {
            if state.query.page_size == page_size {
                return false;
            }
            state.query.page_size = page_size;
            true
        });
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.shared.state().query.sort.clone()
    }

    pub fn set_sort(&self, sort: Option<SortSpec>) {
        self.shared.update(|state| {
            if state.query.sort == sort {
                return false;
            }
            state.query.sort = sort;
            true
        });
    }

    pub fn then_sort(&self) -> Option<SortSpec> {
        self.shared.state().query.then_sort.clone()
    }

    pub fn set_then_sort(&self, then_sort: Option<SortSpec>) {
        self.shared.update(|state| {
            if state.query.then_sort == then_sort {
                return false;
            }
            state.query.then_sort = then_sort;
            true
        });
    }

    /// `None` means the parameter is present without a value.
    pub fn query_parameter(&self, name: &str) -> Option<Option<String>> {
        self.shared
            .state()
            .query
            .get_param(name)
            .map(|value| value.map(str::to_string))
    }

    pub fn set_query_parameter(&self, name: &str, value: Option<&str>) {
        self.shared
            .update(|state| state.query.set_param(name, value));
    }

    pub fn remove_query_parameter(&self, name: &str) {
        self.shared.update(|state| state.query.remove_param(name));
    }

    /// URL of the current request state, or `None` without a base URL.
    pub fn current_url(&self) -> Option<String> {
        self.shared.state().url()
    }

    /// Requests the current state again even though it did not change.
    pub fn force_refresh(&self) {
        let url = self.shared.state().url();
        self.shared.send(url.map(Trigger::Refresh));
    }

    /// Successfully received pages, starting with the latest one if any.
    pub fn pagination_result(&self) -> UnboundedReceiver<PageEnvelope<T>>
    where
        T: Clone,
    {
        self.shared.results.subscribe()
    }

    /// `true` while a request is in flight, starting with the current value.
    pub fn request_running(&self) -> UnboundedReceiver<bool> {
        self.shared.running.subscribe()
    }

    /// Latest page received, updated before subscribers are notified.
    pub fn last_result(&self) -> Option<PageEnvelope<T>>
    where
        T: Clone,
    {
        self.shared
            .last_result
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stops the driver, cancels the in-flight request and ends subscriptions.
    pub fn dispose(&self) {
        if self.shared.shutdown.is_cancelled() {
            return;
        }
        debug!("Disposing pagination client for {}", self.base_url());
        self.shared.shutdown.cancel();
        self.shared.results.close();
        self.shared.running.close();
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.shutdown.is_cancelled()
    }
}

impl<T> PaginationClient<T>
where
    T: DeserializeOwned,
{
    /// Loads every record of the collection with the current sorts and
    /// parameters, walking pages of [`FETCH_ALL_PAGE_SIZE`].
    ///
    /// Stops once the server answers with a different page than requested,
    /// which it does when asked for a page past the end. This bypasses the
    /// pipeline and leaves the published state untouched.
    pub async fn fetch_all(&self) -> ClientResult<Vec<T>> {
        if self.is_disposed() {
            return Err(ClientError::Closed);
        }
        let (base_url, mut query) = {
            let state = self.shared.state();
            (state.base_url.clone(), state.query.clone())
        };
        if base_url.is_empty() {
            return Ok(Vec::new());
        }
        query.page_size = FETCH_ALL_PAGE_SIZE;

        let mut records = Vec::new();
        for page in 1.. {
            query.page = page;
            let url = format!("{base_url}{}", query.build());
            debug!("Fetching all records: {url}");
            let response = self.shared.transport.get(&url).await?;
            let Interpreted { envelope, .. } = interpret::<T>(&response)?;
            if envelope.page != page || envelope.data.is_empty() {
                break;
            }
            records.extend(envelope.data);
        }
        Ok(records)
    }
}

impl<T> Drop for PaginationClient<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Background task owning request sequencing.
async fn drive<T>(shared: Arc<Shared<T>>, mut triggers: UnboundedReceiver<Trigger>)
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let (completed, mut completions) = mpsc::unbounded_channel::<Completion>();
    let mut last_state_url: Option<String> = None;
    let mut generation: u64 = 0;
    let mut in_flight: Option<CancellationToken> = None;

    loop {
        // Triggers go before completions so a queued reply is judged against
        // the newest generation.
        tokio::select! {
            biased;

            _ = shared.shutdown.cancelled() => break,

            Some(first) = triggers.recv() => {
                // Let the rest of the burst arrive, then keep the last URL.
                tokio::task::yield_now().await;
                let mut burst = vec![first];
                while let Ok(next) = triggers.try_recv() {
                    burst.push(next);
                }

                let mut target = None;
                for trigger in burst {
                    match trigger {
                        Trigger::State(url) if last_state_url.as_deref() == Some(url.as_str()) => {}
                        Trigger::State(url) => {
                            last_state_url = Some(url.clone());
                            target = Some(url);
                        }
                        Trigger::Refresh(url) => target = Some(url),
                    }
                }
                let Some(url) = target else {
                    continue;
                };

                if let Some(previous) = in_flight.take() {
                    debug!("Cancelling superseded request");
                    previous.cancel();
                    shared.running.publish(false);
                }
                generation += 1;
                let token = shared.shutdown.child_token();
                in_flight = Some(token.clone());
                shared.running.publish(true);

                debug!("Requesting {url}");
                let request = shared.transport.get(&url);
                let completed = completed.clone();
                let current = generation;
                tokio::spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        result = request => {
                            let _ = completed.send((current, result));
                        }
                    }
                });
            }

            Some((finished, result)) = completions.recv() => {
                if finished != generation {
                    debug!("Discarding response of superseded request {finished}");
                    continue;
                }
                in_flight = None;
                shared.running.publish(false);

                match result.map_err(ClientError::from).and_then(|r| interpret::<T>(&r)) {
                    Ok(Interpreted { envelope, corrected_page }) => {
                        if let Some(page) = corrected_page {
                            debug!("Page {} is out of range, moving to {page}", envelope.page);
                            shared.update(|state| {
                                if state.query.page == page {
                                    return false;
                                }
                                state.query.page = page;
                                true
                            });
                        }
                        *shared
                            .last_result
                            .write()
                            .unwrap_or_else(PoisonError::into_inner) = Some(envelope.clone());
                        shared.results.publish(envelope);
                    }
                    Err(e) => warn!("Pagination request failed: {e}"),
                }
            }
        }
    }

    if let Some(token) = in_flight {
        token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_state_builds_url_only_with_base_url() {
        let mut state = RequestState {
            base_url: String::new(),
            query: QueryBuilder::new(),
        };
        assert_eq!(state.url(), None);
        state.base_url = "/users".into();
        assert_eq!(state.url().as_deref(), Some("/users?page=1&pageSize=20"));
    }
}
