use std::time::Duration;

use tokio::time::{Instant, sleep_until};

use super::{FilterStore, HistorySink};

/// Quiet period before typed search text is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds back a value until no newer value arrived for `delay`.
///
/// Every [`push`](Debouncer::push) replaces the pending value and restarts the quiet period.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    /// Drops the pending value, returning it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value will settle, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Takes the pending value if its quiet period has elapsed.
    pub fn take_ready(&mut self) -> Option<T> {
        let ready = self.deadline().is_some_and(|at| at <= Instant::now());
        if ready { self.cancel() } else { None }
    }

    /// Waits for the pending value to settle. Returns `None` immediately when nothing is pending.
    ///
    /// Dropping the returned future (e.g. because new input arrived) loses nothing;
    /// the value stays pending.
    pub async fn settled(&mut self) -> Option<T> {
        loop {
            let deadline = self.deadline()?;
            sleep_until(deadline).await;
            if let Some(v) = self.take_ready() {
                return Some(v);
            }
        }
    }
}

/// The search input: raw keystrokes in, debounced query commits out.
#[derive(Debug)]
pub struct SearchBox {
    text: String,
    debouncer: Debouncer<String>,
}

impl SearchBox {
    /// Starts with `query` (usually the query of the current filter state) in the box.
    pub fn new(query: impl Into<String>) -> Self {
        Self::with_delay(query, DEFAULT_DEBOUNCE)
    }

    pub fn with_delay(query: impl Into<String>, delay: Duration) -> Self {
        Self {
            text: query.into(),
            debouncer: Debouncer::new(delay),
        }
    }

    /// What the box currently shows.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The user edited the box.
    pub fn input(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.debouncer.push(self.text.clone());
    }

    /// Mirrors an externally changed query (e.g. history navigation) without committing it.
    pub fn sync(&mut self, query: &str) {
        self.text = query.to_string();
        self.debouncer.cancel();
    }

    /// The clear button: empties the box and leaves search mode right away.
    pub fn clear<H: HistorySink>(&mut self, store: &mut FilterStore<H>) {
        self.text.clear();
        self.debouncer.cancel();
        store.clear_search();
    }

    /// Waits until typing pauses and returns the settled text.
    pub async fn settled(&mut self) -> Option<String> {
        self.debouncer.settled().await
    }

    /// Applies a settled value: a non-empty value starts a search, an empty one
    /// leaves search mode. Nothing happens when it equals the current query.
    pub fn commit<H: HistorySink>(value: &str, store: &mut FilterStore<H>) -> bool {
        if value == store.state().query() {
            return false;
        }
        if value.is_empty() {
            store.clear_search()
        } else {
            store.set_search(value)
        }
    }

    /// Waits for the input to settle, then commits it to `store`.
    pub async fn settle_into<H: HistorySink>(&mut self, store: &mut FilterStore<H>) -> bool {
        match self.settled().await {
            Some(value) => Self::commit(&value, store),
            None => false,
        }
    }
}
