//! Live "new items" notifications over server-sent events.
//!
//! [`LiveStreamBuilder::start`] spawns a driver task that owns the HTTP
//! connection and the reconnect timer and feeds a [`StreamMachine`]. Callers
//! only see [`StreamState`] snapshots and send commands through [`LiveStream`].

mod machine;
mod sse;

pub use machine::{
    INITIAL_RETRY_DELAY, MAX_RETRIES, MAX_RETRY_DELAY, Phase, Scope, StreamAction, StreamConfig,
    StreamError, StreamInput, StreamMachine, StreamState, backoff_delay,
};
pub use sse::{LineTooLong, MAX_LINE_BYTES, SseDecoder, SseEvent, SseLine, parse_sse_line};

use std::pin::Pin;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::{
    select,
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{Sleep, sleep},
};
use url::Url;

use crate::core::client::PATH_STREAM;
use crate::core::net::append_params;
use crate::core::{NewsCategory, NewsClient, NewsError, NewsSource};

/* ---------------- Public API ---------------- */

#[derive(Debug, Clone, Copy)]
enum Command {
    Enable,
    Disable,
    SetScope(Scope),
    Reconnect,
    Acknowledge,
}

/// A handle for a running live-update subscription.
///
/// Dropping the handle tears the subscription down.
pub struct LiveStream {
    join: JoinHandle<()>,
    stop_tx: Option<oneshot::Sender<()>>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<StreamState>,
}

impl LiveStream {
    /// The latest state snapshot.
    pub fn state(&self) -> StreamState {
        self.state_rx.borrow().clone()
    }

    /// A receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<StreamState> {
        self.state_rx.clone()
    }

    /// Waits until the state satisfies `f`. Returns `None` if the driver has stopped.
    pub async fn wait_for(&mut self, f: impl FnMut(&StreamState) -> bool) -> Option<StreamState> {
        self.state_rx.wait_for(f).await.ok().map(|s| s.clone())
    }

    fn send(&self, cmd: Command) {
        // a closed channel means the driver is gone; there is nothing left to command
        let _ = self.cmd_tx.send(cmd);
    }

    /// Resets the unseen counter. Connection state is untouched.
    pub fn acknowledge(&self) {
        self.send(Command::Acknowledge);
    }

    /// (Re-)enables the subscription with its current scope.
    pub fn enable(&self) {
        self.send(Command::Enable);
    }

    /// Closes the connection and cancels any pending reconnect.
    pub fn disable(&self) {
        self.send(Command::Disable);
    }

    /// Changes the scope; a live subscription reconnects with fresh counters.
    pub fn set_scope(&self, scope: Scope) {
        self.send(Command::SetScope(scope));
    }

    /// Starts over immediately, also out of the failed state.
    pub fn reconnect(&self) {
        self.send(Command::Reconnect);
    }

    /// Politely ask the driver to stop and wait for it to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.join.await;
    }

    /// Immediately abort the driver task.
    pub fn abort(self) {
        self.join.abort();
    }
}

/// Builder to start a live-update subscription.
pub struct LiveStreamBuilder {
    client: NewsClient,
    scope: Scope,
    enabled: bool,
    config: StreamConfig,
}

impl LiveStreamBuilder {
    /// Start from an existing client (cloned internally).
    pub fn new(client: &NewsClient) -> Self {
        Self {
            client: client.clone(),
            scope: Scope::default(),
            enabled: true,
            config: StreamConfig::default(),
        }
    }

    #[must_use]
    pub const fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub const fn source(mut self, source: Option<NewsSource>) -> Self {
        self.scope.source = source;
        self
    }

    #[must_use]
    pub const fn category(mut self, category: Option<NewsCategory>) -> Self {
        self.scope.category = category;
        self
    }

    /// Whether to connect right away (default true).
    #[must_use]
    pub const fn enabled(mut self, yes: bool) -> Self {
        self.enabled = yes;
        self
    }

    #[must_use]
    pub const fn config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }

    /// Consecutive failures before giving up (default 10).
    #[must_use]
    pub const fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    /// First backoff delay (default 1s).
    #[must_use]
    pub const fn initial_delay(mut self, d: Duration) -> Self {
        self.config.initial_delay = d;
        self
    }

    /// Backoff cap (default 30s).
    #[must_use]
    pub const fn max_delay(mut self, d: Duration) -> Self {
        self.config.max_delay = d;
        self
    }

    /// Spawns the driver. Must be called inside a tokio runtime.
    pub fn start(self) -> LiveStream {
        let mut machine = StreamMachine::new(self.config);
        // records the scope without connecting
        machine.handle(StreamInput::Rescope(self.scope));

        let (state_tx, state_rx) = watch::channel(machine.state().clone());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        if self.enabled {
            let _ = cmd_tx.send(Command::Enable);
        }

        let join = tokio::spawn(drive(self.client, machine, cmd_rx, stop_rx, state_tx));

        LiveStream {
            join,
            stop_tx: Some(stop_tx),
            cmd_tx,
            state_rx,
        }
    }
}

/* ---------------- Internal: driver ---------------- */

type Connection = BoxStream<'static, StreamInput>;

async fn drive(
    client: NewsClient,
    mut machine: StreamMachine,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    mut stop_rx: oneshot::Receiver<()>,
    state_tx: watch::Sender<StreamState>,
) {
    let mut conn: Option<Connection> = None;
    let mut timer: Option<Pin<Box<Sleep>>> = None;

    loop {
        let input = select! {
            _ = &mut stop_rx => break,
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => to_input(cmd, machine.scope()),
                None => break,
            },
            signal = next_signal(&mut conn) => match signal {
                Some(signal) => signal,
                None => {
                    conn = None;
                    continue;
                }
            },
            () = fire(&mut timer) => {
                timer = None;
                StreamInput::RetryTimerFired
            }
        };

        #[cfg(feature = "tracing")]
        log_input(&input);
        #[cfg(feature = "tracing")]
        let before = machine.phase();

        for action in machine.handle(input) {
            match action {
                StreamAction::Open { scope, generation } => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(generation, ?scope, "opening live stream");
                    conn = Some(open_connection(&client, scope, generation));
                }
                StreamAction::Close => conn = None,
                StreamAction::ScheduleReconnect(delay) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(delay_ms = delay.as_millis(), "scheduling reconnect");
                    timer = Some(Box::pin(sleep(delay)));
                }
                StreamAction::CancelTimer => timer = None,
            }
        }

        #[cfg(feature = "tracing")]
        log_transition(before, machine.state());

        state_tx.send_if_modified(|current| {
            if current == machine.state() {
                false
            } else {
                *current = machine.state().clone();
                true
            }
        });
    }
}

const fn to_input(cmd: Command, current: Scope) -> StreamInput {
    match cmd {
        Command::Enable => StreamInput::Enable(current),
        Command::Disable => StreamInput::Disable,
        Command::SetScope(scope) => StreamInput::Rescope(scope),
        Command::Reconnect => StreamInput::Reconnect,
        Command::Acknowledge => StreamInput::Acknowledge,
    }
}

#[cfg(feature = "tracing")]
fn log_input(input: &StreamInput) {
    match input {
        StreamInput::TransportError { generation, reason } => {
            tracing::warn!(generation, %reason, "live stream transport error");
        }
        StreamInput::Message { data, .. } if serde_json::from_str::<serde_json::Value>(data).is_err() => {
            tracing::warn!(len = data.len(), "skipping malformed live update");
        }
        StreamInput::Opened { generation } => tracing::debug!(generation, "live stream open"),
        _ => {}
    }
}

#[cfg(feature = "tracing")]
fn log_transition(before: Phase, state: &StreamState) {
    if before == state.phase {
        return;
    }
    if state.phase == Phase::Failed {
        tracing::error!(
            retries = state.retry_count,
            "live stream gave up after repeated failures"
        );
    } else {
        tracing::debug!(from = ?before, to = ?state.phase, "live stream transition");
    }
}

async fn next_signal(conn: &mut Option<Connection>) -> Option<StreamInput> {
    match conn {
        Some(c) => c.next().await,
        None => std::future::pending().await,
    }
}

async fn fire(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(t) => t.as_mut().await,
        None => std::future::pending().await,
    }
}

fn stream_url(client: &NewsClient, scope: Scope) -> Result<Url, NewsError> {
    let mut url = client.endpoint(PATH_STREAM)?;
    append_params(
        &mut url,
        &[
            ("source", scope.source.map(|s| s.as_str().to_string())),
            ("category", scope.category.map(|c| c.as_str().to_string())),
        ],
    );
    Ok(url)
}

enum Stage {
    Connect(reqwest::RequestBuilder),
    Reading {
        body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
        decoder: SseDecoder,
    },
    Done,
}

/// One connection attempt as a stream of signals: `Opened`, then `Message`s,
/// and finally a `TransportError` (the server ending the stream counts as one).
fn open_connection(client: &NewsClient, scope: Scope, generation: u64) -> Connection {
    let url = match stream_url(client, scope) {
        Ok(url) => url,
        Err(e) => {
            return stream::once(async move {
                StreamInput::TransportError {
                    generation,
                    reason: e.to_string(),
                }
            })
            .boxed();
        }
    };

    let req = client
        .stream_http()
        .get(url)
        .header("accept", "text/event-stream")
        .header("cache-control", "no-cache");

    stream::unfold(Stage::Connect(req), move |stage| async move {
        match stage {
            Stage::Connect(req) => match req.send().await {
                Ok(resp) if resp.status().is_success() => {
                    let body = resp.bytes_stream().map(|r| r.map(|b| b.to_vec())).boxed();
                    Some((
                        StreamInput::Opened { generation },
                        Stage::Reading {
                            body,
                            decoder: SseDecoder::new(),
                        },
                    ))
                }
                Ok(resp) => Some((
                    StreamInput::TransportError {
                        generation,
                        reason: format!("unexpected status {}", resp.status()),
                    },
                    Stage::Done,
                )),
                Err(e) => Some((
                    StreamInput::TransportError {
                        generation,
                        reason: e.to_string(),
                    },
                    Stage::Done,
                )),
            },
            Stage::Reading {
                mut body,
                mut decoder,
            } => loop {
                if let Some(event) = decoder.next_event() {
                    if !event.is_message() {
                        continue;
                    }
                    return Some((
                        StreamInput::Message {
                            generation,
                            data: event.data,
                        },
                        Stage::Reading { body, decoder },
                    ));
                }
                match body.next().await {
                    Some(Ok(chunk)) => {
                        if let Err(e) = decoder.push(&chunk) {
                            return Some((
                                StreamInput::TransportError {
                                    generation,
                                    reason: e.to_string(),
                                },
                                Stage::Done,
                            ));
                        }
                    }
                    Some(Err(e)) => {
                        return Some((
                            StreamInput::TransportError {
                                generation,
                                reason: e.to_string(),
                            },
                            Stage::Done,
                        ));
                    }
                    None => {
                        return Some((
                            StreamInput::TransportError {
                                generation,
                                reason: "stream closed by server".into(),
                            },
                            Stage::Done,
                        ));
                    }
                }
            },
            Stage::Done => None,
        }
    })
    .boxed()
}
