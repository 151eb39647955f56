//! The live-update subscription as an explicit state machine.
//!
//! The machine performs no I/O. It consumes [`StreamInput`]s (caller commands
//! and connection signals) and answers with [`StreamAction`]s for a driver to
//! carry out. Connection signals carry the generation of the connection that
//! produced them; signals from a superseded connection are ignored.

use std::time::Duration;

use thiserror::Error;

use crate::core::{NewsCategory, NewsSource};
use crate::filters::FilterState;

/// Consecutive transport failures after which the subscription gives up.
pub const MAX_RETRIES: u32 = 10;
pub const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(1_000);
pub const MAX_RETRY_DELAY: Duration = Duration::from_millis(30_000);

/// `initial * 2^(retry-1)`, capped at `max`. `retry` is 1-based.
pub fn backoff_delay(retry: u32, initial: Duration, max: Duration) -> Duration {
    let exp = retry.saturating_sub(1).min(31);
    initial
        .checked_mul(1_u32 << exp)
        .map_or(max, |d| d.min(max))
}

/// The (source, category) pair a subscription listens to. `None` means all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    pub source: Option<NewsSource>,
    pub category: Option<NewsCategory>,
}

impl Scope {
    pub const fn new(source: Option<NewsSource>, category: Option<NewsCategory>) -> Self {
        Self { source, category }
    }

    pub const fn from_filters(filters: &FilterState) -> Self {
        Self::new(filters.source(), filters.category())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Never enabled.
    Idle,
    Connecting,
    Connected,
    /// Waiting for the backoff timer before the next attempt.
    Reconnecting,
    /// Retries exhausted. Terminal until re-enabled.
    Failed,
    /// Turned off by the caller.
    Disabled,
}

/// Non-fatal and terminal problems surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Transient: the connection dropped and a retry is scheduled.
    #[error("connecting...")]
    Reconnecting,
    /// A pushed message was not valid JSON. The subscription keeps running.
    #[error("failed to parse live update: {0}")]
    Parse(String),
    #[error("maximum reconnection attempts exceeded")]
    MaxRetriesExceeded,
}

/// What the caller observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamState {
    pub phase: Phase,
    pub connected: bool,
    /// Items pushed since the last acknowledge.
    pub new_count: u32,
    pub retry_count: u32,
    pub last_error: Option<StreamError>,
}

impl StreamState {
    const fn fresh(phase: Phase) -> Self {
        Self {
            phase,
            connected: false,
            new_count: 0,
            retry_count: 0,
            last_error: None,
        }
    }
}

impl Default for StreamState {
    fn default() -> Self {
        Self::fresh(Phase::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            initial_delay: INITIAL_RETRY_DELAY,
            max_delay: MAX_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamInput {
    /// Start (or restart) the subscription for `Scope`.
    Enable(Scope),
    Disable,
    /// The caller's filters changed.
    Rescope(Scope),
    /// Manual reconnect; counts as a deliberate restart.
    Reconnect,
    Acknowledge,
    Opened { generation: u64 },
    Message { generation: u64, data: String },
    TransportError { generation: u64, reason: String },
    RetryTimerFired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamAction {
    Open { scope: Scope, generation: u64 },
    Close,
    ScheduleReconnect(Duration),
    CancelTimer,
}

#[derive(Debug, Clone)]
pub struct StreamMachine {
    config: StreamConfig,
    state: StreamState,
    scope: Scope,
    generation: u64,
}

impl StreamMachine {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            state: StreamState::default(),
            scope: Scope::default(),
            generation: 0,
        }
    }

    pub const fn state(&self) -> &StreamState {
        &self.state
    }

    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// Generation of the most recently opened connection.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    const fn is_live(&self) -> bool {
        matches!(
            self.state.phase,
            Phase::Connecting | Phase::Connected | Phase::Reconnecting | Phase::Failed
        )
    }

    pub fn handle(&mut self, input: StreamInput) -> Vec<StreamAction> {
        match input {
            StreamInput::Enable(scope) => {
                if self.is_live() && self.state.phase != Phase::Failed && scope == self.scope {
                    return Vec::new();
                }
                self.start_session(scope)
            }
            StreamInput::Disable => {
                if self.state.phase == Phase::Disabled {
                    return Vec::new();
                }
                self.state = StreamState::fresh(Phase::Disabled);
                vec![StreamAction::CancelTimer, StreamAction::Close]
            }
            StreamInput::Rescope(scope) => {
                if !self.is_live() {
                    self.scope = scope;
                    return Vec::new();
                }
                if scope == self.scope {
                    return Vec::new();
                }
                self.start_session(scope)
            }
            StreamInput::Reconnect => {
                if !self.is_live() {
                    return Vec::new();
                }
                self.start_session(self.scope)
            }
            StreamInput::Acknowledge => {
                self.state.new_count = 0;
                Vec::new()
            }
            StreamInput::Opened { generation } => {
                if generation != self.generation || self.state.phase != Phase::Connecting {
                    return Vec::new();
                }
                self.state.phase = Phase::Connected;
                self.state.connected = true;
                self.state.retry_count = 0;
                self.state.last_error = None;
                Vec::new()
            }
            StreamInput::Message { generation, data } => {
                if generation != self.generation || self.state.phase != Phase::Connected {
                    return Vec::new();
                }
                match serde_json::from_str::<serde_json::Value>(&data) {
                    Ok(_) => self.state.new_count = self.state.new_count.saturating_add(1),
                    Err(e) => self.state.last_error = Some(StreamError::Parse(e.to_string())),
                }
                Vec::new()
            }
            StreamInput::TransportError { generation, .. } => {
                if generation != self.generation
                    || !matches!(self.state.phase, Phase::Connecting | Phase::Connected)
                {
                    return Vec::new();
                }
                self.on_transport_error()
            }
            StreamInput::RetryTimerFired => {
                if self.state.phase != Phase::Reconnecting {
                    return Vec::new();
                }
                self.state.phase = Phase::Connecting;
                vec![self.open()]
            }
        }
    }

    fn start_session(&mut self, scope: Scope) -> Vec<StreamAction> {
        self.scope = scope;
        self.state = StreamState::fresh(Phase::Connecting);
        vec![StreamAction::CancelTimer, StreamAction::Close, self.open()]
    }

    fn open(&mut self) -> StreamAction {
        self.generation += 1;
        StreamAction::Open {
            scope: self.scope,
            generation: self.generation,
        }
    }

    fn on_transport_error(&mut self) -> Vec<StreamAction> {
        self.state.retry_count += 1;
        self.state.connected = false;

        if self.state.retry_count >= self.config.max_retries {
            self.state.phase = Phase::Failed;
            self.state.last_error = Some(StreamError::MaxRetriesExceeded);
            return vec![StreamAction::Close, StreamAction::CancelTimer];
        }

        self.state.phase = Phase::Reconnecting;
        self.state.last_error = Some(StreamError::Reconnecting);
        let delay = backoff_delay(
            self.state.retry_count,
            self.config.initial_delay,
            self.config.max_delay,
        );
        vec![StreamAction::Close, StreamAction::ScheduleReconnect(delay)]
    }
}
