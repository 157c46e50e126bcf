//! Interval status poller.
//!
//! Fetches the agent status snapshot on a fixed interval, keeps the last
//! good result, and tells subscribers what changed.
//!
//! # Cycle
//!
//! ```text
//! start() ──► poll ──ok──► notify ──► sleep(interval) ──► poll ...
//!               │
//!               └─err──► notify(error) ──► sleep(error_retry_interval) ──► poll ...
//!                                      └─► stop() once retries run out
//! ```
//!
//! Only one timer is pending at a time. Scheduling a poll cancels the
//! previous timer, and [`StatusPoller::stop`] cancels the current one.

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::observer::{Registry, Subscription, isolate};
use crate::protocol::{Agent, StatusSnapshot};
use crate::transport::GatewayClient;

use super::cache::AgentCache;
use super::config::{PollingConfig, PollingConfigUpdate};
use super::source::StatusSource;

// ============================================================================
// Types
// ============================================================================

/// Callback for every poll result.
///
/// Receives the full agent list and, when the poll failed, the error. On
/// failure the list is the last one that succeeded.
pub type StatusHandler = dyn Fn(&[Agent], Option<&Error>) + Send + Sync;

/// Callback for one changed agent.
pub type AgentHandler = dyn Fn(&Agent) + Send + Sync;

// ============================================================================
// PollerState
// ============================================================================

/// Mutable poller state, guarded by one lock.
#[derive(Debug, Default)]
struct PollerState {
    config: PollingConfig,
    running: bool,
    retry_count: u32,
    last: Option<StatusSnapshot>,
    cache: AgentCache,
    /// Cancels the pending poll timer.
    timer: Option<CancellationToken>,
}

impl PollerState {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn last_agents(&self) -> Vec<Agent> {
        self.last
            .as_ref()
            .map(|snapshot| snapshot.agents.clone())
            .unwrap_or_default()
    }
}

// ============================================================================
// Inner
// ============================================================================

struct Inner {
    source: Arc<dyn StatusSource>,
    state: Mutex<PollerState>,
    status_handlers: Registry<(), StatusHandler>,
    update_handlers: Registry<(), AgentHandler>,
    agent_handlers: Registry<String, AgentHandler>,
}

// ============================================================================
// StatusPoller
// ============================================================================

/// Polls agent status and notifies subscribers of changes.
///
/// # Example
///
/// ```ignore
/// use gateway_client::{PollingConfig, StatusPoller};
///
/// let poller = StatusPoller::with_shared_client(PollingConfig::default())?;
///
/// let _sub = poller.on_agent_update(|agent| {
///     println!("{} is now {}", agent.name, agent.state);
/// });
///
/// poller.start();
/// ```
///
/// Dropping the poller stops it.
pub struct StatusPoller {
    inner: Arc<Inner>,
}

// ============================================================================
// StatusPoller - Constructors
// ============================================================================

impl StatusPoller {
    /// Creates a stopped poller that reads from `source`.
    #[must_use]
    pub fn new(config: PollingConfig, source: Arc<dyn StatusSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                state: Mutex::new(PollerState {
                    config,
                    ..PollerState::default()
                }),
                status_handlers: Registry::new(),
                update_handlers: Registry::new(),
                agent_handlers: Registry::new(),
            }),
        }
    }

    /// Creates a stopped poller that reads from `client`.
    #[must_use]
    pub fn with_client(config: PollingConfig, client: Arc<GatewayClient>) -> Self {
        Self::new(config, client)
    }

    /// Creates a stopped poller that reads from [`GatewayClient::shared`].
    ///
    /// # Errors
    ///
    /// Returns an error if the shared client cannot be built.
    pub fn with_shared_client(config: PollingConfig) -> Result<Self> {
        Ok(Self::with_client(config, GatewayClient::shared()?))
    }
}

// ============================================================================
// StatusPoller - Lifecycle
// ============================================================================

impl StatusPoller {
    /// Starts polling with an immediate poll.
    ///
    /// No-op if already running or if the configuration is disabled.
    /// Requires a Tokio runtime.
    pub fn start(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.running || !state.config.enabled {
                return;
            }
            state.running = true;
            state.retry_count = 0;
        }

        let Ok(runtime) = Handle::try_current() else {
            error!("Cannot start status poller outside a Tokio runtime");
            self.inner.stop();
            return;
        };

        info!(interval_ms = self.config().interval.as_millis() as u64, "Status poller started");

        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            let _ = inner.poll().await;
        });
    }

    /// Stops polling and cancels the pending timer.
    ///
    /// A poll already in flight completes, but schedules nothing.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Returns `true` between [`start`](Self::start) and
    /// [`stop`](Self::stop).
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.state.lock().running
    }

    /// Polls now.
    ///
    /// Returns an empty list without polling if the poller is stopped.
    ///
    /// # Errors
    ///
    /// Returns the poll error after subscribers have been notified and the
    /// retry policy applied.
    pub async fn refresh(&self) -> Result<Vec<Agent>> {
        self.inner.poll().await
    }
}

// ============================================================================
// StatusPoller - Configuration
// ============================================================================

impl StatusPoller {
    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> PollingConfig {
        self.inner.state.lock().config
    }

    /// Applies a partial configuration update.
    ///
    /// If anything changes, the poller is stopped and, if it was running
    /// and is still enabled, restarted with an immediate poll. An update
    /// that changes nothing leaves the schedule untouched.
    pub fn set_config(&self, update: PollingConfigUpdate) {
        let (merged, was_running) = {
            let state = self.inner.state.lock();
            let merged = state.config.merged(&update);
            if merged == state.config {
                trace!("Polling config unchanged");
                return;
            }
            (merged, state.running)
        };

        self.inner.stop();
        self.inner.state.lock().config = merged;
        debug!(?merged, "Polling config updated");

        if was_running && merged.enabled {
            self.start();
        }
    }

    /// Returns the number of consecutive failed polls being retried.
    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.inner.state.lock().retry_count
    }
}

// ============================================================================
// StatusPoller - Cached Data
// ============================================================================

impl StatusPoller {
    /// Returns the agents from the last successful poll.
    #[must_use]
    pub fn last_status(&self) -> Option<Vec<Agent>> {
        self.inner
            .state
            .lock()
            .last
            .as_ref()
            .map(|snapshot| snapshot.agents.clone())
    }

    /// Returns the last successful snapshot.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<StatusSnapshot> {
        self.inner.state.lock().last.clone()
    }

    /// Returns the cached agent with `id`.
    #[must_use]
    pub fn agent(&self, id: &str) -> Option<Agent> {
        self.inner.state.lock().cache.get(id).cloned()
    }
}

// ============================================================================
// StatusPoller - Subscriptions
// ============================================================================

impl StatusPoller {
    /// Subscribes to every poll result.
    ///
    /// If a snapshot is already cached, `handler` is invoked with it
    /// immediately.
    pub fn on_status_update<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&[Agent], Option<&Error>) + Send + Sync + 'static,
    {
        let handler: Arc<StatusHandler> = Arc::new(handler);
        let subscription = self
            .inner
            .status_handlers
            .subscribe((), Arc::clone(&handler));

        if let Some(agents) = self.last_status() {
            isolate("status handler", || handler(&agents, None));
        }

        subscription
    }

    /// Subscribes to every changed agent.
    pub fn on_agent_update<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Agent) + Send + Sync + 'static,
    {
        self.inner.update_handlers.subscribe((), Arc::new(handler))
    }

    /// Subscribes to changes of the agent with `id`.
    ///
    /// If that agent is cached, `handler` is invoked with it immediately.
    pub fn on_agent<F>(&self, id: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&Agent) + Send + Sync + 'static,
    {
        let id = id.into();
        let handler: Arc<AgentHandler> = Arc::new(handler);
        let cached = self.agent(&id);
        let subscription = self.inner.agent_handlers.subscribe(id, Arc::clone(&handler));

        if let Some(agent) = cached {
            isolate("agent handler", || handler(&agent));
        }

        subscription
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

// ============================================================================
// Inner - Polling
// ============================================================================

impl Inner {
    fn stop(&self) {
        let mut state = self.state.lock();
        let was_running = state.running;
        state.running = false;
        state.cancel_timer();
        drop(state);

        if was_running {
            info!("Status poller stopped");
        }
    }

    /// Runs one poll.
    async fn poll(self: &Arc<Self>) -> Result<Vec<Agent>> {
        if !self.state.lock().running {
            return Ok(Vec::new());
        }

        trace!("Polling agent status");

        match self.source.fetch_status().await {
            Ok(snapshot) => Ok(self.apply(snapshot)),
            Err(e) => {
                self.handle_error(&e);
                Err(e)
            }
        }
    }

    /// Stores a successful snapshot and notifies subscribers.
    fn apply(self: &Arc<Self>, snapshot: StatusSnapshot) -> Vec<Agent> {
        let agents = snapshot.agents.clone();

        let changes = {
            let mut state = self.state.lock();
            let changes = state.cache.update(&agents);
            state.last = Some(snapshot);
            state.retry_count = 0;
            changes
        };

        debug!(
            agents = agents.len(),
            changes = changes.len(),
            "Status poll succeeded"
        );

        self.notify_status(&agents, None);
        for agent in &changes {
            self.notify_agent(agent);
        }

        self.schedule_next(None);
        agents
    }

    /// Notifies subscribers of a failed poll and applies the retry policy.
    fn handle_error(self: &Arc<Self>, e: &Error) {
        error!(error = %e, code = e.code(), status = e.status(), "Status poll failed");

        let last = self.state.lock().last_agents();
        self.notify_status(&last, Some(e));

        let retry = {
            let mut state = self.state.lock();
            let config = state.config;
            if config.retry_on_error && state.retry_count < config.max_retries {
                state.retry_count += 1;
                Some((state.retry_count, config.max_retries, config.error_retry_interval))
            } else {
                None
            }
        };

        match retry {
            Some((attempt, max_retries, delay)) => {
                warn!(
                    attempt,
                    max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying status poll"
                );
                self.schedule_next(Some(delay));
            }
            None => {
                warn!("Giving up on status polling");
                self.stop();
            }
        }
    }

    /// Arms the timer for the next poll, replacing any pending one.
    ///
    /// `None` uses the configured interval. Does nothing while stopped.
    fn schedule_next(self: &Arc<Self>, delay: Option<Duration>) {
        let (token, delay) = {
            let mut state = self.state.lock();
            if !state.running {
                return;
            }
            state.cancel_timer();
            let token = CancellationToken::new();
            state.timer = Some(token.clone());
            (token, delay.unwrap_or(state.config.interval))
        };

        let Ok(runtime) = Handle::try_current() else {
            error!("Cannot schedule status poll outside a Tokio runtime");
            return;
        };

        let weak: Weak<Self> = Arc::downgrade(self);

        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = sleep(delay) => {
                    if let Some(inner) = weak.upgrade() {
                        inner.poll_scheduled(&token).await;
                    }
                }
            }
        });
    }

    /// Runs the poll a timer fired for, unless the timer was superseded.
    async fn poll_scheduled(self: &Arc<Self>, token: &CancellationToken) {
        {
            let state = self.state.lock();
            if token.is_cancelled() || !state.running {
                return;
            }
        }

        let _ = self.poll().await;
    }

    fn notify_status(&self, agents: &[Agent], error: Option<&Error>) {
        for handler in self.status_handlers.handlers(&()) {
            isolate("status handler", || handler(agents, error));
        }
    }

    fn notify_agent(&self, agent: &Agent) {
        for handler in self.update_handlers.handlers(&()) {
            isolate("agent update handler", || handler(agent));
        }
        for handler in self.agent_handlers.handlers(&agent.id) {
            isolate("agent handler", || handler(agent));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
