//! Conversation state — message timeline plus local and remote typing indicators.
//!
//! DESIGN
//! ======
//! All mutable state lives in one `Inner` behind a `Mutex`. Commands from the
//! owner and elapses from timer tasks both go through that lock, so writes to
//! the timeline and the two indicators are serialized. Timer tasks hold only a
//! `Weak` reference; once the owner drops the state nothing can resurrect it.
//!
//! STATE MACHINE
//! =============
//! Local:  Idle -> Active -> Idle (elapse or `stop_typing`).
//! Remote: Idle -> [name lookup] -> Waiting(name) -> Idle + message append.
//! `stop_other_user_typing` also returns to Idle but never appends.
//!
//! Each transition driven by a timer task first claims its generation under
//! the lock. A replaced or cancelled generation fails the claim: at most one
//! hide and at most one append happen per generation.
//!
//! ERROR HANDLING
//! ==============
//! Name lookup failures are absorbed: the remote participant becomes
//! [`FALLBACK_IDENTITY`] and the simulation proceeds exactly as on success.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::{ChannelConfig, TypingDelays};
use crate::message::{Message, NOW_TIMESTAMP};
use crate::names::NameProvider;
use crate::timer::{Generation, TypingTimer};

/// Author used for the simulated participant when the name lookup fails.
pub const FALLBACK_IDENTITY: &str = crate::names::ANONYMOUS_NAME;

/// Content of the message posted by [`FALLBACK_IDENTITY`].
pub const FALLBACK_CONTENT: &str = "Test message (names service error)";

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Observable view of the state, republished after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub is_user_typing: bool,
    pub other_user_typing: Option<String>,
    pub message_count: usize,
}

// =============================================================================
// SHARED STATE
// =============================================================================

struct Inner {
    /// Newest first.
    messages: VecDeque<Message>,
    is_user_typing: bool,
    other_user_typing: Option<String>,
    local_timer: TypingTimer,
    remote_timer: TypingTimer,
}

impl Inner {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            is_user_typing: self.is_user_typing,
            other_user_typing: self.other_user_typing.clone(),
            message_count: self.messages.len(),
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    changes: watch::Sender<Snapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.changes.send_replace(inner.snapshot());
    }

    fn hide_local_typing(&self, generation: Generation) {
        let mut inner = self.lock();
        if !inner.local_timer.claim(generation) {
            return;
        }
        inner.is_user_typing = false;
        self.publish(&inner);
        debug!("local typing indicator hidden");
    }

    /// Enter Waiting(name) if `generation` still owns the remote slot.
    fn show_remote_typing(&self, generation: Generation, name: &str) -> bool {
        let mut inner = self.lock();
        if !inner.remote_timer.is_current(generation) {
            return false;
        }
        inner.other_user_typing = Some(name.to_string());
        self.publish(&inner);
        debug!(name, "remote typing indicator shown");
        true
    }

    /// Leave Waiting: clear the indicator, then append the remote message.
    fn finish_remote_typing(&self, generation: Generation, message: Message) {
        let mut inner = self.lock();
        if !inner.remote_timer.claim(generation) {
            return;
        }
        inner.other_user_typing = None;
        info!(author = %message.author, "simulated message appended");
        inner.messages.push_front(message);
        self.publish(&inner);
    }
}

// =============================================================================
// CONVERSATION STATE
// =============================================================================

/// Presentation state for one open conversation.
///
/// Dropping the state cancels both typing timers.
pub struct ConversationState {
    channel: ChannelConfig,
    shared: Arc<Shared>,
    names: Arc<dyn NameProvider>,
    delays: TypingDelays,
}

impl ConversationState {
    /// Create a state seeded with `initial_messages` (newest first).
    ///
    /// Timer callbacks run on `runtime`.
    #[must_use]
    pub fn new(
        channel: ChannelConfig,
        initial_messages: Vec<Message>,
        names: Arc<dyn NameProvider>,
        runtime: Handle,
    ) -> Self {
        let inner = Inner {
            messages: initial_messages.into(),
            is_user_typing: false,
            other_user_typing: None,
            local_timer: TypingTimer::new("local_typing", runtime.clone()),
            remote_timer: TypingTimer::new("remote_typing", runtime),
        };
        let (changes, _) = watch::channel(inner.snapshot());
        let shared = Arc::new(Shared { inner: Mutex::new(inner), changes });
        Self { channel, shared, names, delays: TypingDelays::default() }
    }

    /// Override the delays used by the default-delay commands.
    #[must_use]
    pub fn with_delays(mut self, delays: TypingDelays) -> Self {
        self.delays = delays;
        self
    }

    // -------------------------------------------------------------------------
    // Observation
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn channel_name(&self) -> &str {
        &self.channel.name
    }

    #[must_use]
    pub fn channel_members(&self) -> u32 {
        self.channel.members
    }

    /// Timeline, newest first.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.shared.lock().messages.iter().cloned().collect()
    }

    #[must_use]
    pub fn newest_message(&self) -> Option<Message> {
        self.shared.lock().messages.front().cloned()
    }

    #[must_use]
    pub fn is_user_typing(&self) -> bool {
        self.shared.lock().is_user_typing
    }

    /// Name of the remote participant currently typing, if any.
    #[must_use]
    pub fn other_user_typing(&self) -> Option<String> {
        self.shared.lock().other_user_typing.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.shared.lock().snapshot()
    }

    /// Receive a fresh [`Snapshot`] after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.changes.subscribe()
    }

    // -------------------------------------------------------------------------
    // Timeline
    // -------------------------------------------------------------------------

    /// Insert `msg` at the front of the timeline, verbatim.
    pub fn add_message(&self, msg: Message) {
        let mut inner = self.shared.lock();
        debug!(channel = %self.channel.name, author = %msg.author, "message added");
        inner.messages.push_front(msg);
        self.shared.publish(&inner);
    }

    // -------------------------------------------------------------------------
    // Local typing
    // -------------------------------------------------------------------------

    /// Show the local indicator for the configured local delay.
    pub fn start_typing(&self) {
        self.start_typing_with_delay(self.delays.local);
    }

    /// Show the local indicator and (re)start its countdown.
    ///
    /// Calling again before the countdown ends restarts it; the indicator
    /// hides once, `delay` after the last call.
    pub fn start_typing_with_delay(&self, delay: Duration) {
        let mut inner = self.shared.lock();
        inner.local_timer.cancel();
        inner.is_user_typing = true;
        self.shared.publish(&inner);

        let shared = Arc::downgrade(&self.shared);
        inner.local_timer.schedule(delay, move |generation| {
            if let Some(shared) = shared.upgrade() {
                shared.hide_local_typing(generation);
            }
        });
        debug!(channel = %self.channel.name, delay_ms = millis(delay), "local typing started");
    }

    /// Hide the local indicator now and drop any pending countdown.
    pub fn stop_typing(&self) {
        let mut inner = self.shared.lock();
        inner.local_timer.cancel();
        inner.is_user_typing = false;
        self.shared.publish(&inner);
        debug!(channel = %self.channel.name, "local typing stopped");
    }

    // -------------------------------------------------------------------------
    // Remote typing
    // -------------------------------------------------------------------------

    /// Simulate a remote participant with the configured remote delay.
    pub fn simulate_other_user_typing(&self) {
        self.simulate_other_user_typing_with_delay(self.delays.remote);
    }

    /// Look up a participant name, show them typing for `delay`, then post
    /// a message as them.
    ///
    /// Replaces any simulation already in progress. A failed lookup posts as
    /// [`FALLBACK_IDENTITY`] instead; the failure is never returned.
    pub fn simulate_other_user_typing_with_delay(&self, delay: Duration) {
        let mut inner = self.shared.lock();
        self.reset_remote(&mut inner);

        let shared = Arc::downgrade(&self.shared);
        let names = Arc::clone(&self.names);
        inner
            .remote_timer
            .arm(move |generation| run_remote_simulation(shared, names, generation, delay));
        info!(channel = %self.channel.name, delay_ms = millis(delay), "remote typing simulation started");
    }

    /// Show `user_name` typing for the configured remote delay.
    pub fn simulate_specific_user_typing(&self, user_name: &str) {
        self.simulate_specific_user_typing_with_delay(user_name, self.delays.remote);
    }

    /// Show `user_name` typing immediately, then post a message as them
    /// after `delay`. No name lookup is involved.
    ///
    /// Shares the remote slot with [`simulate_other_user_typing`](Self::simulate_other_user_typing):
    /// whichever call comes last wins.
    pub fn simulate_specific_user_typing_with_delay(&self, user_name: &str, delay: Duration) {
        let mut inner = self.shared.lock();
        self.reset_remote(&mut inner);
        inner.other_user_typing = Some(user_name.to_string());
        self.shared.publish(&inner);

        let shared = Arc::downgrade(&self.shared);
        let message = Message::new(user_name, specific_user_content(user_name), NOW_TIMESTAMP);
        inner.remote_timer.schedule(delay, move |generation| {
            if let Some(shared) = shared.upgrade() {
                shared.finish_remote_typing(generation, message);
            }
        });
        info!(channel = %self.channel.name, user_name, delay_ms = millis(delay), "specific user typing started");
    }

    /// Cancel the remote simulation and hide its indicator. No message is posted.
    pub fn stop_other_user_typing(&self) {
        let mut inner = self.shared.lock();
        self.reset_remote(&mut inner);
        debug!(channel = %self.channel.name, "remote typing stopped");
    }

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    /// Tear the state down, cancelling both timers.
    pub fn shutdown(self) {
        info!(channel = %self.channel.name, "conversation closed");
    }

    fn reset_remote(&self, inner: &mut Inner) {
        let cancelled = inner.remote_timer.cancel();
        let cleared = inner.other_user_typing.take().is_some();
        if cleared {
            debug!(channel = %self.channel.name, "remote typing indicator cleared");
        }
        if cancelled || cleared {
            self.shared.publish(inner);
        }
    }
}

impl Drop for ConversationState {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        let local = inner.local_timer.cancel();
        let remote = inner.remote_timer.cancel();
        if local || remote {
            debug!(channel = %self.channel.name, local, remote, "pending typing timers cancelled on teardown");
        }
    }
}

// =============================================================================
// REMOTE SIMULATION TASK
// =============================================================================

async fn run_remote_simulation(
    shared: Weak<Shared>,
    names: Arc<dyn NameProvider>,
    generation: Generation,
    delay: Duration,
) {
    let (author, content) = match names.request_name().await {
        Ok(name) => {
            let content = greeting_content(&name);
            (name, content)
        }
        Err(e) => {
            warn!(error = %e, retryable = e.retryable(), fallback = FALLBACK_IDENTITY, "name lookup failed; posting as fallback identity");
            (FALLBACK_IDENTITY.to_string(), FALLBACK_CONTENT.to_string())
        }
    };

    {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        if !shared.show_remote_typing(generation, &author) {
            return;
        }
    }

    tokio::time::sleep(delay).await;

    if let Some(shared) = shared.upgrade() {
        shared.finish_remote_typing(generation, Message::new(author, content, NOW_TIMESTAMP));
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn greeting_content(name: &str) -> String {
    format!("Hi! I'm {name}, a simulated message from the names service.")
}

fn specific_user_content(name: &str) -> String {
    format!("Simulated message from {name}")
}

fn millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
