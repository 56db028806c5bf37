//! Session events for UI observers.
//!
//! The screen subscribes once and re-renders on each event. Events are not
//! persisted; a subscriber that falls behind misses the oldest ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::registry::ServiceId;
use crate::session::CompletionOutcome;

// ============================================================================
// Event Enum
// ============================================================================

/// Something observable happened to a session.
///
/// Serialized as `{"event": "...", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A different language (and its starter program) was loaded.
    LanguageChanged {
        /// The new language.
        service_id: ServiceId,
    },
    /// A run was sent to the judge.
    Submitted {
        /// Language of the run.
        service_id: ServiceId,
        /// Whether stdin was attached.
        stdin_attached: bool,
        /// When the run started.
        timestamp: DateTime<Utc>,
    },
    /// A run finished and its text is now in the output pane.
    OutputApplied {
        /// Outcome name, e.g. `output` or `compile_error`.
        outcome: String,
        /// The output pane contents.
        text: String,
    },
    /// A run finished after the language changed; nothing was shown.
    ResultDiscarded {
        /// Language the run was submitted for.
        submitted_for: ServiceId,
        /// Language selected when it came back.
        current: ServiceId,
    },
    /// The output pane was emptied.
    OutputCleared,
}

impl SessionEvent {
    /// Returns the event name as a string.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::LanguageChanged { .. } => "language_changed",
            Self::Submitted { .. } => "submitted",
            Self::OutputApplied { .. } => "output_applied",
            Self::ResultDiscarded { .. } => "result_discarded",
            Self::OutputCleared => "output_cleared",
        }
    }

    /// Maps a completion to the matching event.
    #[must_use]
    pub fn completion(
        outcome: CompletionOutcome,
        result_outcome: &str,
        text: String,
        submitted_for: ServiceId,
        current: ServiceId,
    ) -> Self {
        match outcome {
            CompletionOutcome::Applied => Self::OutputApplied {
                outcome: result_outcome.to_string(),
                text,
            },
            CompletionOutcome::Discarded => Self::ResultDiscarded {
                submitted_for,
                current,
            },
        }
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Fans session events out to every subscriber.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBroadcaster {
    /// Creates a broadcaster buffering `capacity` events per subscriber.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Creates a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Broadcasts an event, returning how many subscribers will see it.
    pub fn send(&self, event: SessionEvent) -> usize {
        // Err only means nobody is listening
        self.sender.send(event).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}
