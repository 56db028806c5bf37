//! Async driver for an editor session.
//!
//! [`SessionHandle`] owns one [`EditorSession`] behind a mutex, runs the
//! judge call on the tokio runtime and broadcasts a [`SessionEvent`] for every
//! visible change. The lock is never held across the network call, so the
//! user can keep editing or switch language while a run is in flight.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use codeplay_core::{EditorSession, ExecutionBackend, SessionHandle};
//!
//! # async fn example<B: ExecutionBackend>(backend: B) -> codeplay_core::Result<()> {
//! let handle = SessionHandle::new(EditorSession::with_builtin()?, Arc::new(backend));
//!
//! handle.edit_stdin("Ada").await;
//! let run = handle.run_submit().await?;
//! let _ = run.await;
//!
//! println!("{}", handle.snapshot().await.last_output);
//! # Ok(())
//! # }
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::Result;
use crate::events::{EventBroadcaster, SessionEvent};
use crate::registry::LanguageRegistry;
use crate::session::{CompletionOutcome, EditorSession, SessionSnapshot};
use crate::submission::{ExecutionBackend, SubmissionResult};

/// Shared handle to one editor session and the backend it submits to.
pub struct SessionHandle<B: ExecutionBackend> {
    session: Arc<Mutex<EditorSession>>,
    backend: Arc<B>,
    events: EventBroadcaster,
}

impl<B: ExecutionBackend> Clone for SessionHandle<B> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            backend: Arc::clone(&self.backend),
            events: self.events.clone(),
        }
    }
}

impl<B: ExecutionBackend> SessionHandle<B> {
    /// Wraps a session with a default-sized event channel.
    #[must_use]
    pub fn new(session: EditorSession, backend: Arc<B>) -> Self {
        Self::with_events(session, backend, EventBroadcaster::default())
    }

    /// Wraps a session with a caller-provided event channel.
    #[must_use]
    pub fn with_events(session: EditorSession, backend: Arc<B>, events: EventBroadcaster) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            backend,
            events,
        }
    }

    /// Opens a fresh session on `registry`, sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::ConfigValidationError` if `config` is invalid,
    /// or an error if the registry has no starter program for its first
    /// language.
    pub fn open(registry: Arc<LanguageRegistry>, backend: Arc<B>, config: &Config) -> Result<Self> {
        config.validate()?;
        let session = EditorSession::new(registry)?;
        Ok(Self::with_events(
            session,
            backend,
            EventBroadcaster::new(config.events.capacity),
        ))
    }

    /// Subscribes to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Returns a read-only view of the session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Returns `true` while a run is in flight.
    pub async fn is_busy(&self) -> bool {
        self.session.lock().await.is_busy()
    }

    /// See [`EditorSession::select_language`].
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::UnknownLanguage` for ids outside the catalog.
    pub async fn select_language(&self, service_id: &str) -> Result<()> {
        let mut session = self.session.lock().await;
        session.select_language(service_id)?;
        let service_id = session.selected_language().clone();
        drop(session);

        self.events.send(SessionEvent::LanguageChanged { service_id });
        Ok(())
    }

    /// See [`EditorSession::edit_source`].
    pub async fn edit_source(&self, text: impl Into<String>) {
        self.session.lock().await.edit_source(text);
    }

    /// See [`EditorSession::edit_stdin`].
    pub async fn edit_stdin(&self, text: impl Into<String>) {
        self.session.lock().await.edit_stdin(text);
    }

    /// See [`EditorSession::clear_output`].
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::AlreadySubmitting` while a run is in flight.
    pub async fn clear_output(&self) -> Result<()> {
        self.session.lock().await.clear_output()?;
        self.events.send(SessionEvent::OutputCleared);
        Ok(())
    }

    /// Starts a run and returns the task that completes it.
    ///
    /// The task resolves once the judge has answered and the result has been
    /// applied to (or discarded by) the session.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::AlreadySubmitting` if a run is in flight; no
    /// request is sent in that case.
    pub async fn run_submit(&self) -> Result<JoinHandle<CompletionOutcome>> {
        let mut guard = self.session.lock().await;
        let pending = guard.run_submit()?;
        self.events.send(SessionEvent::Submitted {
            service_id: pending.language().clone(),
            stdin_attached: !pending.request().stdin().is_empty(),
            timestamp: pending.submitted_at(),
        });
        drop(guard);

        let session = Arc::clone(&self.session);
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();

        Ok(tokio::spawn(async move {
            // A panicking backend must still release the busy flag.
            let result = AssertUnwindSafe(async { backend.submit(pending.request()).await })
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    error!(language = %pending.language(), "Execution backend panicked");
                    SubmissionResult::transport_failure("execution backend panicked")
                });
            let result_outcome = result.outcome();
            let submitted_for = pending.language().clone();

            let mut session = session.lock().await;
            let outcome = session.complete_submit(pending, result);
            let event = SessionEvent::completion(
                outcome,
                result_outcome,
                session.last_output().to_string(),
                submitted_for,
                session.selected_language().clone(),
            );
            drop(session);

            debug!(event = event.event_name(), "Run finished");
            events.send(event);
            outcome
        }))
    }
}
