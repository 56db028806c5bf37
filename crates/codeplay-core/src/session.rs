//! Editor session state machine.
//!
//! One [`EditorSession`] exists per open compiler screen. The session is
//! `Idle` or `Submitting`; a failed run is simply `Idle` with the failure text
//! in the output pane.
//!
//! Submitting is split in two so the network call can happen without holding
//! the session: [`EditorSession::run_submit`] hands out a
//! [`PendingSubmission`] and [`EditorSession::complete_submit`] consumes it.
//! Every language switch advances a selection epoch; a completion whose epoch
//! no longer matches is stale and its result is dropped.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::requires_stdin;
use crate::error::{CodeplayError, Result};
use crate::registry::{LanguageRegistry, ServiceId};
use crate::submission::{SubmissionRequest, SubmissionResult};

// ============================================================================
// SessionStatus
// ============================================================================

/// Whether a submission is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Ready for a new run.
    #[default]
    Idle,
    /// Waiting for the judge.
    Submitting,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Submitting => write!(f, "submitting"),
        }
    }
}

// ============================================================================
// PendingSubmission and CompletionOutcome
// ============================================================================

/// A submission that has been started but not yet completed.
///
/// Consumed by [`EditorSession::complete_submit`], which clears the busy flag
/// exactly once per run.
#[derive(Debug)]
pub struct PendingSubmission {
    request: SubmissionRequest,
    epoch: u64,
    submitted_at: DateTime<Utc>,
}

impl PendingSubmission {
    /// The request to send to the judge.
    #[must_use]
    pub const fn request(&self) -> &SubmissionRequest {
        &self.request
    }

    /// The language selected when the run started.
    #[must_use]
    pub const fn language(&self) -> &ServiceId {
        self.request.language()
    }

    /// When the run started.
    #[must_use]
    pub const fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// What happened to a result when it came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// The result was written to the output pane.
    Applied,
    /// The language changed while the run was in flight; the result was dropped.
    Discarded,
}

// ============================================================================
// SessionSnapshot
// ============================================================================

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Selected language id.
    pub selected_language: ServiceId,
    /// Display name of the selected language.
    pub language_name: String,
    /// Editor contents.
    pub source_text: String,
    /// Stdin field contents.
    pub stdin_text: String,
    /// Output pane contents.
    pub last_output: String,
    /// Idle or submitting.
    pub status: SessionStatus,
    /// Whether the stdin field should be shown.
    pub requires_stdin: bool,
}

// ============================================================================
// EditorSession
// ============================================================================

/// Mutable state behind one compiler screen.
#[derive(Debug)]
pub struct EditorSession {
    registry: Arc<LanguageRegistry>,
    selected_language: ServiceId,
    source_text: String,
    stdin_text: String,
    last_output: String,
    status: SessionStatus,
    epoch: u64,
}

impl EditorSession {
    /// Opens a session on the registry's first language with its starter
    /// program.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::UnknownLanguage` if the registry has no
    /// starter program for its first language.
    pub fn new(registry: Arc<LanguageRegistry>) -> Result<Self> {
        let selected_language = registry.first().service_id.clone();
        let source_text = registry
            .default_source(selected_language.as_str())?
            .to_string();

        debug!(language = %selected_language, "Editor session opened");

        Ok(Self {
            registry,
            selected_language,
            source_text,
            stdin_text: String::new(),
            last_output: String::new(),
            status: SessionStatus::Idle,
            epoch: 0,
        })
    }

    /// Opens a session on the built-in registry.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::CatalogMismatch` if the built-in tables are
    /// inconsistent.
    pub fn with_builtin() -> Result<Self> {
        Self::new(LanguageRegistry::builtin()?)
    }

    /// The registry this session draws languages from.
    #[must_use]
    pub const fn registry(&self) -> &Arc<LanguageRegistry> {
        &self.registry
    }

    /// The selected language.
    #[must_use]
    pub const fn selected_language(&self) -> &ServiceId {
        &self.selected_language
    }

    /// The editor contents.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// The stdin field contents.
    #[must_use]
    pub fn stdin_text(&self) -> &str {
        &self.stdin_text
    }

    /// The output pane contents.
    #[must_use]
    pub fn last_output(&self) -> &str {
        &self.last_output
    }

    /// Idle or submitting.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns `true` while a submission is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self.status, SessionStatus::Submitting)
    }

    /// Whether the stdin field should be shown for the current language and
    /// source. Recomputed on every call.
    #[must_use]
    pub fn requires_stdin(&self) -> bool {
        requires_stdin(self.selected_language.as_str(), &self.source_text)
    }

    /// Switches language, replacing the editor with the language's starter
    /// program and clearing stdin and output.
    ///
    /// Allowed while submitting. The in-flight run is not cancelled, but its
    /// result will be discarded.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::UnknownLanguage` if the language is not in the
    /// catalog; the session is left untouched.
    pub fn select_language(&mut self, service_id: &str) -> Result<()> {
        let language = self.registry.language(service_id)?.service_id.clone();
        let source = self.registry.default_source(service_id)?.to_string();

        if self.is_busy() {
            info!(
                from = %self.selected_language,
                to = %language,
                "Language switched during a run; its result will be discarded"
            );
        }

        self.selected_language = language;
        self.source_text = source;
        self.stdin_text.clear();
        self.last_output.clear();
        self.epoch = self.epoch.wrapping_add(1);

        debug!(language = %self.selected_language, epoch = self.epoch, "Language selected");
        Ok(())
    }

    /// Replaces the editor contents verbatim.
    pub fn edit_source(&mut self, text: impl Into<String>) {
        self.source_text = text.into();
    }

    /// Replaces the stdin field contents verbatim.
    pub fn edit_stdin(&mut self, text: impl Into<String>) {
        self.stdin_text = text.into();
    }

    /// Starts a run: marks the session busy, clears the output pane and
    /// returns the ticket to complete once the judge answers.
    ///
    /// Stdin is attached only when [`Self::requires_stdin`] holds.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::AlreadySubmitting` if a run is in flight; the
    /// session is left untouched.
    pub fn run_submit(&mut self) -> Result<PendingSubmission> {
        if self.is_busy() {
            warn!(language = %self.selected_language, "Run rejected: already submitting");
            return Err(CodeplayError::AlreadySubmitting);
        }

        let request = SubmissionRequest::for_session(
            &self.selected_language,
            &self.source_text,
            &self.stdin_text,
        );

        self.status = SessionStatus::Submitting;
        self.last_output.clear();

        info!(
            language = %self.selected_language,
            source_len = request.source_code().len(),
            stdin_attached = !request.stdin().is_empty(),
            "Submission started"
        );

        Ok(PendingSubmission {
            request,
            epoch: self.epoch,
            submitted_at: Utc::now(),
        })
    }

    /// Finishes a run. The result is shown only if the language has not
    /// changed since [`Self::run_submit`]; the busy flag is cleared either way.
    pub fn complete_submit(
        &mut self,
        pending: PendingSubmission,
        result: SubmissionResult,
    ) -> CompletionOutcome {
        if !self.is_busy() {
            warn!(
                language = %pending.language(),
                "Completion received while idle"
            );
        }
        self.status = SessionStatus::Idle;

        let elapsed_ms = (Utc::now() - pending.submitted_at).num_milliseconds();

        if pending.epoch != self.epoch || *pending.language() != self.selected_language {
            info!(
                submitted_for = %pending.language(),
                current = %self.selected_language,
                outcome = result.outcome(),
                elapsed_ms,
                "Discarding stale submission result"
            );
            return CompletionOutcome::Discarded;
        }

        info!(
            language = %self.selected_language,
            outcome = result.outcome(),
            elapsed_ms,
            "Submission completed"
        );
        self.last_output = result.display_text();
        CompletionOutcome::Applied
    }

    /// Empties the output pane.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::AlreadySubmitting` if a run is in flight.
    pub fn clear_output(&mut self) -> Result<()> {
        if self.is_busy() {
            return Err(CodeplayError::AlreadySubmitting);
        }
        self.last_output.clear();
        Ok(())
    }

    /// Returns a read-only view for rendering.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let language_name = self
            .registry
            .language(self.selected_language.as_str())
            .map(|language| language.display_name.clone())
            .unwrap_or_default();

        SessionSnapshot {
            selected_language: self.selected_language.clone(),
            language_name,
            source_text: self.source_text.clone(),
            stdin_text: self.stdin_text.clone(),
            last_output: self.last_output.clone(),
            status: self.status,
            requires_stdin: self.requires_stdin(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
