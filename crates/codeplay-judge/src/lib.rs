//! Codeplay Judge Client
//!
//! HTTP execution backend for Judge0-compatible judge services via reqwest.
//!
//! The crate exposes [`JudgeClient`], which implements
//! [`codeplay_core::ExecutionBackend`], together with the wire types it
//! exchanges with the judge.

pub mod client;

use codeplay_core::SubmissionResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::JudgeClient;

/// Errors that can occur while talking to the judge.
///
/// None of these escape [`JudgeClient`]'s backend implementation; they are
/// rendered into [`SubmissionResult::TransportFailure`].
#[derive(Debug, Error)]
pub enum JudgeError {
    /// Connect failure, timeout or unreadable body.
    #[error("judge request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The judge answered with a non-success status.
    #[error("judge returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("malformed judge response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// The language id is not a judge language number.
    #[error("invalid judge language id: '{0}'")]
    InvalidLanguageId(String),

    /// The HTTP client could not be built from the configuration.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl JudgeError {
    /// Returns `true` if retrying the same request later might succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(err) => err.is_connect() || err.is_timeout(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedResponse(_) | Self::InvalidLanguageId(_) | Self::ClientBuild(_) => {
                false
            }
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// Body of a submission POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeRequest {
    /// Program text.
    pub source_code: String,
    /// Judge language number.
    pub language_id: u32,
    /// Program input; empty when none is attached.
    pub stdin: String,
}

/// The subset of a judge response the client reads.
///
/// Every field may be missing or `null`; anything else in the body is
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JudgeResponse {
    /// Program standard output.
    #[serde(default)]
    pub stdout: Option<String>,
    /// Compiler diagnostics.
    #[serde(default)]
    pub compile_output: Option<String>,
    /// Program standard error.
    #[serde(default)]
    pub stderr: Option<String>,
}

impl JudgeResponse {
    /// Picks the text to show: stdout, then compiler output, then stderr.
    #[must_use]
    pub fn into_result(self) -> SubmissionResult {
        if let Some(text) = non_empty(self.stdout) {
            SubmissionResult::Output(text)
        } else if let Some(text) = non_empty(self.compile_output) {
            SubmissionResult::CompileError(text)
        } else if let Some(text) = non_empty(self.stderr) {
            SubmissionResult::RuntimeError(text)
        } else {
            SubmissionResult::NoOutput
        }
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|text| !text.is_empty())
}
