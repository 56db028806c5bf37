//! Submission request/result types and the execution backend seam.

use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::classifier::requires_stdin;
use crate::registry::ServiceId;

/// Text shown when the judge produced no output at all.
pub const NO_OUTPUT_TEXT: &str = "No output";

/// Text shown when the judge could not be reached.
pub const TRANSPORT_FAILURE_TEXT: &str =
    "Error compiling code. Please check your internet connection.";

// ============================================================================
// SubmissionRequest
// ============================================================================

/// A program ready to be sent to the judge.
///
/// Built once per run and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    service_language_id: ServiceId,
    source_code: String,
    stdin: String,
}

impl SubmissionRequest {
    /// Creates a request with an explicit stdin.
    #[must_use]
    pub fn new(
        service_language_id: ServiceId,
        source_code: impl Into<String>,
        stdin: impl Into<String>,
    ) -> Self {
        Self {
            service_language_id,
            source_code: source_code.into(),
            stdin: stdin.into(),
        }
    }

    /// Creates a request from editor contents, attaching stdin only when the
    /// source looks like it reads console input.
    #[must_use]
    pub fn for_session(language: &ServiceId, source_code: &str, stdin: &str) -> Self {
        let stdin = if requires_stdin(language.as_str(), source_code) {
            stdin
        } else {
            ""
        };
        Self::new(language.clone(), source_code, stdin)
    }

    /// The judge language the program is written in.
    #[must_use]
    pub const fn language(&self) -> &ServiceId {
        &self.service_language_id
    }

    /// The program text.
    #[must_use]
    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    /// The input fed to the program; empty when none is attached.
    #[must_use]
    pub fn stdin(&self) -> &str {
        &self.stdin
    }
}

// ============================================================================
// SubmissionResult
// ============================================================================

/// Outcome of one submission attempt.
///
/// Compile and runtime errors are valid judged outcomes, not client errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "text", rename_all = "snake_case")]
pub enum SubmissionResult {
    /// The program wrote to stdout.
    Output(String),
    /// The judge reported compiler diagnostics.
    CompileError(String),
    /// The program wrote to stderr and nothing to stdout.
    RuntimeError(String),
    /// The judge returned no output of any kind.
    NoOutput,
    /// The judge could not be reached or answered with garbage.
    TransportFailure(String),
}

impl SubmissionResult {
    /// Creates a `TransportFailure` from any displayable reason.
    #[must_use]
    pub fn transport_failure(reason: impl fmt::Display) -> Self {
        Self::TransportFailure(reason.to_string())
    }

    /// Returns `true` if the judge actually ran (or tried to compile) the
    /// program.
    #[must_use]
    pub const fn is_judged(&self) -> bool {
        !matches!(self, Self::TransportFailure(_))
    }

    /// Short machine-readable name of the outcome, used in logs.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Output(_) => "output",
            Self::CompileError(_) => "compile_error",
            Self::RuntimeError(_) => "runtime_error",
            Self::NoOutput => "no_output",
            Self::TransportFailure(_) => "transport_failure",
        }
    }

    /// Text placed in the output pane.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Output(text) | Self::CompileError(text) | Self::RuntimeError(text) => {
                text.clone()
            }
            Self::NoOutput => NO_OUTPUT_TEXT.to_string(),
            Self::TransportFailure(reason) => format!("{TRANSPORT_FAILURE_TEXT} ({reason})"),
        }
    }
}

impl fmt::Display for SubmissionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

// ============================================================================
// ExecutionBackend
// ============================================================================

/// Something that can run a submission and report its outcome.
///
/// Implementations must never fail: every transport or parsing problem is
/// reported as [`SubmissionResult::TransportFailure`].
pub trait ExecutionBackend: Send + Sync + 'static {
    /// Runs the program and waits for the judged result.
    fn submit<'a>(&'a self, request: &'a SubmissionRequest) -> BoxFuture<'a, SubmissionResult>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_for_session_attaches_stdin_when_required() {
        let request = SubmissionRequest::for_session(
            &ServiceId::from("71"),
            "name = input()\nprint(name)",
            "Ada",
        );
        assert_eq!(request.stdin(), "Ada");
        assert_eq!(request.language().as_str(), "71");
    }

    #[test]
    fn test_for_session_drops_stdin_when_not_required() {
        let request =
            SubmissionRequest::for_session(&ServiceId::from("63"), "console.log(1);", "ignored");
        assert_eq!(request.stdin(), "");
        assert_eq!(request.source_code(), "console.log(1);");
    }

    #[test]
    fn test_for_session_unknown_language_sends_no_stdin() {
        let request = SubmissionRequest::for_session(&ServiceId::from("999"), "input()", "x");
        assert!(request.stdin().is_empty());
    }

    #[test]
    fn test_display_text() {
        insta::assert_snapshot!(SubmissionResult::Output("5".to_string()).display_text(), @"5");
        insta::assert_snapshot!(SubmissionResult::NoOutput.display_text(), @"No output");
        insta::assert_snapshot!(
            SubmissionResult::transport_failure("connection refused").display_text(),
            @"Error compiling code. Please check your internet connection. (connection refused)"
        );
    }

    #[test]
    fn test_errors_rendered_verbatim() {
        let compile = SubmissionResult::CompileError("main.c:1: error: expected ';'".to_string());
        assert_eq!(compile.to_string(), "main.c:1: error: expected ';'");

        let runtime = SubmissionResult::RuntimeError("Traceback ...".to_string());
        assert_eq!(runtime.to_string(), "Traceback ...");
    }

    #[test]
    fn test_is_judged() {
        assert!(SubmissionResult::NoOutput.is_judged());
        assert!(SubmissionResult::CompileError(String::new()).is_judged());
        assert!(!SubmissionResult::transport_failure("timeout").is_judged());
    }

    #[test]
    fn test_outcome_names() {
        assert_eq!(SubmissionResult::Output(String::new()).outcome(), "output");
        assert_eq!(SubmissionResult::NoOutput.outcome(), "no_output");
        assert_eq!(
            SubmissionResult::transport_failure("x").outcome(),
            "transport_failure"
        );
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_string(&SubmissionResult::CompileError("e".to_string())).unwrap();
        assert_eq!(json, r#"{"outcome":"compile_error","text":"e"}"#);

        let json = serde_json::to_string(&SubmissionResult::NoOutput).unwrap();
        assert_eq!(json, r#"{"outcome":"no_output"}"#);
    }
}
