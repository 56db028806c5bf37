//! Codeplay Core
//!
//! Client-side core of the Codeplay online compiler: the language catalog,
//! the stdin heuristic and the editor session that drives submissions.
//!
//! Talking to an actual judge lives in `codeplay-judge`; this crate only
//! defines the [`ExecutionBackend`] seam it plugs into.

pub mod classifier;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod registry;
pub mod session;
pub mod submission;

pub use classifier::{requires_stdin, stdin_tokens};
pub use config::{Config, EventsConfig, JudgeConfig, ENV_JUDGE_HOST, ENV_JUDGE_KEY, ENV_JUDGE_URL};
pub use error::{CodeplayError, Result};
pub use events::{EventBroadcaster, SessionEvent};
pub use handle::SessionHandle;
pub use registry::{LanguageOption, LanguageRegistry, ServiceId};
pub use session::{
    CompletionOutcome, EditorSession, PendingSubmission, SessionSnapshot, SessionStatus,
};
pub use submission::{
    ExecutionBackend, SubmissionRequest, SubmissionResult, NO_OUTPUT_TEXT, TRANSPORT_FAILURE_TEXT,
};
