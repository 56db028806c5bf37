//! reqwest-based judge client.
//!
//! This module provides [`JudgeClient`], which posts one submission per run
//! and waits for the judged result in the same HTTP exchange.

use std::fmt;
use std::time::Duration;

use codeplay_core::{ExecutionBackend, JudgeConfig, SubmissionRequest, SubmissionResult};
use futures::future::BoxFuture;
use tracing::{debug, info, instrument, warn};

use crate::{JudgeError, JudgeRequest, JudgeResponse};

/// Header carrying the judge host for API gateways.
pub const API_HOST_HEADER: &str = "x-rapidapi-host";

/// Header carrying the API credential.
pub const API_KEY_HEADER: &str = "x-rapidapi-key";

/// Longest error body kept from a failed response, in bytes.
pub const MAX_ERROR_BODY_BYTES: usize = 512;

/// Client for a Judge0-compatible submissions endpoint.
///
/// # Example
///
/// ```no_run
/// use codeplay_core::{ExecutionBackend, JudgeConfig, ServiceId, SubmissionRequest};
/// use codeplay_judge::JudgeClient;
///
/// # async fn example() -> Result<(), codeplay_judge::JudgeError> {
/// let client = JudgeClient::new(&JudgeConfig::default())?;
/// let request = SubmissionRequest::new(ServiceId::from("71"), "print(2 + 3)", "");
/// println!("{}", client.submit(&request).await);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JudgeClient {
    http: reqwest::Client,
    endpoint: String,
    api_host: Option<String>,
    api_key: Option<String>,
}

impl JudgeClient {
    /// Builds a client from judge settings.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::ClientBuild`] if `config.wait` is off or the TLS
    /// backend or resolver cannot be initialised.
    pub fn new(config: &JudgeConfig) -> Result<Self, JudgeError> {
        // Without wait the judge answers with a token, not a result.
        if !config.wait {
            return Err(JudgeError::ClientBuild(
                "judge.wait must be true; polling by token is not supported".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| JudgeError::ClientBuild(e.to_string()))?;

        debug!(endpoint = %config.endpoint, "Created judge client");
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_host: config.api_host.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// The submissions endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one submission and parses the judged result.
    ///
    /// # Errors
    ///
    /// Returns a [`JudgeError`] for an unparseable language id, any transport
    /// failure, a non-success status or a body that is not judge JSON.
    #[instrument(skip(self, request), fields(language = %request.language()))]
    pub async fn try_submit(
        &self,
        request: &SubmissionRequest,
    ) -> Result<SubmissionResult, JudgeError> {
        let language_id = request
            .language()
            .judge_id()
            .ok_or_else(|| JudgeError::InvalidLanguageId(request.language().to_string()))?;

        let body = JudgeRequest {
            source_code: request.source_code().to_string(),
            language_id,
            stdin: request.stdin().to_string(),
        };

        info!(
            source_len = body.source_code.len(),
            stdin_attached = !body.stdin.is_empty(),
            "Submitting to judge"
        );

        let mut builder = self
            .http
            .post(&self.endpoint)
            .query(&[
                ("base64_encoded", "false"),
                ("wait", "true"),
            ])
            .json(&body);
        if let Some(host) = &self.api_host {
            builder = builder.header(API_HOST_HEADER, host);
        }
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::Status {
                status: status.as_u16(),
                body: truncate_body(body),
            });
        }

        let text = response.text().await?;
        let parsed: JudgeResponse = serde_json::from_str(&text)?;
        let result = parsed.into_result();

        info!(status = status.as_u16(), outcome = result.outcome(), "Judge answered");
        Ok(result)
    }
}

impl ExecutionBackend for JudgeClient {
    fn submit<'a>(&'a self, request: &'a SubmissionRequest) -> BoxFuture<'a, SubmissionResult> {
        Box::pin(async move {
            match self.try_submit(request).await {
                Ok(result) => result,
                Err(err) => {
                    warn!(
                        language = %request.language(),
                        transient = err.is_transient(),
                        error = %err,
                        "Judge submission failed"
                    );
                    SubmissionResult::transport_failure(err)
                }
            }
        })
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body;
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
    body.push_str("...");
    body
}

// Keeps the API key out of logs.
impl fmt::Debug for JudgeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JudgeClient")
            .field("endpoint", &self.endpoint)
            .field("api_host", &self.api_host)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}
