//! The data pipeline: a client that asks a pipeline server to regenerate the
//! report, and the runner behind the `/run-pipeline` route that serves such
//! requests by executing the configured command.

use crate::config::PipelineCommand;
use crate::error::Result;
use log::{error, info, warn};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;

pub const SUCCESS_MESSAGE: &str = "Success! The pipeline has completed. You can now upload the new \"CRR_Full_Combined_Report.xlsx\" file.";
pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";
pub const UNREACHABLE_MESSAGE: &str =
    "Failed to connect to the local server. Is it running? (Run \"python server.py\")";

/// How a pipeline request ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Success,
    /// The server answered with a non-success status.
    Failed {
        reason: Option<String>,
        details: Option<String>,
    },
    /// No answer, or an answer that is not JSON.
    Unreachable,
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success)
    }

    /// Text for the refresh status line.
    pub fn status_message(&self) -> String {
        match self {
            PipelineOutcome::Success => SUCCESS_MESSAGE.to_string(),
            PipelineOutcome::Failed { reason, .. } => {
                format!("Error: {}", reason.as_deref().unwrap_or(UNKNOWN_ERROR))
            }
            PipelineOutcome::Unreachable => UNREACHABLE_MESSAGE.to_string(),
        }
    }

    /// Maps a decoded server reply to an outcome.
    pub fn from_reply(status: StatusCode, reply: PipelineReply) -> Self {
        if status.is_success() {
            PipelineOutcome::Success
        } else {
            PipelineOutcome::Failed {
                reason: reply.message.filter(|message| !message.is_empty()),
                details: reply.error_details,
            }
        }
    }
}

/// Body returned by a pipeline server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Client for a pipeline server.
///
/// Requests carry no timeout: a pipeline run can take minutes.
#[derive(Clone, Debug)]
pub struct PipelineClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PipelineClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Sends one POST to the endpoint and reports how it went.
    pub async fn trigger(&self) -> PipelineOutcome {
        info!("triggering pipeline at {}", self.endpoint);
        let response = match self.client.post(&self.endpoint).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("pipeline server unreachable: {}", e);
                return PipelineOutcome::Unreachable;
            }
        };

        let status = response.status();
        let reply: PipelineReply = match response.json().await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("pipeline server sent an unreadable reply: {}", e);
                return PipelineOutcome::Unreachable;
            }
        };

        let outcome = PipelineOutcome::from_reply(status, reply);
        match &outcome {
            PipelineOutcome::Failed { details, .. } => {
                error!("pipeline failed ({}): {}", status, details.as_deref().unwrap_or("-"))
            }
            _ => info!("pipeline completed"),
        }
        outcome
    }
}

pub const RUN_SUCCEEDED: &str = "Data pipeline completed successfully!";
pub const SCRIPT_NOT_FOUND: &str = "Pipeline script not found on the server.";
pub const SCRIPT_FAILED: &str = "The data pipeline script encountered an error.";
pub const UNEXPECTED_ERROR: &str = "An unexpected server error occurred.";

/// Result of running the pipeline command locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResult {
    pub success: bool,
    pub reply: PipelineReply,
}

impl RunResult {
    fn failed(message: &str, details: String, output: Option<String>) -> Self {
        RunResult {
            success: false,
            reply: PipelineReply {
                message: Some(message.to_string()),
                error_details: Some(details),
                output,
            },
        }
    }
}

/// Runs the pipeline command to completion, capturing its output.
pub async fn run_command(command: &PipelineCommand) -> RunResult {
    info!("running pipeline: {} {}", command.program, command.args.join(" "));

    if let Some(dir) = &command.working_dir {
        if !dir.is_dir() {
            error!("pipeline directory {} does not exist", dir.display());
            return RunResult::failed(
                SCRIPT_NOT_FOUND,
                format!("No such file or directory: {}", dir.display()),
                None,
            );
        }
    }

    let mut process = tokio::process::Command::new(&command.program);
    process.args(&command.args);
    if let Some(dir) = &command.working_dir {
        process.current_dir(dir);
    }

    let output = match process.output().await {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!("pipeline program {} not found", command.program);
            return RunResult::failed(
                SCRIPT_NOT_FOUND,
                format!("No such file or directory: {}", command.program),
                None,
            );
        }
        Err(e) => {
            error!("could not start pipeline: {}", e);
            return RunResult::failed(UNEXPECTED_ERROR, e.to_string(), None);
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if output.status.success() {
        info!("pipeline finished");
        RunResult {
            success: true,
            reply: PipelineReply {
                message: Some(RUN_SUCCEEDED.to_string()),
                error_details: None,
                output: Some(stdout),
            },
        }
    } else {
        error!("pipeline exited with {}", output.status);
        RunResult::failed(SCRIPT_FAILED, stderr, Some(stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_falls_back_when_missing() {
        let outcome = PipelineOutcome::from_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            PipelineReply::default(),
        );
        assert_eq!(outcome.status_message(), "Error: An unknown error occurred.");

        let outcome = PipelineOutcome::from_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            PipelineReply {
                message: Some("disk full".to_string()),
                ..PipelineReply::default()
            },
        );
        assert_eq!(outcome.status_message(), "Error: disk full");
    }

    #[test]
    fn outcomes_have_distinct_messages() {
        let success = PipelineOutcome::from_reply(StatusCode::OK, PipelineReply::default());
        assert!(success.is_success());
        assert_eq!(success.status_message(), SUCCESS_MESSAGE);
        assert_eq!(PipelineOutcome::Unreachable.status_message(), UNREACHABLE_MESSAGE);
    }

    #[tokio::test]
    async fn missing_program_reports_not_found() {
        let command = PipelineCommand {
            program: "crr-pipeline-that-does-not-exist".to_string(),
            args: Vec::new(),
            working_dir: None,
        };
        let result = run_command(&command).await;
        assert!(!result.success);
        assert_eq!(result.reply.message.as_deref(), Some(SCRIPT_NOT_FOUND));
    }

    #[tokio::test]
    async fn unreachable_server_is_reported() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let client = PipelineClient::new("http://127.0.0.1:9/run-pipeline").unwrap();
        assert_eq!(client.trigger().await, PipelineOutcome::Unreachable);
    }
}
