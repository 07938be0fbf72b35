use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to load kube config - {0}")]
    KubeConfig(String),
    #[error("Failed to set up cluster client: {0}")]
    ClientSetup(#[source] kube::Error),
    #[error("Failed to query exec permissions: {0}")]
    AuthorizationQuery(#[source] kube::Error),
    #[error("no permissions to create exec subresource{}", fmt_reason(.reason))]
    PermissionDenied { reason: Option<String> },
    #[error("Invalid exec request - {0}")]
    InvalidRequest(String),
    #[error("failed to set up executor: {0}")]
    ExecutorSetup(#[source] kube::Error),
    #[error("failed to exec command: {0}")]
    Stream(#[source] std::io::Error),
    #[error("failed to exec command: {}", fmt_exit(.exit_code, .message))]
    CommandFailed { exit_code: Option<i32>, message: String },
    #[error("exec session closed with stdin before the command exit status was received")]
    StatusUnavailable,
    #[error("Proxy '{0}' is not supported by the cluster client")]
    UnsupportedProxy(String),
    #[error("Timeout after {timeout:?}")]
    Timeout { timeout: Duration },
}

fn fmt_reason(reason: &Option<String>) -> String {
    reason.as_ref()
        .map(|reason| format!(". reason: {reason}"))
        .unwrap_or_default()
}

fn fmt_exit(exit_code: &Option<i32>, message: &str) -> String {
    match exit_code {
        Some(code) => format!("command terminated with exit code {code} - {message}"),
        None => String::from(message),
    }
}
