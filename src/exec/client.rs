use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use kube::{Api, Client};

use crate::core::config::ClientOpt;
use crate::core::error::ExecError;
use crate::exec::request::ExecRequest;
use crate::exec::streams::{pump_streams, ExecStreams};
use crate::transport;

pub struct ExecClient {
    client: Client,
    opt: ClientOpt,
}

impl ExecClient {
    pub async fn new(opt: ClientOpt) -> Result<Self, ExecError> {
        let client = transport::build_client(&opt).await?;
        Ok(Self::with_client(client, opt))
    }

    pub fn with_client(client: Client, opt: ClientOpt) -> Self {
        Self {
            client,
            opt,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn opt(&self) -> &ClientOpt {
        &self.opt
    }

    fn pods_api(&self) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &self.opt.namespace)
    }

    /// Runs `command` in the configured pod container, streaming the supplied standard streams.
    ///
    /// Returns when the remote process exits, failing if it terminates with a non-success status.
    pub async fn exec_pod<I, T>(&self, command: I, streams: ExecStreams, tty: bool) -> Result<(), ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let request = ExecRequest::new(command)
            .container(self.opt.container_name.as_deref())
            .for_streams(&streams, tty);

        log::info!(
            "sending exec request, command={}, namespace={}, pod={}, container={}, timeout={:?}",
            request.command_line(),
            self.opt.namespace,
            self.opt.pod_name,
            self.opt.container_name.as_deref().unwrap_or_default(),
            self.opt.timeout(),
        );
        request.validate()?;

        match self.opt.timeout() {
            Some(timeout) => tokio::time::timeout(timeout, self.stream(request, streams))
                .await
                .map_err(|_| ExecError::Timeout { timeout })?,
            None => self.stream(request, streams).await,
        }
    }

    async fn stream(&self, request: ExecRequest, streams: ExecStreams) -> Result<(), ExecError> {
        let mut process = self.pods_api()
            .exec(&self.opt.pod_name, request.command.clone(), &request.attach_params())
            .await
            .map_err(ExecError::ExecutorSetup)?;

        let status = process.take_status();
        let remote_stdin = process.stdin();
        let remote_stdout = process.stdout();
        let remote_stderr = process.stderr();

        let summary = pump_streams(streams, remote_stdin, remote_stdout, remote_stderr)
            .await
            .map_err(ExecError::Stream)?;

        let remote_status = match status {
            Some(status) => status.await,
            None => None,
        };
        let outcome = evaluate_status(remote_status, summary.stdin_closed);

        if let Err(err) = process.join().await {
            log::warn!("exec session for pod {} did not terminate cleanly - {err}", self.opt.pod_name);
        }

        outcome
    }
}

/// Maps the final status of the remote process to the exec outcome.
///
/// Closing remote stdin tears down the session before the status is sent, so a missing status
/// after `stdin_closed` means the outcome of the command is unknown.
pub fn evaluate_status(status: Option<Status>, stdin_closed: bool) -> Result<(), ExecError> {
    let Some(status) = status else {
        if stdin_closed {
            return Err(ExecError::StatusUnavailable);
        }
        log::debug!("exec session ended without status");
        return Ok(());
    };
    if status.status.as_deref() != Some("Failure") {
        return Ok(());
    }

    let exit_code = status.details.as_ref()
        .and_then(|details| details.causes.as_ref())
        .and_then(|causes| causes.iter().find(|cause| cause.reason.as_deref() == Some("ExitCode")))
        .and_then(|cause| cause.message.as_ref())
        .and_then(|code| code.parse::<i32>().ok());

    Err(ExecError::CommandFailed {
        exit_code,
        message: status.message.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{StatusCause, StatusDetails};

    use super::*;

    fn unreachable_client(namespace: &str) -> ExecClient {
        let config = kube::Config::new("http://127.0.0.1:1".parse().expect("Invalid url"));
        let client = transport::client_for(config).expect("Error building client");
        ExecClient::with_client(client, ClientOpt::new(namespace, "web-0"))
    }

    #[test]
    fn success_status_is_ok() {
        let status = Status {
            status: Some(String::from("Success")),
            ..Default::default()
        };
        assert!(evaluate_status(Some(status.clone()), false).is_ok());
        assert!(evaluate_status(Some(status), true).is_ok());
        assert!(evaluate_status(None, false).is_ok());
    }

    #[test]
    fn failure_status_reports_exit_code() {
        let status = Status {
            status: Some(String::from("Failure")),
            reason: Some(String::from("NonZeroExitCode")),
            message: Some(String::from("command terminated with non-zero exit code: exit status 3")),
            details: Some(StatusDetails {
                causes: Some(vec![StatusCause {
                    reason: Some(String::from("ExitCode")),
                    message: Some(String::from("3")),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let err = evaluate_status(Some(status), true).expect_err("Failure status must fail");
        assert!(matches!(err, ExecError::CommandFailed { exit_code: Some(3), .. }));
    }

    #[test]
    fn failure_status_without_exit_code() {
        let status = Status {
            status: Some(String::from("Failure")),
            message: Some(String::from("container not found (\"app\")")),
            ..Default::default()
        };

        match evaluate_status(Some(status), false) {
            Err(ExecError::CommandFailed { exit_code: None, message }) => assert!(message.contains("container not found")),
            other => panic!("Unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn missing_status_after_stdin_close_is_unknown() {
        let err = evaluate_status(None, true).expect_err("Missing status after stdin close must fail");
        assert!(matches!(err, ExecError::StatusUnavailable));
    }

    #[tokio::test]
    async fn empty_command_fails_before_contacting_cluster() {
        let client = unreachable_client("default");
        let streams = ExecStreams::new().stdout(tokio::io::sink());

        let err = client.exec_pod(Vec::<String>::new(), streams, false)
            .await
            .expect_err("Empty command must fail");
        assert!(matches!(err, ExecError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn unreachable_cluster_fails_executor_setup() {
        let client = unreachable_client("default");
        let streams = ExecStreams::new().stdout(tokio::io::sink());

        let err = client.exec_pod(["date"], streams, false)
            .await
            .expect_err("Exec must fail without a cluster");
        assert!(matches!(err, ExecError::ExecutorSetup(_)), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_cluster_fails_permission_query() {
        let client = unreachable_client("payments");

        let err = client.can_exec().await.expect_err("Permission check must fail without a cluster");
        assert!(matches!(err, ExecError::AuthorizationQuery(_)), "{err:?}");
    }
}
