use k8s_openapi::api::core::v1::Pod;
use kube::api::AttachParams;
use kube::Resource;

use crate::core::error::ExecError;
use crate::exec::streams::ExecStreams;

/// Options of a `pods/exec` call: target container, argv and requested channels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecRequest {
    pub container: Option<String>,
    pub command: Vec<String>,
    pub stdin: bool,
    pub stdout: bool,
    pub stderr: bool,
    pub tty: bool,
}

impl ExecRequest {
    pub fn new<I, T>(command: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn container(mut self, container: Option<&str>) -> Self {
        self.container = container.map(String::from);
        self
    }

    /// Requests exactly the channels the caller supplied a stream for.
    ///
    /// A terminal session has no separate stderr channel: the remote side writes it to stdout.
    pub fn for_streams(mut self, streams: &ExecStreams, tty: bool) -> Self {
        self.stdin = streams.stdin.is_some();
        self.stdout = streams.stdout.is_some();
        self.stderr = streams.stderr.is_some() && !tty;
        self.tty = tty;
        if tty && streams.stderr.is_some() {
            log::warn!("tty requested, stderr writer is ignored and remote stderr is merged into stdout");
        }
        self
    }

    pub fn validate(&self) -> Result<(), ExecError> {
        if self.command.is_empty() {
            return Err(ExecError::InvalidRequest(String::from("command must not be empty")));
        }
        if !(self.stdin || self.stdout || self.stderr) {
            return Err(ExecError::InvalidRequest(String::from("at least one of stdin, stdout or stderr must be attached")));
        }
        Ok(())
    }

    pub fn attach_params(&self) -> AttachParams {
        let params = AttachParams::default()
            .stdin(self.stdin)
            .stdout(self.stdout)
            .stderr(self.stderr)
            .tty(self.tty);
        match &self.container {
            Some(container) => params.container(container),
            None => params,
        }
    }

    /// Exec subresource URI (path and query) for the given pod.
    pub fn exec_uri(&self, namespace: &str, pod_name: &str) -> Result<String, ExecError> {
        self.validate()?;
        let request = kube::core::Request::new(Pod::url_path(&(), Some(namespace)))
            .exec(pod_name, self.command.clone(), &self.attach_params())
            .map_err(|err| ExecError::InvalidRequest(err.to_string()))?;
        Ok(request.uri().to_string())
    }

    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> tokio::io::Sink {
        tokio::io::sink()
    }

    #[test]
    fn flags_follow_supplied_streams() {
        let streams = ExecStreams::new().stdout(sink());
        let request = ExecRequest::new(["ls", "-la"]).for_streams(&streams, false);
        assert!(!request.stdin);
        assert!(request.stdout);
        assert!(!request.stderr);
        assert!(!request.tty);

        let streams = ExecStreams::new()
            .stdin(tokio::io::empty())
            .stdout(sink())
            .stderr(sink());
        let request = ExecRequest::new(["cat"]).for_streams(&streams, false);
        assert!(request.stdin);
        assert!(request.stdout);
        assert!(request.stderr);
        assert!(!request.tty);
    }

    #[test]
    fn tty_drops_stderr_channel() {
        let streams = ExecStreams::new()
            .stdin(tokio::io::empty())
            .stdout(sink())
            .stderr(sink());
        let request = ExecRequest::new(["/bin/sh"]).for_streams(&streams, true);
        assert!(request.stdin);
        assert!(request.stdout);
        assert!(!request.stderr);
        assert!(request.tty);

        let params = request.attach_params();
        assert!(params.stdin);
        assert!(params.stdout);
        assert!(!params.stderr);
        assert!(params.tty);
    }

    #[test]
    fn attach_params_carry_container() {
        let request = ExecRequest::new(["env"])
            .container(Some("sidecar"))
            .for_streams(&ExecStreams::new().stdout(sink()), false);
        let params = request.attach_params();
        assert_eq!(params.container.as_deref(), Some("sidecar"));
        assert!(!params.stdin);
        assert!(params.stdout);
        assert!(!params.stderr);
        assert!(!params.tty);

        let params = ExecRequest::new(["env"]).attach_params();
        assert_eq!(params.container, None);
    }

    #[test]
    fn rejects_empty_command_and_no_streams() {
        let streams = ExecStreams::new().stdout(sink());
        let empty = ExecRequest::new(Vec::<String>::new()).for_streams(&streams, false);
        assert!(matches!(empty.validate(), Err(ExecError::InvalidRequest(_))));

        let detached = ExecRequest::new(["true"]).for_streams(&ExecStreams::new(), false);
        assert!(matches!(detached.validate(), Err(ExecError::InvalidRequest(_))));

        let tty_stderr_only = ExecRequest::new(["true"]).for_streams(&ExecStreams::new().stderr(sink()), true);
        assert!(matches!(tty_stderr_only.validate(), Err(ExecError::InvalidRequest(_))));
    }

    #[test]
    fn exec_uri_targets_pod_subresource() {
        let streams = ExecStreams::new().stdout(sink()).stderr(sink());
        let uri = ExecRequest::new(["sh", "-c", "echo hi"])
            .container(Some("app"))
            .for_streams(&streams, false)
            .exec_uri("payments", "api-7f9c")
            .expect("Error building exec uri");

        assert!(uri.starts_with("/api/v1/namespaces/payments/pods/api-7f9c/exec?"), "{uri}");
        assert!(uri.contains("command=sh"), "{uri}");
        assert!(uri.contains("command=-c"), "{uri}");
        assert!(uri.contains("command=echo+hi"), "{uri}");
        assert!(uri.contains("container=app"), "{uri}");
        assert!(uri.contains("stdout=true"), "{uri}");
        assert!(uri.contains("stderr=true"), "{uri}");
        assert!(!uri.contains("stdin=true"), "{uri}");
        assert!(!uri.contains("tty=true"), "{uri}");
    }

    #[test]
    fn exec_uri_for_interactive_terminal() {
        let streams = ExecStreams::new()
            .stdin(tokio::io::empty())
            .stdout(sink())
            .stderr(sink());
        let uri = ExecRequest::new(["bash"])
            .for_streams(&streams, true)
            .exec_uri("default", "web-0")
            .expect("Error building exec uri");

        assert!(uri.contains("stdin=true"), "{uri}");
        assert!(uri.contains("stdout=true"), "{uri}");
        assert!(uri.contains("tty=true"), "{uri}");
        assert!(!uri.contains("stderr=true"), "{uri}");
        assert!(!uri.contains("container="), "{uri}");
    }
}
