use std::io;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Local ends of the remote process standard streams.
///
/// A missing stream is not requested from the API server at all.
#[derive(Default)]
pub struct ExecStreams {
    pub stdin: Option<BoxedReader>,
    pub stdout: Option<BoxedWriter>,
    pub stderr: Option<BoxedWriter>,
}

impl ExecStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wires the current process standard streams, stdin only when `interactive`.
    pub fn stdio(interactive: bool) -> Self {
        let streams = Self::new()
            .stdout(tokio::io::stdout())
            .stderr(tokio::io::stderr());
        if interactive {
            streams.stdin(tokio::io::stdin())
        } else {
            streams
        }
    }

    pub fn stdin<R: AsyncRead + Send + Unpin + 'static>(mut self, reader: R) -> Self {
        self.stdin = Some(Box::new(reader));
        self
    }

    pub fn stdout<W: AsyncWrite + Send + Unpin + 'static>(mut self, writer: W) -> Self {
        self.stdout = Some(Box::new(writer));
        self
    }

    pub fn stderr<W: AsyncWrite + Send + Unpin + 'static>(mut self, writer: W) -> Self {
        self.stderr = Some(Box::new(writer));
        self
    }
}

async fn forward_input<R, W>(local: Option<R>, remote: Option<W>) -> io::Result<bool>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let (Some(mut local), Some(mut remote)) = (local, remote) {
        let sent = tokio::io::copy(&mut local, &mut remote).await?;
        log::debug!("stdin closed after {sent} bytes");
        remote.shutdown().await?;
        return Ok(true);
    }
    Ok(false)
}

async fn forward_output<R, W>(remote: Option<R>, local: Option<W>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let (Some(mut remote), Some(mut local)) = (remote, local) {
        tokio::io::copy(&mut remote, &mut local).await?;
        local.flush().await?;
    }
    Ok(())
}

/// How a pumped session ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpSummary {
    /// Local stdin reached EOF and the remote stdin was closed.
    ///
    /// The kube-rs websocket transport ends the whole session when stdin is closed, so the
    /// final status of the remote process may never arrive after this.
    pub stdin_closed: bool,
}

/// Copies data between the local streams and the remote process channels.
///
/// With an output channel attached, returns once every remote output is closed: local stdin
/// is closed on the remote side when it reaches EOF, and abandoned if the outputs close first.
/// Without output channels, returns once local stdin is fully forwarded.
pub async fn pump_streams<RI, RO, RE>(
    local: ExecStreams,
    remote_stdin: Option<RI>,
    remote_stdout: Option<RO>,
    remote_stderr: Option<RE>,
) -> io::Result<PumpSummary>
where
    RI: AsyncWrite + Unpin,
    RO: AsyncRead + Unpin,
    RE: AsyncRead + Unpin,
{
    let ExecStreams { stdin, stdout, stderr } = local;

    let has_output = (remote_stdout.is_some() && stdout.is_some())
        || (remote_stderr.is_some() && stderr.is_some());

    let input = forward_input(stdin, remote_stdin);
    let output = futures::future::try_join(
        forward_output(remote_stdout, stdout),
        forward_output(remote_stderr, stderr),
    );
    tokio::pin!(input, output);

    if !has_output {
        let stdin_closed = input.await?;
        output.await?;
        return Ok(PumpSummary { stdin_closed });
    }

    tokio::select! {
        res = &mut output => {
            res?;
            Ok(PumpSummary { stdin_closed: false })
        }
        res = &mut input => {
            let stdin_closed = res?;
            output.await?;
            Ok(PumpSummary { stdin_closed })
        }
    }
}
