use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use podexec::ClientOpt;

/// Run commands inside Kubernetes pod containers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct PodExecArgs {
    /// Configuration file, without extension
    #[arg(long, default_value = "podexec")]
    pub config: String,
    #[arg(short, long)]
    pub namespace: Option<String>,
    #[arg(short, long)]
    pub pod: Option<String>,
    #[arg(short, long)]
    pub container: Option<String>,
    /// Kubeconfig context, the current one when missing
    #[arg(long)]
    pub context: Option<String>,
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,
    /// Exec timeout in seconds, 0 disables it
    #[arg(long)]
    pub timeout: Option<u64>,
    #[arg(short, long, default_value = "plain")]
    pub out_format: OutFormat,
    #[clap(subcommand)]
    pub subcommand: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutFormat {
    Plain,
    Json
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the current identity can exec into pods of the namespace
    Check,
    /// Run a command in the target container
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Pass stdin to the container
    #[arg(short = 'i', long)]
    pub stdin: bool,
    /// Allocate a terminal, stderr is merged into stdout
    #[arg(short, long)]
    pub tty: bool,
    /// Do not run the permission check first
    #[arg(long)]
    pub skip_check: bool,
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl PodExecArgs {
    /// Command line values take precedence over file and environment settings.
    pub fn merge_into(&self, mut opt: ClientOpt) -> ClientOpt {
        if let Some(namespace) = &self.namespace {
            opt.namespace = namespace.clone();
        }
        if let Some(pod) = &self.pod {
            opt.pod_name = pod.clone();
        }
        if let Some(container) = &self.container {
            opt.container_name = Some(container.clone());
        }
        if let Some(context) = &self.context {
            opt.current_context = Some(context.clone());
        }
        if let Some(kubeconfig) = &self.kubeconfig {
            opt.kubeconfig = Some(kubeconfig.clone());
        }
        if let Some(timeout) = self.timeout {
            opt.timeout_secs = Some(timeout);
        }
        opt
    }
}
