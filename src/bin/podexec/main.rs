use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;

use podexec::core::config::compose_config;
use podexec::{ClientOpt, ExecClient, ExecError, ExecStreams};

use crate::args::{Commands, PodExecArgs, RunArgs};
use crate::command::{execute_command, print_error, PermissionOutcome};

mod args;
mod command;

async fn build_client(args: &PodExecArgs) -> anyhow::Result<ExecClient> {
    let file_opt: ClientOpt = compose_config(&args.config, "PODEXEC")
        .context("Error loading configuration")?;
    let opt = args.merge_into(file_opt);
    if opt.pod_name.is_empty() {
        bail!("pod name is required, use --pod or PODEXEC_POD_NAME");
    }
    ExecClient::new(opt)
        .await
        .context("Error building cluster client")
}

async fn check(args: &PodExecArgs) -> anyhow::Result<PermissionOutcome> {
    let client = build_client(args).await?;
    client.can_exec().await?;
    Ok(PermissionOutcome {
        namespace: client.opt().namespace.clone(),
        allowed: true,
    })
}

async fn run(args: &PodExecArgs, run_args: &RunArgs) -> anyhow::Result<()> {
    let client = build_client(args).await?;
    if !run_args.skip_check {
        client.can_exec().await?;
    }
    let streams = ExecStreams::stdio(run_args.stdin);
    client.exec_pod(run_args.command.iter().cloned(), streams, run_args.tty).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();
    let args: PodExecArgs = PodExecArgs::parse();

    match &args.subcommand {
        Commands::Check => {
            execute_command(args.out_format, || check(&args)).await
        }
        Commands::Run(run_args) => match run(&args, run_args).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                print_error(args.out_format, &err);
                match err.downcast_ref::<ExecError>() {
                    Some(ExecError::CommandFailed { exit_code: Some(code), .. }) => {
                        ExitCode::from(u8::try_from(*code).unwrap_or(1))
                    }
                    _ => ExitCode::FAILURE,
                }
            }
        },
    }
}
