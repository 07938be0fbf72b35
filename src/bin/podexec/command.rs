use std::future::Future;
use std::process::ExitCode;

use serde::Serialize;
use serde_json::json;

use crate::args::OutFormat;

pub async fn execute_command<Cmd, FutRes, Res>(out_format: OutFormat, command: Cmd) -> ExitCode
where
    Cmd: FnOnce() -> FutRes,
    FutRes: Future<Output = anyhow::Result<Res>>,
    Res: Printable,
{
    match command().await {
        Ok(result) => {
            result.print(out_format);
            ExitCode::SUCCESS
        }
        Err(error) => {
            print_error(out_format, &error);
            ExitCode::FAILURE
        }
    }
}

pub fn print_error(out_format: OutFormat, error: &anyhow::Error) {
    eprintln!("{}", error_line(out_format, error));
}

fn error_line(out_format: OutFormat, error: &anyhow::Error) -> String {
    match out_format {
        OutFormat::Plain => format!("Error during command execution - {error:#}"),
        OutFormat::Json => serde_json::to_string(&json!({ "out": "error", "message": format!("{error:#}") }))
            .unwrap_or_default(),
    }
}

pub trait Printable {
    fn print(&self, format: OutFormat);
}

impl<T> Printable for T
where
    T: PrintFormat<JsonFormat> + PrintFormat<PlainFormat>,
{
    fn print(&self, format: OutFormat) {
        match format {
            OutFormat::Plain => PrintFormat::<PlainFormat>::print(self),
            OutFormat::Json => PrintFormat::<JsonFormat>::print(self),
        }
    }
}

pub struct JsonFormat;
pub struct PlainFormat;
pub trait PrintFormat<F> {
    fn print(&self);
}

impl<S> PrintFormat<JsonFormat> for S
where
    S: Serialize,
{
    fn print(&self) {
        match serde_json::to_string(self) {
            Ok(serialized) => println!("{serialized}"),
            Err(err) => eprintln!("Error serializing result in json format - {err}"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionOutcome {
    pub namespace: String,
    pub allowed: bool,
}

impl PrintFormat<PlainFormat> for PermissionOutcome {
    fn print(&self) {
        println!("exec allowed in namespace {}", self.namespace);
    }
}
