//! Run commands inside Kubernetes pod containers.
//!
//! Provides a pre-flight RBAC check for the `pods/exec` subresource and a thin exec client
//! streaming standard I/O through the kube-rs WebSocket transport.

pub mod core;
pub mod exec;
pub mod transport;

pub use crate::core::config::ClientOpt;
pub use crate::core::error::ExecError;
pub use crate::exec::client::ExecClient;
pub use crate::exec::streams::ExecStreams;
