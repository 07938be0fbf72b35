use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub fn compose_config<'de, CFG: Deserialize<'de>>(external_path: &str, env_prefix: &str) -> Result<CFG, ConfigError> {
    Config::builder()

        // Add in a local configuration file
        .add_source(File::with_name(external_path).required(false))

        // Add in settings from the environment (e.g. PODEXEC_POD_NAME)
        .add_source(Environment::with_prefix(env_prefix))

        .build()?
        .try_deserialize()
}

/// Target of the exec operation and the cluster credentials used to reach it.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientOpt {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub pod_name: String,
    #[serde(default)]
    pub container_name: Option<String>,
    #[serde(default)]
    pub current_context: Option<String>,
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_namespace() -> String {
    String::from("default")
}

impl ClientOpt {
    pub fn new(namespace: &str, pod_name: &str) -> Self {
        Self {
            namespace: String::from(namespace),
            pod_name: String::from(pod_name),
            ..Default::default()
        }
    }

    pub fn container(mut self, container_name: &str) -> Self {
        self.container_name = Some(String::from(container_name));
        self
    }

    /// Exec deadline, `None` when unset or zero.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
