use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use crate::core::config::ClientOpt;
use crate::core::error::ExecError;

/// Resolves the cluster client configuration selected by `opt`.
///
/// An explicit kubeconfig file wins, then a context override on the default kubeconfig,
/// then the usual inference chain (`KUBECONFIG`, `~/.kube/config`, in-cluster service account).
pub async fn load_config(opt: &ClientOpt) -> Result<Config, ExecError> {
    let options = KubeConfigOptions {
        context: opt.current_context.clone(),
        ..Default::default()
    };

    match (&opt.kubeconfig, &opt.current_context) {
        (Some(path), _) => {
            log::debug!("loading kube config from {}", path.display());
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|err| ExecError::KubeConfig(format!("{}: {err}", path.display())))?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|err| ExecError::KubeConfig(err.to_string()))
        }
        (None, Some(context)) => {
            log::debug!("loading kube config for context {context}");
            Config::from_kubeconfig(&options)
                .await
                .map_err(|err| ExecError::KubeConfig(err.to_string()))
        }
        (None, None) => Config::infer()
            .await
            .map_err(|err| ExecError::KubeConfig(err.to_string())),
    }
}

/// Builds a client able to upgrade `pods/exec` requests to a multiplexed stream.
///
/// TLS material and the insecure flag are taken from the resolved config.
pub async fn build_client(opt: &ClientOpt) -> Result<Client, ExecError> {
    let config = load_config(opt).await?;
    log::debug!("cluster endpoint {}, default namespace {}", config.cluster_url, config.default_namespace);
    client_for(config)
}

/// Fails on a configured `proxy-url`: the client is built without proxy support and would
/// otherwise connect to the cluster directly.
pub fn client_for(config: Config) -> Result<Client, ExecError> {
    if let Some(proxy_url) = &config.proxy_url {
        return Err(ExecError::UnsupportedProxy(proxy_url.to_string()));
    }
    Client::try_from(config).map_err(ExecError::ClientSetup)
}
