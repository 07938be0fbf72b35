use std::time::Duration;

use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SelfSubjectAccessReview, SelfSubjectAccessReviewSpec, SubjectAccessReviewStatus,
};
use kube::api::PostParams;
use kube::Api;

use crate::core::error::ExecError;
use crate::exec::client::ExecClient;

pub const PERMISSION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Access review asking whether the caller may create `pods/exec` in `namespace`.
pub fn exec_access_review(namespace: &str) -> SelfSubjectAccessReview {
    SelfSubjectAccessReview {
        spec: SelfSubjectAccessReviewSpec {
            resource_attributes: Some(ResourceAttributes {
                namespace: Some(String::from(namespace)),
                verb: Some(String::from("create")),
                group: Some(String::new()),
                resource: Some(String::from("pods")),
                subresource: Some(String::from("exec")),
                name: None,
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn evaluate_access(status: Option<&SubjectAccessReviewStatus>) -> Result<(), ExecError> {
    match status {
        Some(status) if status.allowed => Ok(()),
        Some(status) => {
            if let Some(evaluation_error) = &status.evaluation_error {
                log::warn!("access review evaluation error - {evaluation_error}");
            }
            Err(ExecError::PermissionDenied {
                reason: status.reason.clone().filter(|reason| !reason.is_empty()),
            })
        }
        None => Err(ExecError::PermissionDenied { reason: None }),
    }
}

impl ExecClient {
    /// Checks that the current identity can create the exec subresource in the configured namespace.
    pub async fn can_exec(&self) -> Result<(), ExecError> {
        let namespace = &self.opt().namespace;
        let review = exec_access_review(namespace);
        let reviews_api = Api::<SelfSubjectAccessReview>::all(self.client().clone());

        log::info!("checking for exec permissions, namespace={namespace}");

        let response = tokio::time::timeout(
            PERMISSION_CHECK_TIMEOUT,
            reviews_api.create(&PostParams::default(), &review),
        )
            .await
            .map_err(|_| ExecError::Timeout { timeout: PERMISSION_CHECK_TIMEOUT })?
            .map_err(ExecError::AuthorizationQuery)?;

        evaluate_access(response.status.as_ref())?;

        log::info!("confirmed exec permissions, namespace={namespace}");
        Ok(())
    }
}
