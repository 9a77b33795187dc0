//! AlwaysPullImages admission plugin.
//!
//! Every new Pod gets the image pull policy of all its containers forced to
//! `Always`. Once an image has been pulled to a node, any pod scheduled there
//! could otherwise run it just by knowing its name, without the registry
//! ever checking the credentials of the pod. Forcing a pull on every
//! container start makes the registry authorize each use of the image.

use std::sync::Arc;

use admission::{
    AdmissionError, AdmissionRequest, FieldError, Handler, Interface, MutationInterface,
    Operation, Plugins, Result, ValidationInterface,
};
use k8s_openapi::{Resource, api::core::v1::Pod};
use tracing::debug;

mod pod_images;
mod pull_policy;

pub use pull_policy::{PullPolicy, UnsupportedPullPolicy};

pub const PLUGIN_NAME: &str = "AlwaysPullImages";

/// Register the plugin under `PLUGIN_NAME`.
pub fn register(plugins: &mut Plugins) {
    plugins.register(PLUGIN_NAME, new_plugin);
}

fn new_plugin(config: Option<&serde_yaml::Value>) -> Result<Arc<dyn Interface>> {
    match config {
        None | Some(serde_yaml::Value::Null) => Ok(Arc::new(AlwaysPullImages::new())),
        Some(_) => Err(AdmissionError::InvalidPluginConfig {
            plugin: PLUGIN_NAME.to_string(),
            reason: "the plugin does not accept any configuration".to_string(),
        }),
    }
}

/// Mutates the pull policy of every container of new pods to `Always`, and
/// rejects new pods still carrying a different policy.
pub struct AlwaysPullImages {
    handler: Handler,
}

impl AlwaysPullImages {
    pub fn new() -> Self {
        AlwaysPullImages {
            handler: Handler::new(&[Operation::Create]),
        }
    }

    /// Subresources, resources other than pods and operations other than
    /// pod creation are left alone.
    fn should_ignore(&self, request: &AdmissionRequest) -> bool {
        if !request.sub_resource.is_empty() {
            return true;
        }

        if !request.resource.is(Pod::GROUP, Pod::URL_PATH_SEGMENT) {
            return true;
        }

        request.operation != Operation::Create
    }
}

impl Default for AlwaysPullImages {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected_object_type(request: &AdmissionRequest) -> AdmissionError {
    AdmissionError::UnexpectedObjectType {
        resource: Pod::URL_PATH_SEGMENT.to_string(),
        expected_kind: Pod::KIND.to_string(),
        found: request.object_kind().to_string(),
    }
}

impl Interface for AlwaysPullImages {
    fn handles(&self, operation: Operation) -> bool {
        self.handler.handles(operation)
    }

    fn as_mutation(&self) -> Option<&dyn MutationInterface> {
        Some(self)
    }

    fn as_validation(&self) -> Option<&dyn ValidationInterface> {
        Some(self)
    }
}

impl MutationInterface for AlwaysPullImages {
    fn admit(&self, request: &mut AdmissionRequest) -> Result<()> {
        if self.should_ignore(request) {
            return Ok(());
        }

        if request.pod().is_none() {
            return Err(unexpected_object_type(request));
        }
        let Some(pod) = request.pod_mut() else {
            return Ok(());
        };

        let mut changed = 0;
        if let Some(spec) = pod.spec.as_mut() {
            for policy in pod_images::pull_policies_mut(spec) {
                if policy.as_deref() != Some(PullPolicy::Always.as_str()) {
                    changed += 1;
                }
                *policy = Some(PullPolicy::Always.to_string());
            }
        }

        debug!(
            plugin = PLUGIN_NAME,
            pod = pod.metadata.name.as_deref().unwrap_or_default(),
            changed,
            "image pull policies forced to Always"
        );
        Ok(())
    }
}

impl ValidationInterface for AlwaysPullImages {
    fn validate(&self, request: &AdmissionRequest) -> Result<()> {
        if self.should_ignore(request) {
            return Ok(());
        }

        let Some(pod) = request.pod() else {
            return Err(unexpected_object_type(request));
        };
        let Some(spec) = pod.spec.as_ref() else {
            return Ok(());
        };

        let always = PullPolicy::Always.as_str();
        let causes: Vec<FieldError> = pod_images::pull_policies(spec)
            .into_iter()
            .filter(|(_, policy)| *policy != Some(always))
            .map(|(field, policy)| {
                FieldError::not_supported(field, policy.unwrap_or_default(), &[always])
            })
            .collect();

        if causes.is_empty() {
            return Ok(());
        }
        Err(AdmissionError::forbidden(
            Pod::URL_PATH_SEGMENT,
            request.name.as_str(),
            causes,
        ))
    }
}
