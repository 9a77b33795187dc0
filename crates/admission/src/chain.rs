use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    admission_request::AdmissionRequest,
    config::AdmissionConfig,
    errors::{AdmissionError, Result},
    interfaces::Interface,
    operation::Operation,
    plugins::Plugins,
};

struct ChainedPlugin {
    name: String,
    plugin: Arc<dyn Interface>,
}

/// An ordered list of admission plugins.
///
/// All the mutating plugins run first, in order, then all the validating
/// ones. The first plugin returning an error denies the request and stops
/// the evaluation.
#[derive(Default)]
pub struct AdmissionChain {
    plugins: Vec<ChainedPlugin>,
}

impl AdmissionChain {
    pub fn new() -> Self {
        AdmissionChain::default()
    }

    pub fn from_config(config: &AdmissionConfig, registry: &Plugins) -> Result<Self> {
        let mut chain = AdmissionChain::new();
        for plugin_config in &config.plugins {
            let plugin =
                registry.new_plugin(&plugin_config.name, plugin_config.configuration.as_ref())?;
            chain.push(&plugin_config.name, plugin);
        }
        Ok(chain)
    }

    pub fn push(&mut self, name: &str, plugin: Arc<dyn Interface>) {
        self.plugins.push(ChainedPlugin {
            name: name.to_string(),
            plugin,
        });
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name.as_str()).collect()
    }

    #[tracing::instrument(
        name = "admission",
        skip_all,
        fields(
            uid = %request.uid,
            resource = %request.resource.resource,
            sub_resource = %request.sub_resource,
            operation = %request.operation,
        )
    )]
    pub fn admit(&self, request: &mut AdmissionRequest) -> Result<()> {
        for chained in self.handling(request.operation) {
            let Some(mutator) = chained.plugin.as_mutation() else {
                continue;
            };
            debug!(plugin = chained.name.as_str(), "mutating admission");
            mutator
                .admit(request)
                .map_err(|e| denied(&chained.name, e))?;
        }

        for chained in self.handling(request.operation) {
            let Some(validator) = chained.plugin.as_validation() else {
                continue;
            };
            debug!(plugin = chained.name.as_str(), "validating admission");
            validator
                .validate(request)
                .map_err(|e| denied(&chained.name, e))?;
        }

        Ok(())
    }

    fn handling(&self, operation: Operation) -> impl Iterator<Item = &ChainedPlugin> {
        self.plugins
            .iter()
            .filter(move |chained| chained.plugin.handles(operation))
    }
}

fn denied(plugin: &str, error: AdmissionError) -> AdmissionError {
    warn!(plugin, error = error.to_string().as_str(), "request denied");
    AdmissionError::Denied {
        plugin: plugin.to_string(),
        source: Box::new(error),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};

    use super::*;
    use crate::{
        Handler, MutationInterface, ValidationInterface,
        config::PluginConfig,
        errors::FieldError,
    };

    /// Appends its name to the pod annotations, and records every call.
    struct Recorder {
        name: &'static str,
        handler: Handler,
        calls: Arc<Mutex<Vec<String>>>,
        reject: bool,
    }

    impl Interface for Recorder {
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

    impl MutationInterface for Recorder {
        fn admit(&self, request: &mut AdmissionRequest) -> Result<()> {
            self.calls.lock().unwrap().push(format!("admit:{}", self.name));
            if let Some(pod) = request.pod_mut() {
                pod.metadata
                    .annotations
                    .get_or_insert_with(Default::default)
                    .insert(self.name.to_string(), "seen".to_string());
            }
            Ok(())
        }
    }

    impl ValidationInterface for Recorder {
        fn validate(&self, _request: &AdmissionRequest) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("validate:{}", self.name));
            if self.reject {
                return Err(AdmissionError::forbidden(
                    "pods",
                    "nginx",
                    vec![FieldError::not_supported("spec", "x", &["y"])],
                ));
            }
            Ok(())
        }
    }

    fn recorder(
        name: &'static str,
        operations: &[Operation],
        reject: bool,
        calls: &Arc<Mutex<Vec<String>>>,
    ) -> Arc<dyn Interface> {
        Arc::new(Recorder {
            name,
            handler: Handler::new(operations),
            calls: calls.clone(),
            reject,
        })
    }

    fn pod_request(operation: Operation) -> AdmissionRequest {
        let pod = Pod {
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: "nginx".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        };
        AdmissionRequest::for_pod(pod, operation)
    }

    #[test]
    fn mutators_run_before_validators() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut chain = AdmissionChain::new();
        chain.push("first", recorder("first", &[Operation::Create], false, &calls));
        chain.push("second", recorder("second", &[Operation::Create], false, &calls));

        let mut request = pod_request(Operation::Create);
        chain.admit(&mut request).unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "admit:first",
                "admit:second",
                "validate:first",
                "validate:second"
            ]
        );
        let annotations = request.pod().unwrap().metadata.annotations.clone().unwrap();
        assert_eq!(annotations.len(), 2);
    }

    #[test]
    fn plugins_not_handling_the_operation_are_skipped() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut chain = AdmissionChain::new();
        chain.push("create", recorder("create", &[Operation::Create], false, &calls));
        chain.push("update", recorder("update", &[Operation::Update], false, &calls));

        let mut request = pod_request(Operation::Update);
        chain.admit(&mut request).unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["admit:update", "validate:update"]
        );
    }

    #[test]
    fn first_rejection_stops_the_chain() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut chain = AdmissionChain::new();
        chain.push("deny", recorder("deny", &[Operation::Create], true, &calls));
        chain.push("after", recorder("after", &[Operation::Create], false, &calls));

        let mut request = pod_request(Operation::Create);
        let err = chain.admit(&mut request).unwrap_err();

        match err {
            AdmissionError::Denied { ref plugin, .. } => assert_eq!(plugin, "deny"),
            ref e => panic!("unexpected error: {e}"),
        }
        assert_eq!(err.status_code(), 403);
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["admit:deny", "admit:after", "validate:deny"]
        );
    }

    #[test]
    fn build_from_config() {
        fn factory(_config: Option<&serde_yaml::Value>) -> Result<Arc<dyn Interface>> {
            Ok(Arc::new(Handler::new_all()))
        }

        let mut registry = Plugins::new();
        registry.register("B", factory);
        registry.register("A", factory);

        let config = AdmissionConfig {
            plugins: vec![
                PluginConfig {
                    name: "B".to_string(),
                    configuration: None,
                },
                PluginConfig {
                    name: "A".to_string(),
                    configuration: None,
                },
            ],
        };
        let chain = AdmissionChain::from_config(&config, &registry).unwrap();
        assert_eq!(chain.plugin_names(), vec!["B", "A"]);

        let config = AdmissionConfig {
            plugins: vec![PluginConfig {
                name: "Missing".to_string(),
                configuration: None,
            }],
        };
        assert!(matches!(
            AdmissionChain::from_config(&config, &registry),
            Err(AdmissionError::UnknownPlugin(_))
        ));
    }
}
