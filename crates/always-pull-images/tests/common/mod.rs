use std::path::PathBuf;

use admission::{AdmissionChain, Plugins, admission_review::AdmissionReview, config::AdmissionConfig};
use base64::{Engine as _, engine::general_purpose};

pub(crate) fn registry() -> Plugins {
    let mut plugins = Plugins::new();
    always_pull_images::register(&mut plugins);
    plugins
}

pub(crate) fn chain() -> AdmissionChain {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/admission_config.yaml");
    let config = AdmissionConfig::from_file(&config_path).expect("cannot load admission config");

    AdmissionChain::from_config(&config, &registry()).expect("cannot build admission chain")
}

pub(crate) fn admission_review(input: &str) -> AdmissionReview {
    serde_json::from_str(input).expect("deserialization should work")
}

/// Apply the patch of the response to the object that was submitted.
pub(crate) fn patched_object(request: &AdmissionReview, reply: &AdmissionReview) -> serde_json::Value {
    let mut object = request
        .request
        .as_ref()
        .and_then(|r| r.object.as_ref())
        .map(|o| o.0.clone())
        .expect("the request has no object");

    let response = reply.response.as_ref().expect("the reply has no response");
    let patch = response.patch.as_ref().expect("the response has no patch");
    let decoded = general_purpose::STANDARD
        .decode(patch)
        .expect("the patch is not base64 encoded");
    let patch: json_patch::Patch = serde_json::from_slice(&decoded).expect("invalid JSONPatch");

    json_patch::patch(&mut object, &patch).expect("cannot apply patch");
    object
}
