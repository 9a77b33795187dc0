//! Every place of a PodSpec that references an image to pull.

use k8s_openapi::api::core::v1::PodSpec;

/// The pull policy fields of `spec`: init containers, containers, ephemeral
/// containers and image volumes.
pub(crate) fn pull_policies_mut(spec: &mut PodSpec) -> impl Iterator<Item = &mut Option<String>> {
    let init_containers = spec
        .init_containers
        .iter_mut()
        .flatten()
        .map(|c| &mut c.image_pull_policy);
    let containers = spec.containers.iter_mut().map(|c| &mut c.image_pull_policy);
    let ephemeral_containers = spec
        .ephemeral_containers
        .iter_mut()
        .flatten()
        .map(|c| &mut c.image_pull_policy);
    let image_volumes = spec
        .volumes
        .iter_mut()
        .flatten()
        .filter_map(|v| v.image.as_mut())
        .map(|image| &mut image.pull_policy);

    init_containers
        .chain(containers)
        .chain(ephemeral_containers)
        .chain(image_volumes)
}

/// Same fields as `pull_policies_mut`, paired with their field path.
pub(crate) fn pull_policies(spec: &PodSpec) -> Vec<(String, Option<&str>)> {
    let mut fields = Vec::new();

    for (i, c) in spec.init_containers.iter().flatten().enumerate() {
        fields.push((
            format!("spec.initContainers[{i}].imagePullPolicy"),
            c.image_pull_policy.as_deref(),
        ));
    }
    for (i, c) in spec.containers.iter().enumerate() {
        fields.push((
            format!("spec.containers[{i}].imagePullPolicy"),
            c.image_pull_policy.as_deref(),
        ));
    }
    for (i, c) in spec.ephemeral_containers.iter().flatten().enumerate() {
        fields.push((
            format!("spec.ephemeralContainers[{i}].imagePullPolicy"),
            c.image_pull_policy.as_deref(),
        ));
    }
    for (i, v) in spec.volumes.iter().flatten().enumerate() {
        if let Some(image) = &v.image {
            fields.push((
                format!("spec.volumes[{i}].image.pullPolicy"),
                image.pull_policy.as_deref(),
            ));
        }
    }

    fields
}
