use k8s_openapi::{
    Resource,
    api::{authentication::v1::UserInfo, core::v1::Pod},
};

use crate::{object::Object, operation::Operation};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        GroupVersionKind {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(group: &str, version: &str, resource: &str) -> Self {
        GroupVersionResource {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }

    /// True when this is the resource `resource` of the given API group,
    /// regardless of the version.
    pub fn is(&self, group: &str, resource: &str) -> bool {
        self.group == group && self.resource == resource
    }
}

/// The attributes of an API request handed to admission plugins.
///
/// Mutating plugins receive it by mutable reference and change `object` in
/// place; later plugins of the chain observe those changes.
#[derive(Clone, Debug)]
pub struct AdmissionRequest {
    pub uid: String,
    pub kind: GroupVersionKind,
    pub resource: GroupVersionResource,
    /// Empty when the request targets the primary resource.
    pub sub_resource: String,
    pub name: String,
    pub namespace: String,
    pub operation: Operation,
    pub user_info: UserInfo,
    pub object: Option<Object>,
    pub old_object: Option<Object>,
    pub dry_run: bool,
}

impl AdmissionRequest {
    pub fn new(
        kind: GroupVersionKind,
        resource: GroupVersionResource,
        operation: Operation,
        object: Option<Object>,
    ) -> Self {
        AdmissionRequest {
            uid: String::new(),
            kind,
            resource,
            sub_resource: String::new(),
            name: String::new(),
            namespace: String::new(),
            operation,
            user_info: UserInfo::default(),
            object,
            old_object: None,
            dry_run: false,
        }
    }

    /// Request targeting the primary `pods` resource, name and namespace are
    /// taken from the pod metadata.
    pub fn for_pod(pod: Pod, operation: Operation) -> Self {
        let name = pod.metadata.name.clone().unwrap_or_default();
        let namespace = pod.metadata.namespace.clone().unwrap_or_default();

        AdmissionRequest::new(
            GroupVersionKind::new(Pod::GROUP, Pod::VERSION, Pod::KIND),
            GroupVersionResource::new(Pod::GROUP, Pod::VERSION, Pod::URL_PATH_SEGMENT),
            operation,
            Some(Object::from(pod)),
        )
        .with_name(&name)
        .with_namespace(&namespace)
    }

    pub fn with_uid(mut self, uid: &str) -> Self {
        self.uid = uid.to_string();
        self
    }

    pub fn with_sub_resource(mut self, sub_resource: &str) -> Self {
        self.sub_resource = sub_resource.to_string();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub fn pod(&self) -> Option<&Pod> {
        self.object.as_ref().and_then(Object::as_pod)
    }

    pub fn pod_mut(&mut self) -> Option<&mut Pod> {
        self.object.as_mut().and_then(Object::as_pod_mut)
    }

    /// Kind of the submitted object, `<none>` when the request carries none.
    pub fn object_kind(&self) -> &str {
        self.object.as_ref().map_or("<none>", Object::kind)
    }
}
