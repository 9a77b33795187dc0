use k8s_openapi::{Resource, api::core::v1::Pod};
use serde::Serialize;
use serde_json::Value;

use crate::errors::{AdmissionError, Result};

/// The object carried by an admission request.
///
/// Pods are decoded into their typed representation, every other kind is
/// kept as a raw JSON document together with its type metadata.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Pod(Box<Pod>),
    Unstructured(UnstructuredObject),
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnstructuredObject {
    pub api_version: String,
    pub kind: String,
    pub data: Value,
}

impl UnstructuredObject {
    /// Encode any typed Kubernetes resource as an unstructured object.
    pub fn from_resource<K>(resource: &K) -> Result<Self>
    where
        K: Resource + Serialize,
    {
        let data = serde_json::to_value(resource).map_err(AdmissionError::Encode)?;
        Ok(UnstructuredObject {
            api_version: K::API_VERSION.to_string(),
            kind: K::KIND.to_string(),
            data,
        })
    }
}

impl Object {
    /// Decode an object using its `apiVersion` and `kind`.
    pub fn from_value(value: Value) -> Result<Self> {
        let api_version = type_meta_field(&value, "apiVersion")?;
        let kind = type_meta_field(&value, "kind")?;

        if api_version == Pod::API_VERSION && kind == Pod::KIND {
            let pod: Pod = serde_json::from_value(value).map_err(AdmissionError::Decode)?;
            return Ok(Object::Pod(Box::new(pod)));
        }

        Ok(Object::Unstructured(UnstructuredObject {
            api_version,
            kind,
            data: value,
        }))
    }

    pub fn as_pod(&self) -> Option<&Pod> {
        match self {
            Object::Pod(pod) => Some(&**pod),
            Object::Unstructured(_) => None,
        }
    }

    pub fn as_pod_mut(&mut self) -> Option<&mut Pod> {
        match self {
            Object::Pod(pod) => Some(&mut **pod),
            Object::Unstructured(_) => None,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Object::Pod(_) => Pod::KIND,
            Object::Unstructured(obj) => &obj.kind,
        }
    }

    pub fn api_version(&self) -> &str {
        match self {
            Object::Pod(_) => Pod::API_VERSION,
            Object::Unstructured(obj) => &obj.api_version,
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        match self {
            Object::Pod(pod) => serde_json::to_value(pod).map_err(AdmissionError::Encode),
            Object::Unstructured(obj) => Ok(obj.data.clone()),
        }
    }
}

impl From<Pod> for Object {
    fn from(pod: Pod) -> Self {
        Object::Pod(Box::new(pod))
    }
}

impl From<UnstructuredObject> for Object {
    fn from(obj: UnstructuredObject) -> Self {
        Object::Unstructured(obj)
    }
}

fn type_meta_field(value: &Value, field: &str) -> Result<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(AdmissionError::MissingTypeMeta)
}
