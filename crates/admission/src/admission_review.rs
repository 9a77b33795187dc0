use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    admission_request::{AdmissionRequest, GroupVersionKind, GroupVersionResource},
    chain::AdmissionChain,
    errors::{AdmissionError, Result},
    object::Object,
    operation::Operation,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<AdmissionReviewRequest>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<AdmissionResponse>,
}

impl AdmissionReview {
    pub fn new_with_response(response: AdmissionResponse) -> Self {
        AdmissionReview {
            response: Some(response),
            ..Default::default()
        }
    }
}

impl Default for AdmissionReview {
    fn default() -> Self {
        AdmissionReview {
            api_version: Some(String::from("admission.k8s.io/v1")),
            kind: Some(String::from("AdmissionReview")),
            request: None,
            response: None,
        }
    }
}

/// The `request` of an AdmissionReview, as sent by the API server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewRequest {
    pub uid: String,
    pub kind: GroupVersionKind,
    pub resource: GroupVersionResource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub operation: String,
    #[serde(default)]
    pub user_info: k8s_openapi::api::authentication::v1::UserInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<k8s_openapi::apimachinery::pkg::runtime::RawExtension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_object: Option<k8s_openapi::apimachinery::pkg::runtime::RawExtension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

impl TryFrom<AdmissionReviewRequest> for AdmissionRequest {
    type Error = AdmissionError;

    fn try_from(raw: AdmissionReviewRequest) -> Result<Self> {
        let operation = raw.operation.parse::<Operation>()?;
        let object = raw.object.map(|o| Object::from_value(o.0)).transpose()?;
        let old_object = raw.old_object.map(|o| Object::from_value(o.0)).transpose()?;

        Ok(AdmissionRequest {
            uid: raw.uid,
            kind: raw.kind,
            resource: raw.resource,
            sub_resource: raw.sub_resource.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            namespace: raw.namespace.unwrap_or_default(),
            operation,
            user_info: raw.user_info,
            object,
            old_object,
            dry_run: raw.dry_run.unwrap_or_default(),
        })
    }
}

/// This models the admission/v1/AdmissionResponse object of Kubernetes
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// Copied over from the corresponding AdmissionRequest.
    pub uid: String,

    pub allowed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<PatchType>,

    /// Base64 encoded JSONPatch (RFC 6902).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,

    /// Only consulted by the API server when `allowed` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionResponseStatus>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub enum PatchType {
    #[serde(rename = "JSONPatch")]
    #[default]
    JSONPatch,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct AdmissionResponseStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl AdmissionResponse {
    pub fn allow(uid: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: true,
            ..Default::default()
        }
    }

    pub fn reject(uid: String, message: String, code: u16) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: false,
            status: Some(AdmissionResponseStatus {
                message: Some(message),
                code: Some(code),
            }),
            ..Default::default()
        }
    }

    pub fn from_error(uid: String, error: &AdmissionError) -> AdmissionResponse {
        AdmissionResponse::reject(uid, error.to_string(), error.status_code())
    }

    /// Accept the request, attaching the JSONPatch that turns `original`
    /// into `mutated`. No patch is attached when they are equal.
    pub fn from_mutation(
        uid: String,
        original: &serde_json::Value,
        mutated: &serde_json::Value,
    ) -> Result<AdmissionResponse> {
        let diff = json_patch::diff(original, mutated);
        if diff.0.is_empty() {
            return Ok(AdmissionResponse::allow(uid));
        }

        let patch = serde_json::to_string(&diff)
            .map(|s| general_purpose::STANDARD.encode(s))
            .map_err(AdmissionError::Encode)?;

        Ok(AdmissionResponse {
            uid,
            allowed: true,
            patch_type: Some(PatchType::JSONPatch),
            patch: Some(patch),
            status: None,
        })
    }
}

impl AdmissionChain {
    /// Evaluate an AdmissionReview sent by the API server and build the
    /// AdmissionReview to reply with.
    pub fn review(&self, review: AdmissionReview) -> AdmissionReview {
        let response = match review.request {
            Some(raw) => self.evaluate(raw),
            None => AdmissionResponse::reject(
                String::new(),
                "admission review does not contain a request".to_string(),
                400,
            ),
        };
        AdmissionReview::new_with_response(response)
    }

    fn evaluate(&self, raw: AdmissionReviewRequest) -> AdmissionResponse {
        let uid = raw.uid.clone();

        let mut request = match AdmissionRequest::try_from(raw) {
            Ok(request) => request,
            Err(e) => {
                info!(
                    uid = uid.as_str(),
                    error = e.to_string().as_str(),
                    "cannot decode admission request"
                );
                return AdmissionResponse::from_error(uid, &e);
            }
        };

        // Compare against the re-encoded object, not the raw one, so that
        // decoding alone never shows up in the patch.
        let original = match request.object.as_ref().map(Object::to_value).transpose() {
            Ok(original) => original,
            Err(e) => return AdmissionResponse::from_error(uid, &e),
        };

        if let Err(e) = self.admit(&mut request) {
            return AdmissionResponse::from_error(uid, &e);
        }

        let response = match (original, request.object.as_ref()) {
            (Some(original), Some(object)) => object
                .to_value()
                .and_then(|mutated| AdmissionResponse::from_mutation(uid.clone(), &original, &mutated)),
            _ => Ok(AdmissionResponse::allow(uid.clone())),
        };

        match response {
            Ok(response) => {
                debug!(
                    uid = uid.as_str(),
                    mutated = response.patch.is_some(),
                    "request accepted"
                );
                response
            }
            Err(e) => AdmissionResponse::from_error(uid, &e),
        }
    }
}
