use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdmissionError>;

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error(
        "resource {resource} was marked with kind {expected_kind} but was unable to be converted: got {found}"
    )]
    UnexpectedObjectType {
        resource: String,
        expected_kind: String,
        found: String,
    },

    #[error("{resource} \"{name}\" is forbidden: {causes}")]
    Forbidden {
        resource: String,
        name: String,
        causes: FieldErrors,
    },

    #[error("admission plugin \"{plugin}\" denied the request: {source}")]
    Denied {
        plugin: String,
        #[source]
        source: Box<AdmissionError>,
    },

    #[error("unknown admission plugin: {0}")]
    UnknownPlugin(String),

    #[error("invalid configuration for admission plugin \"{plugin}\": {reason}")]
    InvalidPluginConfig { plugin: String, reason: String },

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("object does not declare apiVersion and kind")]
    MissingTypeMeta,

    #[error("cannot decode object: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("cannot encode object: {0}")]
    Encode(#[source] serde_json::Error),
}

impl AdmissionError {
    pub fn forbidden(
        resource: impl Into<String>,
        name: impl Into<String>,
        causes: Vec<FieldError>,
    ) -> Self {
        AdmissionError::Forbidden {
            resource: resource.into(),
            name: name.into(),
            causes: FieldErrors(causes),
        }
    }

    /// HTTP status code reported back to the API client when this error
    /// denies a request.
    pub fn status_code(&self) -> u16 {
        match self {
            AdmissionError::UnexpectedObjectType { .. }
            | AdmissionError::UnknownOperation(_)
            | AdmissionError::MissingTypeMeta
            | AdmissionError::Decode(_) => 400,
            AdmissionError::Forbidden { .. } => 403,
            AdmissionError::Denied { source, .. } => source.status_code(),
            AdmissionError::UnknownPlugin(_)
            | AdmissionError::InvalidPluginConfig { .. }
            | AdmissionError::Encode(_) => 500,
        }
    }
}

/// A field that holds a value outside of the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub value: String,
    pub supported_values: Vec<String>,
}

impl FieldError {
    pub fn not_supported(field: impl Into<String>, value: impl Into<String>, supported: &[&str]) -> Self {
        FieldError {
            field: field.into(),
            value: value.into(),
            supported_values: supported.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let supported = self
            .supported_values
            .iter()
            .map(|s| format!("\"{s}\""))
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{}: Unsupported value: \"{}\": supported values: {}",
            self.field, self.value, supported
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{single}"),
            errors => {
                let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", messages.join(", "))
            }
        }
    }
}
